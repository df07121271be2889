//! Per-visitor session carried in a signed cookie.
//!
//! Handlers decode a [`Session`] from the request headers, pass it into the
//! league logic by `&mut`, and write it back with [`SessionCodec::set_cookie`]
//! on the response. Nothing about a visitor is kept on the server.

use crate::shared::session_token::{sign_token, verify_token};
use axum::http::{header::COOKIE, HeaderMap};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "cap_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
            FlashKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_id: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_master: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl Session {
    pub fn select_league(&mut self, league_id: String, is_admin: bool, is_master: bool) {
        self.league_id = Some(league_id);
        self.is_admin = is_admin;
        self.is_master = is_master;
    }

    /// Drops the selected league and its flags. Pending flashes survive.
    pub fn clear_league(&mut self) {
        self.league_id = None;
        self.is_admin = false;
        self.is_master = false;
    }

    pub fn points_at(&self, league_id: &str) -> bool {
        self.league_id.as_deref() == Some(league_id)
    }

    pub fn flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.flashes.push(Flash {
            kind,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    fn is_empty(&self) -> bool {
        self == &Session::default()
    }
}

#[derive(Clone)]
pub struct SessionCodec {
    secret: Vec<u8>,
    secure: bool,
}

impl SessionCodec {
    pub fn new(secret: Vec<u8>, secure: bool) -> Self {
        Self { secret, secure }
    }

    /// Missing, malformed or forged cookies all read as an empty session.
    pub fn read(&self, headers: &HeaderMap) -> Session {
        let Some(token) = session_cookie(headers) else {
            return Session::default();
        };
        match verify_token::<Session>(token, &self.secret) {
            Some(session) => session,
            None => {
                tracing::debug!("ignoring session cookie with bad signature");
                Session::default()
            }
        }
    }

    /// `Set-Cookie` value persisting `session`, or expiring the cookie when
    /// the session is empty.
    pub fn set_cookie(&self, session: &Session) -> anyhow::Result<String> {
        let secure = if self.secure { "; Secure" } else { "" };
        if session.is_empty() {
            return Ok(format!(
                "{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{secure}"
            ));
        }
        let token = sign_token(session, &self.secret)?;
        Ok(format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax{secure}"
        ))
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

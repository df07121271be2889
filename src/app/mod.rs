mod views;


use crate::config::AppConfig;
use crate::league::board::{add_player, adjust_player, delete_player, require_admin, selected_league};
use crate::league::lifecycle::{
    create_league, delete_league, login, record_creation, CreateLeague, MasterPassword, Role,
};
use crate::league::{Category, LeagueError};
use crate::rate_limit::CreationLimiter;
use crate::session::{FlashKind, Session, SessionCodec};
use crate::store::{JsonStore, StoreError};
use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, MethodRouter},
    Form, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use views::{BoardView, HomeView};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

pub struct AppState {
    pub store: JsonStore,
    pub sessions: SessionCodec,
    pub limiter: CreationLimiter,
    pub master: MasterPassword,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            store: JsonStore::new(config.data_path.clone()),
            sessions: SessionCodec::new(config.session_secret.clone(), config.cookie_secure),
            limiter: CreationLimiter::new(chrono::Duration::seconds(config.create_window_secs)),
            master: MasterPassword::new(config.master_password.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateLeagueForm {
    league_name: String,
    admin_password: String,
    master_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginForm {
    league_id: String,
    role: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteLeagueForm {
    league_id: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayerForm {
    name: String,
    value: Option<String>,
    delta: Option<String>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct LeaderboardEntry {
    name: String,
    value: i64,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
    league: String,
    category: Category,
    scores: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Copy)]
enum BoardAction {
    Add,
    Adjust,
    Delete,
}

/// A successful form post: what to flash and where to send the browser.
struct Done {
    kind: FlashKind,
    message: String,
    to: &'static str,
}

impl Done {
    fn success(message: impl Into<String>, to: &'static str) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
            to,
        }
    }
}

type Outcome = Result<Done, LeagueError>;

pub fn router(state: Arc<AppState>) -> Router {
    let mut app: Router<Arc<AppState>> = Router::new()
        .route("/", get(home))
        .route("/league/create", post(league_create))
        .route("/league/login", post(league_login))
        .route("/league/delete", post(league_delete))
        .route("/logout", post(logout))
        .route("/api/health", get(health))
        .route("/api/leaderboard", get(leaderboard_get));

    for category in Category::ALL {
        app = app.merge(board_routes(category));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn board_routes(category: Category) -> Router<Arc<AppState>> {
    let path = category.path();
    Router::new()
        .route(
            path,
            get(
                move |State(state): State<Arc<AppState>>, headers: HeaderMap| {
                    board_page(state, headers, category)
                },
            ),
        )
        .route(&format!("{path}/add"), board_action_route(category, BoardAction::Add))
        .route(&format!("{path}/edit"), board_action_route(category, BoardAction::Adjust))
        .route(&format!("{path}/adjust"), board_action_route(category, BoardAction::Adjust))
        .route(&format!("{path}/delete"), board_action_route(category, BoardAction::Delete))
}

fn board_action_route(category: Category, action: BoardAction) -> MethodRouter<Arc<AppState>> {
    post(
        move |State(state): State<Arc<AppState>>,
              headers: HeaderMap,
              form: Result<Form<PlayerForm>, FormRejection>| {
            board_action(state, headers, form, category, action)
        },
    )
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let mut session = state.sessions.read(&headers);
    let document = match state.store.load().await {
        Ok(document) => document,
        Err(error) => return storage_failure(&error),
    };

    let current_league = session
        .league_id
        .as_deref()
        .and_then(|league_id| document.leagues.get(league_id))
        .map(|league| league.name.as_str());
    if current_league.is_none() && session.league_id.is_some() {
        session.clear_league();
    }

    let flashes = session.take_flashes();
    let html = views::home_page(&HomeView {
        leagues: document.directory(),
        session: &session,
        current_league,
        flashes: &flashes,
    });
    with_session(&state, &session, Html(html))
}

async fn board_page(state: Arc<AppState>, headers: HeaderMap, category: Category) -> Response {
    let mut session = state.sessions.read(&headers);
    let document = match state.store.load().await {
        Ok(document) => document,
        Err(error) => return storage_failure(&error),
    };
    let league = match selected_league(&document, &session) {
        Ok(league) => league,
        Err(error) => return settle(&state, session, Err(error), "/"),
    };

    let flashes = session.take_flashes();
    let league_id = session.league_id.clone().unwrap_or_default();
    let html = views::board_page(&BoardView {
        category,
        league_id: &league_id,
        league,
        session: &session,
        flashes: &flashes,
    });
    with_session(&state, &session, Html(html))
}

async fn league_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
    form: Result<Form<CreateLeagueForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let client = client_id(&headers, connect.map(|ConnectInfo(addr)| addr));
    let mut session = state.sessions.read(&headers);
    let outcome = run_create(&state, &mut session, &form, &client).await;
    settle(&state, session, outcome, "/")
}

async fn run_create(
    state: &AppState,
    session: &mut Session,
    form: &CreateLeagueForm,
    client: &str,
) -> Outcome {
    let now = Utc::now();
    let mut document = state.store.load().await?;
    let created = create_league(
        &mut document,
        session,
        &state.limiter,
        &state.master,
        CreateLeague {
            name: &form.league_name,
            admin_password: &form.admin_password,
            master_password: &form.master_password,
            client,
        },
        now,
    )
    .inspect_err(|error| {
        if matches!(error, LeagueError::RateLimited) {
            tracing::warn!(client, "league creation rate limited");
        }
    })?;
    state.store.save(&document).await?;
    record_creation(&state.limiter, &created, client, now);

    tracing::info!(
        league_id = %created.league_id,
        client,
        used_master = created.used_master,
        "league created"
    );
    Ok(Done::success("League created. You are its admin.", "/orange"))
}

async fn league_login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let mut session = state.sessions.read(&headers);
    let outcome = run_login(&state, &mut session, &form).await;
    settle(&state, session, outcome, "/")
}

async fn run_login(state: &AppState, session: &mut Session, form: &LoginForm) -> Outcome {
    let document = state.store.load().await?;
    let league_id = form.league_id.trim();
    let role = login(
        &document,
        session,
        &state.master,
        league_id,
        Role::parse(&form.role),
        &form.password,
    )
    .inspect_err(|error| {
        if matches!(error, LeagueError::IncorrectPassword) {
            tracing::warn!(league_id, "admin login rejected");
        }
    })?;

    match role {
        Role::Admin => {
            tracing::info!(league_id, master = session.is_master, "admin login");
            Ok(Done::success("Admin access granted.", "/orange"))
        }
        Role::Viewer => Ok(Done {
            kind: FlashKind::Info,
            message: "User access granted (view-only).".to_string(),
            to: "/orange",
        }),
    }
}

async fn league_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<DeleteLeagueForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let mut session = state.sessions.read(&headers);
    let outcome = run_delete(&state, &mut session, &form).await;
    settle(&state, session, outcome, "/")
}

async fn run_delete(state: &AppState, session: &mut Session, form: &DeleteLeagueForm) -> Outcome {
    let mut document = state.store.load().await?;
    let removed = delete_league(
        &mut document,
        session,
        &state.master,
        &form.league_id,
        &form.password,
    )?;
    state.store.save(&document).await?;

    tracing::info!(league_id = form.league_id.trim(), name = %removed.name, "league deleted");
    Ok(Done::success(format!("League '{}' deleted.", removed.name), "/"))
}

async fn logout(State(state): State<Arc<AppState>>) -> Response {
    redirect(&state, &Session::default(), "/")
}

async fn board_action(
    state: Arc<AppState>,
    headers: HeaderMap,
    form: Result<Form<PlayerForm>, FormRejection>,
    category: Category,
    action: BoardAction,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let session = state.sessions.read(&headers);
    let outcome = run_board_action(&state, &session, &form, category, action).await;
    settle(&state, session, outcome, category.path())
}

async fn run_board_action(
    state: &AppState,
    session: &Session,
    form: &PlayerForm,
    category: Category,
    action: BoardAction,
) -> Outcome {
    let mut document = state.store.load().await?;
    let (league_id, league) = require_admin(&mut document, session)?;
    let player = form.name.trim();

    let message = match action {
        BoardAction::Add => {
            let value = form.value.as_deref().unwrap_or_default();
            add_player(league, category, player, value)?;
            tracing::info!(league_id = %league_id, %category, player, "player added");
            format!("Player added to {} leaderboard.", category.title())
        }
        BoardAction::Adjust => {
            let delta = form
                .delta
                .as_deref()
                .or(form.value.as_deref())
                .unwrap_or_default();
            let updated = adjust_player(league, category, player, delta)?;
            tracing::info!(league_id = %league_id, %category, player, updated, "player adjusted");
            format!("{} stats updated.", category.title())
        }
        BoardAction::Delete => {
            let entry = delete_player(league, category, player, Utc::now())?;
            tracing::info!(
                league_id = %league_id,
                %category,
                player,
                value = entry.value,
                "player deleted"
            );
            format!("Player removed from {} leaderboard.", category.title())
        }
    };

    state.store.save(&document).await?;
    Ok(Done::success(message, category.path()))
}

async fn leaderboard_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(league_id) = params
        .get("league")
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
    else {
        return error_json(StatusCode::BAD_REQUEST, "league is required");
    };
    let category = match params
        .get("category")
        .map(String::as_str)
        .unwrap_or("orange")
        .parse::<Category>()
    {
        Ok(category) => category,
        Err(error) => return error_json(StatusCode::BAD_REQUEST, &error.to_string()),
    };
    let limit = params
        .get("limit")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);

    let document = match state.store.load().await {
        Ok(document) => document,
        Err(error) => {
            tracing::error!(?error, "failed to load leaderboard");
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load leaderboard");
        }
    };
    let league = match document.league(league_id) {
        Ok(league) => league,
        Err(error) => return error_json(StatusCode::NOT_FOUND, &error.to_string()),
    };

    let scores = league
        .stats(category)
        .ranked()
        .into_iter()
        .take(limit)
        .map(|(name, value)| LeaderboardEntry {
            name: name.to_string(),
            value,
        })
        .collect::<Vec<_>>();

    (
        StatusCode::OK,
        Json(LeaderboardResponse {
            league: league_id.to_string(),
            category,
            scores,
        }),
    )
        .into_response()
}

/// Turns a form post outcome into a flash plus redirect. Storage failures
/// are the only ones that reach the client as a 500.
fn settle(state: &AppState, mut session: Session, outcome: Outcome, fallback: &'static str) -> Response {
    match outcome {
        Ok(done) => {
            session.flash(done.kind, done.message);
            redirect(state, &session, done.to)
        }
        Err(LeagueError::Storage(error)) => storage_failure(&error),
        Err(error) => {
            if let LeagueError::LeagueNotFound(league_id) = &error {
                if session.points_at(league_id) {
                    session.clear_league();
                }
            }
            let to = if error.needs_league() { "/" } else { fallback };
            tracing::debug!(kind = ?error.kind(), %error, "request refused");
            session.flash(FlashKind::Error, error.to_string());
            redirect(state, &session, to)
        }
    }
}

fn redirect(state: &AppState, session: &Session, to: &str) -> Response {
    with_session(state, session, Redirect::to(to))
}

fn with_session(state: &AppState, session: &Session, response: impl IntoResponse) -> Response {
    match state.sessions.set_cookie(session) {
        Ok(cookie) => ([(SET_COOKIE, cookie)], response).into_response(),
        Err(error) => {
            tracing::error!(?error, "failed to sign session cookie");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn storage_failure(error: &StoreError) -> Response {
    tracing::error!(?error, "league store unavailable");
    (StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable").into_response()
}

fn error_json(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            ok: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

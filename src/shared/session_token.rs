use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn sign_token<T: Serialize>(claims: &T, secret: &[u8]) -> anyhow::Result<String> {
    let payload = serde_json::to_vec(claims).context("failed to serialize session claims")?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let mut mac =
        HmacSha256::new_from_slice(secret).context("failed to initialize session signer")?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{payload_b64}.{signature_b64}"))
}

/// Returns the claims only when the signature matches `secret`.
pub fn verify_token<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Option<T> {
    let (payload_b64, signature_b64) = token.split_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature).ok()?;

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    serde_json::from_slice(&payload).ok()
}

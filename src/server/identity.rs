//! Per-request caller identity.
//!
//! `POST /api/identify` hands the client a cookie holding the chosen display
//! name and an HMAC-SHA256 tag over it. Every later request carries the cookie
//! back and the [`Identity`] extractor verifies it. Requests without a valid
//! cookie act as [`ANONYMOUS`].

use super::AppState;
use crate::libs::task::ANONYMOUS;
use anyhow::Result;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::convert::Infallible;

pub const IDENTITY_COOKIE: &str = "simpletask_user";
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies identity cookie values of the form `<base64url name>.<hex tag>`.
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
}

impl SessionSigner {
    pub fn new(key: &[u8]) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(key).map_err(|_| anyhow::anyhow!("invalid session signing key"))?;
        Ok(Self { mac })
    }

    pub fn sign(&self, name: &str) -> String {
        let payload = URL_SAFE_NO_PAD.encode(name.as_bytes());
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let tag = hex::encode(mac.finalize().into_bytes());

        format!("{}.{}", payload, tag)
    }

    /// Returns the signed name, or `None` for anything malformed or forged.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (payload, tag) = token.split_once('.')?;
        let tag = hex::decode(tag).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag).ok()?;

        let name = URL_SAFE_NO_PAD.decode(payload).ok()?;
        String::from_utf8(name).ok()
    }

    /// `Set-Cookie` value carrying the signed identity.
    pub fn cookie(&self, name: &str) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            IDENTITY_COOKIE,
            self.sign(name),
            COOKIE_MAX_AGE_SECS
        )
    }
}

/// Display name of the caller of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn anonymous() -> Self {
        Identity(ANONYMOUS.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

fn identity_cookie(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == IDENTITY_COOKIE)
        .map(|(_, value)| value)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let identity = identity_cookie(parts)
            .and_then(|token| state.signer.verify(token))
            .map(Identity)
            .unwrap_or_else(Identity::anonymous);

        Ok(identity)
    }
}

//! Boundary to the external authentication layer.
//!
//! Sessions, password handling and token issuance live elsewhere.  This
//! module only turns request headers into a [`Principal`] through an
//! [`Authenticator`], and rejects protected routes when that fails.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::ApiError;
use super::AppState;
use crate::config::AuthConfig;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable, non-secret label for logs.
    pub subject: String,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".into(),
        }
    }
}

pub trait Authenticator: Send + Sync {
    /// `None` means the request is not authenticated.
    fn authenticate(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// Accepts `Authorization: Bearer <token>` for tokens listed in
/// [`AuthConfig::tokens`].  With `required = false` every request is
/// admitted as [`Principal::anonymous`].
pub struct TokenAuthenticator {
    required: bool,
    tokens: HashMap<String, usize>,
}

impl TokenAuthenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        Self {
            required: config.required,
            tokens,
        }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Option<Principal> {
        if !self.required {
            return Some(Principal::anonymous());
        }

        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .trim();

        self.tokens.get(token).map(|index| Principal {
            subject: format!("token#{index}"),
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .authenticator
            .authenticate(&parts.headers)
            .ok_or(ApiError::Unauthorized)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

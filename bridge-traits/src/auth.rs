//! Credential state access.
//!
//! The loader attaches a bearer token to media requests when one is
//! available. Token acquisition and refresh belong to the host; the core only
//! reads the current value right before each load.

use crate::{error::Result, platform::PlatformSendSync};

/// Source of the bearer token attached to media requests.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CredentialProvider: PlatformSendSync {
    /// Current access token, or `None` when the user is signed out.
    async fn bearer_token(&self) -> Result<Option<String>>;
}

/// Credential provider returning a fixed token.
///
/// Handy for hosts that resolve the token once at startup, and for tests.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn signed_out() -> Self {
        Self { token: None }
    }
}

// Tokens never appear in debug output.
impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

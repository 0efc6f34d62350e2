//! Bot verification against the Cloudflare Turnstile siteverify API.
//!
//! Fail-closed: any transport error, non-success status, or malformed
//! response body rejects the request. Exactly one attempt per request; no
//! retries, so a misbehaving client cannot use us to amplify load against
//! the upstream verifier.

use std::time::Duration;

use serde::Deserialize;

use crate::config::{Config, ExecutionMode};

/// Result of a bot-verification attempt. Produced per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub ok: bool,
    pub error: Option<String>,
}

impl VerificationResult {
    fn pass() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(reason.into()),
        }
    }
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    success: bool,
}

/// Turnstile verifier.
///
/// Mode and secret come in through the constructor; the verifier never reads
/// the process environment itself.
pub struct BotVerifier {
    mode: ExecutionMode,
    secret: Option<String>,
    verify_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BotVerifier {
    pub fn new(
        mode: ExecutionMode,
        secret: Option<String>,
        verify_url: String,
        timeout: Duration,
    ) -> Self {
        Self {
            mode,
            secret,
            verify_url,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.mode,
            config.turnstile_secret.clone(),
            config.turnstile_url.clone(),
            Duration::from_secs(config.verify_timeout),
        )
    }

    /// Verifies a client-supplied token.
    ///
    /// Outside production every request passes, including one with no token.
    /// In production a missing secret is a configuration failure and rejects
    /// everything.
    pub async fn verify(&self, token: Option<&str>, remote_ip: &str) -> VerificationResult {
        if !self.mode.is_production() {
            return VerificationResult::pass();
        }

        let Some(secret) = self.secret.as_deref() else {
            return VerificationResult::fail("verification secret not configured");
        };

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return VerificationResult::fail("token required");
        };

        let params = [
            ("secret", secret),
            ("response", token),
            ("remoteip", remote_ip),
        ];

        let resp = match self
            .client
            .post(&self.verify_url)
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%err, "siteverify request failed");
                return VerificationResult::fail("verification service unavailable");
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "siteverify returned non-success status");
            return VerificationResult::fail("verification service unavailable");
        }

        match resp.json::<SiteverifyResponse>().await {
            Ok(body) if body.success => VerificationResult::pass(),
            Ok(_) => VerificationResult::fail("token rejected"),
            Err(err) => {
                tracing::warn!(%err, "malformed siteverify response");
                VerificationResult::fail("verification service unavailable")
            }
        }
    }
}

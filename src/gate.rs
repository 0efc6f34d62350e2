//! The public-mutation request gate.
//!
//! Every public mutation passes the same ordered checks: rate limit, then
//! payload validation, then bot verification, then the caller-supplied
//! uniqueness check and write. A rejection at any stage is terminal: no
//! later stage runs, and the write never partially executes. The order puts
//! cheap local checks ahead of the outbound verifier call so malformed or
//! throttled traffic cannot burn upstream quota.

use std::future::Future;
use std::time::Duration;

use axum::http::HeaderMap;

use crate::bot_check::BotVerifier;
use crate::error::ApiError;
use crate::metrics::{GateOutcome, Metrics};
use crate::rate_limit::RateLimiter;

/// Identity used when no forwarding header is present (direct connection,
/// local development).
const FALLBACK_IDENTITY: &str = "local";

/// Per-action gate policy.
#[derive(Debug, Clone, Copy)]
pub struct GatePolicy {
    pub action: &'static str,
    pub limit: u64,
    pub window: Duration,
}

impl GatePolicy {
    fn bucket_key(&self, identity: &str) -> String {
        format!("{}:{}", self.action, identity)
    }
}

/// What the gate needs to know about the client before touching the payload.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    /// Rate-limit identity. Forwarded-IP headers are attacker-controllable,
    /// so this gates cheap throttling only, never authentication.
    pub identity: String,
    /// Best-effort client IP forwarded to the bot verifier; empty if unknown.
    pub remote_ip: String,
    /// Client-supplied Turnstile token, if any.
    pub bot_token: Option<String>,
}

impl ClientContext {
    /// Derives the client context from request headers and the raw token
    /// field of the (already transport-decoded) form body.
    pub fn from_headers(headers: &HeaderMap, bot_token: Option<String>) -> Self {
        let ip = client_ip(headers);
        Self {
            identity: ip
                .clone()
                .unwrap_or_else(|| FALLBACK_IDENTITY.to_string()),
            remote_ip: ip.unwrap_or_default(),
            bot_token,
        }
    }
}

/// Extracts the client IP from trusted-proxy headers, in priority order.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    // x-forwarded-for first (reverse proxy); first hop wins
    if let Some(xff) = headers.get("x-forwarded-for")
        && let Ok(value) = xff.to_str()
        && let Some(first) = value.split(',').next()
        && !first.trim().is_empty()
    {
        return Some(first.trim().to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// The gate itself: borrows the injected limiter, verifier, and metrics from
/// application state for the duration of one request.
pub struct Gate<'a> {
    limiter: &'a RateLimiter,
    verifier: &'a BotVerifier,
    metrics: &'a Metrics,
}

impl<'a> Gate<'a> {
    pub fn new(limiter: &'a RateLimiter, verifier: &'a BotVerifier, metrics: &'a Metrics) -> Self {
        Self {
            limiter,
            verifier,
            metrics,
        }
    }

    /// Drives one mutation through the ordered checks.
    ///
    /// `parse` validates the payload shape (stage 2); `commit` performs the
    /// uniqueness check and the write (stages 4 and 5). Stages 1 and 3,
    /// rate limit and bot verification, are the gate's own.
    pub async fn run<T, R, P, C, Fut>(
        &self,
        policy: GatePolicy,
        ctx: &ClientContext,
        parse: P,
        commit: C,
    ) -> Result<R, ApiError>
    where
        P: FnOnce() -> Result<T, ApiError>,
        C: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, ApiError>>,
    {
        // 1. Rate limit: cheapest check, no side effects beyond the counter.
        let decision = self
            .limiter
            .check(&policy.bucket_key(&ctx.identity), policy.limit, policy.window);
        if !decision.allowed {
            tracing::warn!(
                action = policy.action,
                identity = %ctx.identity,
                "rate limited"
            );
            self.metrics
                .record_gate(policy.action, GateOutcome::RateLimited);
            return Err(ApiError::TooManyRequests);
        }

        // 2. Schema validation: malformed payloads reject before any
        //    network or store access.
        let input = match parse() {
            Ok(input) => input,
            Err(err) => {
                self.metrics
                    .record_gate(policy.action, GateOutcome::InvalidInput);
                return Err(err);
            }
        };

        // 3. Bot verification: shape-valid input only.
        let verdict = self
            .verifier
            .verify(ctx.bot_token.as_deref(), &ctx.remote_ip)
            .await;
        if !verdict.ok {
            tracing::warn!(
                action = policy.action,
                reason = verdict.error.as_deref().unwrap_or("unspecified"),
                "bot check failed"
            );
            self.metrics
                .record_gate(policy.action, GateOutcome::BotRejected);
            return Err(ApiError::BotCheckFailed);
        }

        // 4 + 5. Uniqueness check and write.
        match commit(input).await {
            Ok(result) => {
                self.metrics.record_gate(policy.action, GateOutcome::Admitted);
                Ok(result)
            }
            Err(err) => {
                if matches!(err, ApiError::Conflict(_)) {
                    self.metrics.record_gate(policy.action, GateOutcome::Conflict);
                }
                Err(err)
            }
        }
    }
}

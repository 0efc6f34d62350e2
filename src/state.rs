//! Shared application state: the store, sessions, and the gate's components.
//!
//! Everything the gate touches (bucket map, verifier, metrics) is owned
//! here and injected into handlers, never reached through globals. That keeps
//! tests on isolated instances and leaves room to swap the bucket map for a
//! shared cache later.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bot_check::BotVerifier;
use crate::config::{Config, ExecutionMode};
use crate::gate::{Gate, GatePolicy};
use crate::metrics::Metrics;
use crate::rate_limit::RateLimiter;
use crate::sessions::SessionManager;
use crate::store::CommunityStore;

/// Shared application state, cloneable across handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: CommunityStore,
    sessions: SessionManager,
    rate_limiter: RateLimiter,
    verifier: BotVerifier,
    metrics: Metrics,
    session_ttl: Duration,
    cors_origins: Vec<String>,
    start_time: Instant,
    register_policy: GatePolicy,
    subscribe_policy: GatePolicy,
}

impl AppState {
    /// Creates application state from config.
    pub fn new(config: &Config) -> Self {
        Self::assemble(
            BotVerifier::from_config(config),
            GatePolicy {
                action: "register",
                limit: config.register_limit,
                window: Duration::from_secs(config.rate_window),
            },
            GatePolicy {
                action: "subscribe",
                limit: config.subscribe_limit,
                window: Duration::from_secs(config.rate_window),
            },
            Duration::from_secs(config.session_ttl),
            config.cors_origins.clone(),
        )
    }

    /// In-memory state with the development-mode verifier (tests and
    /// ephemeral use). Default policies: register 10/min, subscribe 20/min.
    pub fn new_in_memory() -> Self {
        Self::assemble(
            BotVerifier::new(
                ExecutionMode::Development,
                None,
                String::new(),
                Duration::from_secs(1),
            ),
            GatePolicy {
                action: "register",
                limit: 10,
                window: Duration::from_secs(60),
            },
            GatePolicy {
                action: "subscribe",
                limit: 20,
                window: Duration::from_secs(60),
            },
            Duration::from_secs(86_400),
            vec![],
        )
    }

    /// In-memory state with custom gate policies (for tests).
    pub fn new_in_memory_with_policies(register: GatePolicy, subscribe: GatePolicy) -> Self {
        Self::assemble(
            BotVerifier::new(
                ExecutionMode::Development,
                None,
                String::new(),
                Duration::from_secs(1),
            ),
            register,
            subscribe,
            Duration::from_secs(86_400),
            vec![],
        )
    }

    /// In-memory state with a specific verifier (for tests).
    pub fn new_in_memory_with_verifier(verifier: BotVerifier) -> Self {
        Self::assemble(
            verifier,
            GatePolicy {
                action: "register",
                limit: 10,
                window: Duration::from_secs(60),
            },
            GatePolicy {
                action: "subscribe",
                limit: 20,
                window: Duration::from_secs(60),
            },
            Duration::from_secs(86_400),
            vec![],
        )
    }

    fn assemble(
        verifier: BotVerifier,
        register_policy: GatePolicy,
        subscribe_policy: GatePolicy,
        session_ttl: Duration,
        cors_origins: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: CommunityStore::new(),
                sessions: SessionManager::new(),
                rate_limiter: RateLimiter::new(),
                verifier,
                metrics: Metrics::new(),
                session_ttl,
                cors_origins,
                start_time: Instant::now(),
                register_policy,
                subscribe_policy,
            }),
        }
    }

    /// Returns a reference to the community store.
    pub fn store(&self) -> &CommunityStore {
        &self.inner.store
    }

    /// Returns a reference to the session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    /// Returns a reference to the rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// Returns a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Borrows the gate for one request.
    pub fn gate(&self) -> Gate<'_> {
        Gate::new(
            &self.inner.rate_limiter,
            &self.inner.verifier,
            &self.inner.metrics,
        )
    }

    /// Returns the configured session TTL.
    pub fn session_ttl(&self) -> Duration {
        self.inner.session_ttl
    }

    /// Returns the configured CORS allowed origins.
    pub fn cors_origins(&self) -> &[String] {
        &self.inner.cors_origins
    }

    /// Returns the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }

    pub fn register_policy(&self) -> GatePolicy {
        self.inner.register_policy
    }

    pub fn subscribe_policy(&self) -> GatePolicy {
        self.inner.subscribe_policy
    }
}

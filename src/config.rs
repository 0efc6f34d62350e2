//! Server configuration via CLI args and environment variables.

use clap::{Parser, ValueEnum};

/// Execution mode. Bot verification is bypassed outside production.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Production,
    Development,
}

impl ExecutionMode {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Request-gating HTTP server for the RankAndPlay community platform.
#[derive(Parser, Debug, Clone)]
#[command(name = "rankandplay-server", version, about)]
pub struct Config {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0", env = "RANKANDPLAY_HOST")]
    pub host: String,

    /// Bind port.
    #[arg(long, default_value_t = 8080, env = "RANKANDPLAY_PORT")]
    pub port: u16,

    /// Execution mode (bot checks are enforced only in production).
    #[arg(long, value_enum, default_value_t = ExecutionMode::Development, env = "RANKANDPLAY_MODE")]
    pub mode: ExecutionMode,

    /// Turnstile server-side secret. Required for bot checks in production.
    #[arg(long, env = "RANKANDPLAY_TURNSTILE_SECRET")]
    pub turnstile_secret: Option<String>,

    /// Turnstile verification endpoint.
    #[arg(
        long,
        default_value = "https://challenges.cloudflare.com/turnstile/v0/siteverify",
        env = "RANKANDPLAY_TURNSTILE_URL"
    )]
    pub turnstile_url: String,

    /// Timeout for the outbound verification call, in seconds.
    #[arg(long, default_value_t = 10, env = "RANKANDPLAY_VERIFY_TIMEOUT")]
    pub verify_timeout: u64,

    /// Session token time-to-live in seconds.
    #[arg(long, default_value_t = 86_400, env = "RANKANDPLAY_SESSION_TTL")]
    pub session_ttl: u64,

    /// Registration attempts allowed per identity per window.
    #[arg(long, default_value_t = 10, env = "RANKANDPLAY_REGISTER_LIMIT")]
    pub register_limit: u64,

    /// Newsletter subscriptions allowed per identity per window.
    #[arg(long, default_value_t = 20, env = "RANKANDPLAY_SUBSCRIBE_LIMIT")]
    pub subscribe_limit: u64,

    /// Rate-limit window in seconds.
    #[arg(long, default_value_t = 60, env = "RANKANDPLAY_RATE_WINDOW")]
    pub rate_window: u64,

    /// CORS allowed origins (comma-separated). Empty for no CORS.
    #[arg(long, env = "RANKANDPLAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Log level.
    #[arg(long, default_value = "info", env = "RANKANDPLAY_LOG_LEVEL")]
    pub log_level: String,

    /// Log format ("text" or "json").
    #[arg(long, default_value = "text", env = "RANKANDPLAY_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    /// Parses configuration from CLI args and env vars.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

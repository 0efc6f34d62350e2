//! RankAndPlay Server - request gating for the community platform's
//! state-changing endpoints.
//!
//! Every public mutation (registration, newsletter subscription) passes an
//! ordered gate of rate limiting, schema validation, and bot verification
//! before its uniqueness check and write. Authenticated mutations (posts, ratings)
//! sit behind a bearer-session middleware and the role hierarchy.

pub mod auth;
pub mod bot_check;
pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod perm;
pub mod rate_limit;
pub mod rating;
pub mod request_id;
pub mod routes;
pub mod sessions;
pub mod slug;
pub mod state;
pub mod store;

pub use routes::router;
pub use state::AppState;

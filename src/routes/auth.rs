//! Account registration endpoint.

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Redirect;

use crate::error::{ApiError, ErrorBody};
use crate::gate::ClientContext;
use crate::state::AppState;

use super::types::RegisterForm;

/// Register a new account.
///
/// Runs the full request gate: rate limit, schema validation, bot
/// verification, then the uniqueness-checked write. Redirects to the sign-in
/// page on success.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body(
        content = RegisterForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 303, description = "Account created; redirect to sign-in"),
        (status = 400, description = "Invalid input or bot check failed", body = ErrorBody),
        (status = 409, description = "Email already used", body = ErrorBody),
        (status = 429, description = "Too many requests", body = ErrorBody),
    ),
    tag = "Accounts"
)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, ApiError> {
    let ctx = ClientContext::from_headers(&headers, form.turnstile_token.clone());
    let store = state.store();

    let user_id = state
        .gate()
        .run(
            state.register_policy(),
            &ctx,
            || form.validate(),
            |input| async move {
                let user = store.register_user(&input.email, input.name, &input.password)?;
                Ok(user.id.clone())
            },
        )
        .await?;

    tracing::info!(user = %user_id, "account registered");
    Ok(Redirect::to("/auth/signin"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::bot_check::BotVerifier;
    use crate::config::ExecutionMode;
    use crate::gate::GatePolicy;
    use crate::metrics::GateOutcome;

    use super::*;

    fn form(email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            name: None,
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            turnstile_token: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_duplicate_conflicts() {
        let state = AppState::new_in_memory();

        let first = register(
            State(state.clone()),
            HeaderMap::new(),
            Form(form("Player@Example.com", "longenough")),
        )
        .await;
        assert!(first.is_ok());

        // Same address modulo normalization
        let second = register(
            State(state.clone()),
            HeaderMap::new(),
            Form(form(" player@example.com ", "longenough")),
        )
        .await;
        assert!(matches!(second, Err(ApiError::Conflict(_))));
        assert_eq!(state.store().user_count(), 1);
    }

    #[tokio::test]
    async fn test_register_rate_limited_before_validation() {
        let tight = GatePolicy {
            action: "register",
            limit: 1,
            window: Duration::from_secs(60),
        };
        let subscribe = GatePolicy {
            action: "subscribe",
            limit: 20,
            window: Duration::from_secs(60),
        };
        let state = AppState::new_in_memory_with_policies(tight, subscribe);

        let ok = register(
            State(state.clone()),
            HeaderMap::new(),
            Form(form("a@example.com", "longenough")),
        )
        .await;
        assert!(ok.is_ok());

        // Second call is over the limit; even a malformed payload must be
        // reported as rate-limited because the limit check runs first
        let limited = register(
            State(state.clone()),
            HeaderMap::new(),
            Form(RegisterForm::default()),
        )
        .await;
        assert!(matches!(limited, Err(ApiError::TooManyRequests)));
        assert_eq!(
            state
                .metrics()
                .gate_count("register", GateOutcome::RateLimited),
            1
        );
    }

    #[tokio::test]
    async fn test_invalid_input_reported_before_bot_check() {
        // Production verifier with no secret would fail every bot check
        let verifier = BotVerifier::new(
            ExecutionMode::Production,
            None,
            String::new(),
            Duration::from_secs(1),
        );
        let state = AppState::new_in_memory_with_verifier(verifier);

        let result = register(
            State(state.clone()),
            HeaderMap::new(),
            Form(form("not-an-email", "longenough")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::InvalidInput { .. })));

        // Valid shape, same verifier: now the bot check is the one failing
        let result = register(
            State(state),
            HeaderMap::new(),
            Form(form("a@example.com", "longenough")),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BotCheckFailed)));
    }

    #[tokio::test]
    async fn test_identities_limited_separately() {
        let tight = GatePolicy {
            action: "register",
            limit: 1,
            window: Duration::from_secs(60),
        };
        let subscribe = GatePolicy {
            action: "subscribe",
            limit: 20,
            window: Duration::from_secs(60),
        };
        let state = AppState::new_in_memory_with_policies(tight, subscribe);

        let mut from_a = HeaderMap::new();
        from_a.insert("x-forwarded-for", "203.0.113.1".parse().unwrap());
        let mut from_b = HeaderMap::new();
        from_b.insert("x-forwarded-for", "203.0.113.2".parse().unwrap());

        assert!(register(
            State(state.clone()),
            from_a.clone(),
            Form(form("a@example.com", "longenough"))
        )
        .await
        .is_ok());
        assert!(matches!(
            register(
                State(state.clone()),
                from_a,
                Form(form("b@example.com", "longenough"))
            )
            .await,
            Err(ApiError::TooManyRequests)
        ));
        assert!(register(
            State(state),
            from_b,
            Form(form("c@example.com", "longenough"))
        )
        .await
        .is_ok());
    }
}

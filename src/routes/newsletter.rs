//! Newsletter subscription endpoint.

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Redirect;

use crate::error::{ApiError, ErrorBody};
use crate::gate::ClientContext;
use crate::state::AppState;

use super::types::SubscribeForm;

/// Subscribe to the newsletter.
///
/// Same gate as registration with a looser limit. Redirects back to the
/// hall-of-fame page on success.
#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body(
        content = SubscribeForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 303, description = "Subscribed; redirect back"),
        (status = 400, description = "Invalid input or bot check failed", body = ErrorBody),
        (status = 409, description = "Email already subscribed", body = ErrorBody),
        (status = 429, description = "Too many requests", body = ErrorBody),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SubscribeForm>,
) -> Result<Redirect, ApiError> {
    let ctx = ClientContext::from_headers(&headers, form.turnstile_token.clone());
    let store = state.store();

    state
        .gate()
        .run(
            state.subscribe_policy(),
            &ctx,
            || form.validate(),
            |email| async move { store.subscribe(&email) },
        )
        .await?;

    Ok(Redirect::to("/hall-of-fame?subscribed=1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str) -> SubscribeForm {
        SubscribeForm {
            email: Some(email.to_string()),
            turnstile_token: None,
        }
    }

    #[tokio::test]
    async fn test_subscribe_then_duplicate_conflicts() {
        let state = AppState::new_in_memory();

        let first = subscribe(State(state.clone()), HeaderMap::new(), Form(form("n@example.com"))).await;
        assert!(first.is_ok());

        let second =
            subscribe(State(state.clone()), HeaderMap::new(), Form(form("N@example.com "))).await;
        assert!(matches!(second, Err(ApiError::Conflict(_))));
        assert_eq!(state.store().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let state = AppState::new_in_memory();
        let result = subscribe(
            State(state.clone()),
            HeaderMap::new(),
            Form(form("not-an-email")),
        )
        .await;
        assert!(matches!(
            result,
            Err(ApiError::InvalidInput { field: "email", .. })
        ));
        assert_eq!(state.store().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_registration_and_newsletter_buckets_are_separate() {
        let state = AppState::new_in_memory();

        // Exhaust the register bucket for this identity
        for _ in 0..10 {
            state.rate_limiter().check(
                "register:local",
                state.register_policy().limit,
                state.register_policy().window,
            );
        }

        // Newsletter still admits: different action, different bucket
        let result = subscribe(State(state), HeaderMap::new(), Form(form("n@example.com"))).await;
        assert!(result.is_ok());
    }
}

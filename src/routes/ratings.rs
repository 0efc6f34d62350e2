//! Game rating endpoint.

use axum::Json;
use axum::extract::{Extension, Form, State};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

use super::types::{RatingForm, RatingResponse};

/// Submit or replace a rating for a game.
///
/// Upserts on (user, game): rating the same game again overwrites the
/// previous card.
#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body(
        content = RatingForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 200, description = "Rating stored", body = RatingResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<RatingForm>,
) -> Result<Json<RatingResponse>, ApiError> {
    let (game_id, card) = form.validate()?;
    let stored = state.store().upsert_rating(&user.id, &game_id, card);

    Ok(Json(RatingResponse {
        game_id,
        average: stored.average,
    }))
}

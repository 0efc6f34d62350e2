//! Post creation endpoint (blog and review posts).

use axum::Json;
use axum::extract::{Extension, Form, State};
use axum::http::StatusCode;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

use super::types::{CreatePostForm, PostResponse};

/// Create a post.
///
/// Requires a live session and a role of Blogger or above. The slug is
/// derived from the title when not supplied and uniquified either way.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body(
        content = CreatePostForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody),
        (status = 403, description = "Role cannot publish", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Posts"
)]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<CreatePostForm>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    if !user.role.can_publish() {
        return Err(ApiError::Forbidden);
    }

    let input = form.validate()?;
    let post = state.store().create_post(
        &user.id,
        &input.title,
        input.slug.as_deref(),
        input.excerpt,
        input.content_md,
        input.tags,
        input.published,
    )?;

    tracing::info!(slug = %post.slug, author = %user.id, "post created");
    Ok((StatusCode::CREATED, Json(PostResponse::from(&*post))))
}

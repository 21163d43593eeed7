use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};
use maud::Markup;
use serde_json::{Value, json};

use crate::{error::ApiError, state::ApiState, upstream::UpstreamResponse};

use super::{form::UserForm, page};

/// Create the user routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(index))
        .route("/users", post(add_user))
        .route(
            "/users/{id}",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/users/{id}/delete", delete(delete_user))
}

/// Render the user list. An unreachable or misbehaving upstream yields an empty list.
async fn index(State(state): State<ApiState>) -> Markup {
    tracing::info!("Accessing index page");

    let users = match state.users.list().await {
        Ok(users) => {
            tracing::info!(count = users.len(), "Request to API Gateway success");
            users
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch users from API Gateway");
            Vec::new()
        }
    };

    page::index_page(&users, &state.bucket_base_url())
}

/// Check the email, upload the image, then create the user.
///
/// Nothing is rolled back: an image uploaded before a failed create stays in
/// the bucket. Any create status other than 409 counts as success.
async fn add_user(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<Redirect, ApiError> {
    tracing::info!("Add user request received");

    let form = UserForm::from_multipart(multipart).await?;
    tracing::info!(email = %form.email, name = %form.name, "User data received");

    let status = state.users.check_email(&form.email).await.map_err(|e| {
        tracing::error!(email = %form.email, error = %e, "Email check failed");
        ApiError::GatewayUnreachable
    })?;
    tracing::info!(%status, "Email check status");

    if status == StatusCode::CONFLICT {
        tracing::warn!(email = %form.email, "Email already exists");
        return Err(ApiError::EmailExists);
    }

    let image_url = match &form.image {
        Some(image) => {
            let key = lks_storage::user_image_key(&image.filename);
            tracing::info!(%key, "Uploading image");

            state
                .storage
                .put_object(&key, image.bytes.clone(), image.content_type.as_deref())
                .await
                .map_err(|e| {
                    tracing::error!(%key, error = %e, "Image upload failed");
                    ApiError::from(e)
                })?;

            let url = state.image_url(&key);
            tracing::info!(%url, "Image uploaded");
            url
        }
        None => String::new(),
    };

    let user = form.into_new_user(image_url);
    tracing::info!(email = %user.email, "Sending user data to API Gateway");

    let status = state.users.create(&user).await.map_err(|e| {
        tracing::error!(email = %user.email, error = %e, "POST to API Gateway failed");
        ApiError::CreateFailed
    })?;
    tracing::info!(%status, "API response status");

    if status == StatusCode::CONFLICT {
        tracing::warn!(email = %user.email, "API conflict on email");
        return Err(ApiError::EmailExists);
    }

    tracing::info!(email = %user.email, "User created successfully");
    Ok(Redirect::to("/"))
}

/// Forward to the upstream and relay its status and JSON body verbatim.
async fn get_user(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    tracing::info!(user_id = id, "Get user");

    let upstream = state.users.get(id).await.map_err(|e| {
        tracing::error!(user_id = id, error = %e, "Get user failed");
        ApiError::ApiUnreachable
    })?;
    tracing::info!(user_id = id, status = %upstream.status, "Get user status");

    if !upstream.is_json() {
        tracing::error!(user_id = id, status = %upstream.status, "Get user returned a non-JSON body");
        return Err(ApiError::ApiUnreachable);
    }

    Ok(json_passthrough(upstream))
}

async fn update_user(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    tracing::info!(user_id = id, "Update user");

    let upstream = state.users.update(id, &body).await.map_err(|e| {
        tracing::error!(user_id = id, error = %e, "Update failed");
        ApiError::ApiUnreachable
    })?;
    tracing::info!(user_id = id, status = %upstream.status, "Update status");

    if upstream.status != StatusCode::OK {
        tracing::warn!(user_id = id, status = %upstream.status, "Update failed status");
        return Err(ApiError::UpdateFailed(upstream.status));
    }

    let data = upstream.json().unwrap_or_else(|e| {
        tracing::warn!(user_id = id, error = %e, "Update response had no JSON body");
        Value::Null
    });

    tracing::info!(user_id = id, "User updated");
    Ok(Json(json!({
        "message": "User updated",
        "data": data
    }))
    .into_response())
}

async fn delete_user(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    tracing::info!(user_id = id, "Delete user request");

    let upstream = state.users.delete(id).await.map_err(|e| {
        tracing::error!(user_id = id, error = %e, "Delete failed");
        ApiError::ApiUnreachable
    })?;
    tracing::info!(user_id = id, status = %upstream.status, "Delete status");

    if upstream.status == StatusCode::NO_CONTENT {
        tracing::info!(user_id = id, "User deleted");
        return Ok(Json(json!({ "message": "User deleted successfully" })).into_response());
    }

    if !upstream.is_json() {
        tracing::error!(user_id = id, status = %upstream.status, "Unexpected empty response from API");
        return Err(ApiError::UnexpectedResponse(upstream.status));
    }

    Ok(json_passthrough(upstream))
}

fn json_passthrough(upstream: UpstreamResponse) -> Response {
    (
        upstream.status,
        [(header::CONTENT_TYPE, "application/json")],
        upstream.body,
    )
        .into_response()
}

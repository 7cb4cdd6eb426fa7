use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use securetransact_db::models::UserChanges;
use securetransact_types::api::{Claims, UpdateUserRequest};
use securetransact_types::models::User;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::{AppState, parse_id, with_db};

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "user")?;

    let user = with_db(&state, move |db| {
        db.get_user_by_id(id)?.map(User::try_from).transpose()
    })
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(user))
}

/// Partial profile update. Users may only edit their own profile.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "user")?;
    if claims.user_id != id {
        return Err(ApiError::Forbidden("You can only update your own profile".into()));
    }

    let name = req.name.map(|n| n.trim().to_string());
    if name.as_deref() == Some("") {
        return Err(ApiError::Validation("Name cannot be empty".into()));
    }
    // A blank phone clears the stored number.
    let phone = req.phone.map(|p| {
        let p = p.trim();
        (!p.is_empty()).then(|| p.to_string())
    });
    let user_type = req.user_type;

    let user = with_db(&state, move |db| {
        let changes = UserChanges {
            name: name.as_deref(),
            phone: phone.as_ref().map(|p| p.as_deref()),
            user_type: user_type.as_ref().map(|t| t.as_str()),
        };
        db.update_user(id, &changes)?.map(User::try_from).transpose()
    })
    .await?
    .ok_or(ApiError::NotFound("User"))?;

    info!("User {} updated their profile", user.id);
    Ok(Json(user))
}

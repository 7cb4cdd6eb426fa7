use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::{info, warn};

use securetransact_db::DbErrorKind;
use securetransact_db::models::NewUser;
use securetransact_types::api::{AuthResponse, LoginRequest, RegisterDetails, RegisterRequest};
use securetransact_types::models::{User, UserType};
use securetransact_types::validation::{
    MIN_PASSWORD_LEN, is_valid_email, is_valid_password, normalize_email,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::password::{hash_password, verify_password};
use crate::{AppState, with_db};

/// Treats blank strings like absent ones.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Registration attempt for {:?}", req.email);

    let (email, password, name, user_type) = match (
        present(req.email),
        req.password.filter(|p| !p.is_empty()),
        present(req.name),
        present(req.user_type),
    ) {
        (Some(email), Some(password), Some(name), Some(user_type)) => {
            (email, password, name, user_type)
        }
        (email, password, name, user_type) => {
            return Err(ApiError::MissingFields(RegisterDetails {
                email: email.is_none().then(|| "Email is required".into()),
                password: password.is_none().then(|| "Password is required".into()),
                name: name.is_none().then(|| "Name is required".into()),
                user_type: user_type.is_none().then(|| "User type is required".into()),
            }));
        }
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if !is_valid_password(&password) {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let user_type: UserType = user_type
        .parse()
        .map_err(|_| ApiError::Validation("Invalid user type".into()))?;
    let name = name.trim().to_string();
    let phone = present(req.phone).map(|p| p.trim().to_string());

    let created = with_db(&state, move |db| {
        if db.get_user_by_email(&email)?.is_some() {
            return Ok(None);
        }

        let password_hash = hash_password(&password)?;
        let row = db.create_user(&NewUser {
            email: &email,
            password_hash: &password_hash,
            name: &name,
            phone: phone.as_deref(),
            user_type: user_type.as_str(),
            joined_date: Utc::now().date_naive(),
        })?;
        Ok(Some(User::try_from(row)?))
    })
    .await
    .map_err(email_conflict)?;

    let Some(user) = created else {
        warn!("Registration rejected: email already in use");
        return Err(ApiError::EmailTaken);
    };

    let token = issue_token(&state, &user)?;
    info!("User {} registered", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully".into(),
            token,
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (present(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::Validation("Email and password are required".into()));
    };
    let email = normalize_email(&email);
    info!("Login attempt for {}", email);

    let user = with_db(&state, move |db| {
        let Some(row) = db.get_user_by_email(&email)? else {
            return Ok(None);
        };
        if !verify_password(&password, &row.password)? {
            return Ok(None);
        }
        Ok(Some(User::try_from(row)?))
    })
    .await?
    .ok_or_else(|| {
        warn!("Login failed: unknown email or wrong password");
        ApiError::InvalidCredentials
    })?;

    let token = issue_token(&state, &user)?;
    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user,
    }))
}

/// A concurrent registration can win the race between the lookup and the
/// insert; its UNIQUE violation reads the same as the pre-check.
fn email_conflict(err: ApiError) -> ApiError {
    match err {
        ApiError::Database {
            kind: DbErrorKind::UniqueViolation,
            ..
        } => ApiError::EmailTaken,
        other => other,
    }
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let user_id = user
        .id
        .parse()
        .map_err(|_| ApiError::Internal(format!("non-numeric user id '{}'", user.id)))?;
    state
        .jwt
        .issue(user_id, &user.email)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
}

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` with rejections rendered as `ApiError` JSON bodies instead
/// of plain-text 4xx responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{MessageType, TransactionStatus, User, UserType};

// -- JWT Claims --

/// JWT claims issued on register/login and checked by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

/// Every field is optional so that a request missing several of them can be
/// answered with one error per field.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Per-field messages for a rejected registration; `None` means the field
/// was present.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDetails {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub user_type: Option<String>,
}

// -- Users --

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<UserType>,
}

// -- Transactions --

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
    pub status: Option<TransactionStatus>,
    #[serde(default, deserialize_with = "optional_id")]
    pub buyer_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub seller_id: Option<i64>,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub seller_name: String,
    pub inspection_period: Option<i64>,
    pub delivery_address: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: TransactionStatus,
    pub dispute_reason: Option<String>,
}

// -- Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(deserialize_with = "id")]
    pub transaction_id: i64,
    #[serde(deserialize_with = "id_text")]
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<MessageType>,
}

// -- Diagnostics --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbTestResponse {
    pub status: String,
    pub message: String,
    pub time: String,
}

/// Shape of every error body the server sends. Only `error` is always
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: Option<bool>,
    pub error: String,
    pub suggestion: Option<String>,
    pub code: Option<String>,
    pub details: Option<serde_json::Value>,
}

// -- Id helpers --

/// Ids go out as strings but clients send them back either way.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

impl IdRepr {
    fn into_id<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            IdRepr::Int(v) => Ok(v),
            IdRepr::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id '{}'", s))),
        }
    }
}

fn id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    IdRepr::deserialize(d)?.into_id()
}

fn optional_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Option::<IdRepr>::deserialize(d)?
        .map(IdRepr::into_id)
        .transpose()
}

fn id_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match IdRepr::deserialize(d)? {
        IdRepr::Int(v) => v.to_string(),
        IdRepr::Text(s) => s,
    })
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use securetransact_db::models::{NewTransaction, TransactionRow};
use securetransact_types::api::{CreateTransactionRequest, UpdateStatusRequest};
use securetransact_types::models::Transaction;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::{AppState, parse_id, with_db};

const DEFAULT_INSPECTION_DAYS: i64 = 3;

fn into_transactions(rows: Vec<TransactionRow>) -> anyhow::Result<Vec<Transaction>> {
    rows.into_iter().map(Transaction::try_from).collect()
}

fn required(value: &str, label: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required", label)));
    }
    Ok(())
}

/// GET /api/transactions: every transaction, newest first.
pub async fn list_transactions(State(state): State<AppState>) -> ApiResult<Json<Vec<Transaction>>> {
    let txs = with_db(&state, |db| into_transactions(db.list_transactions()?)).await?;
    Ok(Json(txs))
}

/// GET /api/transactions/user/{user_id}: where the user is buyer or seller.
pub async fn list_user_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let user_id = parse_id(&user_id, "user")?;
    let txs = with_db(&state, move |db| {
        into_transactions(db.list_transactions_for_user(user_id)?)
    })
    .await?;
    Ok(Json(txs))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    required(&req.title, "Title")?;
    required(&req.description, "Description")?;
    required(&req.buyer_name, "Buyer name")?;
    required(&req.seller_name, "Seller name")?;

    let price = req
        .price
        .ok_or_else(|| ApiError::Validation("Price is required".into()))?;
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation("Price must be a non-negative number".into()));
    }

    let inspection_period = req.inspection_period.unwrap_or(DEFAULT_INSPECTION_DAYS);
    if inspection_period < 0 {
        return Err(ApiError::Validation("Inspection period cannot be negative".into()));
    }

    let status = req.status.unwrap_or_default();

    let tx = with_db(&state, move |db| {
        let row = db.create_transaction(&NewTransaction {
            title: req.title.trim(),
            description: req.description.trim(),
            price,
            status: status.as_str(),
            buyer_id: req.buyer_id,
            seller_id: req.seller_id,
            buyer_name: req.buyer_name.trim(),
            seller_name: req.seller_name.trim(),
            inspection_period,
            delivery_address: req.delivery_address.as_deref(),
            expected_delivery: req.expected_delivery,
            created_date: Utc::now().date_naive(),
        })?;
        Transaction::try_from(row)
    })
    .await?;

    info!("Transaction {} created ({})", tx.id, tx.status);
    Ok((StatusCode::CREATED, Json(tx)))
}

/// PUT /api/transactions/{id}/status: any stage may follow any other.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<Transaction>> {
    let id = parse_id(&id, "transaction")?;
    let status = req.status;
    let dispute_reason = req.dispute_reason;

    let tx = with_db(&state, move |db| {
        db.update_transaction_status(
            id,
            status.as_str(),
            dispute_reason.as_deref(),
            Utc::now().date_naive(),
        )?
        .map(Transaction::try_from)
        .transpose()
    })
    .await?
    .ok_or(ApiError::NotFound("Transaction"))?;

    info!("Transaction {} moved to {}", tx.id, tx.status);
    Ok(Json(tx))
}

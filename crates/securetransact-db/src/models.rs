//! Database row types. These map directly to SQLite rows; the `TryFrom`
//! impls turn them into the wire models from securetransact-types.

use anyhow::{Context, Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

use securetransact_types::models::{Message, Transaction, User};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub user_type: String,
    pub rating: f64,
    pub total_transactions: i64,
    pub joined_date: String,
}

#[derive(Debug)]
pub struct TransactionRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: String,
    pub buyer_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub buyer_name: String,
    pub seller_name: String,
    pub created_date: String,
    pub expected_delivery: Option<String>,
    pub inspection_period: i64,
    pub delivery_address: Option<String>,
    pub dispute_reason: Option<String>,
    pub last_update: String,
}

#[derive(Debug)]
pub struct MessageRow {
    pub id: i64,
    pub transaction_id: i64,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub timestamp: String,
    pub kind: String,
}

// -- Inserts --

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub user_type: &'a str,
    pub joined_date: NaiveDate,
}

/// Fields left `None` keep their stored value. `phone: Some(None)` clears
/// the number.
#[derive(Default)]
pub struct UserChanges<'a> {
    pub name: Option<&'a str>,
    pub phone: Option<Option<&'a str>>,
    pub user_type: Option<&'a str>,
}

pub struct NewTransaction<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub status: &'a str,
    pub buyer_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub buyer_name: &'a str,
    pub seller_name: &'a str,
    pub inspection_period: i64,
    pub delivery_address: Option<&'a str>,
    pub expected_delivery: Option<NaiveDate>,
    pub created_date: NaiveDate,
}

pub struct NewMessage<'a> {
    pub transaction_id: i64,
    pub sender_id: &'a str,
    pub sender_name: &'a str,
    pub message: &'a str,
    pub kind: &'a str,
    pub timestamp: DateTime<Utc>,
}

// -- Conversions --

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).with_context(|| format!("corrupt date '{}'", raw))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        // SQLite's datetime('now') has no timezone; treat it as UTC.
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .map(|ndt| ndt.and_utc())
            .with_context(|| format!("corrupt timestamp '{}'", raw))
    })
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id.to_string(),
            user_type: row.user_type.parse()?,
            joined_date: parse_date(&row.joined_date)?,
            email: row.email,
            name: row.name,
            phone: row.phone,
            rating: row.rating,
            total_transactions: row.total_transactions,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Transaction {
            id: row.id.to_string(),
            status: row.status.parse()?,
            buyer_id: row.buyer_id.map(|id| id.to_string()),
            seller_id: row.seller_id.map(|id| id.to_string()),
            created_date: parse_date(&row.created_date)?,
            expected_delivery: row.expected_delivery.as_deref().map(parse_date).transpose()?,
            last_update: parse_date(&row.last_update)?,
            title: row.title,
            description: row.description,
            price: row.price,
            buyer_name: row.buyer_name,
            seller_name: row.seller_name,
            inspection_period: row.inspection_period,
            delivery_address: row.delivery_address,
            dispute_reason: row.dispute_reason,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id.to_string(),
            transaction_id: row.transaction_id.to_string(),
            timestamp: parse_timestamp(&row.timestamp)?,
            kind: row.kind.parse()?,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            message: row.message,
        })
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Returned by the `FromStr` impls below when a stored or submitted label
/// is outside the allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Buyer,
    Seller,
    Both,
}

impl UserType {
    pub const ALL: [UserType; 3] = [Self::Buyer, Self::Seller, Self::Both];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Both => "both",
        }
    }
}

/// Escrow stage of a transaction.
///
/// Any stage may be written at any time; the server does not check that a
/// move from one stage to another makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    PendingAcceptance,
    PendingPayment,
    PaymentSecured,
    Shipped,
    Delivered,
    InspectionPeriod,
    Completed,
    Disputed,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 9] = [
        Self::PendingAcceptance,
        Self::PendingPayment,
        Self::PaymentSecured,
        Self::Shipped,
        Self::Delivered,
        Self::InspectionPeriod,
        Self::Completed,
        Self::Disputed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAcceptance => "pending_acceptance",
            Self::PendingPayment => "pending_payment",
            Self::PaymentSecured => "payment_secured",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::InspectionPeriod => "inspection_period",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    System,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [Self::Text, Self::Image, Self::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::System => "system",
        }
    }
}

macro_rules! label_enum {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(UserType, "user type");
label_enum!(TransactionStatus, "transaction status");
label_enum!(MessageType, "message type");

// -- Entities as they appear on the wire --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub rating: f64,
    pub total_transactions: i64,
    pub joined_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub status: TransactionStatus,
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub buyer_name: String,
    pub seller_name: String,
    pub created_date: NaiveDate,
    pub expected_delivery: Option<NaiveDate>,
    pub inspection_period: i64,
    pub delivery_address: Option<String>,
    pub dispute_reason: Option<String>,
    pub last_update: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub transaction_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageType,
}

use crate::Database;
use crate::models::{
    DATE_FORMAT, MessageRow, NewMessage, NewTransaction, NewUser, TransactionRow, UserChanges,
    UserRow,
};
use anyhow::Result;
use chrono::{NaiveDate, SecondsFormat};
use rusqlite::{Connection, OptionalExtension, Row, params};

const USER_COLUMNS: &str =
    "id, email, password, name, phone, user_type, rating, total_transactions, joined_date";

const TRANSACTION_COLUMNS: &str = "id, title, description, price, status, buyer_id, seller_id, \
     buyer_name, seller_name, created_date, expected_delivery, inspection_period, \
     delivery_address, dispute_reason, last_update";

const MESSAGE_COLUMNS: &str =
    "id, transaction_id, sender_id, sender_name, message, timestamp, type";

impl Database {
    /// Current time according to the store; doubles as a liveness probe.
    pub fn ping(&self) -> Result<String> {
        self.with_conn(|conn| {
            let now = conn.query_row("SELECT strftime('%Y-%m-%dT%H:%M:%SZ', 'now')", [], |r| {
                r.get(0)
            })?;
            Ok(now)
        })
    }

    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<UserRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO users (email, password, name, phone, user_type, joined_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {USER_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                params![
                    user.email,
                    user.password_hash,
                    user.name,
                    user.phone,
                    user.user_type,
                    format_date(user.joined_date),
                ],
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", &email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id))
    }

    /// Returns `None` when no user has this id.
    pub fn update_user(&self, id: i64, changes: &UserChanges<'_>) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    phone = CASE WHEN ?3 THEN ?4 ELSE phone END,
                    user_type = COALESCE(?5, user_type),
                    updated_at = datetime('now')
                 WHERE id = ?1
                 RETURNING {USER_COLUMNS}"
            );
            let row = conn
                .query_row(
                    &sql,
                    params![
                        id,
                        changes.name,
                        changes.phone.is_some(),
                        changes.phone.flatten(),
                        changes.user_type
                    ],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Transactions --

    /// Newest first.
    pub fn list_transactions(&self) -> Result<Vec<TransactionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions
                 ORDER BY created_date DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Transactions where the user is either buyer or seller, newest first.
    pub fn list_transactions_for_user(&self, user_id: i64) -> Result<Vec<TransactionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions
                 WHERE buyer_id = ?1 OR seller_id = ?1
                 ORDER BY created_date DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_transaction(&self, tx: &NewTransaction<'_>) -> Result<TransactionRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO transactions (
                    title, description, price, status, buyer_id, seller_id,
                    buyer_name, seller_name, inspection_period, delivery_address,
                    expected_delivery, created_date, last_update)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
                 RETURNING {TRANSACTION_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                params![
                    tx.title,
                    tx.description,
                    tx.price,
                    tx.status,
                    tx.buyer_id,
                    tx.seller_id,
                    tx.buyer_name,
                    tx.seller_name,
                    tx.inspection_period,
                    tx.delivery_address,
                    tx.expected_delivery.map(format_date),
                    format_date(tx.created_date),
                ],
                transaction_from_row,
            )?;
            Ok(row)
        })
    }

    /// Overwrites status and dispute reason unconditionally. Returns `None`
    /// when the transaction does not exist.
    pub fn update_transaction_status(
        &self,
        id: i64,
        status: &str,
        dispute_reason: Option<&str>,
        last_update: NaiveDate,
    ) -> Result<Option<TransactionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE transactions SET
                    status = ?2,
                    dispute_reason = ?3,
                    last_update = ?4,
                    updated_at = datetime('now')
                 WHERE id = ?1
                 RETURNING {TRANSACTION_COLUMNS}"
            );
            let row = conn
                .query_row(
                    &sql,
                    params![id, status, dispute_reason, format_date(last_update)],
                    transaction_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Messages of the transaction go with it.
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    // -- Messages --

    /// Oldest first.
    pub fn list_messages(&self, transaction_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE transaction_id = ?1
                 ORDER BY timestamp ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([transaction_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_message(&self, msg: &NewMessage<'_>) -> Result<MessageRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO messages (transaction_id, sender_id, sender_name, message, type, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {MESSAGE_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                params![
                    msg.transaction_id,
                    msg.sender_id,
                    msg.sender_name,
                    msg.message,
                    msg.kind,
                    msg.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                ],
                message_from_row,
            )?;
            Ok(row)
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn query_user(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        user_type: row.get(5)?,
        rating: row.get(6)?,
        total_transactions: row.get(7)?,
        joined_date: row.get(8)?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        status: row.get(4)?,
        buyer_id: row.get(5)?,
        seller_id: row.get(6)?,
        buyer_name: row.get(7)?,
        seller_name: row.get(8)?,
        created_date: row.get(9)?,
        expected_delivery: row.get(10)?,
        inspection_period: row.get(11)?,
        delivery_address: row.get(12)?,
        dispute_reason: row.get(13)?,
        last_update: row.get(14)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        sender_id: row.get(2)?,
        sender_name: row.get(3)?,
        message: row.get(4)?,
        timestamp: row.get(5)?,
        kind: row.get(6)?,
    })
}

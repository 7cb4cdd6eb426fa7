use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, transactions, messages)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                email               TEXT NOT NULL UNIQUE,
                password            TEXT NOT NULL,
                name                TEXT NOT NULL,
                phone               TEXT,
                user_type           TEXT NOT NULL
                                    CHECK (user_type IN ('buyer', 'seller', 'both')),
                rating              REAL NOT NULL DEFAULT 0,
                total_transactions  INTEGER NOT NULL DEFAULT 0,
                joined_date         TEXT NOT NULL DEFAULT (date('now')),
                created_at          TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE transactions (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                title               TEXT NOT NULL,
                description         TEXT NOT NULL,
                price               REAL NOT NULL CHECK (price >= 0),
                status              TEXT NOT NULL CHECK (status IN (
                                        'pending_acceptance', 'pending_payment',
                                        'payment_secured', 'shipped', 'delivered',
                                        'inspection_period', 'completed',
                                        'disputed', 'cancelled')),
                buyer_id            INTEGER REFERENCES users(id),
                seller_id           INTEGER REFERENCES users(id),
                buyer_name          TEXT NOT NULL,
                seller_name         TEXT NOT NULL,
                created_date        TEXT NOT NULL DEFAULT (date('now')),
                expected_delivery   TEXT,
                inspection_period   INTEGER NOT NULL DEFAULT 3,
                delivery_address    TEXT,
                dispute_reason      TEXT,
                last_update         TEXT NOT NULL DEFAULT (date('now')),
                created_at          TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_transactions_buyer ON transactions(buyer_id);
            CREATE INDEX idx_transactions_seller ON transactions(seller_id);

            CREATE TABLE messages (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_id  INTEGER NOT NULL
                                REFERENCES transactions(id) ON DELETE CASCADE,
                sender_id       TEXT NOT NULL,
                sender_name     TEXT NOT NULL,
                message         TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                type            TEXT NOT NULL DEFAULT 'text'
                                CHECK (type IN ('text', 'image', 'system'))
            );

            CREATE INDEX idx_messages_transaction ON messages(transaction_id, timestamp);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

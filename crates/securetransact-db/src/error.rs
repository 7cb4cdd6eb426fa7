use rusqlite::ErrorCode;
use rusqlite::ffi;

/// Coarse classification of store failures, used by the API layer to pick
/// a status code and a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    CheckViolation,
    MissingTable,
    Unavailable,
    Other,
}

impl DbErrorKind {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UniqueViolation => "unique_violation",
            Self::ForeignKeyViolation => "foreign_key_violation",
            Self::CheckViolation => "check_violation",
            Self::MissingTable => "undefined_table",
            Self::Unavailable => "database_unavailable",
            Self::Other => "internal",
        }
    }
}

pub fn classify(err: &anyhow::Error) -> DbErrorKind {
    let Some(sql_err) = err.chain().find_map(|e| e.downcast_ref::<rusqlite::Error>()) else {
        return DbErrorKind::Other;
    };

    if let rusqlite::Error::SqliteFailure(failure, _) = sql_err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return DbErrorKind::UniqueViolation;
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return DbErrorKind::ForeignKeyViolation,
            ffi::SQLITE_CONSTRAINT_CHECK => return DbErrorKind::CheckViolation,
            _ => {}
        }
        if matches!(
            failure.code,
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
        ) {
            return DbErrorKind::Unavailable;
        }
    }

    // Prepare-time errors carry the reason only in their message.
    if sql_err.to_string().contains("no such table") {
        return DbErrorKind::MissingTable;
    }

    DbErrorKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        crate::migrations::run(&conn).unwrap();
        conn
    }

    fn insert_user(conn: &Connection, email: &str) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO users (email, password, name, user_type) VALUES (?1, 'h', 'n', 'buyer')",
            [email],
        )
    }

    #[test]
    fn duplicate_email_is_unique_violation() {
        let conn = conn();
        insert_user(&conn, "a@b.co").unwrap();
        let err = anyhow::Error::from(insert_user(&conn, "a@b.co").unwrap_err());
        assert_eq!(classify(&err), DbErrorKind::UniqueViolation);
    }

    #[test]
    fn dangling_reference_is_foreign_key_violation() {
        let conn = conn();
        let err = conn
            .execute(
                "INSERT INTO messages (transaction_id, sender_id, sender_name, message, timestamp)
                 VALUES (99, '1', 'A', 'hi', '2026-01-01T00:00:00Z')",
                [],
            )
            .unwrap_err();
        assert_eq!(classify(&err.into()), DbErrorKind::ForeignKeyViolation);
    }

    #[test]
    fn bad_label_is_check_violation() {
        let conn = conn();
        let err = conn
            .execute(
                "INSERT INTO users (email, password, name, user_type) VALUES ('x@y.z', 'h', 'n', 'admin')",
                [],
            )
            .unwrap_err();
        assert_eq!(classify(&err.into()), DbErrorKind::CheckViolation);
    }

    #[test]
    fn missing_table_is_detected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.prepare("SELECT * FROM users").unwrap_err();
        assert_eq!(classify(&err.into()), DbErrorKind::MissingTable);
    }

    #[test]
    fn context_wrapping_keeps_the_classification() {
        let conn = conn();
        insert_user(&conn, "a@b.co").unwrap();
        let err = anyhow::Error::from(insert_user(&conn, "a@b.co").unwrap_err())
            .context("creating user");
        assert_eq!(classify(&err), DbErrorKind::UniqueViolation);
    }

    #[test]
    fn foreign_errors_are_other() {
        let err = anyhow::anyhow!("DB lock poisoned");
        assert_eq!(classify(&err), DbErrorKind::Other);
        assert_eq!(DbErrorKind::Other.code(), "internal");
    }
}

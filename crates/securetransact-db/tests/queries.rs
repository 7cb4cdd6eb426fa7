use chrono::{Duration, NaiveDate, TimeZone, Utc};

use securetransact_db::models::{NewMessage, NewTransaction, NewUser, UserChanges};
use securetransact_db::{Database, DbErrorKind, classify};
use securetransact_types::models::{Message, MessageType, Transaction, TransactionStatus, User, UserType};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
}

fn new_user<'a>(email: &'a str, name: &'a str) -> NewUser<'a> {
    NewUser {
        email,
        password_hash: "$argon2id$stub",
        name,
        phone: None,
        user_type: "both",
        joined_date: day(1),
    }
}

fn new_tx<'a>(title: &'a str, buyer: Option<i64>, seller: Option<i64>, created: NaiveDate) -> NewTransaction<'a> {
    NewTransaction {
        title,
        description: "described",
        price: 250.0,
        status: "pending_acceptance",
        buyer_id: buyer,
        seller_id: seller,
        buyer_name: "Buyer",
        seller_name: "Seller",
        inspection_period: 3,
        delivery_address: Some("1 Main St"),
        expected_delivery: None,
        created_date: created,
    }
}

#[test]
fn user_round_trip_and_lookup() {
    let db = Database::open_in_memory().unwrap();
    let row = db
        .create_user(&NewUser {
            phone: Some("+33 6 00 00 00 00"),
            ..new_user("alice@example.com", "Alice")
        })
        .unwrap();

    let user = User::try_from(row).unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.user_type, UserType::Both);
    assert_eq!(user.rating, 0.0);
    assert_eq!(user.total_transactions, 0);
    assert_eq!(user.joined_date, day(1));
    assert_eq!(user.phone.as_deref(), Some("+33 6 00 00 00 00"));

    let by_email = db.get_user_by_email("alice@example.com").unwrap().unwrap();
    assert_eq!(by_email.password, "$argon2id$stub");
    let id = by_email.id;
    assert!(db.get_user_by_id(id).unwrap().is_some());
    assert!(db.get_user_by_id(id + 100).unwrap().is_none());
    assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn duplicate_email_is_classified() {
    let db = Database::open_in_memory().unwrap();
    db.create_user(&new_user("dup@example.com", "One")).unwrap();
    let err = db.create_user(&new_user("dup@example.com", "Two")).unwrap_err();
    assert_eq!(classify(&err), DbErrorKind::UniqueViolation);
}

#[test]
fn partial_user_update_keeps_untouched_fields() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .create_user(&NewUser {
            phone: Some("123"),
            ..new_user("bob@example.com", "Bob")
        })
        .unwrap()
        .id;

    let updated = db
        .update_user(
            id,
            &UserChanges {
                name: Some("Robert"),
                user_type: Some("seller"),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Robert");
    assert_eq!(updated.user_type, "seller");
    assert_eq!(updated.phone.as_deref(), Some("123"));

    let cleared = db
        .update_user(
            id,
            &UserChanges {
                phone: Some(None),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(cleared.phone, None);
    assert_eq!(cleared.name, "Robert");

    assert!(db.update_user(id + 1, &UserChanges::default()).unwrap().is_none());
}

#[test]
fn transactions_are_listed_newest_first_and_filtered_by_party() {
    let db = Database::open_in_memory().unwrap();
    let a = db.create_user(&new_user("a@example.com", "A")).unwrap().id;
    let b = db.create_user(&new_user("b@example.com", "B")).unwrap().id;
    let c = db.create_user(&new_user("c@example.com", "C")).unwrap().id;

    db.create_transaction(&new_tx("old", Some(a), Some(b), day(2))).unwrap();
    db.create_transaction(&new_tx("new", Some(b), Some(c), day(9))).unwrap();
    db.create_transaction(&new_tx("mid", Some(c), Some(a), day(5))).unwrap();

    let titles: Vec<String> = db
        .list_transactions()
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, ["new", "mid", "old"]);

    let for_a: Vec<String> = db
        .list_transactions_for_user(a)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(for_a, ["mid", "old"]);
}

#[test]
fn status_update_overwrites_reason_and_date() {
    let db = Database::open_in_memory().unwrap();
    let row = db
        .create_transaction(&NewTransaction {
            expected_delivery: Some(day(20)),
            ..new_tx("Camera", None, None, day(3))
        })
        .unwrap();
    let created = Transaction::try_from(row).unwrap();
    assert_eq!(created.status, TransactionStatus::PendingAcceptance);
    assert_eq!(created.last_update, day(3));
    assert_eq!(created.expected_delivery, Some(day(20)));

    let id: i64 = created.id.parse().unwrap();
    // Going straight from pending to disputed is allowed.
    let disputed = db
        .update_transaction_status(id, "disputed", Some("Item never arrived"), day(10))
        .unwrap()
        .unwrap();
    let disputed = Transaction::try_from(disputed).unwrap();
    assert_eq!(disputed.status, TransactionStatus::Disputed);
    assert_eq!(disputed.dispute_reason.as_deref(), Some("Item never arrived"));
    assert_eq!(disputed.last_update, day(10));
    assert_eq!(disputed.created_date, day(3));

    assert!(db.update_transaction_status(id + 1, "shipped", None, day(11)).unwrap().is_none());
}

#[test]
fn unknown_party_is_a_foreign_key_violation() {
    let db = Database::open_in_memory().unwrap();
    let err = db.create_transaction(&new_tx("ghost", Some(42), None, day(1))).unwrap_err();
    assert_eq!(classify(&err), DbErrorKind::ForeignKeyViolation);
}

#[test]
fn messages_are_ordered_and_cascade_with_their_transaction() {
    let db = Database::open_in_memory().unwrap();
    let tx = db.create_transaction(&new_tx("Lamp", None, None, day(1))).unwrap().id;
    let base = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

    for (offset, text) in [(5, "third"), (0, "first"), (2, "second")] {
        db.create_message(&NewMessage {
            transaction_id: tx,
            sender_id: "7",
            sender_name: "Alice",
            message: text,
            kind: "text",
            timestamp: base + Duration::seconds(offset),
        })
        .unwrap();
    }

    let messages: Vec<Message> = db
        .list_messages(tx)
        .unwrap()
        .into_iter()
        .map(|m| Message::try_from(m).unwrap())
        .collect();
    let texts: Vec<&str> = messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
    assert_eq!(messages[0].timestamp, base);
    assert_eq!(messages[0].kind, MessageType::Text);

    assert!(db.delete_transaction(tx).unwrap());
    assert!(db.list_messages(tx).unwrap().is_empty());
    assert!(!db.delete_transaction(tx).unwrap());
}

#[test]
fn message_for_missing_transaction_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .create_message(&NewMessage {
            transaction_id: 404,
            sender_id: "1",
            sender_name: "A",
            message: "hello",
            kind: "text",
            timestamp: Utc::now(),
        })
        .unwrap_err();
    assert_eq!(classify(&err), DbErrorKind::ForeignKeyViolation);
}

#[test]
fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let db = Database::open(&path).unwrap();
        db.create_user(&new_user("keep@example.com", "Keep")).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert!(db.get_user_by_email("keep@example.com").unwrap().is_some());
    assert!(db.ping().unwrap().ends_with('Z'));
}

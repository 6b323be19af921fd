use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use chrono::{DateTime, TimeZone, Utc};
use engine::{
    Engine, EngineError, Frequency, Kind, NewTransactionCmd, Recurrence, TransactionListFilter,
    UpdateTransactionCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, email) VALUES (?, ?, ?)",
        vec!["alice".into(), "password".into(), "alice@example.com".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn category(engine: &Engine, name: &str) -> Uuid {
    engine
        .list_categories("alice", false)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .unwrap()
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn expense(category_id: Uuid, amount_minor: i64, occurred_at: DateTime<Utc>) -> NewTransactionCmd {
    NewTransactionCmd {
        user_id: "alice".to_string(),
        kind: Kind::Expense,
        category_id,
        amount_minor,
        description: "Expense".to_string(),
        occurred_at,
        payment_method: None,
        tags: vec![],
        recurrence: None,
    }
}

#[tokio::test]
async fn create_validates_amount_and_description() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;

    let err = engine
        .create_transaction(NewTransactionCmd {
            amount_minor: 0,
            ..expense(food, 0, at(2026, 8, 10))
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount_minor must be > 0".to_string())
    );

    let err = engine
        .create_transaction(NewTransactionCmd {
            description: "   ".to_string(),
            ..expense(food, 100, at(2026, 8, 10))
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidField("description must not be empty".to_string())
    );
}

#[tokio::test]
async fn category_kind_must_match_transaction_kind() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;

    let err = engine
        .create_transaction(NewTransactionCmd {
            kind: Kind::Income,
            ..expense(food, 100, at(2026, 8, 10))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::KindMismatch(_)));
}

#[tokio::test]
async fn unknown_category_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    engine.list_categories("alice", false).await.unwrap();

    let err = engine
        .create_transaction(expense(Uuid::new_v4(), 100, at(2026, 8, 10)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );
}

#[tokio::test]
async fn tags_are_trimmed_and_deduplicated() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;

    engine
        .create_transaction(NewTransactionCmd {
            tags: vec![
                " food ".to_string(),
                "food".to_string(),
                String::new(),
                "work".to_string(),
            ],
            ..expense(food, 100, at(2026, 8, 10))
        })
        .await
        .unwrap();

    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page[0].tags, vec!["food".to_string(), "work".to_string()]);
}

#[tokio::test]
async fn recurrence_round_trips_through_storage() {
    let (engine, _db) = engine_with_db().await;
    let salary = category(&engine, "Salary").await;

    let recurrence = Recurrence {
        frequency: Frequency::Monthly,
        end_date: chrono::NaiveDate::from_ymd_opt(2027, 1, 31),
    };
    engine
        .create_transaction(NewTransactionCmd {
            user_id: "alice".to_string(),
            kind: Kind::Income,
            category_id: salary,
            amount_minor: 250_000,
            description: "Salary".to_string(),
            occurred_at: at(2026, 8, 1),
            payment_method: Some("bank transfer".to_string()),
            tags: vec![],
            recurrence: Some(recurrence.clone()),
        })
        .await
        .unwrap();

    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page[0].recurrence, Some(recurrence));
    assert_eq!(page[0].payment_method.as_deref(), Some("bank transfer"));
}

#[tokio::test]
async fn update_patches_only_the_given_fields() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;

    let id = engine
        .create_transaction(NewTransactionCmd {
            payment_method: Some("card".to_string()),
            ..expense(food, 1000, at(2026, 8, 10))
        })
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            amount_minor: Some(1500),
            ..Default::default()
        })
        .await
        .unwrap();

    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page[0].amount_minor, 1500);
    assert_eq!(page[0].description, "Expense");
    assert_eq!(page[0].payment_method.as_deref(), Some("card"));

    // An empty payment method clears the stored one.
    engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            payment_method: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap();
    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page[0].payment_method, None);
}

#[tokio::test]
async fn recurrence_patch_replaces_or_clears() {
    let (engine, _db) = engine_with_db().await;
    let salary = category(&engine, "Salary").await;

    let id = engine
        .create_transaction(NewTransactionCmd {
            user_id: "alice".to_string(),
            kind: Kind::Income,
            category_id: salary,
            amount_minor: 250_000,
            description: "Salary".to_string(),
            occurred_at: at(2026, 8, 1),
            payment_method: None,
            tags: vec![],
            recurrence: Some(Recurrence {
                frequency: Frequency::Monthly,
                end_date: None,
            }),
        })
        .await
        .unwrap();

    // An untouched patch keeps the recurrence.
    engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            amount_minor: Some(260_000),
            ..Default::default()
        })
        .await
        .unwrap();
    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(page[0].recurrence.is_some());

    // Replacing swaps the descriptor wholesale.
    let yearly = Recurrence {
        frequency: Frequency::Yearly,
        end_date: chrono::NaiveDate::from_ymd_opt(2030, 1, 1),
    };
    engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            recurrence: Some(Some(yearly.clone())),
            ..Default::default()
        })
        .await
        .unwrap();
    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page[0].recurrence, Some(yearly));

    // Clearing removes it entirely.
    engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            recurrence: Some(None),
            ..Default::default()
        })
        .await
        .unwrap();
    let (page, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(page[0].recurrence, None);
}

#[tokio::test]
async fn update_revalidates_the_kind_invariant() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;
    let salary = category(&engine, "Salary").await;

    let id = engine
        .create_transaction(expense(food, 1000, at(2026, 8, 10)))
        .await
        .unwrap();

    // Moving to an income category without changing the kind must fail.
    let err = engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            category_id: Some(salary),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KindMismatch(_)));

    // Changing both together is consistent.
    engine
        .update_transaction(UpdateTransactionCmd {
            user_id: "alice".to_string(),
            transaction_id: id,
            kind: Some(Kind::Income),
            category_id: Some(salary),
            ..Default::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_removes_the_transaction() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;

    let id = engine
        .create_transaction(expense(food, 1000, at(2026, 8, 10)))
        .await
        .unwrap();
    engine.delete_transaction("alice", id).await.unwrap();

    let err = engine.delete_transaction("alice", id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
}

#[tokio::test]
async fn listing_pages_newest_first_without_duplicates() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;

    for day in 1..=5 {
        engine
            .create_transaction(expense(food, i64::from(day) * 100, at(2026, 8, day)))
            .await
            .unwrap();
    }

    let mut seen: Vec<Uuid> = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let (page, next) = engine
            .list_transactions_page(
                "alice",
                2,
                cursor.as_deref(),
                &TransactionListFilter::default(),
            )
            .await
            .unwrap();
        assert!(page.len() <= 2);
        for tx in &page {
            assert!(!seen.contains(&tx.id));
            seen.push(tx.id);
        }
        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen.len(), 5);

    // Newest first across the whole walk.
    let (all, _) = engine
        .list_transactions_page("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.iter().map(|tx| tx.id).collect::<Vec<_>>(), seen);
    assert!(all.windows(2).all(|p| p[0].occurred_at >= p[1].occurred_at));
}

#[tokio::test]
async fn listing_applies_filters() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food").await;
    let transport = category(&engine, "Transport").await;
    let salary = category(&engine, "Salary").await;

    engine
        .create_transaction(expense(food, 100, at(2026, 8, 1)))
        .await
        .unwrap();
    engine
        .create_transaction(expense(transport, 200, at(2026, 8, 2)))
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd {
            user_id: "alice".to_string(),
            kind: Kind::Income,
            category_id: salary,
            amount_minor: 300,
            description: "Income".to_string(),
            occurred_at: at(2026, 8, 3),
            payment_method: None,
            tags: vec![],
            recurrence: None,
        })
        .await
        .unwrap();

    let (page, _) = engine
        .list_transactions_page(
            "alice",
            10,
            None,
            &TransactionListFilter {
                kinds: Some(vec![Kind::Income]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].kind, Kind::Income);

    let (page, _) = engine
        .list_transactions_page(
            "alice",
            10,
            None,
            &TransactionListFilter {
                category_ids: Some(vec![food]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].category_id, food);

    // `[from, to)`: the upper bound is excluded.
    let (page, _) = engine
        .list_transactions_page(
            "alice",
            10,
            None,
            &TransactionListFilter {
                from: Some(at(2026, 8, 1)),
                to: Some(at(2026, 8, 3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn listing_rejects_inverted_ranges_and_empty_kind_lists() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .list_transactions_page(
            "alice",
            10,
            None,
            &TransactionListFilter {
                from: Some(at(2026, 8, 10)),
                to: Some(at(2026, 8, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidField("invalid range: from must be < to".to_string())
    );

    let err = engine
        .list_transactions_page(
            "alice",
            10,
            None,
            &TransactionListFilter {
                kinds: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidField("kinds must not be empty".to_string())
    );
}

#[tokio::test]
async fn garbage_cursor_is_an_invalid_field() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .list_transactions_page(
            "alice",
            10,
            Some("not a cursor"),
            &TransactionListFilter::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidField("invalid transactions cursor".to_string())
    );
}

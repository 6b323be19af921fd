use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use chrono::{TimeZone, Utc};
use engine::{Engine, EngineError, Kind, NewTransactionCmd};
use migration::MigratorTrait;

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

#[tokio::test]
async fn first_listing_seeds_defaults_exactly_once() {
    let (engine, _db) = engine_with_db().await;

    let first = engine.list_categories("alice", false).await.unwrap();
    assert_eq!(first.len(), 10);
    assert!(first.iter().all(|c| !c.is_custom));
    assert!(first.windows(2).all(|pair| pair[0].name <= pair[1].name));

    let second = engine.list_categories("alice", false).await.unwrap();
    assert_eq!(second.len(), 10);
}

#[tokio::test]
async fn create_rejects_duplicate_names_within_a_kind() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_category("alice", "Books", Kind::Expense, None, None)
        .await
        .unwrap();

    // Case and surrounding whitespace do not make a different name.
    let err = engine
        .create_category("alice", "  BOOKS ", Kind::Expense, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("BOOKS".to_string()));

    // The same name under the other kind is a different category.
    engine
        .create_category("alice", "Books", Kind::Income, None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn create_applies_color_and_icon_defaults() {
    let (engine, _db) = engine_with_db().await;

    let category = engine
        .create_category("alice", "Books", Kind::Expense, None, None)
        .await
        .unwrap();

    assert_eq!(category.color, "#607d8b");
    assert_eq!(category.icon, "tag");
    assert!(category.is_custom);
    assert!(!category.archived);
}

#[tokio::test]
async fn overlong_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_category("alice", &"x".repeat(41), Kind::Expense, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidField(_)));
}

#[tokio::test]
async fn rename_clashes_with_an_existing_name() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_category("alice", "Books", Kind::Expense, None, None)
        .await
        .unwrap();
    let games = engine
        .create_category("alice", "Games", Kind::Expense, None, None)
        .await
        .unwrap();

    let err = engine
        .update_category("alice", games.id, Some("books"), None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("books".to_string()));

    // Renaming to its own name is a no-op, not a clash.
    engine
        .update_category("alice", games.id, Some("Games"), None, None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn archived_categories_are_hidden_by_default() {
    let (engine, _db) = engine_with_db().await;

    let books = engine
        .create_category("alice", "Books", Kind::Expense, None, None)
        .await
        .unwrap();
    engine
        .update_category("alice", books.id, None, None, None, Some(true))
        .await
        .unwrap();

    let visible = engine.list_categories("alice", false).await.unwrap();
    assert!(visible.iter().all(|c| c.id != books.id));

    let all = engine.list_categories("alice", true).await.unwrap();
    assert!(all.iter().any(|c| c.id == books.id && c.archived));
}

#[tokio::test]
async fn delete_guards_defaults_and_referenced_categories() {
    let (engine, _db) = engine_with_db().await;

    let defaults = engine.list_categories("alice", false).await.unwrap();
    let food = defaults.iter().find(|c| c.name == "Food").unwrap();
    let err = engine.delete_category("alice", food.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("default categories cannot be deleted".to_string())
    );

    let books = engine
        .create_category("alice", "Books", Kind::Expense, None, None)
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd {
            user_id: "alice".to_string(),
            kind: Kind::Expense,
            category_id: books.id,
            amount_minor: 1500,
            description: "Novel".to_string(),
            occurred_at: Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap(),
            payment_method: None,
            tags: vec![],
            recurrence: None,
        })
        .await
        .unwrap();

    let err = engine.delete_category("alice", books.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("category still has transactions".to_string())
    );

    let empty = engine
        .create_category("alice", "Empty", Kind::Expense, None, None)
        .await
        .unwrap();
    engine.delete_category("alice", empty.id).await.unwrap();
    let remaining = engine.list_categories("alice", true).await.unwrap();
    assert!(remaining.iter().all(|c| c.id != empty.id));
}

#[tokio::test]
async fn categories_are_scoped_per_user() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, email) VALUES (?, ?, ?)",
        vec!["bob".into(), "password".into(), "bob@example.com".into()],
    ))
    .await
    .unwrap();

    let books = engine
        .create_category("alice", "Books", Kind::Expense, None, None)
        .await
        .unwrap();

    let err = engine
        .update_category("bob", books.id, Some("Stolen"), None, None, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );
}

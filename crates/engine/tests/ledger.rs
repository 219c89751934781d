use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

use engine::{
    BalanceMode, Balances, CreateExpenseCmd, CreateUserCmd, Engine, EngineError, ErrorKind, Money,
    Notification, ParticipantSpec, RecordingNotifier, SplitError, SplitLimits, SplitType,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, RecordingNotifier, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let notifier = RecordingNotifier::new();
    let engine = Engine::builder()
        .database(db.clone())
        .notifier(Arc::new(notifier.clone()))
        .build()
        .await
        .unwrap();

    for (id, name) in [("u1", "Alice"), ("u2", "Bob"), ("u3", "Carol"), ("u4", "Dan")] {
        engine
            .create_user(CreateUserCmd::new(name, format!("{id}@example.com")).user_id(id))
            .await
            .unwrap();
    }
    (engine, notifier, db)
}

fn equal(payer: &str, amount: Money, debtors: &[&str]) -> CreateExpenseCmd {
    CreateExpenseCmd::new(payer, amount, SplitType::Equal)
        .participants(debtors.iter().map(|id| ParticipantSpec::new(*id)))
}

#[tokio::test]
async fn equal_split_writes_entries_and_notices() {
    let (engine, notifier, _db) = engine_with_db().await;

    let expense = engine
        .create_expense(equal("u1", Money::major(100), &["u2", "u3", "u4"]).name("Dinner"))
        .await
        .unwrap();
    assert_eq!(expense.payer, "u1");
    assert_eq!(expense.amount, Money::major(100));
    assert_eq!(expense.name.as_deref(), Some("Dinner"));

    let entries = engine.ledger_entries().await.unwrap();
    let amounts: Vec<(String, String, i64)> = entries
        .iter()
        .map(|e| (e.debtor.clone(), e.creditor.clone(), e.amount.minor()))
        .collect();
    assert_eq!(
        amounts,
        vec![
            ("u2".to_string(), "u1".to_string(), 3334),
            ("u3".to_string(), "u1".to_string(), 3333),
            ("u4".to_string(), "u1".to_string(), 3333),
        ]
    );
    assert!(entries.iter().all(|e| e.expense_id == expense.id));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    match &sent[0] {
        Notification::ExpenseNotice(notice) => {
            assert_eq!(notice.debtor_name, "Bob");
            assert_eq!(notice.debtor_email, "u2@example.com");
            assert_eq!(notice.payer_name, "Alice");
            assert_eq!(notice.amount, Money::new(3334));
        }
        other => panic!("unexpected notification {other:?}"),
    }
}

#[tokio::test]
async fn exact_and_percent_splits_are_recorded() {
    let (engine, _notifier, _db) = engine_with_db().await;

    engine
        .create_expense(
            CreateExpenseCmd::new("u1", Money::major(1250), SplitType::Exact)
                .participant(ParticipantSpec::new("u2").amount("370"))
                .participant(ParticipantSpec::new("u3").amount("880")),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            CreateExpenseCmd::new("u4", Money::major(1200), SplitType::Percent)
                .participant(ParticipantSpec::new("u1").percentage("40"))
                .participant(ParticipantSpec::new("u2").percentage("20"))
                .participant(ParticipantSpec::new("u3").percentage("40")),
        )
        .await
        .unwrap();

    let amounts: Vec<i64> = engine
        .ledger_entries()
        .await
        .unwrap()
        .iter()
        .map(|e| e.amount.minor())
        .collect();
    assert_eq!(amounts, vec![37000, 88000, 48000, 24000, 48000]);
}

#[tokio::test]
async fn rejected_expense_writes_nothing() {
    let (engine, notifier, _db) = engine_with_db().await;

    let err = engine
        .create_expense(
            CreateExpenseCmd::new("u1", Money::major(100), SplitType::Exact)
                .participant(ParticipantSpec::new("u2").amount("40"))
                .participant(ParticipantSpec::new("u3").amount("50")),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Split(SplitError::SumMismatch {
            expected: Money::major(100),
            actual: Money::major(90),
        })
    );
    assert_eq!(err.kind(), ErrorKind::StrategyValidation);

    assert!(engine.list_expenses().await.unwrap().is_empty());
    assert!(engine.ledger_entries().await.unwrap().is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn unknown_participant_writes_nothing() {
    let (engine, notifier, _db) = engine_with_db().await;

    let err = engine
        .create_expense(equal("u1", Money::major(30), &["u2", "ghost", "u3"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(err, EngineError::KeyNotFound("user ghost".to_string()));

    assert!(engine.list_expenses().await.unwrap().is_empty());
    assert!(engine.ledger_entries().await.unwrap().is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn failed_ledger_insert_rolls_back_the_expense() {
    let (engine, notifier, db) = engine_with_db().await;
    db.execute_unprepared(
        "CREATE TRIGGER reject_u3 BEFORE INSERT ON ledger_entries \
         WHEN NEW.debtor = 'u3' BEGIN SELECT RAISE(ABORT, 'ledger full'); END",
    )
    .await
    .unwrap();
    let before = notifier.sent().len();

    // The expense row and the u2 entry are written before u3 fails.
    let err = engine
        .create_expense(equal("u1", Money::major(30), &["u2", "u3"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);
    assert!(err.to_string().contains("ledger full"), "{err}");

    assert!(engine.list_expenses().await.unwrap().is_empty());
    assert!(engine.ledger_entries().await.unwrap().is_empty());
    assert_eq!(notifier.sent().len(), before);

    engine
        .create_expense(equal("u1", Money::major(30), &["u2", "u4"]))
        .await
        .unwrap();
    assert_eq!(engine.ledger_entries().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_payer_is_a_lookup_error() {
    let (engine, _notifier, _db) = engine_with_db().await;

    let err = engine
        .create_expense(equal("ghost", Money::major(30), &["u2"]))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user ghost".to_string()));
}

#[tokio::test]
async fn payer_cannot_owe_themselves() {
    let (engine, _notifier, _db) = engine_with_db().await;

    let err = engine
        .create_expense(equal("u1", Money::major(30), &["u1", "u2"]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Split(SplitError::PayerIsParticipant("u1".to_string()))
    );
}

#[tokio::test]
async fn limits_come_from_the_builder() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .limits(SplitLimits::new(2, Money::major(50)))
        .build()
        .await
        .unwrap();

    let err = engine
        .create_expense(equal("u1", Money::major(30), &["u2", "u3", "u4"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cardinality);

    let err = engine
        .create_expense(equal("u1", Money::major(51), &["u2"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Limit);
}

#[tokio::test]
async fn simplified_balances_net_opposite_debts() {
    let (engine, _notifier, _db) = engine_with_db().await;

    engine
        .create_expense(equal("u1", Money::major(100), &["u2"]))
        .await
        .unwrap();
    engine
        .create_expense(equal("u2", Money::major(30), &["u1"]))
        .await
        .unwrap();

    let Balances::Simplified(view) = engine.balances(BalanceMode::Simplify).await.unwrap() else {
        panic!("expected a simplified view");
    };
    assert_eq!(view.len(), 1);
    assert_eq!(view["u2"]["u1"], Money::major(70));

    let Balances::Raw(raw) = engine.balances(BalanceMode::Raw).await.unwrap() else {
        panic!("expected the raw passbook");
    };
    assert_eq!(raw.len(), 2);
}

#[tokio::test]
async fn user_passbook_lists_debts_before_credits() {
    let (engine, _notifier, _db) = engine_with_db().await;

    engine
        .create_expense(equal("u2", Money::major(20), &["u3"]))
        .await
        .unwrap();
    engine
        .create_expense(equal("u1", Money::major(10), &["u2"]))
        .await
        .unwrap();

    let entries = engine.balances_for_user("u2").await.unwrap();
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.debtor.as_str(), e.creditor.as_str()))
        .collect();
    assert_eq!(pairs, vec![("u2", "u1"), ("u3", "u2")]);

    assert!(engine.balances_for_user("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn expenses_are_listed_per_payer() {
    let (engine, _notifier, _db) = engine_with_db().await;

    engine
        .create_expense(equal("u1", Money::major(10), &["u2"]))
        .await
        .unwrap();
    engine
        .create_expense(equal("u2", Money::major(20), &["u1"]))
        .await
        .unwrap();
    engine
        .create_expense(equal("u1", Money::major(30), &["u3"]))
        .await
        .unwrap();

    assert_eq!(engine.list_expenses().await.unwrap().len(), 3);
    let paid: Vec<Money> = engine
        .list_expenses_for_user("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.amount)
        .collect();
    assert_eq!(paid, vec![Money::major(10), Money::major(30)]);
    assert!(engine.list_expenses_for_user("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_users_are_rejected() {
    let (engine, _notifier, _db) = engine_with_db().await;

    let err = engine
        .create_user(CreateUserCmd::new("Other", "someone@example.com").user_id("u1"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("u1".to_string()));

    let err = engine
        .create_user(CreateUserCmd::new("Alice Again", "U1@Example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("u1@example.com".to_string()));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let created = engine
        .create_user(CreateUserCmd::new("Eve Smith", "eve@example.com").mobile_number("5551234"))
        .await
        .unwrap();
    assert!(created.user_id.starts_with("eve_smith_"));
    assert_eq!(engine.user(&created.user_id).await.unwrap(), created);
    assert_eq!(engine.list_users().await.unwrap().len(), 5);
}

#[tokio::test]
async fn weekly_summaries_group_debts_per_creditor() {
    let (engine, notifier, _db) = engine_with_db().await;

    engine
        .create_expense(equal("u1", Money::major(30), &["u2", "u3"]))
        .await
        .unwrap();
    engine
        .create_expense(equal("u1", Money::major(10), &["u2"]))
        .await
        .unwrap();
    engine
        .create_expense(equal("u3", Money::major(5), &["u2"]))
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let summaries = engine.weekly_summaries(today).await.unwrap();
    assert_eq!(summaries.len(), 2);

    let bob = summaries.iter().find(|s| s.user_id == "u2").unwrap();
    assert_eq!(bob.user_email, "u2@example.com");
    let lines: Vec<(&str, Money)> = bob
        .lines
        .iter()
        .map(|l| (l.creditor_name.as_str(), l.amount))
        .collect();
    assert_eq!(
        lines,
        vec![("Alice", Money::major(25)), ("Carol", Money::major(5))]
    );
    assert_eq!(bob.total, Money::major(30));

    let before = notifier.sent().len();
    let sent = engine.send_weekly_summaries(today).await.unwrap();
    assert_eq!(sent, 2);
    assert!(
        notifier.sent()[before..]
            .iter()
            .all(|n| matches!(n, Notification::WeeklySummary(_)))
    );
}

#[tokio::test]
async fn weekly_window_ignores_older_expenses() {
    let (engine, _notifier, _db) = engine_with_db().await;

    engine
        .create_expense(equal("u1", Money::major(30), &["u2"]))
        .await
        .unwrap();

    // A window ending long before anything was written.
    let long_ago = chrono::NaiveDate::from_ymd_opt(2000, 1, 5).unwrap();
    assert!(engine.weekly_summaries(long_ago).await.unwrap().is_empty());
}

async fn backdate(db: &DatabaseConnection, expense_id: i64, at: DateTime<Utc>) {
    db.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "UPDATE expenses SET created_at = ? WHERE id = ?",
        [at.into(), expense_id.into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn weekly_window_bounds_are_inclusive() {
    let (engine, _notifier, db) = engine_with_db().await;
    let at = |d: u32, h: u32, m: u32, s: u32| {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
    };

    // Monday 2026-10-19 looks back to Monday 2026-10-12.
    let rows = [
        (10, at(11, 23, 59, 59)),
        (20, at(12, 0, 0, 0)),
        (30, at(19, 23, 59, 59)),
        (40, at(20, 0, 0, 0)),
    ];
    for (amount, created_at) in rows {
        let expense = engine
            .create_expense(equal("u1", Money::major(amount), &["u2"]))
            .await
            .unwrap();
        backdate(&db, expense.id, created_at).await;
    }

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let summaries = engine.weekly_summaries(today).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].user_id, "u2");
    assert_eq!(summaries[0].total, Money::major(50));
}

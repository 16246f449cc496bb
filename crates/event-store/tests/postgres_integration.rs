//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p event-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use event_store::{
    AggregateId, AppendOptions, COMMIT_ID, EventEnvelope, EventStore, EventStoreError,
    EventStoreExt, PostgresEventStore, StreamAppend, Version,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_events_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared events table
async fn get_test_store() -> PostgresEventStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE events")
        .execute(&pool)
        .await
        .unwrap();

    PostgresEventStore::new(pool)
}

fn create_test_event(
    aggregate_id: AggregateId,
    aggregate_type: &str,
    version: Version,
    event_type: &str,
) -> EventEnvelope {
    EventEnvelope::builder()
        .aggregate_id(aggregate_id)
        .aggregate_type(aggregate_type)
        .event_type(event_type)
        .version(version)
        .payload_raw(serde_json::json!({"test": true}))
        .metadata(COMMIT_ID, serde_json::json!("commit-1"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn append_and_retrieve_events() {
    let store = get_test_store().await;
    let wallet = AggregateId::new();

    let event = create_test_event(wallet, "Wallet", Version::first(), "WalletOpened");
    let version = store
        .append(vec![event], AppendOptions::expect_new())
        .await
        .unwrap();
    assert_eq!(version, Version::first());

    let events = store.get_events_for_aggregate(wallet).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "WalletOpened");
    assert_eq!(events[0].commit_id(), Some("commit-1"));
}

#[tokio::test]
async fn append_streams_commits_every_stream() {
    let store = get_test_store().await;
    let wallet = AggregateId::new();
    let cart = AggregateId::new();
    let purchase = AggregateId::new();

    let versions = store
        .append_streams(vec![
            StreamAppend::new(
                vec![
                    create_test_event(wallet, "Wallet", Version::new(1), "WalletOpened"),
                    create_test_event(wallet, "Wallet", Version::new(2), "FundsDeposited"),
                ],
                AppendOptions::expect_new(),
            ),
            StreamAppend::new(
                vec![create_test_event(cart, "Cart", Version::first(), "CartOpened")],
                AppendOptions::expect_new(),
            ),
            StreamAppend::new(
                vec![create_test_event(
                    purchase,
                    "PurchaseRecord",
                    Version::first(),
                    "PurchaseCompleted",
                )],
                AppendOptions::expect_new(),
            ),
        ])
        .await
        .unwrap();

    assert_eq!(
        versions,
        vec![Version::new(2), Version::first(), Version::first()]
    );
    assert!(store.aggregate_exists(purchase).await.unwrap());
}

#[tokio::test]
async fn conflict_on_second_stream_rolls_back_first() {
    let store = get_test_store().await;
    let wallet = AggregateId::new();
    let cart = AggregateId::new();

    store
        .append(
            vec![create_test_event(cart, "Cart", Version::first(), "CartOpened")],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();

    let result = store
        .append_streams(vec![
            StreamAppend::new(
                vec![create_test_event(wallet, "Wallet", Version::first(), "WalletOpened")],
                AppendOptions::expect_new(),
            ),
            StreamAppend::new(
                vec![create_test_event(cart, "Cart", Version::first(), "CartOpened")],
                AppendOptions::expect_new(),
            ),
        ])
        .await;

    assert!(matches!(
        result,
        Err(EventStoreError::ConcurrencyConflict { .. })
    ));
    assert_eq!(store.get_aggregate_version(wallet).await.unwrap(), None);
    assert_eq!(
        store.get_aggregate_version(cart).await.unwrap(),
        Some(Version::first())
    );
}

#[tokio::test]
async fn optimistic_concurrency_success() {
    let store = get_test_store().await;
    let wallet = AggregateId::new();

    store
        .append(
            vec![create_test_event(wallet, "Wallet", Version::first(), "WalletOpened")],
            AppendOptions::expect_new(),
        )
        .await
        .unwrap();

    let version = store
        .append(
            vec![create_test_event(wallet, "Wallet", Version::new(2), "FundsDeposited")],
            AppendOptions::expect_version(Version::first()),
        )
        .await
        .unwrap();
    assert_eq!(version, Version::new(2));
}

#[tokio::test]
async fn unique_constraint_prevents_duplicate_versions() {
    let store = get_test_store().await;
    let wallet = AggregateId::new();

    store
        .append(
            vec![create_test_event(wallet, "Wallet", Version::first(), "WalletOpened")],
            AppendOptions::new(),
        )
        .await
        .unwrap();

    // No expected version: only the constraint stands in the way.
    let result = store
        .append(
            vec![create_test_event(wallet, "Wallet", Version::first(), "WalletOpened")],
            AppendOptions::new(),
        )
        .await;
    assert!(matches!(
        result,
        Err(EventStoreError::ConcurrencyConflict { .. })
    ));
}

#[tokio::test]
async fn stream_all_events_in_commit_order() {
    use futures_util::StreamExt;

    let store = get_test_store().await;
    let a = AggregateId::new();
    let b = AggregateId::new();

    store
        .append(
            vec![create_test_event(a, "Wallet", Version::first(), "First")],
            AppendOptions::new(),
        )
        .await
        .unwrap();
    store
        .append(
            vec![create_test_event(b, "Cart", Version::first(), "Second")],
            AppendOptions::new(),
        )
        .await
        .unwrap();

    let stream = store.stream_all_events().await.unwrap();
    let types: Vec<String> = stream
        .map(|e| e.unwrap().event_type)
        .collect()
        .await;
    assert_eq!(types, vec!["First", "Second"]);
}

#[tokio::test]
async fn concurrent_appends_only_extend_the_log() {
    use futures_util::StreamExt;

    let store = get_test_store().await;
    let writers: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                let cart = AggregateId::new();
                for v in 1..=10 {
                    store
                        .append(
                            vec![create_test_event(cart, "Cart", Version::new(v), "ItemAdded")],
                            AppendOptions::new(),
                        )
                        .await
                        .unwrap();
                }
            })
        })
        .collect();

    // A reader resuming by count relies on every earlier read being a prefix
    // of every later one.
    let mut seen: Vec<uuid::Uuid> = Vec::new();
    loop {
        let done = writers.iter().all(|w| w.is_finished());
        let ids: Vec<uuid::Uuid> = store
            .stream_all_events()
            .await
            .unwrap()
            .map(|e| e.unwrap().event_id.as_uuid())
            .collect()
            .await;
        assert!(ids.len() >= seen.len());
        assert_eq!(&ids[..seen.len()], &seen[..]);
        seen = ids;
        if done {
            break;
        }
        tokio::task::yield_now().await;
    }

    for writer in writers {
        writer.await.unwrap();
    }
    assert_eq!(seen.len(), 80);
}

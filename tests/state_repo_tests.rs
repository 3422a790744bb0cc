// SqliteStateStore tests: init, cold start, overwrite, latest lookups, bad blobs

use netrate::db;
use netrate::error::StoreError;
use netrate::models::*;
use netrate::state_repo::{SqliteStateStore, StateStore};
use tempfile::TempDir;

async fn store(dir: &TempDir) -> (SqliteStateStore, sqlx::SqlitePool) {
    let path = dir.path().join("state.db");
    let pool = db::connect(path.to_str().unwrap(), 2).await.unwrap();
    let store = SqliteStateStore::new(pool.clone());
    store.init().await.unwrap();
    (store, pool)
}

#[tokio::test]
async fn state_store_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (store, _pool) = store(&dir).await;
    store.init().await.unwrap();
}

#[tokio::test]
async fn get_previous_absent_on_cold_start() {
    let dir = TempDir::new().unwrap();
    let (store, _pool) = store(&dir).await;
    for group in Group::ALL {
        assert!(store.get_previous(group).await.unwrap().is_none());
    }
    assert!(store.get_latest_stat().await.unwrap().is_none());
}

#[tokio::test]
async fn set_previous_overwrites_wholesale() {
    let dir = TempDir::new().unwrap();
    let (store, _pool) = store(&dir).await;

    let first = CounterSet::Packet(PacketCounters {
        pkt_v4_in: 1.0,
        pkt_v6_in: 2.0,
        pkt_v4_out: 3.0,
        pkt_v6_out: 4.0,
    });
    let second = CounterSet::Packet(PacketCounters {
        pkt_v4_in: 10.0,
        ..PacketCounters::ZERO
    });
    store.set_previous(&first).await.unwrap();
    assert_eq!(store.get_previous(Group::Packet).await.unwrap(), Some(first));
    store.set_previous(&second).await.unwrap();
    assert_eq!(store.get_previous(Group::Packet).await.unwrap(), Some(second));

    // previous and latest are separate keys
    assert!(store.get_latest_rate(Group::Packet).await.unwrap().is_none());
    assert!(store.get_previous(Group::Flow).await.unwrap().is_none());
}

#[tokio::test]
async fn latest_rate_and_stat_lookups() {
    let dir = TempDir::new().unwrap();
    let (store, _pool) = store(&dir).await;

    let rates = CounterSet::Login(LoginCounters {
        login_pure_v4: -1.5,
        ..LoginCounters::ZERO
    });
    let stat = StatRecord {
        active_pure_v4: 10.0,
        active_pure_v6: 5.0,
        active_dual_stacks: 3.0,
        active_ip_all: 21.0,
        ..Default::default()
    };
    store.set_latest_rate(&rates).await.unwrap();
    store.set_latest_stat(&stat).await.unwrap();

    assert_eq!(store.get_latest_rate(Group::Login).await.unwrap(), Some(rates));
    assert_eq!(store.get_latest_stat().await.unwrap(), Some(stat));
}

#[tokio::test]
async fn foreign_blob_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let (store, pool) = store(&dir).await;

    sqlx::query("INSERT INTO collector_state (key, updated_at, data) VALUES ($1, 0, $2)")
        .bind("flow-old")
        .bind(br#"{"v4":1}"#.to_vec())
        .execute(&pool)
        .await
        .unwrap();

    let err = store.get_previous(Group::Flow).await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "flow-old"));
}

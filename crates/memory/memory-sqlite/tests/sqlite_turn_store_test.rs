//! Integration tests for [`memory_sqlite::SqliteTurnStore`].
//!
//! Covers quoting round-trip, recency order, nearest-neighbour order and
//! persistence across reopen using temporary database files.

use memory_core::{NewTurn, TurnRole, TurnStore};
use memory_sqlite::SqliteTurnStore;
use tempfile::TempDir;

async fn open_temp_store(dir: &TempDir) -> SqliteTurnStore {
    let path = dir.path().join("memory.db");
    SqliteTurnStore::new(path.to_str().unwrap())
        .await
        .expect("Failed to open store")
}

/// **Test: Content with quotes and SQL-looking text round-trips exactly.**
#[tokio::test]
async fn test_quoted_content_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_temp_store(&dir).await;

    let content = "It's O'Brien's house'); DROP TABLE conversation_memory; --";
    store
        .insert(NewTurn::new(TurnRole::User, content))
        .await
        .unwrap();

    let recent = store.query_recent(1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].content, content);
    assert_eq!(store.count().await.unwrap(), 1);
}

/// **Test: A turn is visible to the very next query on a file-backed pool.**
///
/// Setup: fresh file store per iteration, so the pool hands out new connections.
/// Action: insert, then immediately query_recent(1) and count.
/// Expected: the inserted turn every time.
#[tokio::test]
async fn test_insert_visible_to_next_query() {
    for i in 0..100 {
        let dir = TempDir::new().unwrap();
        let store = open_temp_store(&dir).await;
        let content = format!("turn {}", i);
        store
            .insert(NewTurn::new(TurnRole::User, content.clone()))
            .await
            .unwrap();

        let recent = store.query_recent(1).await.unwrap();
        assert_eq!(recent.len(), 1, "turn {} not visible", i);
        assert_eq!(recent[0].content, content);
        store.close().await;
    }
}

/// **Test: Alternating inserts and reads on one file store never lose a turn.**
#[tokio::test]
async fn test_interleaved_inserts_and_reads() {
    let dir = TempDir::new().unwrap();
    let store = open_temp_store(&dir).await;
    for i in 0..100 {
        let role = if i % 2 == 0 { TurnRole::User } else { TurnRole::Agent };
        store.insert(NewTurn::new(role, format!("m{}", i))).await.unwrap();
        let recent = store.query_recent(2).await.unwrap();
        assert_eq!(recent[0].content, format!("m{}", i));
        assert_eq!(store.count().await.unwrap(), i + 1);
    }
}

/// **Test: Empty content is accepted and returned as empty.**
#[tokio::test]
async fn test_empty_content() {
    let store = SqliteTurnStore::in_memory().await.unwrap();
    store.insert(NewTurn::new(TurnRole::Agent, "")).await.unwrap();
    let recent = store.query_recent(1).await.unwrap();
    assert_eq!(recent[0].content, "");
    assert_eq!(recent[0].role, TurnRole::Agent);
}

/// **Test: query_recent returns the newest turns first and honours the limit.**
#[tokio::test]
async fn test_query_recent_newest_first() {
    let store = SqliteTurnStore::in_memory().await.unwrap();
    for i in 0..5 {
        store
            .insert(NewTurn::new(TurnRole::User, format!("turn {}", i)))
            .await
            .unwrap();
    }

    let recent = store.query_recent(3).await.unwrap();
    let contents: Vec<&str> = recent.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["turn 4", "turn 3", "turn 2"]);

    for pair in recent.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
        assert!(pair[0].seq > pair[1].seq);
    }
}

/// **Test: query_nearest orders by ascending L2 distance and skips turns without vectors.**
#[tokio::test]
async fn test_query_nearest_orders_by_distance() {
    let store = SqliteTurnStore::in_memory().await.unwrap();
    store
        .insert(NewTurn::new(TurnRole::User, "far").with_embedding(vec![4.0, 0.0]))
        .await
        .unwrap();
    store
        .insert(NewTurn::new(TurnRole::User, "plain"))
        .await
        .unwrap();
    store
        .insert(NewTurn::new(TurnRole::Agent, "close").with_embedding(vec![0.6, 0.8]))
        .await
        .unwrap();
    store
        .insert(NewTurn::new(TurnRole::User, "mid").with_embedding(vec![2.0, 0.0]))
        .await
        .unwrap();

    let results = store.query_nearest(&[0.0, 0.0], 10).await.unwrap();
    let contents: Vec<&str> = results.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(contents, vec!["close", "mid", "far"]);
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert!((results[2].score - 4.0).abs() < 1e-6);

    let top = store.query_nearest(&[0.0, 0.0], 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].content, "close");
}

/// **Test: Turns and embeddings survive closing and reopening the file.**
#[tokio::test]
async fn test_reopen_keeps_turns() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_temp_store(&dir).await;
        store
            .insert(NewTurn::new(TurnRole::User, "persisted").with_embedding(vec![1.0, 2.0, 3.0]))
            .await
            .unwrap();
        store.close().await;
    }

    let store = open_temp_store(&dir).await;
    let recent = store.query_recent(5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].embedding, Some(vec![1.0, 2.0, 3.0]));

    let next = store
        .insert(NewTurn::new(TurnRole::Agent, "after reopen"))
        .await
        .unwrap();
    assert!(next.seq > recent[0].seq);
    assert!(next.created_at >= recent[0].created_at);
}

/// **Test: A limit beyond i64 range still means "at most that many", not "no limit" or an error.**
#[tokio::test]
async fn test_query_recent_huge_limit() {
    let store = SqliteTurnStore::in_memory().await.unwrap();
    for content in ["a", "b", "c"] {
        store.insert(NewTurn::new(TurnRole::User, content)).await.unwrap();
    }
    let recent = store.query_recent(usize::MAX).await.unwrap();
    let contents: Vec<&str> = recent.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["c", "b", "a"]);
}

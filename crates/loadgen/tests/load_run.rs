//! End-to-end load runs against the real shardlite application.

use std::{net::SocketAddr, sync::Arc};

use shardlite::{create_app, AppState, ShardConfig, ShardManager};
use shardlite_loadgen::{run, LoadClient, LoadConfig};
use tokio::net::TcpListener;

async fn spawn_server(dir: &tempfile::TempDir, num_shards: usize) -> (SocketAddr, Arc<ShardManager>) {
    let manager = Arc::new(
        ShardManager::open(&ShardConfig::new(num_shards, dir.path()))
            .await
            .unwrap(),
    );
    let app = create_app(AppState::new(manager.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, manager)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_run_has_no_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, manager) = spawn_server(&dir, 3).await;

    let client = LoadClient::new(format!("http://{addr}"), 8).unwrap();
    let config = LoadConfig {
        ops: 200,
        concurrency: 8,
        write_ratio: 0.5,
        payload_size: 64,
    };

    let summary = run(client, &config).await.unwrap();

    assert_eq!(summary.ops(), 200);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.writes + summary.reads, 200);

    manager.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_writes_land_in_shards() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, manager) = spawn_server(&dir, 2).await;

    let client = LoadClient::new(format!("http://{addr}"), 4).unwrap();
    let config = LoadConfig {
        ops: 50,
        concurrency: 4,
        write_ratio: 1.0,
        payload_size: 512,
    };

    let summary = run(client, &config).await.unwrap();
    assert_eq!(summary.writes, 50);
    assert_eq!(summary.reads, 0);

    // Every id is drawn from 1..=50, so at least one of them exists now.
    let mut found = 0;
    for id in 1..=50 {
        if let Ok(user) = manager.get_user(id).await {
            assert_eq!(user.username, format!("u{id}"));
            assert_eq!(user.payload, "x".repeat(512));
            found += 1;
        }
    }
    assert!(found > 0);

    manager.close().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_target_counts_errors() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let client = LoadClient::new(format!("http://{addr}"), 2).unwrap();
    let config = LoadConfig {
        ops: 10,
        concurrency: 2,
        write_ratio: 0.5,
        payload_size: 8,
    };

    let summary = run(client, &config).await.unwrap();

    assert_eq!(summary.errors, 10);
    assert_eq!(summary.writes + summary.reads, 0);
}

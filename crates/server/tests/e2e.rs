use std::net::SocketAddr;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    data_file: std::path::PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let mut cfg = AppConfig::default();
    cfg.storage.data_file = std::env::temp_dir()
        .join(format!("issues_e2e_{}", Uuid::new_v4()))
        .join("issues.json");
    cfg.normalize_and_validate()?;

    let app = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_file: cfg.storage.data_file })
}

#[tokio::test]
async fn e2e_issue_lifecycle_persists_to_disk() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["status"], "ok");

    let res = c.post(format!("{}/issues", app.base_url))
        .json(&json!({"title": "Fix login", "priority": "high", "assignee": "dana"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["id"], 1);

    let res = c.put(format!("{}/issues/1", app.base_url))
        .json(&json!({"status": "in_progress"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    // the document on disk carries both the record and the counter
    let doc: Value = serde_json::from_slice(&tokio::fs::read(&app.data_file).await?)?;
    assert_eq!(doc["next_id"], 2);
    assert_eq!(doc["issues"][0]["status"], "in_progress");
    assert_eq!(doc["issues"][0]["assignee"], "dana");

    let res = c.delete(format!("{}/issues/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "deleted", "id": 1}));

    let res = c.get(format!("{}/issues/1", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let doc: Value = serde_json::from_slice(&tokio::fs::read(&app.data_file).await?)?;
    assert_eq!(doc["issues"], json!([]));
    assert_eq!(doc["next_id"], 2);

    if let Some(dir) = app.data_file.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
    Ok(())
}

#[tokio::test]
async fn e2e_concurrent_creates_keep_ids_unique() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let mut handles = Vec::new();
    for n in 0..10 {
        let c = c.clone();
        let url = format!("{}/issues", app.base_url);
        handles.push(tokio::spawn(async move {
            c.post(url).json(&json!({"title": format!("parallel {n}")})).send().await?.json::<Value>().await
        }));
    }
    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.await??["id"].as_u64().unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());

    let res = c.get(format!("{}/issues?pageSize=3&sortBy=id&sortDir=asc", app.base_url)).send().await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["total"], 10);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["items"][0]["id"], 1);

    if let Some(dir) = app.data_file.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
    Ok(())
}

//! End-to-end REST tests: spin the server up on a random port and drive the
//! full register → login → generate → CRUD → export flow over HTTP.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use synthd::config::SynthdConfig;
use synthd::{rest, AppContext};

/// Find a free local port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Start a server over a temp data dir; returns its base URL.
async fn spawn_server(dir: &TempDir) -> String {
    let mut config = SynthdConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.port = find_free_port();
    config.jwt_secret = "integration-test-secret".to_string();
    let base = format!("http://127.0.0.1:{}", config.port);

    let ctx = Arc::new(AppContext::new(config).await.unwrap());
    tokio::spawn(async move {
        let _ = rest::start_rest_server(ctx).await;
    });

    // Wait until the health endpoint answers.
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base}/api/v1/health")).send().await {
            if resp.status().is_success() {
                return base;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not come up on {base}");
}

async fn register_and_login(client: &reqwest::Client, base: &str) -> String {
    let resp = client
        .post(format!("{base}/api/v1/auth/register"))
        .json(&json!({
            "username": "jane",
            "email": "jane@example.com",
            "password": "hunter22",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{base}/api/v1/auth/login"))
        .json(&json!({ "email": "jane@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(&dir).await;
    let body: Value = reqwest::get(format!("{base}/api/v1/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_ok"], true);
}

#[tokio::test]
async fn auth_flow_rejects_bad_credentials_and_duplicates() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(&dir).await;
    let client = reqwest::Client::new();

    let _token = register_and_login(&client, &base).await;

    // Same username again → conflict.
    let resp = client
        .post(format!("{base}/api/v1/auth/register"))
        .json(&json!({
            "username": "jane",
            "email": "second@example.com",
            "password": "hunter22",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // Wrong password → unauthorized, same message as unknown user.
    let resp = client
        .post(format!("{base}/api/v1/auth/login"))
        .json(&json!({ "email": "jane@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Short password rejected up front.
    let resp = client
        .post(format!("{base}/api/v1/auth/register"))
        .json(&json!({
            "username": "other",
            "email": "other@example.com",
            "password": "tiny",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(&dir).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/v1/datasets"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{base}/api/v1/data/generate"))
        .header("Authorization", "Bearer not-a-real-token")
        .json(&json!({ "name": "x", "prompt": "customer records with name", "count": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn generate_validates_its_inputs() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(&dir).await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base).await;

    // Prompt below the 10-character minimum.
    let resp = client
        .post(format!("{base}/api/v1/data/generate"))
        .bearer_auth(&token)
        .json(&json!({ "name": "short", "prompt": "too short", "count": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Count outside 1..=1000.
    for count in [0, 1001] {
        let resp = client
            .post(format!("{base}/api/v1/data/generate"))
            .bearer_auth(&token)
            .json(&json!({
                "name": "bad count",
                "prompt": "customer records with name and email",
                "count": count,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "count {count} should be rejected");
    }
}

#[tokio::test]
async fn full_dataset_lifecycle() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(&dir).await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base).await;

    // Generate.
    let resp = client
        .post(format!("{base}/api/v1/data/generate"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Customers",
            "prompt": "Generate customer records with name, email address, and age",
            "count": 5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let dataset: Value = resp.json().await.unwrap();
    let dataset_id = dataset["id"].as_str().unwrap().to_string();

    let fields: Vec<&str> = dataset["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["id", "name", "email", "age"]);

    let data = dataset["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    for (i, record) in data.iter().enumerate() {
        assert_eq!(record["id"].as_i64().unwrap(), i as i64 + 1);
        let age = record["age"].as_i64().unwrap();
        assert!((18..=80).contains(&age));
        assert!(record["email"].as_str().unwrap().contains('@'));
    }

    // List.
    let body: Value = client
        .get(format!("{base}/api/v1/datasets"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let datasets = body["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0]["count"].as_i64().unwrap(), 5);
    // Summaries carry no row payload.
    assert!(datasets[0].get("data").is_none());

    // Get.
    let fetched: Value = client
        .get(format!("{base}/api/v1/datasets/{dataset_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["data"], dataset["data"]);

    // Update one cell and save the edited rows back.
    let mut edited = fetched["data"].as_array().unwrap().clone();
    edited[0]["name"] = json!("Edited Name");
    let resp = client
        .put(format!("{base}/api/v1/datasets/{dataset_id}"))
        .bearer_auth(&token)
        .json(&json!({ "data": edited }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let fetched: Value = client
        .get(format!("{base}/api/v1/datasets/{dataset_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["data"][0]["name"], "Edited Name");

    // Export JSON: parses back to the stored rows.
    let resp = client
        .get(format!("{base}/api/v1/datasets/{dataset_id}/export?format=json"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Customers.json"));
    let exported: Vec<Value> = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(exported.len(), 5);
    assert_eq!(exported[0]["name"], "Edited Name");

    // Export CSV: header follows the field order.
    let resp = client
        .get(format!("{base}/api/v1/datasets/{dataset_id}/export?format=csv"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let csv_text = resp.text().await.unwrap();
    assert_eq!(csv_text.lines().next().unwrap(), "id,name,email,age");
    assert_eq!(csv_text.lines().count(), 6);

    // Unsupported format.
    let resp = client
        .get(format!("{base}/api/v1/datasets/{dataset_id}/export?format=xml"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Delete, then the dataset is gone.
    let resp = client
        .delete(format!("{base}/api/v1/datasets/{dataset_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = client
        .get(format!("{base}/api/v1/datasets/{dataset_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn explicit_fields_override_prompt_inference() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(&dir).await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base).await;

    let resp = client
        .post(format!("{base}/api/v1/data/generate"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Products",
            "prompt": "a catalog of products for an online store",
            "count": 3,
            "fields": ["sku", "price", "category"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let dataset: Value = resp.json().await.unwrap();
    let fields: Vec<&str> = dataset["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["id", "sku", "price", "category"]);
}

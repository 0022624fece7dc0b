//! Integration tests for the geniusmind CLI.

use axum::{Json, Router, extract::Path, routing::get, routing::post};
use serde_json::{Value, json};
use std::process::Command;

/// Get the path to the geniusmind binary.
fn geniusmind_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_geniusmind"))
}

/// Write an empty config so the user's own file is never read.
fn empty_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();
    path
}

#[test]
fn test_help_flag() {
    let output = geniusmind_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("geniusmind"));
    assert!(stdout.contains("stock recommendations"));
    assert!(stdout.contains("--server"));
    assert!(stdout.contains("--ask"));
    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("--layout"));
    assert!(stdout.contains("GENIUSMIND_SERVER"));
}

#[test]
fn test_version_flag() {
    let output = geniusmind_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("geniusmind"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_details_requires_ask() {
    let output = geniusmind_bin()
        .arg("--details")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_invalid_mode() {
    let output = geniusmind_bin()
        .args(["--ask", "tech", "--mode", "fancy"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_init_config_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let output = geniusmind_bin()
        .arg("--init-config")
        .arg("-c")
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("base_url"));
    assert!(written.contains("/api/get_stock_recommendation"));
}

#[test]
fn test_unreachable_server_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(&dir);

    let output = geniusmind_bin()
        .args(["--server", "http://127.0.0.1:9", "--timeout", "2", "--ask", "tech"])
        .arg("-c")
        .arg(&config)
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not get recommendations"));
    assert!(!stderr.contains("panicked"));
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route(
            "/api/get_stock_recommendation",
            post(|Json(body): Json<Value>| async move {
                if body["query"] == "penny stocks" {
                    return Json(json!([
                        {"ticker": "SYSTEM", "company_name": "No Stocks Found", "reason": "Try a broader request."},
                        {"ticker": "KO", "company_name": "Coca-Cola", "reason": "Steady payer"}
                    ]));
                }
                assert_eq!(body["query"], "dividend stocks");
                Json(json!([
                    {"ticker": "KO", "company_name": "Coca-Cola", "reason": "Steady payer"},
                    {"ticker": "PEP", "company_name": "PepsiCo", "reason": "Raised for 50 years"}
                ]))
            }),
        )
        .route(
            "/api/get_stock_details/{symbol}",
            get(|Path(symbol): Path<String>| async move {
                Json(json!({"symbol": symbol, "companyName": format!("{symbol} Corp"), "mktCap": 2.5e11}))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_json_export() {
    let server = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(&dir);

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_geniusmind"))
        .args(["--server", &server, "--ask", "dividend stocks", "--export", "json"])
        .arg("-c")
        .arg(&config)
        .output()
        .await
        .expect("Failed to execute command");

    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["symbol"], "KO");
    assert_eq!(parsed[1]["companyName"], "PepsiCo");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_with_simple_details() {
    let server = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(&dir);

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_geniusmind"))
        .args(["--server", &server, "--ask", "dividend stocks", "--details"])
        .args(["--mode", "simple"])
        .arg("-c")
        .arg(&config)
        .output()
        .await
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Steady payer"));
    assert!(stdout.contains("KO Corp (KO)"));
    assert!(stdout.contains("250.00B"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_details_skip_stocks_behind_system_notice() {
    let server = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let config = empty_config(&dir);

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_geniusmind"))
        .args(["--server", &server, "--ask", "penny stocks", "--details"])
        .args(["--mode", "simple"])
        .arg("-c")
        .arg(&config)
        .output()
        .await
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[No Stocks Found] Try a broader request."));
    assert!(!stdout.contains("KO Corp"));
    assert!(!stdout.contains("Steady payer"));
}

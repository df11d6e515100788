//! Maintenance content served from a file on disk.

use axum::http::StatusCode;
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use maintenance_warden::{Warden, WardenConfig, WardenError};

mod common;
use common::{gated_app, request, send};

fn file_config(path: &Path) -> WardenConfig {
    WardenConfig {
        maintenance_file_path: path.to_string_lossy().into_owned(),
        ..WardenConfig::default()
    }
}

fn bump_mtime(path: &Path, by: Duration) {
    let current = fs::metadata(path).unwrap().modified().unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(current + by)
        .unwrap();
}

#[tokio::test]
async fn test_serves_file_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maintenance.html");
    fs::write(&path, "<h1>From file</h1>").unwrap();
    let app = gated_app(file_config(&path));

    let (res, body) = send(&app, request("/", &[])).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "<h1>From file</h1>");
    assert_eq!(res.headers()["x-maintenance-mode"], "true");

    let (res, body) = send(&app, request("/", &[("X-Maintenance-Bypass", "true")])).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body, common::BACKEND_BODY);
}

#[tokio::test]
async fn test_picks_up_modified_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maintenance.html");
    fs::write(&path, "<h1>Version 1</h1>").unwrap();
    let app = gated_app(file_config(&path));

    let (_, body) = send(&app, request("/", &[])).await;
    assert_eq!(body, "<h1>Version 1</h1>");

    fs::write(&path, "<h1>Version 2</h1>").unwrap();
    bump_mtime(&path, Duration::from_secs(10));

    let (res, body) = send(&app, request("/", &[])).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "<h1>Version 2</h1>");
}

#[tokio::test]
async fn test_file_removed_after_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maintenance.html");
    fs::write(&path, "<h1>Soon gone</h1>").unwrap();
    let app = gated_app(file_config(&path));

    fs::remove_file(&path).unwrap();

    let (res, body) = send(&app, request("/", &[])).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Service temporarily unavailable");
}

#[tokio::test]
async fn test_file_emptied_after_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maintenance.html");
    fs::write(&path, "<h1>Content</h1>").unwrap();
    let app = gated_app(file_config(&path));

    fs::write(&path, "").unwrap();
    bump_mtime(&path, Duration::from_secs(10));

    let (res, body) = send(&app, request("/", &[])).await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Service temporarily unavailable");
}

#[test]
fn test_construction_rejects_bad_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.html");
    assert!(matches!(
        Warden::new(&file_config(&missing)),
        Err(WardenError::File(_))
    ));

    let empty = dir.path().join("empty.html");
    fs::write(&empty, "").unwrap();
    assert!(matches!(
        Warden::new(&file_config(&empty)),
        Err(WardenError::File(_))
    ));
}

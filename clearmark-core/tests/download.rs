//! Download tests against a local axum server.

use std::path::Path;

use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use clearmark_core::{download_all, download_file, CoreError};
use tempfile::tempdir;

async fn serve() -> String {
    let app = Router::new()
        .route(
            "/video",
            get(|| async { ([(header::CONTENT_TYPE, "video/mp4")], vec![1u8, 2, 3]) }),
        )
        .route(
            "/media/still.png",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    "png-bytes",
                )
            }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

#[tokio::test]
async fn two_urls_become_two_independent_files() {
    let base = serve().await;
    let dir = tempdir().unwrap();
    let client = reqwest::Client::new();
    let urls = vec![format!("{base}/video"), format!("{base}/media/still.png")];

    let results = download_all(&client, &urls, dir.path(), 4).await.unwrap();
    assert_eq!(results.len(), 2);

    let first = results[0].as_ref().unwrap();
    let second = results[1].as_ref().unwrap();
    assert_ne!(first, second);
    assert!(file_name(first).starts_with("media-"));
    assert!(file_name(first).ends_with("-1.mp4"));
    assert!(file_name(second).ends_with("-2.png"));
    assert_eq!(std::fs::read(first).unwrap(), vec![1u8, 2, 3]);
    assert_eq!(std::fs::read(second).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn failed_download_is_isolated() {
    let base = serve().await;
    let dir = tempdir().unwrap();
    let client = reqwest::Client::new();
    let urls = vec![format!("{base}/missing"), format!("{base}/video")];

    let results = download_all(&client, &urls, dir.path(), 0).await.unwrap();
    assert!(matches!(results[0], Err(CoreError::Download(_))));
    assert!(results[1].is_ok());
}

#[tokio::test]
async fn download_file_creates_directory() {
    let base = serve().await;
    let dir = tempdir().unwrap();
    let target = dir.path().join("input");
    let client = reqwest::Client::new();

    let path = download_file(&client, &format!("{base}/video"), &target, "media-7")
        .await
        .unwrap();
    assert_eq!(path, target.join("media-7.mp4"));
}

#[tokio::test]
async fn invalid_url_is_a_download_error() {
    let dir = tempdir().unwrap();
    let client = reqwest::Client::new();
    let err = download_file(&client, "not a url", dir.path(), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Download(_)));
}

#[tokio::test]
async fn batch_runs_on_a_spawned_task() {
    let base = serve().await;
    let dir = tempdir().unwrap();
    let target = dir.path().join("incoming");
    let urls = vec![format!("{base}/video"), format!("{base}/missing")];

    let handle = tokio::spawn(async move {
        let client = reqwest::Client::new();
        download_all(&client, &urls, &target, 0).await
    });
    let results = handle.await.unwrap().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

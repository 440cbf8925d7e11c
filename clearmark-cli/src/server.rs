// clearmark-cli/src/server.rs
//
// HTTP ingestion endpoint. A request names media URLs; they are downloaded
// and run through the pipeline in the background after the response is
// sent. Downstream failures are only logged.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clearmark_core::discovery::is_valid_video_file;
use clearmark_core::external::{SidecarSpawner, StdCommandRunner};
use clearmark_core::{download_all, process_videos, CoreConfig};
use log::{error, info, warn};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Receives validated URL lists from the HTTP layer.
///
/// `submit` must return quickly: errors it returns become a `500`, while work
/// it starts in the background is reported only through the log.
pub trait IngestTrigger: Send + Sync {
    fn submit(&self, urls: Vec<String>) -> anyhow::Result<()>;
}

pub type SharedTrigger = Arc<dyn IngestTrigger>;

/// Builds the router for the ingestion API.
pub fn router(trigger: SharedTrigger) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/process-media", post(process_media))
        .with_state(trigger)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "Up and Running" }))
}

async fn process_media(
    State(trigger): State<SharedTrigger>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let urls = match body {
        Ok(Json(value)) => parse_media_urls(&value),
        Err(rejection) => Err(format!("Request body must be JSON: {}", rejection.body_text())),
    };
    let urls = match urls {
        Ok(urls) => urls,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let count = urls.len();
    match trigger.submit(urls) {
        Ok(()) => {
            info!("Accepted {count} media URL(s) for processing");
            (
                StatusCode::OK,
                Json(json!({
                    "message": format!("Accepted {count} media URL(s); processing has started")
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start processing: {e:#}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start processing: {e:#}"),
            )
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Extracts the `mediaUrl` array. Every element must be a string and the
/// array must not be empty.
pub fn parse_media_urls(body: &Value) -> Result<Vec<String>, String> {
    let field = body
        .get("mediaUrl")
        .ok_or_else(|| "Missing field 'mediaUrl'".to_string())?;
    let items = field
        .as_array()
        .ok_or_else(|| "'mediaUrl' must be an array of strings".to_string())?;
    if items.is_empty() {
        return Err("'mediaUrl' must contain at least one URL".to_string());
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("'mediaUrl[{i}]' must be a string"))
        })
        .collect()
}

/// Downloads into the configured directory, then runs the pipeline over the
/// downloaded videos.
pub struct PipelineIngest {
    config: Arc<CoreConfig>,
    client: reqwest::Client,
}

impl PipelineIngest {
    pub fn new(config: CoreConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("clearmark/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

impl IngestTrigger for PipelineIngest {
    fn submit(&self, urls: Vec<String>) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.config.download_dir).map_err(|e| {
            anyhow::anyhow!(
                "cannot create download directory '{}': {e}",
                self.config.download_dir.display()
            )
        })?;
        let config = Arc::clone(&self.config);
        let client = self.client.clone();
        tokio::spawn(run_ingest(client, config, urls));
        Ok(())
    }
}

async fn run_ingest(client: reqwest::Client, config: Arc<CoreConfig>, urls: Vec<String>) {
    let results = match download_all(
        &client,
        &urls,
        &config.download_dir,
        config.download_concurrency,
    )
    .await
    {
        Ok(results) => results,
        Err(e) => {
            error!("Download batch failed: {e}");
            return;
        }
    };

    let files: Vec<PathBuf> = results
        .into_iter()
        .filter_map(Result::ok)
        .filter(|path| {
            let video = is_valid_video_file(path);
            if !video {
                warn!("Skipping '{}': not a video", path.display());
            }
            video
        })
        .collect();
    if files.is_empty() {
        warn!("No downloaded videos to process");
        return;
    }

    let outcome = tokio::task::spawn_blocking(move || {
        process_videos(&SidecarSpawner, &StdCommandRunner, &config, &files)
    })
    .await;
    match outcome {
        Ok(Ok(report)) => info!(
            "Background batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        ),
        Ok(Err(e)) => error!("Background batch failed: {e}"),
        Err(e) => error!("Background batch panicked or was cancelled: {e}"),
    }
}

// clearmark-cli/src/commands/serve.rs
//
// Implementation of the `serve` command: resolves configuration, then runs
// the axum ingestion server on a tokio runtime until interrupted.

use anyhow::Context;
use clearmark_core::external::check_dependency;
use clearmark_core::CoreConfig;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::ServeArgs;
use crate::config::{apply_eraser_args, apply_pipeline_args, load_base_config};
use crate::server::{router, PipelineIngest};

pub fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_base_config(&args.config)?;
    let config = apply_eraser_args(config, &args.eraser);
    let mut config = apply_pipeline_args(config, &args.pipeline);
    config.output_dir = args.output_dir;
    if let Some(dir) = args.download_dir {
        config.download_dir = dir;
    }
    if let Some(limit) = args.download_concurrency {
        config.download_concurrency = limit;
    }
    config.input_dir = config.download_dir.clone();
    config.validate()?;

    check_dependency("ffmpeg")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(serve(args.addr, config))
}

async fn serve(addr: SocketAddr, config: CoreConfig) -> anyhow::Result<()> {
    info!(
        "Downloads go to '{}', results to '{}'",
        config.download_dir.display(),
        config.output_dir.display()
    );
    let app = router(Arc::new(PipelineIngest::new(config)?));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

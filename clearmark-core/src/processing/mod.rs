//! Frame processing and batch orchestration.
//!
//! The pipeline drives ffmpeg to split each video into frames, hands the frame
//! folder to the walker, which calls the eraser on every frame, then drives
//! ffmpeg again to rebuild the video and restore its audio.

/// Per-frame watermark erasure
pub mod eraser;

/// Iterative frame folder traversal
pub mod walker;

/// Batch orchestration over input videos
pub mod pipeline;

pub use eraser::{EraseOutcome, FrameEraser, WatermarkEraser};
pub use pipeline::{process_videos, BatchReport, VideoReport, VideoStage};
pub use walker::{walk, WalkOptions, WalkSummary};

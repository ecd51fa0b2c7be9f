//! Framestamp Demo - counter-stamping pipeline
//!
//! Builds the demonstration pipeline (test source → embed identity →
//! text overlay → extract identity → sink), stamps every frame with a
//! monotonically increasing counter at the embed point, and reads it
//! back at the extract point to confirm lossless propagation.
//!
//! # Usage
//!
//! ```bash
//! # Stream 150 frames and exit on end-of-stream
//! framestamp-demo
//!
//! # Stream 10 frames
//! framestamp-demo --frames 10
//!
//! # Run a custom pipeline manifest
//! framestamp-demo --manifest ./pipeline.json
//! ```
//!
//! Exits 0 on end-of-stream, non-zero on construction or runtime
//! errors.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use framestamp_core::nodes::ElementRegistry;
use framestamp_core::pipeline::{PipelineController, EMBED_POINT, EXTRACT_POINT, RENDER_POINT};

/// Framestamp Demo - stamp and read back per-frame counters
#[derive(Parser)]
#[command(name = "framestamp-demo")]
#[command(author, version)]
#[command(about = "Run the counter-stamping demonstration pipeline")]
struct Args {
    /// Number of frames to stream (0 = unbounded)
    #[arg(short, long, default_value_t = 150)]
    frames: u64,

    /// Frame width in pixels
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Path to a pipeline manifest (overrides the built-in pipeline)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The built-in source-to-sink graph, embed before overlay before
/// extract.
fn default_manifest(frames: u64, width: u32, height: u32) -> String {
    let num_buffers = (frames > 0).then_some(frames);
    serde_json::json!({
        "version": "v1",
        "metadata": {
            "name": "counter-demo",
            "description": "Per-frame counter provenance demonstration"
        },
        "nodes": [
            { "id": "src", "node_type": "TestSource",
              "params": { "num-buffers": num_buffers, "width": width, "height": height } },
            { "id": EMBED_POINT, "node_type": "Identity" },
            { "id": RENDER_POINT, "node_type": "TextOverlay" },
            { "id": EXTRACT_POINT, "node_type": "Identity" },
            { "id": "sink", "node_type": "AutoSink" }
        ]
    })
    .to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let manifest = match &args.manifest {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?,
        None => default_manifest(args.frames, args.width, args.height),
    };

    tracing::debug!(frames = args.frames, "starting demo pipeline");

    let mut controller = PipelineController::new(ElementRegistry::with_builtins());
    controller.run(&manifest).await?;
    Ok(())
}

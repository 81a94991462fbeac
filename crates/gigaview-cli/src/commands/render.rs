use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gigaview_core::compose::compose_session;

use super::view::{open_view, ViewArgs};

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output PNG path
    #[arg(short, long, default_value = "view.png")]
    pub output: PathBuf,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let (mut session, reporter) = open_view(&args.view)?;
    session.flush();
    let frames = session.displayed_frames().len();
    let image = compose_session(&session);
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    let view = session.view();
    drop(session);
    let _ = reporter.join();

    println!(
        "Rendered {}x{} view ({} frame(s), zoom level {}) to {}",
        view.viewport_width,
        view.viewport_height,
        frames,
        view.zoom_level,
        args.output.display()
    );
    Ok(())
}

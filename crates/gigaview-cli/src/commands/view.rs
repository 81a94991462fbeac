//! Arguments and setup shared by `plan` and `render`.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use clap::Args;
use gigaview_core::config::ViewerConfig;
use gigaview_core::events::ViewerEvent;
use gigaview_core::session::ViewerSession;
use gigaview_core::source::ImageRasterSource;
use gigaview_core::viewport::ZoomDirection;
use indicatif::{ProgressBar, ProgressStyle};
use kurbo::Point;

#[derive(Args)]
pub struct ViewArgs {
    /// Input rasters, merged onto one canvas in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Viewer config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Viewport width in pixels (overrides config)
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels (overrides config)
    #[arg(long)]
    pub height: Option<u32>,

    /// Zoom-in steps applied after fitting
    #[arg(long, default_value = "0")]
    pub zoom_in: u32,

    /// Zoom-out steps applied after zooming in
    #[arg(long, default_value = "0")]
    pub zoom_out: u32,

    /// Zoom pivot in screen pixels, "X,Y" (defaults to the viewport centre)
    #[arg(long, value_parser = parse_pair)]
    pub pivot: Option<(f64, f64)>,

    /// Pan applied last, in screen pixels, "DX,DY"
    #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
    pub pan: Option<(f64, f64)>,
}

pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    let config: ViewerConfig = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).context("Invalid viewer config")?
        }
        None => ViewerConfig::default(),
    };
    config.validate().context("Invalid viewer config")?;
    Ok(config)
}

/// Open every file into a fresh session and apply the requested gestures.
///
/// Events are reported on a background thread until the session is dropped;
/// join the returned handle after dropping it.
pub fn open_view(args: &ViewArgs) -> Result<(ViewerSession, JoinHandle<()>)> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(w) = args.width {
        config.viewport.width = w;
    }
    if let Some(h) = args.height {
        config.viewport.height = h;
    }
    let source = Arc::new(ImageRasterSource::new(config.pyramid.factors.clone()));
    let (mut session, events) = ViewerSession::new(config, source)?;
    let reporter = spawn_reporter(events);

    for file in &args.files {
        session
            .open_executed(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
    }

    let pivot = args
        .pivot
        .map(|(x, y)| Point::new(x, y))
        .unwrap_or_else(|| session.controller().viewport_center());
    for _ in 0..args.zoom_in {
        session.zoom_at(ZoomDirection::In, pivot);
    }
    for _ in 0..args.zoom_out {
        session.zoom_at(ZoomDirection::Out, pivot);
    }
    if let Some((dx, dy)) = args.pan {
        session.pan(dx, dy);
    }

    Ok((session, reporter))
}

fn spawn_reporter(events: Receiver<ViewerEvent>) -> JoinHandle<()> {
    let pb = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::default_bar().template("{msg:20} [{bar:40}] {pos}%") {
        pb.set_style(style.progress_chars("=> "));
    }
    std::thread::spawn(move || {
        for event in events {
            match event {
                ViewerEvent::Progress { percent } => {
                    pb.set_message("Building pyramid");
                    pb.set_position(u64::from(percent));
                }
                ViewerEvent::ImageOpened(summary) => {
                    pb.println(format!(
                        "Opened {} ({}, {}x{}, {} band(s), {})",
                        summary.file_name,
                        summary.file_type,
                        summary.width,
                        summary.height,
                        summary.band_count,
                        summary.data_type
                    ));
                    pb.reset();
                }
                ViewerEvent::Notice { message } => pb.println(format!("warning: {message}")),
                ViewerEvent::FrameUpdated { .. } => {}
            }
        }
        pb.finish_and_clear();
    })
}

fn parse_pair(s: &str) -> std::result::Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"X,Y\", got {s:?}"))?;
    let x = a.trim().parse::<f64>().map_err(|e| format!("{a:?}: {e}"))?;
    let y = b.trim().parse::<f64>().map_err(|e| format!("{b:?}: {e}"))?;
    Ok((x, y))
}

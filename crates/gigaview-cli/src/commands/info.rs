use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gigaview_core::source::{ImageRasterSource, RasterSource};

use super::view::load_config;

#[derive(Args)]
pub struct InfoArgs {
    /// Input raster
    pub file: PathBuf,

    /// Viewer config file (TOML); supplies the pyramid factors
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = ImageRasterSource::new(config.pyramid.factors.clone());
    let dataset = source
        .open(&args.file, &|_| {})
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let info = dataset.info();

    println!("File:        {}", info.name);
    println!("Dimensions:  {}x{}", info.pixel_width, info.pixel_height);
    println!("Bands:       {}", info.band_count);
    println!("Data type:   {}", info.data_type);
    println!("File type:   {}", info.file_type);
    match info.pixel_size {
        Some(size) => println!("Pixel size:  ({}, {})", size.width, size.height),
        None => println!("Pixel size:  -"),
    }
    match info.boundary {
        Some(ref b) => println!(
            "Footprint:   [{:.6}, {:.6}] - [{:.6}, {:.6}]",
            b.min_x(),
            b.min_y(),
            b.max_x(),
            b.max_y()
        ),
        None => println!("Footprint:   none (pixel space)"),
    }
    println!("Levels:");
    for (i, level) in info.levels.iter().enumerate() {
        println!(
            "  {:>2}  1/{:<3} {}x{}",
            i, level.factor, level.width, level.height
        );
    }

    Ok(())
}

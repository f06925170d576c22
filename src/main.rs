//! Image Resize and PDF Assembly CLI
//!
//! Command-line interface for the two tools: resizing a single image and
//! assembling an image collection into a paginated PDF.

use anyhow::Context;
use clap::{Parser, Subcommand};
use imagepress::{
    CollectionSession, ImagepressError, LayoutMode, Orientation, OutputFormat, PageSize,
    ResizeSession,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resize a single image to target dimensions, quality, and format
    Resize {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (defaults to resized-image.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target width in pixels (defaults to the source width)
        #[arg(short = 'W', long)]
        width: Option<u32>,

        /// Target height in pixels (defaults to the source height)
        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// Derive the omitted dimension from the source aspect ratio
        #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
        lock_aspect: bool,

        /// Output quality (0-100, affects jpeg output)
        #[arg(short, long, default_value = "85")]
        quality: u8,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Jpeg)]
        format: OutputFormat,
    },

    /// Assemble images into a paginated PDF, in argument order
    Pdf {
        /// Input image paths, in page order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output path (defaults to converted-images.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page format
        #[arg(long, value_enum, default_value_t = PageSize::A4)]
        page_size: PageSize,

        /// Page orientation
        #[arg(long, value_enum, default_value_t = Orientation::Portrait)]
        orientation: Orientation,

        /// Image layout mode
        #[arg(short, long, value_enum, default_value_t = LayoutMode::Fit)]
        layout: LayoutMode,

        /// JPEG quality for embedded images (0-100)
        #[arg(short, long, default_value = "90")]
        quality: u8,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Command::Resize {
            input,
            output,
            width,
            height,
            lock_aspect,
            quality,
            format,
        } => run_resize(&input, output, width, height, lock_aspect, quality, format),
        Command::Pdf {
            images,
            output,
            page_size,
            orientation,
            layout,
            quality,
        } => run_pdf(&images, output, page_size, orientation, layout, quality),
    }
}

fn run_resize(
    input: &Path,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    lock_aspect: bool,
    quality: u8,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if quality > 100 {
        return Err(ImagepressError::InvalidQuality.into());
    }

    let bytes = fs::read(input).with_context(|| format!("failed to read {input:?}"))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let mut session = ResizeSession::new();
    // When both dimensions are given explicitly they are taken as-is.
    session.set_lock_aspect(lock_aspect && !(width.is_some() && height.is_some()));
    session.load(&name, bytes)?;

    let source_bytes = session.source().map(|s| s.bytes().len()).unwrap_or(0);
    if let Some(width) = width {
        session.set_width(width);
    }
    if let Some(height) = height {
        session.set_height(height);
    }
    session.spec.quality = quality as f32 / 100.0;
    session.spec.format = format;

    let artifact = session.resize()?;
    let output =
        output.unwrap_or_else(|| PathBuf::from(format!("resized-image.{}", format.extension())));
    fs::write(&output, &artifact.bytes).with_context(|| format!("failed to write {output:?}"))?;

    let savings = if source_bytes > 0 {
        ((1.0 - artifact.byte_size() as f64 / source_bytes as f64) * 100.0).round() as i64
    } else {
        0
    };
    println!(
        "Resized to {}x{} ({}, {}% smaller)",
        artifact.width,
        artifact.height,
        format_file_size(artifact.byte_size()),
        savings
    );
    println!("Output saved to: {output:?}");

    Ok(())
}

fn run_pdf(
    images: &[PathBuf],
    output: Option<PathBuf>,
    page_size: PageSize,
    orientation: Orientation,
    layout: LayoutMode,
    quality: u8,
) -> anyhow::Result<()> {
    if quality > 100 {
        return Err(ImagepressError::InvalidQuality.into());
    }

    let mut session = CollectionSession::new();
    session.options.page_size = page_size;
    session.options.orientation = orientation;
    session.options.layout = layout;
    session.options.quality = quality as f32 / 100.0;

    for path in images {
        let bytes = fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        session.add_image(&name, bytes)?;
    }

    println!(
        "{} image(s) selected, total size: {}",
        session.entries().len(),
        format_file_size(session.total_bytes())
    );

    let document = session.assemble()?;
    let output = output.unwrap_or_else(|| PathBuf::from("converted-images.pdf"));
    fs::write(&output, &document.bytes).with_context(|| format!("failed to write {output:?}"))?;

    println!(
        "PDF ready: {} page(s), {} {}, {}",
        document.page_count,
        document.page_size,
        document.orientation,
        format_file_size(document.byte_size())
    );
    println!("Output saved to: {output:?}");

    Ok(())
}

/// Human-readable byte counts (1024-based, two decimals).
fn format_file_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 bytes".to_string();
    }
    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    if exp == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[exp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes_format_like_the_ui() {
        assert_eq!(format_file_size(0), "0 bytes");
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }
}

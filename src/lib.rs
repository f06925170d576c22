//! Image Resize and PDF Assembly Library
//!
//! Two independent features share this crate: resizing a single raster image
//! to target dimensions, quality, and format, and assembling an ordered
//! collection of raster images into a paginated PDF document.
//!
//! The pure placement math lives in [`geometry`] and [`layout`]; the raster
//! pipeline in [`pipeline`]; the sequential PDF builder in [`assemble`]; and
//! the stateful resize/collection sessions in [`session`].

pub mod assemble;
pub mod geometry;
pub mod layout;
pub mod pipeline;
pub mod session;

pub use assemble::{assemble, AssembleOptions, AssembledDocument};
pub use geometry::{couple_dimension, Dimension};
pub use layout::{plan_placement, LayoutMode, Orientation, PageSize, Placement};
pub use pipeline::{resize, OutputFormat, ResizeSpec, ResizedImage, SourceImage};
pub use session::{CollectionSession, ImageCollectionEntry, ResizeSession};

/// Error type for resize and assembly operations
#[derive(Debug, thiserror::Error)]
pub enum ImagepressError {
    /// Input bytes do not carry a recognizable image signature.
    #[error("not a recognizable image: {0}")]
    InvalidInput(String),

    /// The image signature was recognized but the pixels could not be decoded.
    #[error("failed to decode image {name}: {reason}")]
    DecodeFailure { name: String, reason: String },

    #[error("failed to encode image: {0}")]
    EncodeFailure(String),

    #[error("quality must be between 0 and 100")]
    InvalidQuality,

    #[error("target dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("the image collection is empty")]
    EmptyCollection,

    #[error("failed to save output: {0}")]
    SaveError(String),
}

pub type Result<T> = std::result::Result<T, ImagepressError>;

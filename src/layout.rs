//! Page geometry and per-image placement planning.
//!
//! Placements are computed in top-left page coordinates; the assembler
//! converts them to the PDF's bottom-left origin when emitting operators.

use std::fmt;

/// Supported page formats (portrait dimensions in PDF points, 72 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    fn portrait_points(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }

    /// Page dimensions in points for the given orientation.
    pub fn dimensions(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.portrait_points();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::A4 => write!(f, "A4"),
            PageSize::Letter => write!(f, "letter"),
            PageSize::Legal => write!(f, "legal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// How images are placed on document pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LayoutMode {
    /// Letterbox: centered, aspect-preserving, never overflows the page.
    #[default]
    Fit,
    /// Width-filled; height follows the aspect ratio and may overflow.
    Full,
    /// Two-up grid, four images per page.
    Multiple,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Fit => write!(f, "fit"),
            LayoutMode::Full => write!(f, "full"),
            LayoutMode::Multiple => write!(f, "multiple"),
        }
    }
}

/// Gutter applied around each cell of the two-up grid, in page units.
pub const MULTIPLE_MARGIN: f32 = 10.0;

/// Where an image lands on its page, and whether a fresh page must be
/// started before placing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub new_page: bool,
}

/// Plan the placement of the image at `index` in the collection.
///
/// Total over positive inputs; the caller guarantees `img_width` and
/// `img_height` are non-zero (the decode step does).
pub fn plan_placement(
    img_width: u32,
    img_height: u32,
    page_width: f32,
    page_height: f32,
    mode: LayoutMode,
    index: usize,
) -> Placement {
    let iw = img_width as f32;
    let ih = img_height as f32;

    match mode {
        LayoutMode::Fit => {
            let scale = (page_width / iw).min(page_height / ih);
            let width = iw * scale;
            let height = ih * scale;
            Placement {
                x: (page_width - width) / 2.0,
                y: (page_height - height) / 2.0,
                width,
                height,
                new_page: index > 0,
            }
        }
        LayoutMode::Full => Placement {
            x: 0.0,
            y: 0.0,
            width: page_width,
            height: ih * page_width / iw,
            new_page: index > 0,
        },
        LayoutMode::Multiple => {
            let width = page_width / 2.0 - MULTIPLE_MARGIN;
            let height = ih * width / iw;
            let column = (index % 2) as f32;
            let row = ((index / 2) % 2) as f32;
            Placement {
                x: column * (page_width / 2.0) + MULTIPLE_MARGIN / 2.0,
                y: row * (page_height / 2.0) + MULTIPLE_MARGIN / 2.0,
                width,
                height,
                // Two rows of two per page, so a break every fourth image.
                new_page: index > 0 && index % 4 == 0,
            }
        }
    }
}

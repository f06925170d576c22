//! Single-image resize pipeline: decode, resample, re-encode.

use crate::{ImagepressError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use log::debug;
use std::fmt;
use std::io::Cursor;

/// Output format for the resize pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    #[value(name = "webp")]
    WebP,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A loaded source image: raw bytes plus the dimensions decoded at load time.
/// Immutable once constructed; resizing never mutates it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl SourceImage {
    /// Sniff the magic bytes and decode dimensions. Non-image input is
    /// rejected with `InvalidInput` before any pipeline work begins.
    pub fn load(name: &str, bytes: Vec<u8>) -> Result<Self> {
        let (width, height) = decode_dimensions(name, &bytes)?;
        debug!("[Pipeline] Loaded {name}: {width}x{height}, {} bytes", bytes.len());
        Ok(Self {
            name: name.to_string(),
            bytes,
            width,
            height,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height, as captured at load time.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Sniff an image signature and decode its pixel dimensions.
pub(crate) fn decode_dimensions(name: &str, bytes: &[u8]) -> Result<(u32, u32)> {
    image::guess_format(bytes).map_err(|_| ImagepressError::InvalidInput(name.to_string()))?;

    let img = image::load_from_memory(bytes).map_err(|e| ImagepressError::DecodeFailure {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    Ok((img.width(), img.height()))
}

/// Resize parameters; width/height may be auto-derived from the aspect-ratio
/// invariant when locking is enabled (see [`crate::geometry`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSpec {
    pub width: u32,
    pub height: u32,
    /// Quality fraction in `[0, 1]`; clamped before reaching the encoder.
    pub quality: f32,
    pub format: OutputFormat,
}

impl Default for ResizeSpec {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            quality: 0.85,
            format: OutputFormat::Jpeg,
        }
    }
}

/// Re-encoded output of the resize pipeline.
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl ResizedImage {
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// Resize a source image: decode, resample with Lanczos3, re-encode at the
/// target quality and format.
///
/// Quality affects JPEG output; PNG and WebP are written losslessly.
pub fn resize(source: &SourceImage, spec: &ResizeSpec) -> Result<ResizedImage> {
    if spec.width == 0 || spec.height == 0 {
        return Err(ImagepressError::InvalidDimensions {
            width: spec.width,
            height: spec.height,
        });
    }

    let img = image::load_from_memory(source.bytes()).map_err(|e| ImagepressError::DecodeFailure {
        name: source.name().to_string(),
        reason: e.to_string(),
    })?;

    debug!(
        "[Pipeline] Resampling {} from {}x{} to {}x{}",
        source.name(),
        source.width(),
        source.height(),
        spec.width,
        spec.height
    );

    let resampled = img.resize_exact(spec.width, spec.height, FilterType::Lanczos3);
    let quality = (spec.quality.clamp(0.0, 1.0) * 100.0).round() as u8;

    let bytes = match spec.format {
        OutputFormat::Jpeg => encode_jpeg(&resampled, quality)?,
        OutputFormat::Png => encode_with_image_crate(&resampled, ImageFormat::Png)?,
        OutputFormat::WebP => encode_with_image_crate(&resampled, ImageFormat::WebP)?,
    };

    Ok(ResizedImage {
        bytes,
        width: spec.width,
        height: spec.height,
        format: spec.format,
    })
}

/// Encode an image as baseline JPEG at the given quality (0-100).
pub(crate) fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    // The encoder's quality scale starts at 1.
    let quality = quality.clamp(1, 100);

    let mut jpeg_bytes = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut jpeg_bytes, quality);
    encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_2_0);
    encoder
        .encode(
            rgb.as_raw(),
            width as u16,
            height as u16,
            jpeg_encoder::ColorType::Rgb,
        )
        .map_err(|e| ImagepressError::EncodeFailure(e.to_string()))?;

    Ok(jpeg_bytes)
}

fn encode_with_image_crate(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .map_err(|e| ImagepressError::EncodeFailure(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            Rgb([40, 120, 200]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn load_captures_dimensions_and_aspect() {
        let source = SourceImage::load("wide.png", png_bytes(1000, 500)).unwrap();
        assert_eq!((source.width(), source.height()), (1000, 500));
        assert_eq!(source.aspect_ratio(), 2.0);
    }

    #[test]
    fn non_image_bytes_are_rejected_at_load() {
        let err = SourceImage::load("notes.txt", b"definitely not pixels".to_vec()).unwrap_err();
        assert!(matches!(err, ImagepressError::InvalidInput(name) if name == "notes.txt"));
    }

    #[test]
    fn resize_produces_exact_target_dimensions() {
        let source = SourceImage::load("wide.png", png_bytes(1000, 500)).unwrap();
        let spec = ResizeSpec {
            width: 500,
            height: 250,
            quality: 0.85,
            format: OutputFormat::Jpeg,
        };

        let artifact = resize(&source, &spec).unwrap();
        assert_eq!((artifact.width, artifact.height), (500, 250));
        assert_eq!(artifact.format, OutputFormat::Jpeg);

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (500, 250));
    }

    #[test]
    fn resize_rejects_zero_area_targets() {
        let source = SourceImage::load("wide.png", png_bytes(100, 100)).unwrap();
        let spec = ResizeSpec {
            width: 0,
            height: 250,
            ..ResizeSpec::default()
        };
        assert!(matches!(
            resize(&source, &spec),
            Err(ImagepressError::InvalidDimensions { width: 0, height: 250 })
        ));
    }

    #[test]
    fn png_and_webp_round_trip_through_their_decoders() {
        let source = SourceImage::load("img.png", png_bytes(64, 32)).unwrap();
        for format in [OutputFormat::Png, OutputFormat::WebP] {
            let artifact = resize(
                &source,
                &ResizeSpec {
                    width: 32,
                    height: 16,
                    quality: 1.0,
                    format,
                },
            )
            .unwrap();
            let decoded = image::load_from_memory(&artifact.bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (32, 16));
        }
    }

    #[test]
    fn quality_is_clamped_before_encoding() {
        let source = SourceImage::load("img.png", png_bytes(64, 64)).unwrap();
        let spec = ResizeSpec {
            width: 32,
            height: 32,
            quality: 7.5,
            format: OutputFormat::Jpeg,
        };
        // An out-of-range fraction must not panic or error; it clamps to 1.0.
        assert!(resize(&source, &spec).is_ok());
    }

    #[test]
    fn format_names_match_download_extensions() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpeg");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::WebP.extension(), "webp");
        assert_eq!(OutputFormat::WebP.mime_type(), "image/webp");
    }
}

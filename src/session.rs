//! Explicit session objects for the two tools.
//!
//! Each session owns its own state and exposes an explicit reset. The two
//! lifecycles are independent: resetting one never touches the other.

use crate::assemble::{assemble, AssembleOptions, AssembledDocument};
use crate::geometry::{couple_dimension, Dimension};
use crate::pipeline::{decode_dimensions, resize, ResizeSpec, ResizedImage, SourceImage};
use crate::{ImagepressError, Result};
use log::debug;

/// One image queued for document assembly. Collection order is the sole
/// determinant of page order.
#[derive(Debug, Clone)]
pub struct ImageCollectionEntry {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub name: String,
    pub byte_size: usize,
}

impl ImageCollectionEntry {
    /// Sniff and decode the bytes; non-image input is rejected up front.
    pub fn load(name: &str, bytes: Vec<u8>) -> Result<Self> {
        let (width, height) = decode_dimensions(name, &bytes)?;
        let byte_size = bytes.len();
        Ok(Self {
            bytes,
            width,
            height,
            name: name.to_string(),
            byte_size,
        })
    }
}

/// State for the single-image resize tool.
///
/// The aspect ratio is captured once at load and held constant; dimension
/// setters couple the complementary field through it while locking is on.
#[derive(Debug)]
pub struct ResizeSession {
    source: Option<SourceImage>,
    aspect_ratio: f64,
    lock_aspect: bool,
    pub spec: ResizeSpec,
    artifact: Option<ResizedImage>,
}

impl Default for ResizeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeSession {
    pub fn new() -> Self {
        Self {
            source: None,
            aspect_ratio: 1.0,
            lock_aspect: true,
            spec: ResizeSpec::default(),
            artifact: None,
        }
    }

    /// Load a new source image, replacing any previous one wholesale.
    /// The spec's target dimensions start out at the source dimensions.
    pub fn load(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let source = SourceImage::load(name, bytes)?;
        self.aspect_ratio = source.aspect_ratio();
        self.spec.width = source.width();
        self.spec.height = source.height();
        self.artifact = None;
        self.source = Some(source);
        Ok(())
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn lock_aspect(&self) -> bool {
        self.lock_aspect
    }

    pub fn set_lock_aspect(&mut self, lock: bool) {
        self.lock_aspect = lock;
    }

    /// Set the target width; while locked (and an image is loaded) the
    /// height follows through the captured aspect ratio.
    pub fn set_width(&mut self, width: u32) {
        self.spec.width = width;
        if self.source.is_some() {
            if let Some(height) = couple_dimension(Dimension::Width, width, self.aspect_ratio, self.lock_aspect) {
                self.spec.height = height;
            }
        }
    }

    /// Set the target height; the width follows while locked.
    pub fn set_height(&mut self, height: u32) {
        self.spec.height = height;
        if self.source.is_some() {
            if let Some(width) = couple_dimension(Dimension::Height, height, self.aspect_ratio, self.lock_aspect) {
                self.spec.width = width;
            }
        }
    }

    /// Run the pipeline on the loaded source with the current spec.
    pub fn resize(&mut self) -> Result<&ResizedImage> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ImagepressError::InvalidInput("no image loaded".to_string()))?;
        let artifact = resize(source, &self.spec)?;
        Ok(self.artifact.insert(artifact))
    }

    pub fn artifact(&self) -> Option<&ResizedImage> {
        self.artifact.as_ref()
    }

    /// Drop the loaded image and artifact and restore default settings.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// State for the image-collection / PDF tool.
#[derive(Debug, Default)]
pub struct CollectionSession {
    entries: Vec<ImageCollectionEntry>,
    document: Option<AssembledDocument>,
    pub options: AssembleOptions,
}

impl CollectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ImageCollectionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combined byte size of all queued entries.
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.byte_size).sum()
    }

    /// Append an image to the end of the collection.
    pub fn add_image(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let entry = ImageCollectionEntry::load(name, bytes)?;
        debug!("[Collection] Added {} ({}x{})", entry.name, entry.width, entry.height);
        self.entries.push(entry);
        self.invalidate();
        Ok(())
    }

    /// Remove the entry at `index`, keeping the remaining order intact.
    pub fn remove_at(&mut self, index: usize) -> Option<ImageCollectionEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.invalidate();
        Some(self.entries.remove(index))
    }

    /// Insert an entry at `index` (clamped to the current length).
    pub fn insert_at(&mut self, index: usize, entry: ImageCollectionEntry) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.invalidate();
    }

    /// Move the entry at `from` so it ends up exactly at index `to`;
    /// the reorder gesture expressed as remove + insert.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let entry = self.entries.remove(from);
            self.entries.insert(to, entry);
            self.invalidate();
        }
        true
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.invalidate();
    }

    /// Assemble the current entries into a document and hold it for export.
    pub fn assemble(&mut self) -> Result<&AssembledDocument> {
        let document = assemble(&self.entries, &self.options)?;
        Ok(self.document.insert(document))
    }

    /// The most recently assembled document, if the collection has not been
    /// mutated since.
    pub fn document(&self) -> Option<&AssembledDocument> {
        self.document.as_ref()
    }

    /// Drop all entries, the document, and restore default settings.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // Mutating the collection after an assembly makes the held document
    // stale; force a re-assembly before the next export.
    fn invalidate(&mut self) {
        if self.document.take().is_some() {
            debug!("[Collection] Entries changed; assembled document invalidated");
        }
    }
}

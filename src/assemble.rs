//! Sequential image-to-PDF assembly.
//!
//! Entries are processed strictly in collection order by one coordinator
//! loop: decode, plan placement, append to the growing document. A fresh
//! page is opened only when the layout planner raises its page-break flag
//! (or for the very first entry); in `multiple` mode several images share
//! a page.

use crate::layout::{plan_placement, LayoutMode, Orientation, PageSize, Placement};
use crate::pipeline::encode_jpeg;
use crate::session::ImageCollectionEntry;
use crate::{ImagepressError, Result};
use log::{debug, info};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Options for document assembly
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub layout: LayoutMode,
    /// JPEG quality fraction in `[0, 1]` for embedded images.
    pub quality: f32,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            layout: LayoutMode::Fit,
            quality: 0.9,
        }
    }
}

/// The finished document artifact.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub page_size: PageSize,
    pub orientation: Orientation,
}

impl AssembledDocument {
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

/// One page being filled: accumulated draw operators plus the image
/// XObjects its resource dictionary must reference.
struct PageBuilder {
    content: Vec<u8>,
    xobjects: Dictionary,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            content: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }

    fn place_image(&mut self, image_id: ObjectId, index: usize, placement: &Placement, page_height: f32) {
        let name = format!("Im{index}");
        self.xobjects.set(name.clone(), Object::Reference(image_id));

        // Placements are top-down; the PDF origin is bottom-left. A `full`
        // placement taller than the page goes negative here, which crops at
        // the page edge as intended.
        let y = page_height - placement.y - placement.height;
        let ops = format!(
            "q\n{w} 0 0 {h} {x} {y} cm\n/{name} Do\nQ\n",
            w = placement.width,
            h = placement.height,
            x = placement.x,
        );
        self.content.extend_from_slice(ops.as_bytes());
    }

    fn finish(self, doc: &mut Document, parent: ObjectId, page_width: f32, page_height: f32) -> ObjectId {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), self.content));
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_width),
                Object::Real(page_height),
            ],
            "Resources" => dictionary! {
                "XObject" => Object::Dictionary(self.xobjects),
            },
            "Contents" => content_id,
        })
    }
}

/// Build a JPEG image XObject stream.
fn jpeg_image_xobject(width: u32, height: u32, jpeg_bytes: Vec<u8>) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    dict.set("Length", Object::Integer(jpeg_bytes.len() as i64));

    Stream::new(dict, jpeg_bytes)
}

/// Assemble the entries, in order, into a paginated PDF.
///
/// Any entry that fails to decode aborts the whole run; no partial artifact
/// escapes. Each image is re-encoded as a JPEG XObject at the collection
/// quality.
pub fn assemble(entries: &[ImageCollectionEntry], options: &AssembleOptions) -> Result<AssembledDocument> {
    if entries.is_empty() {
        return Err(ImagepressError::EmptyCollection);
    }

    let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round() as u8;
    let (page_width, page_height) = options.page_size.dimensions(options.orientation);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    let mut current = PageBuilder::new();

    for (index, entry) in entries.iter().enumerate() {
        // Decode
        let img = image::load_from_memory(&entry.bytes).map_err(|e| ImagepressError::DecodeFailure {
            name: entry.name.clone(),
            reason: e.to_string(),
        })?;

        // Place
        let placement = plan_placement(
            entry.width,
            entry.height,
            page_width,
            page_height,
            options.layout,
            index,
        );
        if placement.new_page {
            let done = std::mem::replace(&mut current, PageBuilder::new());
            kids.push(done.finish(&mut doc, pages_id, page_width, page_height).into());
        }

        // Append
        let jpeg_bytes = encode_jpeg(&img, quality)?;
        let image_id = doc.add_object(jpeg_image_xobject(entry.width, entry.height, jpeg_bytes));
        current.place_image(image_id, index, &placement, page_height);

        debug!(
            "[Assemble] {} ({}x{}) -> page {} at ({:.1}, {:.1}) {:.1}x{:.1}",
            entry.name,
            entry.width,
            entry.height,
            kids.len() + 1,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
    }

    // The collection is non-empty, so the last page always has content.
    kids.push(current.finish(&mut doc, pages_id, page_width, page_height).into());

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ImagepressError::SaveError(e.to_string()))?;

    info!(
        "[Assemble] {} image(s) -> {} page(s), {} {}, {} bytes",
        entries.len(),
        page_count,
        options.page_size,
        options.orientation,
        bytes.len()
    );

    Ok(AssembledDocument {
        bytes,
        page_count,
        page_size: options.page_size,
        orientation: options.orientation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb};
    use std::io::Cursor;

    fn entry(name: &str, width: u32, height: u32) -> ImageCollectionEntry {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            Rgb([200, 60, 60]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageCollectionEntry::load(name, bytes).unwrap()
    }

    #[test]
    fn empty_collection_is_rejected() {
        assert!(matches!(
            assemble(&[], &AssembleOptions::default()),
            Err(ImagepressError::EmptyCollection)
        ));
    }

    #[test]
    fn fit_layout_makes_one_page_per_image() {
        let entries = vec![entry("a.png", 400, 300), entry("b.png", 300, 400), entry("c.png", 100, 100)];
        let result = assemble(&entries, &AssembleOptions::default()).unwrap();
        assert_eq!(result.page_count, 3);

        let doc = Document::load_mem(&result.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn multiple_layout_packs_four_images_per_page() {
        let entries: Vec<_> = (0..5).map(|i| entry(&format!("{i}.png"), 200, 100)).collect();
        let options = AssembleOptions {
            layout: LayoutMode::Multiple,
            ..AssembleOptions::default()
        };
        let result = assemble(&entries, &options).unwrap();
        assert_eq!(result.page_count, 2);

        let doc = Document::load_mem(&result.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn pages_carry_the_requested_media_box() {
        let entries = vec![entry("a.png", 400, 300)];
        let options = AssembleOptions {
            page_size: PageSize::Letter,
            orientation: Orientation::Landscape,
            ..AssembleOptions::default()
        };
        let result = assemble(&entries, &options).unwrap();

        let doc = Document::load_mem(&result.bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_float().unwrap(), 792.0);
        assert_eq!(media_box[3].as_float().unwrap(), 612.0);
    }

    #[test]
    fn corrupt_entry_aborts_the_run() {
        let mut bad = entry("bad.png", 50, 50);
        bad.bytes.truncate(20);
        let entries = vec![entry("ok.png", 50, 50), bad];

        let err = assemble(&entries, &AssembleOptions::default()).unwrap_err();
        assert!(matches!(err, ImagepressError::DecodeFailure { name, .. } if name == "bad.png"));
    }
}

//! PDF assembly for paginated snapshots.
//!
//! The snapshot is embedded once as a Flate-compressed RGB image XObject and
//! every page draws that same object at its own vertical offset, clipped by
//! the page's media box.

use super::paginate::PaginatedDocument;
use crate::{Error, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use std::sync::OnceLock;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const IMAGE_NAME: &str = "Im0";

fn mm_to_pt(mm: f64) -> f32 {
    (mm * POINTS_PER_MM) as f32
}

/// Document-level settings shared by every rendered document.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub pdf_version: String,
    pub producer: String,
    pub title: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            pdf_version: "1.5".to_string(),
            producer: concat!("simexport ", env!("CARGO_PKG_VERSION")).to_string(),
            title: "Simulation snapshot".to_string(),
        }
    }
}

/// Turns paginated snapshots into PDF bytes.
///
/// A renderer is immutable once built. Hand it to the document export
/// explicitly; [`PdfRenderer::shared`] provides a process-wide default for
/// callers that want exactly one.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    config: RendererConfig,
}

static SHARED: OnceLock<PdfRenderer> = OnceLock::new();

impl PdfRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// The process-wide renderer, built with default settings on first use.
    pub fn shared() -> &'static PdfRenderer {
        SHARED.get_or_init(PdfRenderer::default)
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn render(&self, document: &PaginatedDocument<'_>) -> Result<Vec<u8>> {
        let snapshot = document.snapshot;
        let plan = &document.plan;
        if snapshot.is_empty() || plan.slices.is_empty() {
            return Err(Error::RenderError("nothing to render".to_string()));
        }

        let mut doc = Document::with_version(self.config.pdf_version.as_str());
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(image_stream(
            snapshot.width,
            snapshot.height,
            snapshot.pixels(),
        )?);

        let page_w = mm_to_pt(plan.page_width_mm);
        let page_h = mm_to_pt(plan.page_height_mm);
        let image_w = page_w;
        let image_h = mm_to_pt(plan.image_height_mm);

        let mut kids: Vec<Object> = Vec::with_capacity(plan.slices.len());
        for slice in &plan.slices {
            // PDF origin is bottom-left; offsets are measured down from the top.
            let y = page_h - mm_to_pt(slice.offset_mm) - image_h;
            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            image_w.into(),
                            Object::Integer(0),
                            Object::Integer(0),
                            image_h.into(),
                            Object::Integer(0),
                            y.into(),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(page_dictionary(
                pages_id, content_id, image_id, page_w, page_h,
            ));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(self.config.producer.as_str()),
            "Title" => Object::string_literal(self.config.title.as_str()),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        log::debug!(
            "rendered {} page(s) into {} PDF bytes",
            plan.slices.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn image_stream(width: u32, height: u32, rgb: &[u8]) -> Result<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb)
        .map_err(|e| Error::RenderError(format!("image compression: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::RenderError(format!("image compression: {}", e)))?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8_i64,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, compressed))
}

fn page_dictionary(
    parent: ObjectId,
    contents: ObjectId,
    image: ObjectId,
    width: f32,
    height: f32,
) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), width.into(), height.into()],
        "Contents" => contents,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image,
            },
        },
    }
}

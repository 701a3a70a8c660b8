//! Source discovery, image decoding and output encoding (PNG, JPEG, PDF)

use crate::io::configuration::JPEG_QUALITY;
use crate::io::error::{AnnotateError, Result, WithPath, invalid_parameter};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Document, Object, Stream, dictionary};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File extensions accepted as source screenshots
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Encoding used for annotated outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG keeping transparency
    Png,
    /// JPEG at fixed quality, flattened over the background
    #[serde(alias = "jpeg")]
    Jpg,
    /// Single-page PDF embedding the flattened image
    #[default]
    Pdf,
}

impl OutputFormat {
    /// File extension (without dot) written for this format
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Pdf => "pdf",
        }
    }

    /// Whether transparency must be flattened before encoding
    pub const fn needs_flattening(self) -> bool {
        !matches!(self, Self::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "pdf" => Ok(Self::Pdf),
            other => Err(invalid_parameter(
                "format",
                &other,
                &"expected one of png, jpg, pdf",
            )),
        }
    }
}

/// Check whether `path` carries a supported source extension
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// List the supported images directly inside `folder`, sorted by path
///
/// A missing folder yields an empty list.
///
/// # Errors
///
/// Returns an error if the folder exists but cannot be read
pub fn discover_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder).with_path(folder, "read directory")? {
        let path = entry.with_path(folder, "read directory entry")?.path();
        if path.is_file() && is_supported_image(&path) {
            files.push(path);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Decode an image and convert it to RGBA
///
/// # Errors
///
/// Returns [`AnnotateError::ImageLoad`] naming `path` if decoding fails
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| AnnotateError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Composite `image` over an opaque `background`, dropping the alpha channel
pub fn flatten(image: &RgbaImage, background: Rgba<u8>) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (x, y, px) in image.enumerate_pixels() {
        let alpha = u32::from(px[3]);
        let inv = 255 - alpha;
        let mix = |fg: u8, bg: u8| ((u32::from(fg) * alpha + u32::from(bg) * inv + 127) / 255) as u8;
        out.put_pixel(
            x,
            y,
            Rgb([
                mix(px[0], background[0]),
                mix(px[1], background[1]),
                mix(px[2], background[2]),
            ]),
        );
    }
    out
}

/// Write an annotated image to `path` in the requested format
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or encoding fails
pub fn save_output(
    image: &RgbaImage,
    path: &Path,
    format: OutputFormat,
    background: Rgba<u8>,
) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
    }

    match format {
        OutputFormat::Png => image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| AnnotateError::ImageExport {
                path: path.to_path_buf(),
                source,
            }),
        OutputFormat::Jpg => {
            let rgb = flatten(image, background);
            let file = File::create(path).with_path(path, "create file")?;
            let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
            encoder
                .encode_image(&rgb)
                .map_err(|source| AnnotateError::ImageExport {
                    path: path.to_path_buf(),
                    source,
                })
        }
        OutputFormat::Pdf => {
            let rgb = flatten(image, background);
            write_pdf(&rgb, path)
        }
    }
}

// One page, one image XObject, page box equal to the pixel size
fn write_pdf(image: &RgbImage, path: &Path) -> Result<()> {
    let pdf_error = |source| AnnotateError::PdfExport {
        path: path.to_path_buf(),
        source,
    };
    let width = i64::from(image.width());
    let height = i64::from(image.height());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.as_raw().clone(),
    );
    image_stream.compress().map_err(pdf_error)?;
    let image_id = doc.add_object(image_stream);

    let content = format!("q\n{width} 0 0 {height} 0 0 cm\n/Im0 Do\nQ\n");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).map(|_| ()).map_err(|source| AnnotateError::FileSystem {
        path: path.to_path_buf(),
        operation: "write PDF",
        source,
    })
}

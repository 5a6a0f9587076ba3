//! Files attached to medical records: scanned reports (PDF) and photos
//! (JPEG, PNG). The extension, the sniffed content and, for images, the
//! decoded pixels must all agree before a file is accepted.

use anyhow::{anyhow, bail, Context, Result};
use image::{GenericImageView, ImageFormat};
use std::path::Path;

use crate::utils::validation::MAX_FILE_SIZE;

const MAX_IMAGE_DIMENSIONS: (u32, u32) = (8192, 8192);
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Jpeg,
    Png,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(FileKind::Pdf),
            "jpg" | "jpeg" => Some(FileKind::Jpeg),
            "png" => Some(FileKind::Png),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Jpeg => "image/jpeg",
            FileKind::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Jpeg => "jpg",
            FileKind::Png => "png",
        }
    }
}

/// A file whose name, size and content have been checked
#[derive(Debug, Clone)]
pub struct FileInput {
    content: Vec<u8>,
    filename: String,
    kind: FileKind,
}

impl FileInput {
    pub fn new(content: &[u8], filename: &str) -> Result<Self> {
        if content.is_empty() {
            bail!("File content cannot be empty");
        }
        if content.len() > MAX_FILE_SIZE {
            bail!("File size exceeds maximum allowed size of {MAX_FILE_SIZE} bytes");
        }

        let filename = Self::sanitize_filename(filename)?;

        let extension = Path::new(&filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| anyhow!("Missing file extension"))?;

        let kind = FileKind::from_extension(&extension)
            .ok_or_else(|| anyhow!("Only PDF, JPEG and PNG files are accepted"))?;

        match kind {
            FileKind::Pdf => Self::validate_pdf(content)?,
            FileKind::Jpeg => Self::validate_image(content, ImageFormat::Jpeg)?,
            FileKind::Png => Self::validate_image(content, ImageFormat::Png)?,
        }

        Ok(Self {
            content: content.to_vec(),
            filename,
            kind,
        })
    }

    /// Keeps only the final path component of the client-provided name
    fn sanitize_filename(filename: &str) -> Result<String> {
        let filename = filename.trim();
        if filename.is_empty() {
            bail!("Filename cannot be empty");
        }

        let name = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Invalid filename"))?;

        Ok(name.to_string())
    }

    fn validate_pdf(content: &[u8]) -> Result<()> {
        if !content.starts_with(PDF_MAGIC) {
            bail!("File is not a PDF document");
        }
        Ok(())
    }

    fn validate_image(content: &[u8], expected: ImageFormat) -> Result<()> {
        match image::guess_format(content) {
            Ok(format) if format == expected => {}
            Ok(_) => bail!("File content does not match its extension"),
            Err(_) => bail!("Unable to determine file format"),
        }

        let (width, height) = image::load_from_memory_with_format(content, expected)
            .context("Failed to decode image")?
            .dimensions();

        if width > MAX_IMAGE_DIMENSIONS.0 || height > MAX_IMAGE_DIMENSIONS.1 {
            bail!(
                "Image dimensions ({width} x {height}) exceed maximum allowed ({} x {})",
                MAX_IMAGE_DIMENSIONS.0,
                MAX_IMAGE_DIMENSIONS.1
            );
        }
        Ok(())
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }
}

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, GenericImageView};
use shared::{
    domain::{ReportEntry, ReportId},
    error::AppError,
};
use tracing::debug;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 3 * 1024 * 1024;
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 1024;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
const MIN_TEXT_LEN: usize = 3;
const DATE_FORMAT: &str = "%Y-%m-%d";
const UNTITLED: &str = "Barang Tanpa Nama";
const UNKNOWN_LOCATION: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_image_bytes: usize,
    pub max_image_width: u32,
    pub jpeg_quality: u8,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_image_width: DEFAULT_MAX_IMAGE_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// What the public report form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub contact: String,
    pub image: Option<ImageUpload>,
}

pub fn validate_draft(draft: &ReportDraft) -> Result<(), AppError> {
    let title = draft.title.trim();
    let location = draft.location.trim();
    if title.is_empty() || location.is_empty() || draft.date.trim().is_empty() {
        return Err(AppError::validation(
            "title, location and date are required",
        ));
    }
    if title.chars().count() < MIN_TEXT_LEN {
        return Err(AppError::validation(format!(
            "title must be at least {MIN_TEXT_LEN} characters"
        )));
    }
    if location.chars().count() < MIN_TEXT_LEN {
        return Err(AppError::validation(format!(
            "location must be at least {MIN_TEXT_LEN} characters"
        )));
    }
    if NaiveDate::parse_from_str(draft.date.trim(), DATE_FORMAT).is_err() {
        return Err(AppError::validation(format!(
            "date must look like 2025-09-19, got {}",
            draft.date.trim()
        )));
    }
    Ok(())
}

pub fn validate_image(upload: &ImageUpload, limits: &IntakeLimits) -> Result<(), AppError> {
    if !upload.mime_type.starts_with("image/") {
        return Err(AppError::validation(format!(
            "file must be an image, got {}",
            upload.mime_type
        )));
    }
    if upload.bytes.len() > limits.max_image_bytes {
        return Err(AppError::validation(format!(
            "image is {} bytes; the limit is {} bytes",
            upload.bytes.len(),
            limits.max_image_bytes
        )));
    }
    Ok(())
}

/// Downscales to the width limit and re-encodes as a JPEG data URL.
pub fn embed_image(upload: &ImageUpload, limits: &IntakeLimits) -> Result<String, AppError> {
    validate_image(upload, limits)?;

    let decoded = image::load_from_memory(&upload.bytes)
        .map_err(|e| AppError::validation(format!("unreadable image: {e}")))?;
    let (width, height) = decoded.dimensions();
    let resized = if width > limits.max_image_width {
        let scaled_height =
            ((u64::from(height) * u64::from(limits.max_image_width)) / u64::from(width)).max(1);
        decoded.resize_exact(
            limits.max_image_width,
            scaled_height as u32,
            FilterType::Triangle,
        )
    } else {
        decoded
    };

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, limits.jpeg_quality.clamp(1, 100))
        .encode_image(&resized.to_rgb8())
        .map_err(|e| AppError::validation(format!("failed to re-encode image: {e}")))?;
    debug!(
        original_bytes = upload.bytes.len(),
        embedded_bytes = encoded.len(),
        width = resized.width(),
        "embedded report image"
    );

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(encoded)))
}

/// Validates the draft and builds the queue entry, image included.
///
/// Nothing here touches shared state: the entry only exists once every step,
/// including image processing, has succeeded.
pub fn prepare_report(
    draft: ReportDraft,
    limits: &IntakeLimits,
    id: ReportId,
    today: NaiveDate,
) -> Result<ReportEntry, AppError> {
    validate_draft(&draft)?;
    let image = draft
        .image
        .as_ref()
        .map(|upload| embed_image(upload, limits))
        .transpose()?;

    Ok(ReportEntry {
        id,
        title: non_empty(&draft.title).unwrap_or_else(|| UNTITLED.to_string()),
        location: non_empty(&draft.location).unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        date: non_empty(&draft.date).unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
        image,
        description: non_empty(&draft.description),
        contact: non_empty(&draft.contact),
    })
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/intake_tests.rs"]
mod tests;

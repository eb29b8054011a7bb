//! Floating image + caption panel shown next to the pointer while a point is
//! hovered. Stateless: views build one per frame from whatever is hovered.

use base64::Engine as _;
use runtime::window::ScreenPos;

use crate::record::{PointInfo, Record};

/// Distance from the pointer to the panel's top-left corner, on both axes.
pub const PREVIEW_OFFSET_PX: f64 = 10.0;
pub const PREVIEW_WIDTH_PX: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDecodeError(pub String);

impl std::fmt::Display for ImageDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "preview image is not valid base64: {}", self.0)
    }
}

impl std::error::Error for ImageDecodeError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewWindow<'a> {
    pub caption: &'a str,
    /// Base64 payload, as received from the backend.
    pub image: &'a str,
    pub similarity_score: f64,
    /// Top-left corner of the panel in window pixels.
    pub anchor: ScreenPos,
    pub width: f64,
}

impl<'a> PreviewWindow<'a> {
    pub fn near_pointer(caption: &'a str, image: &'a str, similarity_score: f64, pointer: ScreenPos) -> Self {
        Self {
            caption,
            image,
            similarity_score,
            anchor: pointer.offset(PREVIEW_OFFSET_PX, PREVIEW_OFFSET_PX),
            width: PREVIEW_WIDTH_PX,
        }
    }

    pub fn for_record(record: &'a Record, pointer: ScreenPos) -> Self {
        Self::near_pointer(&record.caption, &record.image, record.similarity_score, pointer)
    }

    pub fn for_info(info: &'a PointInfo, pointer: ScreenPos) -> Self {
        Self::near_pointer(&info.caption, &info.image, info.similarity_score, pointer)
    }

    /// The image as an inline `data:` URI, ready for an `<img src>`.
    pub fn image_data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.image)
    }

    pub fn image_bytes(&self) -> Result<Vec<u8>, ImageDecodeError> {
        base64::engine::general_purpose::STANDARD
            .decode(self.image)
            .map_err(|e| ImageDecodeError(e.to_string()))
    }
}

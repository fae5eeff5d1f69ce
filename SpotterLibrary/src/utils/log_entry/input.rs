use image::ImageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputEntry {
    #[error("Unsupported media type")]
    UnsupportedMediaType,
    #[error("Invalid file name")]
    InvalidFileName,
    #[error("Invalid payload")]
    InvalidPayload,
    #[error("Target list is empty")]
    EmptyTargetList,
    #[error("Failed to decode image {0}: {1}")]
    ImageDecodeError(String, ImageError),
}

impl From<InputEntry> for String {
    #[inline(always)]
    fn from(value: InputEntry) -> Self {
        value.to_string()
    }
}

use image::ImageError;
use reqwest::Error as ReqwestError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleEntry {
    #[error("Oracle query timeout")]
    QueryTimeout,
    #[error("Oracle transport error: {0}")]
    TransportError(ReqwestError),
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
    #[error("Oracle returned status {0}")]
    BadStatus(StatusCode),
    #[error("Failed to encode query image: {0}")]
    EncodeError(ImageError),
    #[error("Oracle unavailable")]
    Unavailable,
}

impl From<OracleEntry> for String {
    #[inline(always)]
    fn from(value: OracleEntry) -> Self {
        value.to_string()
    }
}

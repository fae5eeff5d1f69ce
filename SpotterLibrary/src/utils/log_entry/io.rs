use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IOEntry {
    #[error("Failed to create directory {0}: {1}")]
    CreateDirectoryError(String, IoError),
    #[error("Failed to delete directory {0}: {1}")]
    DeleteDirectoryError(String, IoError),
}

impl From<IOEntry> for String {
    #[inline(always)]
    fn from(value: IOEntry) -> Self {
        value.to_string()
    }
}

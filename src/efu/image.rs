use std::fs;
use std::path::Path;

use super::error::{Result, UploadError};

/// Firmware binary held in memory for the duration of one upload
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    data: Vec<u8>,
    size: u32,
}

impl FirmwareImage {
    pub fn new(data: Vec<u8>) -> Result<Self> {
        let size = u32::try_from(data.len())
            .map_err(|_| UploadError::ImageTooLarge { size: data.len() })?;
        Ok(FirmwareImage { data, size })
    }

    /// Read the whole image file
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|source| UploadError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(data)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// CRC-32/ISO-HDLC over the whole image
    pub fn crc32(&self) -> u32 {
        crc32fast::hash(&self.data)
    }
}

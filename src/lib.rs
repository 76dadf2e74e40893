//! Network clients for LED controller boards: firmware upload over the EFU
//! TCP protocol (v1.1 and v1.2) and pixel streaming over DDP/UDP.

pub mod config;
pub mod ddp;
pub mod efu;
pub mod logging;
pub mod pacing;
pub mod pixel_format;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::ddp::fragment::{DDP_PORT, MAX_CHUNK_SIZE};
use crate::efu::protocol::CHUNK_SIZE;
use crate::pixel_format::PixelFormat;

/// Settings shared by both firmware uploaders
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EfuConfig {
    /// Read, write and connect timeout in seconds
    pub timeout_secs: u64,
    /// Countdown after the v1.2 header while the device erases its partition.
    /// Purely cosmetic; the header ack read still uses `timeout_secs`.
    pub erase_wait_secs: u32,
    pub chunk_size: usize,
    /// Overrides the version's default port
    pub port: Option<u16>,
}

impl Default for EfuConfig {
    fn default() -> Self {
        EfuConfig {
            timeout_secs: 5,
            erase_wait_secs: 4,
            chunk_size: CHUNK_SIZE,
            port: None,
        }
    }
}

impl EfuConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }
}

/// Top-level configuration file for the DDP sender
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SenderConfig {
    pub ddp: DdpConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DdpConfig {
    pub host: String,
    pub port: u16,
    /// Must match the LED count configured on the controller, otherwise
    /// trailing LEDs are never addressed
    pub led_count: usize,
    pub chunk_size: usize,
    /// Pause between fragments of one frame
    pub fragment_delay_ms: u64,
    /// Pause between frames
    pub frame_delay_ms: u64,
    pub pixel_format: PixelFormat,
}

impl Default for DdpConfig {
    fn default() -> Self {
        DdpConfig {
            host: "192.168.178.225".to_string(),
            port: DDP_PORT,
            led_count: 880,
            chunk_size: MAX_CHUNK_SIZE,
            fragment_delay_ms: 2,
            frame_delay_ms: 100,
            pixel_format: PixelFormat::Rgb,
        }
    }
}

impl DdpConfig {
    pub fn fragment_delay(&self) -> Duration {
        Duration::from_millis(self.fragment_delay_ms)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    /// Length in bytes of one frame, `None` if it overflows `usize`
    pub fn checked_frame_len(&self) -> Option<usize> {
        self.led_count.checked_mul(3)
    }

    /// Length in bytes of one frame. Only meaningful on a validated config;
    /// saturates instead of overflowing otherwise.
    pub fn frame_len(&self) -> usize {
        self.led_count.saturating_mul(3)
    }
}

/// Red ramp played by the demo driver. `end` is exclusive.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub start: u8,
    pub end: u16,
    pub step: u8,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            start: 0,
            end: 16,
            step: 10,
        }
    }
}

impl SenderConfig {
    /// Load a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let config_data = fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        let config: SenderConfig = serde_json::from_str(&config_data)
            .context(format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ddp = &self.ddp;
        if ddp.port == 0 {
            anyhow::bail!("ddp.port must not be 0");
        }
        if ddp.led_count == 0 {
            anyhow::bail!("ddp.led_count must be at least 1");
        }
        if ddp.chunk_size == 0 || ddp.chunk_size > u16::MAX as usize {
            anyhow::bail!("ddp.chunk_size must be in 1..={}", u16::MAX);
        }
        let fits = ddp
            .checked_frame_len()
            .is_some_and(|len| u32::try_from(len).is_ok());
        if !fits {
            anyhow::bail!("ddp.led_count {} is too large for a DDP frame", ddp.led_count);
        }
        if self.animation.step == 0 {
            anyhow::bail!("animation.step must be at least 1");
        }
        Ok(())
    }
}

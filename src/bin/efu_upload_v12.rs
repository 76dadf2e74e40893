use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use efu_ddp_client::config::EfuConfig;
use efu_ddp_client::efu::{self, ProtocolVersion};
use efu_ddp_client::logging;
use efu_ddp_client::pacing::ThreadSleep;

#[derive(Parser)]
#[command(name = "efu_upload_v12")]
#[command(about = "Ethernet firmware upload, protocol v1.2\n\nSends header, image and CRC32 trailer to TCP port 4243.", long_about = None)]
struct Cli {
    /// Device host name or IP address
    host: String,

    /// Path to the firmware binary
    image: PathBuf,

    /// Seconds to count down while the device erases its partition
    #[arg(long)]
    erase_wait: Option<u32>,

    /// Connect/read timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Device port (default 4243)
    #[arg(long)]
    port: Option<u16>,

    /// Enable debug output (per-chunk logging)
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug, false);

    let defaults = EfuConfig::default();
    let config = EfuConfig {
        timeout_secs: cli.timeout.unwrap_or(defaults.timeout_secs),
        erase_wait_secs: cli.erase_wait.unwrap_or(defaults.erase_wait_secs),
        port: cli.port,
        ..defaults
    };
    config.validate()?;

    efu::upload(
        &cli.host,
        &cli.image,
        ProtocolVersion::V12,
        &config,
        ThreadSleep,
        efu::print_progress,
    )?;

    println!("\nDone.");
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use efu_ddp_client::config::EfuConfig;
use efu_ddp_client::efu::{self, ProtocolVersion};
use efu_ddp_client::logging;
use efu_ddp_client::pacing::NoPacing;

#[derive(Parser)]
#[command(name = "efu_upload_v11")]
#[command(about = "Ethernet firmware upload, protocol v1.1\n\nSends the image to TCP port 4242, waiting for \"OK\" after every chunk.", long_about = None)]
struct Cli {
    /// Device host name or IP address
    host: String,

    /// Path to the firmware binary
    image: PathBuf,

    /// Connect/read timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Device port (default 4242)
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
        port: cli.port,
        ..defaults
    };
    config.validate()?;

    // v1.1 has no erase countdown, so nothing is paced
    efu::upload(
        &cli.host,
        &cli.image,
        ProtocolVersion::V11,
        &config,
        NoPacing,
        efu::print_progress,
    )?;

    println!("\nDone.");
    Ok(())
}

//! Ethernet firmware update (EFU) client.
//!
//! Uploads a binary image to a device listening on TCP. Two protocol
//! revisions exist; both open with the same 8-byte header and stream the
//! image in 2048-byte chunks, but differ in when the device acknowledges:
//!
//! - v1.1 (port 4242): "OK" after every chunk, no trailer.
//! - v1.2 (port 4243): "HD" after the header, "OK" after the last chunk,
//!   then a big-endian CRC32 trailer answered by "CC".
//!
//! Every failure is terminal. There is no retry and no resume.

pub mod error;
pub mod image;
pub mod io;
pub mod protocol;
pub mod v11;
pub mod v12;

#[cfg(test)]
mod mock;

use std::io::Write;
use std::net::Shutdown;
use std::path::Path;
use tracing::{debug, info};

use crate::config::EfuConfig;
use crate::pacing::Pacer;

pub use error::{AckFailure, Result, UploadError};
pub use image::FirmwareImage;
pub use protocol::ProtocolVersion;

/// Upload progress reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Seconds left in the v1.2 erase countdown
    EraseWait { remaining: u32 },
    /// Bytes of the image written (v1.2) or acknowledged (v1.1)
    Sent { sent: usize, total: usize },
}

/// Console progress on a single rewritten line
pub fn print_progress(progress: Progress) {
    match progress {
        Progress::EraseWait { remaining } => print!("Wait for erase: {}\r", remaining),
        Progress::Sent { sent, total } => print!("{}/{} bytes sent   \r", sent, total),
    }
    let _ = std::io::stdout().flush();
}

/// Device port for `version`, unless the config overrides it
pub fn target_port(version: ProtocolVersion, config: &EfuConfig) -> u16 {
    config.port.unwrap_or_else(|| version.default_port())
}

/// Load `image_path` and upload it to `host` with the given protocol version.
///
/// The socket is shut down after a successful upload and dropped on every
/// error path.
pub fn upload<P, F>(
    host: &str,
    image_path: &Path,
    version: ProtocolVersion,
    config: &EfuConfig,
    pacer: P,
    progress: F,
) -> Result<()>
where
    P: Pacer,
    F: FnMut(Progress),
{
    let image = FirmwareImage::load(image_path)?;
    info!("Firmware size: {} bytes", image.size());

    let stream = io::connect(host, target_port(version, config), config.timeout())?;

    match version {
        ProtocolVersion::V11 => {
            v11::Session::new(&stream)
                .with_chunk_size(config.chunk_size)
                .run(&image, progress)?;
        }
        ProtocolVersion::V12 => {
            info!("CRC32: {:08X}", image.crc32());
            v12::Session::new(&stream, pacer)
                .with_chunk_size(config.chunk_size)
                .with_erase_wait(config.erase_wait_secs)
                .run(&image, progress)?;
        }
    }

    if let Err(e) = stream.shutdown(Shutdown::Both) {
        debug!("Socket shutdown after upload failed: {}", e);
    }
    info!("Upload complete ({} {} bytes)", version, image.size());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::{NoPacing, RecordingPacer};
    use std::fs;
    use std::io::Read;
    use std::net::{TcpListener, TcpStream};
    use std::path::PathBuf;
    use std::thread;
    use std::time::Duration;

    fn write_image(name: &str, len: usize) -> (PathBuf, Vec<u8>) {
        let data: Vec<u8> = (0..len).map(|i| (i * 31 % 256) as u8).collect();
        let path = std::env::temp_dir().join(format!("efu_{}_{}.bin", name, std::process::id()));
        fs::write(&path, &data).unwrap();
        (path, data)
    }

    fn read_header(conn: &mut TcpStream) -> ([u8; 8], usize) {
        let mut header = [0u8; 8];
        conn.read_exact(&mut header).unwrap();
        let size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
        (header, size)
    }

    fn loopback_config(listener: &TcpListener) -> EfuConfig {
        EfuConfig {
            timeout_secs: 5,
            erase_wait_secs: 0,
            port: Some(listener.local_addr().unwrap().port()),
            ..EfuConfig::default()
        }
    }

    #[test]
    fn test_target_port_per_version() {
        let config = EfuConfig::default();
        assert_eq!(target_port(ProtocolVersion::V11, &config), 4242);
        assert_eq!(target_port(ProtocolVersion::V12, &config), 4243);

        let config = EfuConfig {
            port: Some(9000),
            ..EfuConfig::default()
        };
        assert_eq!(target_port(ProtocolVersion::V12, &config), 9000);
    }

    #[test]
    fn test_upload_v12_over_loopback() {
        let (path, data) = write_image("v12_ok", 5000);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = loopback_config(&listener);
        config.chunk_size = 1000;
        config.erase_wait_secs = 2;

        let device = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let (header, size) = read_header(&mut conn);
            conn.write_all(b"HD").unwrap();

            let mut image = vec![0u8; size];
            conn.read_exact(&mut image).unwrap();
            conn.write_all(b"OK").unwrap();

            let mut crc = [0u8; 4];
            conn.read_exact(&mut crc).unwrap();
            conn.write_all(b"CC").unwrap();
            (header, image, u32::from_be_bytes(crc))
        });

        let mut pacer = RecordingPacer::default();
        let mut progress = Vec::new();
        let result = upload(
            "127.0.0.1",
            &path,
            ProtocolVersion::V12,
            &config,
            &mut pacer,
            |p| progress.push(p),
        );
        let (header, image, crc) = device.join().unwrap();
        fs::remove_file(&path).unwrap();

        result.unwrap();
        assert_eq!(&header[..4], &[0xD1, 0x36, 0x4A, 0x12]);
        assert_eq!(image, data);
        assert_eq!(crc, crc32fast::hash(&data));

        // erase countdown plus one progress event per 1000-byte chunk
        assert_eq!(pacer.pauses, vec![Duration::from_secs(1); 2]);
        let sent: Vec<usize> = progress
            .iter()
            .filter_map(|p| match p {
                Progress::Sent { sent, .. } => Some(*sent),
                Progress::EraseWait { .. } => None,
            })
            .collect();
        assert_eq!(sent, vec![1000, 2000, 3000, 4000, 5000]);
    }

    #[test]
    fn test_upload_v11_over_loopback() {
        let (path, data) = write_image("v11_ok", 2048 * 3 + 500);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = loopback_config(&listener);

        let device = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let (header, size) = read_header(&mut conn);

            let mut image = Vec::with_capacity(size);
            let mut chunk_lens = Vec::new();
            while image.len() < size {
                let mut chunk = vec![0u8; (size - image.len()).min(2048)];
                conn.read_exact(&mut chunk).unwrap();
                chunk_lens.push(chunk.len());
                image.extend_from_slice(&chunk);
                conn.write_all(b"OK").unwrap();
            }
            (header, image, chunk_lens)
        });

        let result = upload("127.0.0.1", &path, ProtocolVersion::V11, &config, NoPacing, |_| {});
        let (header, image, chunk_lens) = device.join().unwrap();
        fs::remove_file(&path).unwrap();

        result.unwrap();
        assert_eq!(header[3], 0x11);
        assert_eq!(image, data);
        assert_eq!(chunk_lens, vec![2048, 2048, 2048, 500]);
    }

    #[test]
    fn test_upload_v12_rejected_header() {
        let (path, _) = write_image("v12_no", 300);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = loopback_config(&listener);

        let device = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            read_header(&mut conn);
            conn.write_all(b"NO").unwrap();
            // Hold the socket until the client hangs up
            let mut rest = Vec::new();
            let _ = conn.read_to_end(&mut rest);
        });

        let result = upload("127.0.0.1", &path, ProtocolVersion::V12, &config, NoPacing, |_| {});
        device.join().unwrap();
        fs::remove_file(&path).unwrap();

        match result {
            Err(UploadError::HeaderAck(AckFailure::Mismatch { received, .. })) => assert_eq!(&received, b"NO"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_upload_missing_image_never_connects() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let config = loopback_config(&listener);

        let result = upload(
            "127.0.0.1",
            Path::new("/nonexistent/fw.bin"),
            ProtocolVersion::V11,
            &config,
            NoPacing,
            |_| {},
        );
        assert!(matches!(result, Err(UploadError::FileRead { .. })));
        assert!(listener.accept().is_err());
    }
}

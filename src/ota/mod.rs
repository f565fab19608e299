// OTA (Over-The-Air) upload of a filesystem or firmware image

pub mod checksum;
pub mod client;
pub mod multipart;

pub use checksum::compute_checksum;
pub use client::OtaClient;
pub use multipart::MultipartUpload;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{UploadConfig, DEFAULT_DEVICE_ADDRESS};
use crate::prompt::prompt_with_default;

// OTA upload flow:
// 1. Make sure the image was built
// 2. Ask for the device address
// 3. MD5 the image
// 4. GET /ota/start with the hash, device must answer 200
// 5. POST the image to /ota/upload as multipart/form-data
// The device checks the MD5 itself and restarts.

/// Which partition the device writes the image to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OtaMode {
    /// SPIFFS filesystem image
    #[default]
    #[value(name = "fs")]
    Filesystem,
    /// Application firmware
    #[value(name = "fw")]
    Firmware,
}

impl OtaMode {
    /// Value of the `mode` query parameter on `/ota/start`
    pub fn as_query(&self) -> &'static str {
        match self {
            OtaMode::Filesystem => "fs",
            OtaMode::Firmware => "fw",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OtaMode::Filesystem => "SPIFFS",
            OtaMode::Firmware => "firmware",
        }
    }

    /// PlatformIO command producing the default image for this mode
    pub fn build_command(&self) -> &'static str {
        match self {
            OtaMode::Filesystem => "pio run --target buildfs",
            OtaMode::Firmware => "pio run",
        }
    }
}

#[derive(Debug, Error)]
pub enum OtaError {
    #[error("{} binary not found at {}", .mode.label(), .path.display())]
    ImageMissing { path: PathBuf, mode: OtaMode },

    #[error("Failed to read image {}: {source}", .path.display())]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read device address: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Error {action}: {source}")]
    Transport {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to start OTA update: {body}")]
    Rejected { status: u16, body: String },

    #[error("Upload failed: {status}, {body}")]
    UploadFailed { status: u16, body: String },
}

/// What a completed upload looked like, for the final summary
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub address: String,
    pub checksum: String,
    /// Plain-text body the device answered the upload with
    pub response: String,
}

/// Run the whole upload: checksum, begin, stream. Stops at the first error.
///
/// `input`/`output` carry the address prompt when `config.address` is unset.
pub fn run<R: BufRead, W: Write>(
    config: &UploadConfig,
    input: &mut R,
    output: &mut W,
) -> Result<UploadReport, OtaError> {
    if !config.image.is_file() {
        return Err(OtaError::ImageMissing {
            path: config.image.clone(),
            mode: config.mode,
        });
    }

    let address = match &config.address {
        Some(address) => address.clone(),
        None => prompt_with_default(input, output, "Enter ESP32 IP address", DEFAULT_DEVICE_ADDRESS)
            .map_err(OtaError::Prompt)?,
    };

    log::info!("Uploading {} to {}...", config.mode.label(), address);

    let checksum = compute_checksum(&config.image)?;
    log::info!("MD5 hash: {}", checksum);

    let client = OtaClient::new(&address, config.timeout)?;
    client.begin_update(config.mode, &checksum)?;
    let response = client.stream_image(&config.image, config.show_progress)?;

    Ok(UploadReport {
        address: client.address().to_string(),
        checksum,
        response,
    })
}

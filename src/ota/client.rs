use std::fs::File;
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Body, Client};
use reqwest::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;

use super::multipart::MultipartUpload;
use super::{OtaError, OtaMode};

/// Blocking client for the device's `/ota/start` and `/ota/upload` endpoints
pub struct OtaClient {
    http: Client,
    address: String,
}

/// Accepts `10.0.0.5`, `10.0.0.5:8080` or a pasted `http://10.0.0.5/`.
/// The device only speaks plain HTTP, so an `https://` prefix is dropped too.
fn normalize_address(address: &str) -> String {
    let address = address.trim();
    let address = ["http://", "https://"]
        .iter()
        .find(|scheme| {
            address.len() >= scheme.len()
                && address.as_bytes()[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
        })
        .map_or(address, |scheme| &address[scheme.len()..]);
    address.trim_end_matches('/').to_string()
}

impl OtaClient {
    /// `timeout` of `None` waits on the device indefinitely
    pub fn new(address: &str, timeout: Option<Duration>) -> Result<Self, OtaError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| OtaError::Transport {
                action: "creating HTTP client",
                source,
            })?;

        Ok(Self {
            http,
            address: normalize_address(address),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn start_url(&self, mode: OtaMode, checksum: &str) -> String {
        format!(
            "http://{}/ota/start?mode={}&hash={}",
            self.address,
            mode.as_query(),
            checksum
        )
    }

    pub fn upload_url(&self) -> String {
        format!("http://{}/ota/upload", self.address)
    }

    /// Ask the device to prepare for an image with the given MD5.
    /// Anything but 200 aborts the update before any bytes are sent.
    pub fn begin_update(&self, mode: OtaMode, checksum: &str) -> Result<(), OtaError> {
        let url = self.start_url(mode, checksum);
        log::debug!("GET {}", url);

        let transport = |source| OtaError::Transport {
            action: "starting OTA update",
            source,
        };
        let response = self.http.get(&url).send().map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;

        if status != StatusCode::OK {
            log::error!("Device refused OTA start: HTTP {}", status);
            return Err(OtaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("OTA update started successfully");
        Ok(())
    }

    /// Stream the image as a single-part multipart upload and return the
    /// device's response text. The file is read from disk while sending.
    pub fn stream_image(&self, path: &Path, show_progress: bool) -> Result<String, OtaError> {
        let unreadable = |source| OtaError::ImageUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unreadable)?;
        let file_size = file.metadata().map_err(unreadable)?.len();

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.bin".to_string());
        let upload = MultipartUpload::new(&filename);
        let content_length = upload.content_length(file_size);

        log::info!(
            "Uploading {} ({} bytes, {:.2} MB), body {} bytes",
            filename,
            file_size,
            file_size as f64 / 1024.0 / 1024.0,
            content_length
        );
        log::debug!("Multipart boundary: {}", upload.boundary());

        let pb = progress_bar(content_length, show_progress);
        let reader: Box<dyn Read + Send> = Box::new(pb.wrap_read(upload.body_reader(file)));

        let result = self
            .http
            .post(self.upload_url())
            .header(CONTENT_TYPE, upload.content_type())
            .header(CONTENT_LENGTH, content_length.to_string())
            .header(CONNECTION, "close")
            .body(Body::sized(reader, content_length))
            .send();
        pb.finish_and_clear();

        let transport = |source| OtaError::Transport {
            action: "uploading image",
            source,
        };
        let response = result.map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;

        if status != StatusCode::OK {
            log::error!("Upload rejected: HTTP {}", status);
            return Err(OtaError::UploadFailed {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Upload OK: {}", body);
        Ok(body)
    }
}

/// Byte progress for the upload body; hidden when not on a terminal
fn progress_bar(total: u64, enabled: bool) -> ProgressBar {
    if !enabled || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("   {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

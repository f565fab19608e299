//! Configuration for the three deployment tools. Every field has a default
//! matching the PlatformIO project layout; the CLI overrides them.

use std::path::PathBuf;
use std::time::Duration;

use crate::ota::OtaMode;

pub const DEFAULT_DEVICE_ADDRESS: &str = "192.168.11.144";
pub const SPIFFS_BIN_PATH: &str = ".pio/build/esp32dev/spiffs.bin";
pub const FIRMWARE_BIN_PATH: &str = ".pio/build/esp32dev/firmware.bin";

pub const STATIC_SOURCE_DIR: &str = "src/static";
pub const STATIC_TARGET_DIR: &str = "data";
pub const EXCLUDED_SUFFIXES: &[&str] = &[".h", ".cpp", ".sh"];

#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    /// Device host, prompted for when `None`
    pub address: Option<String>,
    pub image: PathBuf,
    pub mode: OtaMode,
    /// `None` blocks until the device answers
    pub timeout: Option<Duration>,
    pub show_progress: bool,
}

impl UploadConfig {
    /// Defaults for `mode`, picking the matching PlatformIO build artifact.
    pub fn for_mode(mode: OtaMode) -> Self {
        let image = match mode {
            OtaMode::Filesystem => SPIFFS_BIN_PATH,
            OtaMode::Firmware => FIRMWARE_BIN_PATH,
        };
        Self {
            address: None,
            image: PathBuf::from(image),
            mode,
            timeout: None,
            show_progress: true,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::for_mode(OtaMode::Filesystem)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub excluded_suffixes: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(STATIC_SOURCE_DIR),
            target: PathBuf::from(STATIC_TARGET_DIR),
            excluded_suffixes: EXCLUDED_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ByteFormat {
    /// Comma-joined decimal values
    #[default]
    List,
    /// `const uint8_t NAME[] PROGMEM = { ... };`
    CArray,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectConfig {
    pub format: ByteFormat,
    /// Identifier used by the C array output
    pub array_name: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            format: ByteFormat::List,
            array_name: "WEB_APP_GZ".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults() {
        let config = UploadConfig::default();
        assert_eq!(config.mode, OtaMode::Filesystem);
        assert_eq!(config.image, PathBuf::from(".pio/build/esp32dev/spiffs.bin"));
        assert!(config.address.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_firmware_mode_picks_firmware_image() {
        let config = UploadConfig::for_mode(OtaMode::Firmware);
        assert_eq!(config.image, PathBuf::from(".pio/build/esp32dev/firmware.bin"));
    }

    #[test]
    fn test_stage_defaults() {
        let config = StageConfig::default();
        assert_eq!(config.source, PathBuf::from("src/static"));
        assert_eq!(config.target, PathBuf::from("data"));
        assert_eq!(config.excluded_suffixes, vec![".h", ".cpp", ".sh"]);
    }
}

//! Host-side deployment tools for the ESP32 web app:
//! static asset staging, gzip asset inspection and SPIFFS/firmware OTA upload.

pub mod config;
pub mod inspector;
pub mod logging;
pub mod ota;
pub mod prompt;
pub mod stager;

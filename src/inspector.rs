//! Debug helper for the gzip'd web app embedded in firmware: compress a page
//! to a byte list for pasting into source, or turn a pasted list back into text.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::config::{ByteFormat, InspectConfig};

const C_ARRAY_VALUES_PER_LINE: usize = 16;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Nothing to inspect: input is empty")]
    EmptyInput,

    #[error("An error occurred while compressing: {0}")]
    Compress(#[source] io::Error),

    #[error("An error occurred while decompressing: {0}")]
    Decompress(#[source] io::Error),

    #[error("Invalid byte list: {0}")]
    ByteList(#[from] serde_json::Error),
}

/// Compress data using gzip
pub fn compress(text: &str) -> Result<Vec<u8>, InspectError> {
    if text.trim().is_empty() {
        return Err(InspectError::EmptyInput);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).map_err(InspectError::Compress)?;
    encoder.finish().map_err(InspectError::Compress)
}

/// Gunzip `bytes`; invalid UTF-8 is replaced rather than rejected
pub fn decompress(bytes: &[u8]) -> Result<String, InspectError> {
    if bytes.is_empty() {
        return Err(InspectError::EmptyInput);
    }
    let mut decoded = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .map_err(InspectError::Decompress)?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

/// Parse a pasted list such as `31,139,8,0` or `[31, 139, 8, 0,]`
pub fn parse_byte_list(input: &str) -> Result<Vec<u8>, InspectError> {
    let mut list = input.trim();
    if let Some(inner) = list.strip_prefix('[') {
        list = inner.strip_suffix(']').unwrap_or(inner);
    }
    let list = list.trim().trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    if list.is_empty() {
        return Err(InspectError::EmptyInput);
    }

    Ok(serde_json::from_str(&format!("[{}]", list))?)
}

pub fn format_bytes(bytes: &[u8], config: &InspectConfig) -> String {
    match config.format {
        ByteFormat::List => bytes
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(","),
        ByteFormat::CArray => {
            let rows: Vec<String> = bytes
                .chunks(C_ARRAY_VALUES_PER_LINE)
                .map(|row| {
                    let values: Vec<String> = row.iter().map(u8::to_string).collect();
                    format!("  {},", values.join(", "))
                })
                .collect();
            format!(
                "#define {name}_LEN {len}\nconst uint8_t {name}[] PROGMEM = {{\n{rows}\n}};",
                name = config.array_name,
                len = bytes.len(),
                rows = rows.join("\n")
            )
        }
    }
}

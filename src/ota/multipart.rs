use std::io::{Cursor, Read};

/// Form field the device's upload handler reads the image from
pub const FIELD_NAME: &str = "file";
/// Content type of the single part; the device ignores it
pub const PART_CONTENT_TYPE: &str = "application/macbinary";

const BOUNDARY_PREFIX: &str = "----WebKitFormBoundary";

/// A single-part `multipart/form-data` body wrapped around a file.
///
/// The body is `preamble + file bytes + postamble`, so the exact
/// `Content-Length` is known before a single file byte is read and the
/// file can be streamed straight from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    boundary: String,
    filename: String,
}

/// Browser-style boundary with 16 random hex digits
pub fn generate_boundary() -> String {
    format!("{}{:016x}", BOUNDARY_PREFIX, rand::random::<u64>())
}

impl MultipartUpload {
    pub fn new(filename: &str) -> Self {
        Self::with_boundary(generate_boundary(), filename)
    }

    pub fn with_boundary(boundary: impl Into<String>, filename: &str) -> Self {
        Self {
            boundary: boundary.into(),
            // Quotes would end the filename parameter early
            filename: filename.replace('"', "%22"),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn preamble(&self) -> Vec<u8> {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            self.boundary, FIELD_NAME, self.filename, PART_CONTENT_TYPE
        )
        .into_bytes()
    }

    pub fn postamble(&self) -> Vec<u8> {
        format!("\r\n--{}--\r\n", self.boundary).into_bytes()
    }

    /// Exact body length for a file of `file_size` bytes
    pub fn content_length(&self, file_size: u64) -> u64 {
        self.preamble().len() as u64 + file_size + self.postamble().len() as u64
    }

    /// Full body as a reader: preamble, then `file`, then postamble
    pub fn body_reader<R: Read>(&self, file: R) -> impl Read {
        Cursor::new(self.preamble())
            .chain(file)
            .chain(Cursor::new(self.postamble()))
    }
}

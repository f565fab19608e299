use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use md5::{Digest, Md5};

use super::OtaError;

const READ_CHUNK: usize = 64 * 1024;

/// MD5 of everything `reader` yields, as 32 lowercase hex chars
pub fn checksum_reader<R: Read>(reader: R) -> io::Result<String> {
    let mut reader = BufReader::with_capacity(READ_CHUNK, reader);
    let mut hasher = Md5::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Stream the image at `path` through MD5. This is the hash the device
/// checks the uploaded bytes against.
pub fn compute_checksum(path: &Path) -> Result<String, OtaError> {
    let unreadable = |source| OtaError::ImageUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    checksum_reader(file).map_err(unreadable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_vectors() {
        assert_eq!(checksum_reader(&b""[..]).unwrap(), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(checksum_reader(&b"abc"[..]).unwrap(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_file_checksum_is_stable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let first = compute_checksum(file.path()).unwrap();
        let second = compute_checksum(file.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert_eq!(first, checksum_reader(&data[..]).unwrap());
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = compute_checksum(&dir.path().join("spiffs.bin")).unwrap_err();
        assert!(matches!(err, OtaError::ImageUnreadable { .. }));
    }
}

//! BLAKE3 hashing for content comparison

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{Result, fs as fs_error};

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| fs_error::read_failed(path, &e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs_error::read_failed(path, &e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Whether two regular files have identical contents
///
/// Sizes are compared first so differing files are usually not read.
pub fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let len_a = a
        .metadata()
        .map_err(|e| fs_error::read_failed(a, &e))?
        .len();
    let len_b = b
        .metadata()
        .map_err(|e| fs_error::read_failed(b, &e))?
        .len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(hash_file(a)? == hash_file(b)?)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_hash_file() {
        let temp = create_temp_dir();
        let file_path = temp.path().join("test.txt");
        std::fs::write(&file_path, "test content").expect("write");

        let hash = hash_file(&file_path).expect("hash");
        assert!(hash.starts_with(HASH_PREFIX));
        assert_eq!(hash, hash_file(&file_path).expect("hash"));
    }

    #[test]
    fn test_hash_file_not_found() {
        let result = hash_file(Path::new("/nonexistent/file.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_same_contents() {
        let temp = create_temp_dir();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        let c = temp.path().join("c");
        let d = temp.path().join("d");
        std::fs::write(&a, "hello").expect("write");
        std::fs::write(&b, "hello").expect("write");
        std::fs::write(&c, "world").expect("write");
        std::fs::write(&d, "longer text").expect("write");

        assert!(same_contents(&a, &b).expect("compare"));
        assert!(!same_contents(&a, &c).expect("compare"));
        assert!(!same_contents(&a, &d).expect("compare"));
    }
}

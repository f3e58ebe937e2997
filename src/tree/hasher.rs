//! Content hashing for files using BLAKE3
//!
//! Digests are only ever used as an equality oracle between a source file
//! and its target counterpart. They are recomputed on every pass.

use blake3::Hasher;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Reference read size for streaming file content into the hasher
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Hash a file's full content, reading it in [`DEFAULT_CHUNK_SIZE`] chunks
///
/// Returns the 256-bit digest as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    hash_file_chunked(path, DEFAULT_CHUNK_SIZE)
}

/// Hash a file's full content, reading `chunk_size` bytes at a time
///
/// The digest does not depend on `chunk_size`. A zero chunk size is treated
/// as one byte.
pub fn hash_file_chunked(path: &Path, chunk_size: usize) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..read]);
    }

    Ok(hex::encode(hasher.finalize().as_bytes()))
}

/// Compute content hash for in-memory bytes, hex-encoded
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hex::encode(hasher.finalize().as_bytes())
}

//! SHA256 verification for downloaded artifacts.

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::error::{UpdateError, UpdateResult};

/// Verify the SHA256 checksum of a file.
pub async fn verify_sha256(path: &Path, expected: &str) -> UpdateResult<()> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let actual = hex::encode(hasher.finalize());

    // Normalize expected (remove any whitespace, lowercase)
    let expected = expected.trim().to_lowercase();

    if actual != expected {
        return Err(UpdateError::ChecksumMismatch { expected, actual });
    }

    Ok(())
}

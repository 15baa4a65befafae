//! Gateway checksum: `hex(sha256(canonical || salt_key)) + "###" + salt_index`.
//!
//! The same primitive authenticates outbound requests (canonical is the
//! base64 body followed by the API path) and inbound webhook deliveries and
//! status responses (canonical is the raw payload).

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

const SEPARATOR: &str = "###";
const DIGEST_HEX_LEN: usize = 64;

#[derive(Clone)]
pub struct ChecksumSigner {
    salt_key: SecretString,
    salt_index: u32,
}

impl ChecksumSigner {
    pub fn new(salt_key: SecretString, salt_index: u32) -> Self {
        Self {
            salt_key,
            salt_index,
        }
    }

    /// Checksum over the concatenation of `parts`.
    pub fn sign(&self, parts: &[&str]) -> String {
        format!(
            "{}{}{}",
            self.digest_hex(parts),
            SEPARATOR,
            self.salt_index
        )
    }

    /// Checks a claimed checksum against `parts`. Malformed values are a
    /// plain mismatch.
    pub fn verify(&self, parts: &[&str], claimed: &str) -> bool {
        let Some((digest, index)) = claimed.trim().split_once(SEPARATOR) else {
            return false;
        };
        if digest.len() != DIGEST_HEX_LEN || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
        if index.parse::<u32>().ok() != Some(self.salt_index) {
            return false;
        }
        constant_time_compare(&digest.to_ascii_lowercase(), &self.digest_hex(parts))
    }

    fn digest_hex(&self, parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
        }
        hasher.update(self.salt_key.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Domain tag prepended to every text digest.
const TEXT_DOMAIN: &str = "revtrack-text-v1";

/// BLAKE3 digest of one whole text version.
///
/// Digests are domain-separated so that a text digest can never collide with
/// a raw BLAKE3 hash of the same bytes used elsewhere. Patch artifacts record
/// the digest of both sides to detect being applied to the wrong text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest a text version.
    pub fn of_text(text: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(TEXT_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(text.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Returns `true` if `text` produces this digest.
    pub fn verify(&self, text: &str) -> bool {
        Self::of_text(text) == *self
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.short_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

//! Replacement transforms for sensitive substrings.
//!
//! Either a fixed mask token, or a lowercase-hex digest of the captured text.
//! Digests are deterministic, so equal plaintext always redacts to equal
//! output and downstream systems can still correlate values. With a key
//! configured the digest becomes an HMAC over the same algorithm, which keeps
//! short inputs such as SSN prefixes from being brute-forced offline.

use crate::error::{RedactionError, Result};
use hmac::digest::core_api::BlockSizeUser;
use hmac::digest::Digest;
use hmac::{Mac, SimpleHmac};
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha3::Sha3_256;

/// Default replacement when hashing is disabled.
pub const DEFAULT_MASK_TOKEN: &str = "****";

/// Minimum decoded length of a configured hash key.
pub const MIN_KEY_BYTES: usize = 16;

/// Digest algorithm applied to sensitive substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    /// Replace with the mask token.
    #[default]
    None,
    Md5,
    Sha1,
    /// SHA3-256.
    Sha3,
}

impl HashFunction {
    /// Parse a hash function name.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "" | "none" => Some(HashFunction::None),
            "md5" => Some(HashFunction::Md5),
            "sha1" => Some(HashFunction::Sha1),
            "sha3" => Some(HashFunction::Sha3),
            _ => None,
        }
    }

    /// Whether this function produces digests rather than the mask token.
    pub fn is_hashing(&self) -> bool {
        !matches!(self, HashFunction::None)
    }
}

impl std::fmt::Display for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HashFunction::None => "none",
            HashFunction::Md5 => "md5",
            HashFunction::Sha1 => "sha1",
            HashFunction::Sha3 => "sha3",
        };
        write!(f, "{}", s)
    }
}

/// The string transform applied to every rewritten capture group.
#[derive(Clone)]
pub struct HashDigest {
    function: HashFunction,
    mask_token: String,
    key: Option<Vec<u8>>,
}

impl std::fmt::Debug for HashDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashDigest")
            .field("function", &self.function)
            .field("mask_token", &self.mask_token)
            .field("keyed", &self.key.is_some())
            .finish()
    }
}

impl HashDigest {
    /// Unkeyed transform.
    pub fn new(function: HashFunction, mask_token: impl Into<String>) -> Self {
        Self {
            function,
            mask_token: mask_token.into(),
            key: None,
        }
    }

    /// Keyed transform from a base64-encoded key.
    pub fn with_key(
        function: HashFunction,
        mask_token: impl Into<String>,
        encoded_key: &str,
    ) -> Result<Self> {
        if !function.is_hashing() {
            return Err(RedactionError::Key(
                "hash_key requires hash_function md5, sha1 or sha3".to_string(),
            ));
        }
        let key = decode_key(encoded_key)?;
        Ok(Self {
            function,
            mask_token: mask_token.into(),
            key: Some(key),
        })
    }

    pub fn function(&self) -> HashFunction {
        self.function
    }

    pub fn mask_token(&self) -> &str {
        &self.mask_token
    }

    pub fn is_keyed(&self) -> bool {
        self.key.is_some()
    }

    /// Transform one captured substring.
    pub fn apply(&self, input: &str) -> String {
        match (self.function, self.key.as_deref()) {
            (HashFunction::None, _) => self.mask_token.clone(),
            (HashFunction::Md5, None) => hex_digest::<Md5>(input),
            (HashFunction::Sha1, None) => hex_digest::<Sha1>(input),
            (HashFunction::Sha3, None) => hex_digest::<Sha3_256>(input),
            (HashFunction::Md5, Some(key)) => hex_hmac::<Md5>(key, input),
            (HashFunction::Sha1, Some(key)) => hex_hmac::<Sha1>(key, input),
            (HashFunction::Sha3, Some(key)) => hex_hmac::<Sha3_256>(key, input),
        }
    }
}

impl Default for HashDigest {
    fn default() -> Self {
        Self::new(HashFunction::None, DEFAULT_MASK_TOKEN)
    }
}

fn decode_key(encoded: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| RedactionError::Key(format!("invalid base64: {}", e)))?;

    if decoded.len() < MIN_KEY_BYTES {
        return Err(RedactionError::Key(format!(
            "key must be at least {} bytes, got {}",
            MIN_KEY_BYTES,
            decoded.len()
        )));
    }
    Ok(decoded)
}

fn hex_digest<D: Digest>(input: &str) -> String {
    hex::encode(D::digest(input.as_bytes()))
}

fn hex_hmac<D: Digest + BlockSizeUser>(key: &[u8], input: &str) -> String {
    // SimpleHmac accepts keys of any length.
    match <SimpleHmac<D> as Mac>::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(input.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => hex_digest::<D>(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "AAECAwQFBgcICQoLDA0ODw=="; // bytes 0..16

    #[test]
    fn test_mask_ignores_input() {
        let digest = HashDigest::default();
        assert_eq!(digest.apply("123-45-"), "****");
        assert_eq!(digest.apply(""), "****");
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(
            HashDigest::new(HashFunction::Md5, "x").apply("abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            HashDigest::new(HashFunction::Sha1, "x").apply("abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            HashDigest::new(HashFunction::Sha3, "x").apply("abc"),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn test_hash_stability_and_distinctness() {
        for function in [HashFunction::Md5, HashFunction::Sha1, HashFunction::Sha3] {
            let digest = HashDigest::new(function, "****");
            assert_eq!(digest.apply("123-45-"), digest.apply("123-45-"));
            assert_ne!(digest.apply("123-45-"), digest.apply("987-65-"));
        }
    }

    #[test]
    fn test_keyed_differs_from_plain() {
        let plain = HashDigest::new(HashFunction::Sha3, "****");
        let keyed = HashDigest::with_key(HashFunction::Sha3, "****", TEST_KEY).unwrap();
        assert!(keyed.is_keyed());
        assert_ne!(plain.apply("secret"), keyed.apply("secret"));
        assert_eq!(keyed.apply("secret"), keyed.apply("secret"));
        assert_eq!(keyed.apply("secret").len(), 64);
    }

    #[test]
    fn test_key_requires_hashing() {
        let err = HashDigest::with_key(HashFunction::None, "****", TEST_KEY).unwrap_err();
        assert!(matches!(err, RedactionError::Key(_)));
    }

    #[test]
    fn test_short_key_rejected() {
        let err = HashDigest::with_key(HashFunction::Md5, "****", "AAEC").unwrap_err();
        assert!(err.to_string().contains("at least 16 bytes"));
        assert!(HashDigest::with_key(HashFunction::Md5, "****", "not base64!").is_err());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(HashFunction::parse_str("SHA3"), Some(HashFunction::Sha3));
        assert_eq!(HashFunction::parse_str(""), Some(HashFunction::None));
        assert_eq!(HashFunction::parse_str("sha256"), None);
        assert_eq!(HashFunction::Md5.to_string(), "md5");
    }
}

/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

use base64::{engine::general_purpose::STANDARD as base64_engine, Engine};
use ring::digest;
use std::fmt;

/// Length of a SHA-1 digest in bytes.
pub const SHA1_LEN: usize = 20;

/// Base64 (standard alphabet, padded) of a certificate's SHA-1 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyHash(String);

impl KeyHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for KeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct CryptoEngine;

impl CryptoEngine {
    pub fn sha1_digest(data: &[u8]) -> [u8; SHA1_LEN] {
        let d = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data);
        let mut out = [0u8; SHA1_LEN];
        out.copy_from_slice(d.as_ref());
        out
    }

    pub fn compute_sha1(data: &[u8]) -> String {
        base64_engine.encode(Self::sha1_digest(data))
    }

    /// The key hash consoles expect: SHA-1 over the certificate bytes,
    /// base64 encoded with surrounding whitespace trimmed.
    pub fn key_hash(certificate: &[u8]) -> KeyHash {
        KeyHash(Self::compute_sha1(certificate).trim().to_string())
    }

    /// `keytool` style fingerprint, e.g. `BE:EA:CD:...`.
    pub fn sha1_fingerprint(data: &[u8]) -> String {
        Self::colon_hex(&Self::sha1_digest(data))
    }

    pub fn sha256_fingerprint(data: &[u8]) -> String {
        Self::colon_hex(digest::digest(&digest::SHA256, data).as_ref())
    }

    fn colon_hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_of_known_vector() {
        assert_eq!(CryptoEngine::compute_sha1(b"abc"), "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
    }

    #[test]
    fn key_hash_decodes_to_digest_length() {
        let hash = CryptoEngine::key_hash(b"certificate bytes");
        let raw = base64_engine.decode(hash.as_str()).unwrap();
        assert_eq!(raw.len(), SHA1_LEN);
        assert_eq!(hash.as_str().len(), 28);
        assert!(!hash.as_str().ends_with('\n'));
    }

    #[test]
    fn fingerprints_are_upper_hex_pairs() {
        let fp = CryptoEngine::sha1_fingerprint(b"abc");
        assert_eq!(fp, "A9:99:3E:36:47:06:81:6A:BA:3E:25:71:78:50:C2:6C:9C:D0:D8:9D");
        assert_eq!(CryptoEngine::sha256_fingerprint(b"abc").split(':').count(), 32);
    }
}

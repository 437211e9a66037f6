/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Error types and handling for the KeyHashRust library.
//! Defines everything that can go wrong while reading package signing metadata.

use std::{fmt, io};

/// Comprehensive error type for metadata retrieval and digest computation.
#[derive(Debug)]
pub enum KeyHashError {
    /// I/O errors during file operations
    Io(io::Error),
    /// ZIP format errors while reading an APK
    Zip(zip::result::ZipError),
    /// PEM format parsing errors
    Pem(pem::PemError),
    /// A signature blob is not a valid X.509 certificate
    Certificate(String),
    /// Malformed APK Signing Block (scheme v2/v3)
    SigningBlock(String),
    /// Malformed PKCS#7 signature block (scheme v1)
    Pkcs7(String),
    /// The package manager has no record of the requested package
    PackageNotFound(String),
    /// Configuration or setup errors
    Config(String),
}

impl fmt::Display for KeyHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyHashError::Io(e) => write!(f, "I/O Error: {}", e),
            KeyHashError::Zip(e) => write!(f, "ZIP Error: {}", e),
            KeyHashError::Pem(e) => write!(f, "PEM Parsing Error: {}", e),
            KeyHashError::Certificate(s) => write!(f, "Certificate Error: {}", s),
            KeyHashError::SigningBlock(s) => write!(f, "APK Signing Block Error: {}", s),
            KeyHashError::Pkcs7(s) => write!(f, "PKCS#7 Error: {}", s),
            KeyHashError::PackageNotFound(s) => write!(f, "Package not found: {}", s),
            KeyHashError::Config(s) => write!(f, "Configuration Error: {}", s),
        }
    }
}

impl std::error::Error for KeyHashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeyHashError::Io(e) => Some(e),
            KeyHashError::Zip(e) => Some(e),
            KeyHashError::Pem(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for KeyHashError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<zip::result::ZipError> for KeyHashError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(e)
    }
}

impl From<pem::PemError> for KeyHashError {
    fn from(e: pem::PemError) -> Self {
        Self::Pem(e)
    }
}

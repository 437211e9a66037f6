/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Package signing metadata as the host platform exposes it.

use crate::error::KeyHashError;
use std::cell::RefCell;

/// One signing certificate attached to a package, as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Signature {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Read-only view of the host's package-management facility.
pub trait PackageManager {
    /// Signing signatures of `package_name`, in the order the host reports
    /// them. `Ok(None)` means the host has no signature list for the package.
    fn signatures(&self, package_name: &str) -> Result<Option<Vec<Signature>>, KeyHashError>;
}

/// A package whose metadata is already in memory.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub package_name: String,
    pub signatures: Option<Vec<Signature>>,
}

impl InstalledPackage {
    pub fn new(package_name: impl Into<String>, signatures: Option<Vec<Signature>>) -> Self {
        Self {
            package_name: package_name.into(),
            signatures,
        }
    }
}

impl PackageManager for InstalledPackage {
    fn signatures(&self, package_name: &str) -> Result<Option<Vec<Signature>>, KeyHashError> {
        if package_name != self.package_name {
            return Err(KeyHashError::PackageNotFound(package_name.to_string()));
        }
        Ok(self.signatures.clone())
    }
}

/// Forwards to another package manager and keeps the answer, so a caller can
/// inspect what was reported without querying the host again.
pub struct RecordingPackageManager<'a> {
    inner: &'a dyn PackageManager,
    seen: RefCell<Option<Vec<Signature>>>,
}

impl<'a> RecordingPackageManager<'a> {
    pub fn new(inner: &'a dyn PackageManager) -> Self {
        Self {
            inner,
            seen: RefCell::new(None),
        }
    }

    /// Signatures of the last successful lookup; `None` before one or when
    /// the host had no list.
    pub fn recorded(&self) -> Option<Vec<Signature>> {
        self.seen.borrow().clone()
    }
}

impl PackageManager for RecordingPackageManager<'_> {
    fn signatures(&self, package_name: &str) -> Result<Option<Vec<Signature>>, KeyHashError> {
        let signatures = self.inner.signatures(package_name)?;
        *self.seen.borrow_mut() = signatures.clone();
        Ok(signatures)
    }
}

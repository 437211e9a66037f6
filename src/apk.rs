/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Package signing metadata read from an APK on disk.
//!
//! Signatures come from the newest scheme the archive carries, the same
//! precedence the platform package manager applies: v3, then v2, then v1.

use crate::{
    error::KeyHashError,
    package::{PackageManager, Signature},
    pkcs7,
    signing_block::{Scheme, SigningBlock},
    ui::Ui,
    META_INF_DIR,
};
use std::{
    cell::Cell,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use zip::ZipArchive;

const V1_BLOCK_EXTENSIONS: [&str; 3] = [".RSA", ".DSA", ".EC"];

/// An APK file acting as the package manager for one package. The archive
/// is read each time signatures are requested.
pub struct ApkPackage<'a> {
    path: PathBuf,
    package_name: String,
    scheme: Cell<Option<Scheme>>,
    ui: &'a Ui,
}

impl<'a> ApkPackage<'a> {
    /// The package name defaults to the file stem.
    pub fn new(path: &Path, package_name: Option<&str>, ui: &'a Ui) -> Result<Self, KeyHashError> {
        let package_name = match package_name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    KeyHashError::Config(format!(
                        "Cannot derive a package name from {}. Use --package.",
                        path.display()
                    ))
                })?,
        };
        Ok(Self {
            path: path.to_path_buf(),
            package_name,
            scheme: Cell::new(None),
            ui,
        })
    }

    /// Reads the signing certificates and the scheme they came from.
    /// `(None, [])` for an unsigned archive.
    pub fn read_signatures(&self) -> Result<(Option<Scheme>, Vec<Signature>), KeyHashError> {
        let ui = self.ui;
        let mut reader = BufReader::new(File::open(&self.path)?);
        let from_block = match SigningBlock::find(&mut reader)? {
            Some(block) => {
                ui.very_verbose(&format!(
                    "APK Signing Block present, IDs: {}",
                    block
                        .ids()
                        .map(|id| format!("{:#010x}", id))
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
                block.signer_certificates()?
            }
            None => {
                ui.very_verbose("No APK Signing Block");
                None
            }
        };

        let (scheme, signatures) = match from_block {
            Some((scheme, sigs)) => (Some(scheme), sigs),
            None => {
                let sigs = Self::v1_signatures(&self.path, ui)?;
                if sigs.is_empty() {
                    (None, sigs)
                } else {
                    (Some(Scheme::V1), sigs)
                }
            }
        };

        match scheme {
            Some(scheme) => ui.verbose(&format!(
                "Signature scheme {}: {} certificate(s)",
                scheme,
                signatures.len()
            )),
            None => ui.verbose("No signature scheme found, APK is unsigned"),
        }
        self.scheme.set(scheme);
        Ok((scheme, signatures))
    }

    /// Signer certificates of every `META-INF` signature block, in archive order.
    fn v1_signatures(path: &Path, ui: &Ui) -> Result<Vec<Signature>, KeyHashError> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        let mut out = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            if !Self::is_v1_block(&name) {
                continue;
            }
            ui.debug(&format!("Reading signature block {}", name));
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            let certs = pkcs7::signer_certificates(&bytes)
                .map_err(|e| KeyHashError::Pkcs7(format!("{}: {}", name, e)))?;
            out.extend(certs);
        }
        Ok(out)
    }

    fn is_v1_block(name: &str) -> bool {
        let Some(file) = name.strip_prefix(META_INF_DIR) else {
            return false;
        };
        if file.contains('/') {
            return false;
        }
        let upper = file.to_ascii_uppercase();
        V1_BLOCK_EXTENSIONS.iter().any(|ext| upper.ends_with(ext))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Scheme seen by the last successful read; `None` before any read or
    /// when the APK is unsigned.
    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme.get()
    }
}

impl PackageManager for ApkPackage<'_> {
    fn signatures(&self, package_name: &str) -> Result<Option<Vec<Signature>>, KeyHashError> {
        if package_name != self.package_name {
            return Err(KeyHashError::PackageNotFound(package_name.to_string()));
        }
        let (_, signatures) = self.read_signatures()?;
        if signatures.is_empty() {
            return Ok(None);
        }
        Ok(Some(signatures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_block_names() {
        assert!(ApkPackage::is_v1_block("META-INF/CERT.RSA"));
        assert!(ApkPackage::is_v1_block("META-INF/release.ec"));
        assert!(ApkPackage::is_v1_block("META-INF/ANDROIDD.DSA"));
        assert!(!ApkPackage::is_v1_block("META-INF/CERT.SF"));
        assert!(!ApkPackage::is_v1_block("META-INF/nested/CERT.RSA"));
        assert!(!ApkPackage::is_v1_block("assets/CERT.RSA"));
    }
}

/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! The key-hash reporter.
//!
//! On startup it asks the package manager for the signing certificates of the
//! running package and logs the base64 SHA-1 of each under [`KEY_HASH_TAG`].
//! Failures are logged and swallowed; they never reach the host.

use crate::{
    crypto::{CryptoEngine, KeyHash},
    error::KeyHashError,
    lifecycle::{HostContext, StartupHooks},
    package::PackageManager,
    KEY_HASH_TAG,
};

pub const FAILURE_MESSAGE: &str = "Failed to compute key hash";

/// How a single report ended. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// This many key hashes were logged.
    Reported(usize),
    NoSignatures,
    Failed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyHashReporter;

impl KeyHashReporter {
    pub fn new() -> Self {
        Self
    }

    /// Startup callback. Logs one debug line per signature, a warning when
    /// there are none, or a single error line when anything fails.
    pub fn on_create(&self, ctx: &HostContext<'_>) -> ReportOutcome {
        match self.key_hashes(ctx.package_manager, ctx.package_name) {
            Ok(Some(hashes)) if !hashes.is_empty() => {
                for hash in &hashes {
                    ctx.log.debug(KEY_HASH_TAG, hash.as_str());
                }
                ReportOutcome::Reported(hashes.len())
            }
            Ok(_) => {
                ctx.log.warn(
                    KEY_HASH_TAG,
                    &format!("No signatures found for package {}", ctx.package_name),
                );
                ReportOutcome::NoSignatures
            }
            Err(e) => {
                ctx.log.error_with(KEY_HASH_TAG, FAILURE_MESSAGE, &e);
                ReportOutcome::Failed
            }
        }
    }

    /// Key hashes of `package_name`'s signatures, in host order, without
    /// logging anything.
    pub fn key_hashes(
        &self,
        manager: &dyn PackageManager,
        package_name: &str,
    ) -> Result<Option<Vec<KeyHash>>, KeyHashError> {
        let signatures = manager.signatures(package_name)?;
        Ok(signatures.map(|sigs| {
            sigs.iter()
                .map(|sig| CryptoEngine::key_hash(sig.as_bytes()))
                .collect()
        }))
    }

    pub fn register(self, hooks: &mut StartupHooks) {
        hooks.register(move |ctx| {
            // The outcome is already in the log.
            let _ = self.on_create(ctx);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        log::{MemoryLog, Severity},
        package::{InstalledPackage, Signature},
    };
    use base64::{engine::general_purpose::STANDARD, Engine};

    struct BrokenPackageManager;

    impl PackageManager for BrokenPackageManager {
        fn signatures(&self, _: &str) -> Result<Option<Vec<Signature>>, KeyHashError> {
            Err(KeyHashError::Config("package service unavailable".into()))
        }
    }

    fn report(pkg: &dyn PackageManager, name: &str) -> (ReportOutcome, MemoryLog) {
        let log = MemoryLog::new();
        let outcome = KeyHashReporter::new().on_create(&HostContext::new(name, pkg, &log));
        (outcome, log)
    }

    #[test]
    fn one_debug_line_per_signature() {
        let sigs = (0u8..3).map(|i| Signature::new(vec![i; 64])).collect();
        let pkg = InstalledPackage::new("com.example.app", Some(sigs));
        let (outcome, log) = report(&pkg, "com.example.app");

        assert_eq!(outcome, ReportOutcome::Reported(3));
        let records = log.records();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.severity, Severity::Debug);
            assert_eq!(record.tag, "KeyHash");
            assert_eq!(STANDARD.decode(&record.message).unwrap().len(), 20);
            assert_eq!(
                record.message,
                CryptoEngine::compute_sha1(&vec![i as u8; 64])
            );
        }
    }

    #[test]
    fn known_bytes_give_precomputed_hash() {
        let pkg = InstalledPackage::new("com.example.app", Some(vec![Signature::new(b"abc".to_vec())]));
        let (_, log) = report(&pkg, "com.example.app");
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
    }

    #[test]
    fn empty_list_warns_once() {
        let pkg = InstalledPackage::new("com.example.app", Some(Vec::new()));
        let (outcome, log) = report(&pkg, "com.example.app");

        assert_eq!(outcome, ReportOutcome::NoSignatures);
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Warn);
        assert_eq!(records[0].message, "No signatures found for package com.example.app");
    }

    #[test]
    fn missing_list_warns_once() {
        let pkg = InstalledPackage::new("com.example.app", None);
        let (outcome, log) = report(&pkg, "com.example.app");
        assert_eq!(outcome, ReportOutcome::NoSignatures);
        assert_eq!(log.with_severity(Severity::Warn).len(), 1);
    }

    #[test]
    fn failure_is_logged_not_raised() {
        let (outcome, log) = report(&BrokenPackageManager, "com.example.app");

        assert_eq!(outcome, ReportOutcome::Failed);
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
        assert_eq!(records[0].message, FAILURE_MESSAGE);
        assert!(records[0]
            .cause
            .as_deref()
            .unwrap()
            .contains("package service unavailable"));
    }

    #[test]
    fn registered_reporter_runs_on_launch() {
        let pkg = InstalledPackage::new("com.example.app", Some(vec![Signature::new(b"abc".to_vec())]));
        let log = MemoryLog::new();
        let mut hooks = StartupHooks::new();
        KeyHashReporter::new().register(&mut hooks);
        assert_eq!(hooks.launch(&HostContext::new("com.example.app", &pkg, &log)), 1);
        assert_eq!(log.with_severity(Severity::Debug).len(), 1);
    }
}

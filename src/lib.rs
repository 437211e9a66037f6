/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! # KeyHashRust Library
//!
//! Computes the SHA-1 "key hash" of the certificates an Android package is
//! signed with, the value social-login consoles ask for when they report an
//! invalid key hash. It provides the core functionality for the
//! `keyhashrust` command-line tool and a startup hook for embedding hosts.

pub mod apk;
pub mod certificate;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod lifecycle;
pub mod log;
pub mod package;
pub mod pkcs7;
pub mod reporter;
pub mod signing_block;
pub mod ui;

pub const APP_NAME: &str = "KeyHashRust";
pub const APP_BIN_NAME: &str = "keyhashrust";
pub const APP_VERSION: &str = "1.0.0";
pub const APP_AUTHOR: &str = "Tiash H Kabir / @MrCarb0n";
pub const APP_ABOUT: &str =
    "Report the SHA-1 key hash of the certificates an Android package is signed with.";

/// Log tag every reporter line is written under.
pub const KEY_HASH_TAG: &str = "KeyHash";

pub const META_INF_DIR: &str = "META-INF/";

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

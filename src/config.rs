/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Configuration parsing and validation for the KeyHashRust CLI.

use crate::error::KeyHashError;
use clap::ArgMatches;
use std::io;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Where the signatures to report come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Signing certificates of an APK
    Apk,
    /// Certificates given directly as PEM/DER files
    Certificates,
}

/// Application configuration parsed from command-line arguments.
#[derive(Debug)]
pub struct Config {
    /// Execution mode (apk/cert)
    pub mode: Mode,
    /// Input files; exactly one in APK mode
    pub input_paths: Vec<PathBuf>,
    /// Package identifier reported in log lines
    pub package_name: Option<String>,
    /// Verbose report after the key hashes
    pub verbose: bool,
    /// Temporary file for stdin input handling
    pub _input_temp_file: Option<NamedTempFile>,
}

impl Config {
    /// Parse configuration from command-line argument matches.
    ///
    /// # Arguments
    /// * `matches` - The clap argument matches structure
    /// * `ui` - User interface for verbose output
    ///
    /// # Returns
    /// Configuration object or an error
    pub fn from_matches(matches: &ArgMatches, ui: &crate::ui::Ui) -> Result<Self, KeyHashError> {
        let verbose = matches.get_count("verbose") > 0 && !matches.get_flag("quiet");

        let mut config = match matches.subcommand() {
            Some(("apk", sub_matches)) => Self::parse_apk(sub_matches, ui)?,
            Some(("cert", sub_matches)) => Self::parse_cert(sub_matches, ui)?,
            _ => {
                return Err(KeyHashError::Config(
                    "No subcommand provided. Use 'apk' or 'cert'.".into(),
                ))
            }
        };
        config.verbose = verbose;
        Ok(config)
    }

    fn parse_apk(matches: &ArgMatches, ui: &crate::ui::Ui) -> Result<Self, KeyHashError> {
        let input_str = matches
            .get_one::<String>("input")
            .ok_or_else(|| KeyHashError::Config("No input APK specified".into()))?;
        let package_name = Self::package_name(matches)?;

        let (input_path, input_temp_file) = if input_str == "-" {
            if package_name.is_none() {
                return Err(KeyHashError::Config(
                    "Reading an APK from stdin requires --package.".into(),
                ));
            }
            let mut temp = NamedTempFile::new().map_err(|e| {
                KeyHashError::Config(format!("Failed to create temp file for stdin: {}", e))
            })?;
            ui.debug(&format!(
                "Created temporary file for stdin input: {:?}",
                temp.path()
            ));
            let mut stdin = io::stdin();
            io::copy(&mut stdin, &mut temp)
                .map_err(|e| KeyHashError::Config(format!("Failed to read stdin: {}", e)))?;
            (temp.path().to_path_buf(), Some(temp))
        } else {
            (Self::existing_file(input_str, "Input file", ui)?, None)
        };

        Ok(Self {
            mode: Mode::Apk,
            input_paths: vec![input_path],
            package_name,
            verbose: false,
            _input_temp_file: input_temp_file,
        })
    }

    fn parse_cert(matches: &ArgMatches, ui: &crate::ui::Ui) -> Result<Self, KeyHashError> {
        let inputs: Vec<&String> = matches
            .get_many::<String>("input")
            .map(|v| v.collect())
            .unwrap_or_default();
        if inputs.is_empty() {
            return Err(KeyHashError::Config("No certificate file specified".into()));
        }

        let input_paths = inputs
            .into_iter()
            .map(|s| Self::existing_file(s, "Certificate file", ui))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            mode: Mode::Certificates,
            input_paths,
            package_name: Self::package_name(matches)?,
            verbose: false,
            _input_temp_file: None,
        })
    }

    fn package_name(matches: &ArgMatches) -> Result<Option<String>, KeyHashError> {
        match matches.get_one::<String>("package") {
            Some(name) if name.trim().is_empty() => {
                Err(KeyHashError::Config("Package name must not be empty".into()))
            }
            Some(name) => Ok(Some(name.trim().to_string())),
            None => Ok(None),
        }
    }

    fn existing_file(
        input: &str,
        what: &str,
        ui: &crate::ui::Ui,
    ) -> Result<PathBuf, KeyHashError> {
        let path = PathBuf::from(input);
        if !path.exists() {
            return Err(KeyHashError::Config(format!(
                "{} does not exist: {}",
                what,
                path.display()
            )));
        }
        // Validate that input is a readable file
        let metadata = std::fs::metadata(&path).map_err(|e| {
            KeyHashError::Config(format!("Cannot access {} {}: {}", what, path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(KeyHashError::Config(format!(
                "{} is not a regular file: {}",
                what,
                path.display()
            )));
        }
        ui.debug(&format!("Using {}: {}", what.to_lowercase(), path.display()));
        Ok(path)
    }
}

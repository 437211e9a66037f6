/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

use crate::{
    apk::ApkPackage,
    certificate::{self, CertificateFiles},
    config::{Config, Mode},
    error::KeyHashError,
    lifecycle::HostContext,
    package::{RecordingPackageManager, Signature},
    reporter::{KeyHashReporter, ReportOutcome},
    ui::Ui,
    *,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;

pub fn build_command() -> Command {
    let package_arg = Arg::new("package")
        .short('n')
        .long("package")
        .value_name("ID")
        .help("Package identifier to report under (default: input file name)");

    Command::new(APP_NAME)
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .disable_version_flag(true)
        .help_template("{about-with-newline}{usage-heading} {usage}\n\n{all-args}\n")
        .subcommand_required(false)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("apk")
                .about("Report the key hash of an APK's signing certificates")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("input")
                        .required(true)
                        .help("Path to the APK (- for stdin)")
                        .index(1),
                )
                .arg(package_arg.clone()),
        )
        .subcommand(
            Command::new("cert")
                .about("Report the key hash of PEM/DER certificate files")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("input")
                        .required(true)
                        .num_args(1..)
                        .help("Certificate files (PEM, possibly several per file, or DER)")
                        .index(1),
                )
                .arg(package_arg),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Set verbosity level (-v for verbose, -vv for more verbose, -vvv for debug)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Suppress all output except key hashes and errors"),
        )
        .arg(
            Arg::new("version_custom")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information"),
        )
}

/// `Ok(None)` when nothing was reported, e.g. `--version`.
pub fn run() -> Result<Option<ReportOutcome>, KeyHashError> {
    let binary_name = std::env::args()
        .next()
        .and_then(|p| {
            Path::new(&p)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| APP_BIN_NAME.to_string());

    let matches = build_command().bin_name(binary_name).get_matches();
    run_with_matches(&matches)
}

pub fn run_with_matches(matches: &ArgMatches) -> Result<Option<ReportOutcome>, KeyHashError> {
    if matches.get_flag("version_custom") {
        let mut ui = Ui::new(0, false, true);
        ui.enable_colors_if_supported();
        ui.print_version_info();
        return Ok(None);
    }

    let verbosity_level = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    let mut ui = Ui::new(verbosity_level, quiet, true);

    // Enable colors if supported on the platform
    ui.enable_colors_if_supported();

    if matches.subcommand().is_none() {
        return Err(KeyHashError::Config("No command provided".into()));
    }

    let outcome = run_logic(matches, &ui)?;
    if let ReportOutcome::Reported(n) = outcome {
        ui.success(&format!("{} key hash(es) reported.", n));
    }

    Ok(Some(outcome))
}

fn run_logic(matches: &ArgMatches, ui: &Ui) -> Result<ReportOutcome, KeyHashError> {
    let config = Config::from_matches(matches, ui)?;
    let reporter = KeyHashReporter::new();

    match config.mode {
        Mode::Apk => {
            let input = &config.input_paths[0];
            let apk = ApkPackage::new(input, config.package_name.as_deref(), ui)?;

            if config._input_temp_file.is_some() {
                ui.info("Source: <stdin pipe>");
            } else {
                ui.info(&format!("Source: {}", input.display()));
            }
            ui.info(&format!("Package: {}", apk.package_name()));

            let recorder = RecordingPackageManager::new(&apk);
            let outcome =
                reporter.on_create(&HostContext::new(apk.package_name(), &recorder, ui));

            if config.verbose {
                let scheme = apk
                    .scheme()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string());
                report_summary(
                    ui,
                    apk.package_name(),
                    outcome,
                    &recorder.recorded().unwrap_or_default(),
                    &[("Scheme", scheme)],
                );
            }
            Ok(outcome)
        }
        Mode::Certificates => {
            let package_name = match config.package_name.clone() {
                Some(name) => name,
                None => default_package_name(&config.input_paths[0])?,
            };
            let files = CertificateFiles::new(package_name, &config.input_paths, ui);

            for path in files.sources() {
                ui.info(&format!("Source: {}", path.display()));
            }
            ui.info(&format!("Package: {}", files.package_name()));

            let recorder = RecordingPackageManager::new(&files);
            let outcome =
                reporter.on_create(&HostContext::new(files.package_name(), &recorder, ui));

            if config.verbose {
                report_summary(
                    ui,
                    files.package_name(),
                    outcome,
                    &recorder.recorded().unwrap_or_default(),
                    &[("Files", files.sources().len().to_string())],
                );
            }
            Ok(outcome)
        }
    }
}

fn default_package_name(path: &Path) -> Result<String, KeyHashError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            KeyHashError::Config(format!(
                "Cannot derive a package name from {}. Use --package.",
                path.display()
            ))
        })
}

/// Verbose report: outcome, then one block per reported certificate.
fn report_summary(
    ui: &Ui,
    package_name: &str,
    outcome: ReportOutcome,
    signatures: &[Signature],
    extra: &[(&str, String)],
) {
    let status = match outcome {
        ReportOutcome::Reported(n) => format!("{} key hash(es)", n),
        ReportOutcome::NoSignatures => "No signatures".to_string(),
        ReportOutcome::Failed => "Failed".to_string(),
    };
    let mut fields = vec![
        ("Status", status),
        ("Package", package_name.to_string()),
    ];
    fields.extend(extra.iter().cloned());
    ui.print_summary("Key Hash Report", &fields);

    for (i, sig) in signatures.iter().enumerate() {
        let key_hash = crypto::CryptoEngine::key_hash(sig.as_bytes()).into_string();
        match certificate::describe(sig.as_bytes()) {
            Ok(summary) => ui.print_summary(
                &format!("Certificate #{}", i + 1),
                &[
                    ("Subject", summary.subject),
                    ("Issuer", summary.issuer),
                    ("Serial", summary.serial),
                    ("Valid", format!("{} .. {}", summary.not_before, summary.not_after)),
                    ("KeyHash", key_hash),
                    ("SHA1", summary.sha1_fingerprint),
                    ("SHA256", summary.sha256_fingerprint),
                ],
            ),
            Err(e) => {
                ui.debug(&format!("Certificate #{} not describable: {}", i + 1, e));
                ui.print_summary(
                    &format!("Signature #{}", i + 1),
                    &[
                        ("Bytes", sig.len().to_string()),
                        ("KeyHash", key_hash),
                    ],
                );
            }
        }
    }
}

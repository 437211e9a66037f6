/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Console output: leveled diagnostics on stderr, key hashes on stdout.

use crate::{
    log::{LogRecord, LogSink, Severity},
    APP_ABOUT, APP_AUTHOR, APP_NAME, APP_VERSION, KEY_HASH_TAG,
};
use colored::*;
use std::{
    ffi::OsStr,
    io::{self, Write},
    sync::Mutex,
};

type Stream = Mutex<Box<dyn Write + Send>>;

pub struct Ui {
    pub verbose: bool,
    pub very_verbose: bool,
    pub debug: bool,
    silent: bool,
    colors: bool,
    out: Stream,
    err: Stream,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new(0, false, true)
    }
}

/// Colors are used when requested, unless `NO_COLOR` is set to anything
/// but the empty string.
pub fn colors_wanted(requested: bool, no_color: Option<&OsStr>) -> bool {
    requested && no_color.map_or(true, |v| v.is_empty())
}

impl Ui {
    /// Verbosity `level`: 1 verbose, 2 very verbose, 3 and up debug.
    pub fn new(level: u8, silent: bool, colors: bool) -> Self {
        Self::with_writers(
            level,
            silent,
            colors,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    pub fn with_writers(
        level: u8,
        silent: bool,
        colors: bool,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            verbose: level >= 1,
            very_verbose: level >= 2,
            debug: level >= 3,
            silent,
            colors: colors_wanted(colors, std::env::var_os("NO_COLOR").as_deref()),
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    pub fn enable_colors_if_supported(&mut self) {
        #[cfg(windows)]
        if self.colors {
            colored::control::set_override(true);
        }
    }

    fn emit(stream: &Stream, text: &str) {
        if let Ok(mut w) = stream.lock() {
            // a closed pipe is not worth failing the report over
            let _ = writeln!(w, "{}", text);
        }
    }

    fn paint(&self, icon: &str, msg: &str, color: Color, dim: bool) {
        let line = if !self.colors {
            format!("{} {}", icon, msg)
        } else if dim {
            format!("{} {}", icon.color(color).dimmed(), msg.dimmed())
        } else {
            format!("{} {}", icon.color(color).bold(), msg)
        };
        Self::emit(&self.err, &line);
    }

    fn note(&self, enabled: bool, icon: &str, msg: &str, color: Color, dim: bool) {
        if enabled && !self.silent {
            self.paint(icon, msg, color, dim);
        }
    }

    pub fn info(&self, msg: &str) {
        self.note(self.verbose, "[i]", msg, Color::Blue, false);
    }
    pub fn verbose(&self, msg: &str) {
        self.note(self.verbose, "[v]", msg, Color::White, true);
    }
    pub fn very_verbose(&self, msg: &str) {
        self.note(self.very_verbose, "[vv]", msg, Color::White, true);
    }
    pub fn debug(&self, msg: &str) {
        self.note(self.debug, "[dbg]", msg, Color::White, true);
    }
    pub fn success(&self, msg: &str) {
        self.note(true, "[+]", msg, Color::Green, false);
    }
    pub fn warn(&self, msg: &str) {
        self.note(true, "[!]", msg, Color::Yellow, false);
    }
    pub fn error(&self, msg: &str) {
        self.paint("[x]", msg, Color::Red, false);
    }

    /// Key hashes are the product of a run, so they bypass `--quiet` and
    /// go to stdout undecorated.
    pub fn key_hash(&self, hash: &str) {
        Self::emit(&self.out, hash);
    }

    /// Titled block of aligned `key value` lines, verbose mode only.
    pub fn print_summary(&self, title: &str, fields: &[(&str, String)]) {
        if self.silent || !self.verbose {
            return;
        }
        let title = format!("{}:", title);
        if self.colors {
            Self::emit(&self.err, &title.green().bold().to_string());
        } else {
            Self::emit(&self.err, &title);
        }
        let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, val) in fields {
            let key = format!("{:<width$}", key, width = width);
            let line = if self.colors {
                format!("  {} {}", key.cyan().bold(), val)
            } else {
                format!("  {} {}", key, val)
            };
            Self::emit(&self.err, &line);
        }
    }

    pub fn print_version_info(&self) {
        let title = format!("{} v{}", APP_NAME, APP_VERSION);
        let lines = [
            format!("Author:      {}", APP_AUTHOR),
            "License:     MIT".to_string(),
            format!("Description: {}", APP_ABOUT),
        ];
        if self.colors {
            Self::emit(&self.out, &title.cyan().bold().to_string());
        } else {
            Self::emit(&self.out, &title);
        }
        for line in &lines {
            Self::emit(&self.out, line);
        }
    }
}

impl LogSink for Ui {
    fn write(&self, record: LogRecord) {
        match record.severity {
            Severity::Debug if record.tag == KEY_HASH_TAG => self.key_hash(&record.message),
            Severity::Debug => self.debug(&format!("{}: {}", record.tag, record.message)),
            Severity::Warn => self.warn(&record.message),
            Severity::Error => match record.cause {
                Some(cause) => self.error(&format!("{}: {}", record.message, cause)),
                None => self.error(&record.message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyHashError;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn console(level: u8, silent: bool) -> (Ui, Captured, Captured) {
        let (out, err) = (Captured::default(), Captured::default());
        let ui = Ui::with_writers(
            level,
            silent,
            false,
            Box::new(out.clone()),
            Box::new(err.clone()),
        );
        (ui, out, err)
    }

    #[test]
    fn key_hash_goes_to_stdout_even_when_quiet() {
        let (ui, out, err) = console(0, true);
        LogSink::debug(&ui, KEY_HASH_TAG, "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
        assert_eq!(out.text(), "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=\n");
        assert_eq!(err.text(), "");
    }

    #[test]
    fn warnings_go_to_stderr() {
        let (ui, out, err) = console(0, false);
        LogSink::warn(&ui, KEY_HASH_TAG, "No signatures found for package com.example.app");
        assert_eq!(out.text(), "");
        assert_eq!(err.text(), "[!] No signatures found for package com.example.app\n");
    }

    #[test]
    fn quiet_drops_warnings_but_keeps_errors() {
        let (ui, out, err) = console(0, true);
        LogSink::warn(&ui, KEY_HASH_TAG, "No signatures found for package com.example.app");
        let cause = KeyHashError::SigningBlock("truncated signer".into());
        ui.error_with(KEY_HASH_TAG, "Failed to compute key hash", &cause);
        assert_eq!(out.text(), "");
        assert_eq!(
            err.text(),
            "[x] Failed to compute key hash: APK Signing Block Error: truncated signer\n"
        );
    }

    #[test]
    fn other_debug_records_need_debug_level() {
        let (ui, _, err) = console(2, false);
        LogSink::debug(&ui, "Startup", "hidden");
        assert_eq!(err.text(), "");

        let (ui, out, err) = console(3, false);
        LogSink::debug(&ui, "Startup", "shown");
        assert_eq!(out.text(), "");
        assert_eq!(err.text(), "[dbg] Startup: shown\n");
    }

    #[test]
    fn summary_aligns_keys() {
        let (ui, _, err) = console(1, false);
        ui.print_summary("Report", &[("Status", "ok".into()), ("Package", "a.b".into())]);
        assert_eq!(err.text(), "Report:\n  Status  ok\n  Package a.b\n");
    }

    #[test]
    fn no_color_disables_colors() {
        assert!(colors_wanted(true, None));
        assert!(colors_wanted(true, Some(OsStr::new(""))));
        assert!(!colors_wanted(true, Some(OsStr::new("1"))));
        assert!(!colors_wanted(false, None));
    }
}

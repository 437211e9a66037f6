/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

use keyhashrust::cli;
use keyhashrust::reporter::ReportOutcome;
use keyhashrust::ui::Ui;

fn main() {
    match cli::run() {
        // the reporter has already logged the failure
        Ok(Some(ReportOutcome::Failed)) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            let mut ui = Ui::default();
            ui.enable_colors_if_supported();
            ui.error(&format!("{}", e));
            std::process::exit(1);
        }
    }
}

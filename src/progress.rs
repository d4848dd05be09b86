//! Progress indicators and prompts for the pcsync CLI.

use anyhow::Result;
use colored::Colorize;
use declarative::{ApplyResult, ConfirmCallback, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ui;

/// Spinner shown while waiting on a single pcs call.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Prints one line per step as the executor runs.
pub struct StepPrinter {
    total: usize,
    quiet: bool,
}

impl StepPrinter {
    pub fn new(quiet: bool) -> Self {
        Self { total: 0, quiet }
    }
}

impl ProgressCallback for StepPrinter {
    fn on_plan_start(&mut self, count: usize) {
        self.total = count;
    }

    fn on_step_start(&mut self, index: usize, _id: &str, description: &str) {
        if !self.quiet {
            ui::step(index + 1, self.total, description);
        }
    }

    fn on_step_complete(&mut self, _index: usize, id: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Failed { error } => ui::error(&format!("{id}: {error}")),
            _ if !self.quiet => ui::dim(ui::result_label(result)),
            _ => {}
        }
    }

    fn on_plan_complete(&mut self) {}
}

/// Asks on the terminal, or answers yes when `--yes` was given.
pub struct Prompt {
    pub assume_yes: bool,
}

impl ConfirmCallback for Prompt {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use dialoguer::Confirm;

        if self.assume_yes {
            return Ok(true);
        }

        let confirmed = Confirm::new()
            .with_prompt(prompt.bold().to_string())
            .default(false)
            .interact()?;

        Ok(confirmed)
    }
}

use anyhow::{Context, Result};
use dialoguer::Input;
use reconcile::{ApprovalPrompt, ApprovalResponse};

use crate::ui;

/// Interactive y / n / a prompt on the terminal
pub struct DialoguerPrompt;

impl ApprovalPrompt for DialoguerPrompt {
    fn ask(&mut self, message: &str, tokens: &[&str]) -> Result<String> {
        let hint = tokens.join(" / ");
        Input::<String>::new()
            .with_prompt(message)
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                input
                    .parse::<ApprovalResponse>()
                    .map(|_| ())
                    .map_err(|_| format!("answer with {hint}"))
            })
            .interact_text()
            .context("Failed to read answer")
    }

    fn rejected(&mut self, answer: &str, hint: &str) {
        ui::warn(&format!("'{}' is not a valid answer, {hint}", answer.trim()));
    }
}

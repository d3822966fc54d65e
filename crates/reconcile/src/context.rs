//! Collaborator traits
//!
//! These traits keep the engine free of terminal and network code: the
//! binary supplies a dialoguer prompt and an HTTP session, tests supply
//! scripted fakes.

use crate::diff::DiffLine;
use crate::host::{HostRecord, UpdateIntent};
use crate::types::{HostOutcome, RunMode};
use anyhow::Result;

/// Operator prompt used by the batch approval controller
pub trait ApprovalPrompt {
    /// Ask the operator a question and return the raw answer
    ///
    /// # Arguments
    /// * `message` - The question to show
    /// * `tokens` - The accepted answers
    fn ask(&mut self, message: &str, tokens: &[&str]) -> Result<String>;

    /// Called when an answer was rejected, before asking again
    fn rejected(&mut self, _answer: &str, _hint: &str) {}
}

/// Sends approved update intents to the remote system
pub trait HostUpdater {
    /// Replace the host record; errors are reported per host, never fatal
    fn update(&mut self, intent: &UpdateIntent) -> Result<()>;
}

/// Receives reconciliation events for display
pub trait RunObserver {
    /// Called once before the first host
    fn on_start(&mut self, total: usize, mode: RunMode);

    /// Called for each host in a view mode
    fn on_view(&mut self, host: &HostRecord, mode: RunMode);

    /// Called with the full diff of a host that has changes
    fn on_diff(&mut self, host: &HostRecord, lines: &[DiffLine]);

    /// Called when a host's reconciliation finishes
    fn on_outcome(&mut self, host: &HostRecord, outcome: &HostOutcome);
}

/// No-op observer
pub struct NoObserver;

impl RunObserver for NoObserver {
    fn on_start(&mut self, _total: usize, _mode: RunMode) {}
    fn on_view(&mut self, _host: &HostRecord, _mode: RunMode) {}
    fn on_diff(&mut self, _host: &HostRecord, _lines: &[DiffLine]) {}
    fn on_outcome(&mut self, _host: &HostRecord, _outcome: &HostOutcome) {}
}

/// Prompt for non-interactive contexts; any call is an error
pub struct NoPrompt;

impl ApprovalPrompt for NoPrompt {
    fn ask(&mut self, message: &str, _tokens: &[&str]) -> Result<String> {
        anyhow::bail!("Operator input required but no prompt available: {message}")
    }
}

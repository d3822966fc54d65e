//! Terminal rendering of views, diffs and per-host outcomes

use colored::Colorize;
use reconcile::{
    DiffLine, HostOutcome, HostRecord, PolicyFlags, RunMode, RunObserver, RunSummary, flag_symbol,
};

use crate::ui;

/// Prints everything the reconciler reports
#[derive(Debug, Default)]
pub struct TerminalObserver {
    quiet: bool,
}

impl TerminalObserver {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl RunObserver for TerminalObserver {
    fn on_start(&mut self, total: usize, mode: RunMode) {
        if self.quiet || total == 0 {
            return;
        }
        ui::header(&format!("{} ({})", mode, ui::plural(total, "proxy host")));
    }

    fn on_view(&mut self, host: &HostRecord, mode: RunMode) {
        match mode {
            RunMode::ViewAdvancedConfig => display_advanced_config(host),
            _ => display_host(host),
        }
    }

    fn on_diff(&mut self, host: &HostRecord, lines: &[DiffLine]) {
        display_diff(host, lines);
    }

    fn on_outcome(&mut self, host: &HostRecord, outcome: &HostOutcome) {
        display_outcome(host, outcome, self.quiet);
    }
}

/// List view: identity, forward target and current flags
fn display_host(host: &HostRecord) {
    println!();
    println!(
        "{} {}",
        format!("#{}", host.id).dimmed(),
        host.label().bold()
    );
    ui::kv("forward", &host.forward_target());
    for (field, value) in PolicyFlags::from_host(host).iter() {
        ui::kv(field.name(), &colored_symbol(value));
    }
}

fn display_advanced_config(host: &HostRecord) {
    println!();
    println!("{}", host.label().bold());
    ui::rule();
    match host.advanced_config_text() {
        Some(text) => println!("{}", text.trim_end()),
        None => println!("{}", "<empty>".dimmed()),
    }
    ui::rule();
}

fn display_diff(host: &HostRecord, lines: &[DiffLine]) {
    println!();
    println!("┌─ {}", host.label().bold());
    for line in lines {
        let text = line.to_string();
        if line.is_changed() {
            println!("│ {}", text.yellow());
        } else {
            println!("│ {}", text.dimmed());
        }
    }
    println!("└─");
}

fn display_outcome(host: &HostRecord, outcome: &HostOutcome, quiet: bool) {
    let label = host.label();
    match outcome {
        HostOutcome::Viewed => {}
        HostOutcome::Compliant => {
            if !quiet {
                println!("{} {} {}", "✓".green(), label, "already compliant".dimmed());
            }
        }
        HostOutcome::WouldApply { .. } => ui::dim("dry run: no changes applied"),
        HostOutcome::Applied { changes } => ui::success(&format!(
            "Updated {} ({})",
            label,
            ui::plural(changes.len(), "change")
        )),
        HostOutcome::Skipped { .. } => ui::dim(&format!("Skipped {label}")),
        HostOutcome::Failed { error, .. } => {
            ui::warn(&format!("Failed to update {label}: {error}"));
        }
    }
}

fn colored_symbol(value: bool) -> String {
    let symbol = flag_symbol(value);
    if value {
        symbol.green().to_string()
    } else {
        symbol.red().to_string()
    }
}

/// End-of-run summary
pub fn print_summary(summary: &RunSummary, mode: RunMode) {
    println!();
    if summary.is_success() {
        println!("  {} Reconciliation complete", "✓".green().bold());
    } else {
        println!("  {} Reconciliation finished with errors", "⚠".yellow().bold());
    }

    for line in summary_lines(summary, mode) {
        println!("    • {line}");
    }

    println!();
    println!("Done.");
}

fn summary_lines(summary: &RunSummary, mode: RunMode) -> Vec<String> {
    let mut lines = Vec::new();
    if mode.is_view() {
        lines.push(format!("{} shown", ui::plural(summary.viewed, "host")));
        return lines;
    }
    if summary.compliant > 0 {
        lines.push(format!("{} already compliant", summary.compliant));
    }
    if summary.would_apply > 0 {
        lines.push(format!("{} would be updated", summary.would_apply));
    }
    if summary.applied > 0 {
        lines.push(format!("{} updated", summary.applied));
    }
    if summary.skipped > 0 {
        lines.push(format!("{} skipped", summary.skipped));
    }
    if summary.failed > 0 {
        lines.push(format!("{} {}", summary.failed, "failed".red()));
    }
    lines
}

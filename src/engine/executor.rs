//! Run wiring: login, listing, reconciliation and summary

use anyhow::{Context, Result, bail};
use proxy_api::{Client, Session};
use reconcile::{HostRecord, NoPrompt, Reconciler, RunMode, RunReport};
use std::io::IsTerminal;

use crate::config::Settings;
use crate::progress;
use crate::ui;

use super::differ::{TerminalObserver, print_summary};
use super::prompt::DialoguerPrompt;

/// Options that affect presentation only
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Suppress spinners and compliant-host lines
    pub quiet: bool,
    /// Ask interactively when changes need approval
    pub interactive: bool,
}

impl ExecuteOptions {
    /// Interactive only when stdin is a terminal
    pub fn detect(quiet: bool) -> Self {
        Self {
            quiet,
            interactive: std::io::stdin().is_terminal(),
        }
    }
}

/// Run against the admin API named in `settings`
pub fn execute(settings: &Settings, opts: ExecuteOptions) -> Result<RunReport> {
    let client = Client::new(&settings.host)
        .with_context(|| format!("Invalid host URL '{}'", settings.host))?;
    execute_with(client, settings, opts)
}

/// Run with an already constructed client
pub fn execute_with(
    client: Client,
    settings: &Settings,
    opts: ExecuteOptions,
) -> Result<RunReport> {
    let mut session = login(client, settings, opts)?;
    let hosts = list(&session, opts)?;

    if hosts.is_empty() {
        ui::info("No proxy hosts found, nothing to reconcile.");
        println!("Done.");
        return Ok(RunReport::default());
    }

    let reconciler = Reconciler::new(settings.mode, &settings.policy);
    let mut observer = TerminalObserver::new(opts.quiet);

    let report = if settings.mode == RunMode::Apply && opts.interactive {
        reconciler.run(&hosts, &mut session, &mut DialoguerPrompt, &mut observer)
    } else {
        if settings.mode == RunMode::Apply {
            log::debug!("stdin is not a terminal, hosts needing changes cannot be approved");
        }
        reconciler.run(&hosts, &mut session, &mut NoPrompt, &mut observer)
    };

    print_summary(&report.summary, settings.mode);
    if let Some(reason) = &report.aborted {
        bail!("Run aborted: {reason}");
    }
    Ok(report)
}

fn login(client: Client, settings: &Settings, opts: ExecuteOptions) -> Result<Session> {
    let spinner = progress::spinner(&format!("Logging in to {}", settings.host), opts.quiet);

    match client.login(&settings.credentials) {
        Ok(session) => {
            progress::finish_success(&spinner, &format!("Logged in to {}", settings.host));
            Ok(session)
        }
        Err(e) => {
            progress::finish_error(&spinner, "Login failed");
            ui::dim(e.category().advice());
            Err(e).with_context(|| {
                format!("Failed to authenticate as {}", settings.credentials.identity)
            })
        }
    }
}

fn list(session: &Session, opts: ExecuteOptions) -> Result<Vec<HostRecord>> {
    let spinner = progress::spinner("Fetching proxy hosts", opts.quiet);

    match session.list_hosts() {
        Ok(hosts) => {
            progress::finish_success(
                &spinner,
                &format!("Found {}", ui::plural(hosts.len(), "proxy host")),
            );
            Ok(hosts)
        }
        Err(e) => {
            progress::finish_error(&spinner, "Listing failed");
            ui::dim(e.category().advice());
            Err(e).context("Failed to list proxy hosts")
        }
    }
}

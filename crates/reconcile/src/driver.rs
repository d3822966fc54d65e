//! Reconciliation driver - walks hosts in order through evaluate, diff,
//! approve and update

use crate::approval::{BatchApproval, Decision};
use crate::context::{ApprovalPrompt, HostUpdater, RunObserver};
use crate::diff::{compute_changes, render};
use crate::host::{HostRecord, UpdateIntent};
use crate::policy::evaluate;
use crate::types::{HostOutcome, PolicyFlags, PolicyOptions, RunMode, RunSummary};
use anyhow::{Context, Result};

/// Per-host entry in a run report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub host_id: u64,
    pub label: String,
    pub outcome: HostOutcome,
}

/// Everything a run produced, in input order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub hosts: Vec<HostReport>,
    pub summary: RunSummary,
    /// Why the walk stopped early, if it did
    pub aborted: Option<String>,
}

impl RunReport {
    /// True when no host was reported
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// True when every listed host was walked
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

/// Drives one reconciliation run over a host listing
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    mode: RunMode,
    options: &'a PolicyOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(mode: RunMode, options: &'a PolicyOptions) -> Self {
        Self { mode, options }
    }

    /// Reconcile every host in listing order
    ///
    /// A fresh [`BatchApproval`] is created for each run. Update failures are
    /// recorded per host and the walk continues. A prompt failure stops the
    /// walk; the report keeps the hosts finished so far and sets `aborted`.
    ///
    /// # Type Parameters
    /// * `U` - Update collaborator
    /// * `P` - Operator prompt
    /// * `O` - Event observer
    pub fn run<U, P, O>(
        &self,
        hosts: &[HostRecord],
        updater: &mut U,
        prompt: &mut P,
        observer: &mut O,
    ) -> RunReport
    where
        U: HostUpdater,
        P: ApprovalPrompt,
        O: RunObserver,
    {
        observer.on_start(hosts.len(), self.mode);

        let mut report = RunReport::default();
        if hosts.is_empty() {
            log::info!("No proxy hosts listed, nothing to reconcile");
            return report;
        }

        let mut approval = BatchApproval::new();
        for host in hosts {
            let outcome = match self.reconcile_host(host, &mut approval, updater, prompt, observer)
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::debug!("Run aborted at {}: {e:#}", host.label());
                    report.aborted = Some(format!("{e:#}"));
                    break;
                }
            };
            observer.on_outcome(host, &outcome);
            report.summary.add_outcome(&outcome);
            report.hosts.push(HostReport {
                host_id: host.id,
                label: host.label(),
                outcome,
            });
        }

        report
    }

    /// Reconcile a single host against the run's approval state
    pub fn reconcile_host<U, P, O>(
        &self,
        host: &HostRecord,
        approval: &mut BatchApproval,
        updater: &mut U,
        prompt: &mut P,
        observer: &mut O,
    ) -> Result<HostOutcome>
    where
        U: HostUpdater,
        P: ApprovalPrompt,
        O: RunObserver,
    {
        if self.mode.is_view() {
            observer.on_view(host, self.mode);
            return Ok(HostOutcome::Viewed);
        }

        let current = PolicyFlags::from_host(host);
        let desired = evaluate(host, self.options);
        let changes = compute_changes(&current, &desired);

        if !changes.has_changes() {
            log::debug!("host {}: already compliant", host.id);
            return Ok(HostOutcome::Compliant);
        }

        observer.on_diff(host, &render(&current, &desired));

        if self.mode == RunMode::DryRun {
            return Ok(HostOutcome::WouldApply { changes });
        }

        let label = host.label();
        let decision = approval
            .decide(&label, &changes, prompt)
            .with_context(|| format!("Failed to read approval for {label}"))?;

        if decision == Decision::Skip {
            log::debug!("host {}: skipped by operator", host.id);
            return Ok(HostOutcome::Skipped { changes });
        }

        let intent = UpdateIntent::new(host, &desired);
        match updater.update(&intent) {
            Ok(()) => Ok(HostOutcome::Applied { changes }),
            Err(e) => {
                log::warn!("host {}: update failed: {e:#}", host.id);
                Ok(HostOutcome::Failed {
                    changes,
                    error: format!("{e:#}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::tests::ScriptedPrompt;
    use crate::approval::ApprovalMode;
    use crate::context::{NoObserver, NoPrompt};
    use crate::diff::DiffLine;
    use crate::types::PolicyField;

    /// Updater that records intents and fails for chosen host ids
    #[derive(Default)]
    struct RecordingUpdater {
        sent: Vec<UpdateIntent>,
        fail_ids: Vec<u64>,
    }

    impl HostUpdater for RecordingUpdater {
        fn update(&mut self, intent: &UpdateIntent) -> Result<()> {
            self.sent.push(intent.clone());
            if self.fail_ids.contains(&intent.host_id) {
                anyhow::bail!("HTTP 500: internal error");
            }
            Ok(())
        }
    }

    /// Observer that keeps a log of events
    #[derive(Default)]
    struct RecordingObserver {
        started: Option<(usize, RunMode)>,
        views: Vec<u64>,
        diffs: Vec<(u64, Vec<DiffLine>)>,
        outcomes: Vec<u64>,
    }

    impl RunObserver for RecordingObserver {
        fn on_start(&mut self, total: usize, mode: RunMode) {
            self.started = Some((total, mode));
        }

        fn on_view(&mut self, host: &HostRecord, _mode: RunMode) {
            self.views.push(host.id);
        }

        fn on_diff(&mut self, host: &HostRecord, lines: &[DiffLine]) {
            self.diffs.push((host.id, lines.to_vec()));
        }

        fn on_outcome(&mut self, host: &HostRecord, _outcome: &HostOutcome) {
            self.outcomes.push(host.id);
        }
    }

    fn bare_host(id: u64, domain: &str) -> HostRecord {
        HostRecord {
            id,
            domain_names: vec![domain.to_string()],
            forward_scheme: "http".into(),
            forward_host: "10.0.0.2".into(),
            forward_port: 80,
            ssl_forced: Some(false),
            http2_support: Some(false),
            hsts_enabled: Some(false),
            hsts_subdomains: Some(false),
            block_exploits: Some(false),
            caching_enabled: Some(false),
            allow_websocket_upgrade: Some(false),
            ..HostRecord::default()
        }
    }

    fn compliant_host(id: u64, domain: &str) -> HostRecord {
        HostRecord {
            ssl_forced: Some(true),
            http2_support: Some(true),
            hsts_enabled: Some(true),
            ..bare_host(id, domain)
        }
    }

    #[test]
    fn test_scenario_all_false_block_exploits() {
        let opts = PolicyOptions::new().with_block_exploits(true);
        let host = bare_host(1, "app.example.com");

        let desired = evaluate(&host, &opts);
        assert_eq!(
            desired,
            PolicyFlags {
                ssl_forced: true,
                http2_support: true,
                hsts_enabled: true,
                hsts_subdomains: false,
                block_exploits: true,
                caching_enabled: false,
                allow_websocket_upgrade: false,
            }
        );

        let changes = compute_changes(&PolicyFlags::from_host(&host), &desired);
        assert_eq!(
            changes.fields(),
            vec![
                PolicyField::SslForced,
                PolicyField::Http2Support,
                PolicyField::HstsEnabled,
                PolicyField::BlockExploits,
            ]
        );
    }

    #[test]
    fn test_scenario_existing_block_exploits_is_compliant() {
        let opts = PolicyOptions::new();
        let host = HostRecord {
            block_exploits: Some(true),
            ..compliant_host(1, "app.example.com")
        };

        let mut updater = RecordingUpdater::default();
        let report = Reconciler::new(RunMode::Apply, &opts)
            .run(&[host], &mut updater, &mut NoPrompt, &mut NoObserver);

        assert_eq!(report.hosts[0].outcome, HostOutcome::Compliant);
        assert!(updater.sent.is_empty());
    }

    #[test]
    fn test_scenario_empty_listing() {
        let opts = PolicyOptions::new();
        let mut updater = RecordingUpdater::default();
        let mut observer = RecordingObserver::default();

        let report = Reconciler::new(RunMode::Apply, &opts)
            .run(&[], &mut updater, &mut NoPrompt, &mut observer);

        assert!(report.is_empty());
        assert_eq!(report.summary.total(), 0);
        assert!(updater.sent.is_empty());
        assert_eq!(observer.started, Some((0, RunMode::Apply)));
    }

    #[test]
    fn test_scenario_dry_run_never_prompts() {
        let opts = PolicyOptions::new();
        let host = HostRecord {
            ssl_forced: Some(true),
            ..bare_host(4, "docs.example.com")
        };

        let mut updater = RecordingUpdater::default();
        let mut observer = RecordingObserver::default();
        // NoPrompt errors if it is ever asked
        let report = Reconciler::new(RunMode::DryRun, &opts)
            .run(&[host], &mut updater, &mut NoPrompt, &mut observer);

        assert_eq!(observer.diffs.len(), 1);
        assert!(updater.sent.is_empty());
        match &report.hosts[0].outcome {
            HostOutcome::WouldApply { changes } => assert_eq!(changes.len(), 2),
            other => panic!("expected WouldApply, got {other:?}"),
        }
        assert_eq!(report.summary.would_apply, 1);
    }

    #[test]
    fn test_scenario_three_changes_dry_run() {
        let opts = PolicyOptions::new();
        let host = bare_host(9, "wiki.example.com");

        let mut updater = RecordingUpdater::default();
        let mut observer = RecordingObserver::default();
        let report = Reconciler::new(RunMode::DryRun, &opts)
            .run(&[host], &mut updater, &mut NoPrompt, &mut observer);

        assert_eq!(observer.diffs.len(), 1);
        assert_eq!(observer.diffs[0].1.len(), 7);
        assert_eq!(observer.diffs[0].1.iter().filter(|l| l.is_changed()).count(), 3);
        assert_eq!(report.summary.updates_sent(), 0);
        assert!(updater.sent.is_empty());
    }

    #[test]
    fn test_scenario_apply_all_on_first_host() {
        let opts = PolicyOptions::new();
        let hosts = vec![
            bare_host(1, "one.example.com"),
            bare_host(2, "two.example.com"),
            bare_host(3, "three.example.com"),
        ];

        let mut updater = RecordingUpdater::default();
        let mut prompt = ScriptedPrompt::new(&["a"]);
        let report = Reconciler::new(RunMode::Apply, &opts)
            .run(&hosts, &mut updater, &mut prompt, &mut NoObserver);

        assert_eq!(prompt.asked.len(), 1);
        assert_eq!(
            updater.sent.iter().map(|i| i.host_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(report.summary.applied, 3);
    }

    #[test]
    fn test_skip_then_apply_one() {
        let opts = PolicyOptions::new();
        let hosts = vec![bare_host(1, "one.lan"), bare_host(2, "two.lan")];

        let mut updater = RecordingUpdater::default();
        let mut prompt = ScriptedPrompt::new(&["n", "y"]);
        let report = Reconciler::new(RunMode::Apply, &opts)
            .run(&hosts, &mut updater, &mut prompt, &mut NoObserver);

        assert!(matches!(report.hosts[0].outcome, HostOutcome::Skipped { .. }));
        assert!(matches!(report.hosts[1].outcome, HostOutcome::Applied { .. }));
        assert_eq!(updater.sent.len(), 1);
        assert_eq!(updater.sent[0].host_id, 2);
    }

    #[test]
    fn test_compliant_hosts_are_not_prompted() {
        let opts = PolicyOptions::new();
        let hosts = vec![compliant_host(1, "ok.lan"), bare_host(2, "todo.lan")];

        let mut updater = RecordingUpdater::default();
        let mut prompt = ScriptedPrompt::new(&["y"]);
        let mut observer = RecordingObserver::default();
        let report = Reconciler::new(RunMode::Apply, &opts)
            .run(&hosts, &mut updater, &mut prompt, &mut observer);

        assert_eq!(prompt.asked.len(), 1);
        assert_eq!(observer.diffs.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(report.summary.compliant, 1);
        assert_eq!(report.summary.applied, 1);
    }

    #[test]
    fn test_update_failure_does_not_abort_run() {
        let opts = PolicyOptions::new();
        let hosts = vec![
            bare_host(1, "one.lan"),
            bare_host(2, "two.lan"),
            bare_host(3, "three.lan"),
        ];

        let mut updater = RecordingUpdater {
            fail_ids: vec![2],
            ..RecordingUpdater::default()
        };
        let mut prompt = ScriptedPrompt::new(&["a"]);
        let report = Reconciler::new(RunMode::Apply, &opts)
            .run(&hosts, &mut updater, &mut prompt, &mut NoObserver);

        assert_eq!(updater.sent.len(), 3);
        assert_eq!(report.summary.applied, 2);
        assert_eq!(report.summary.failed, 1);
        match &report.hosts[1].outcome {
            HostOutcome::Failed { error, .. } => assert!(error.contains("HTTP 500")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_view_modes_skip_policy_logic() {
        let opts = PolicyOptions::new().with_block_exploits(true);
        let hosts = vec![bare_host(1, "one.lan"), compliant_host(2, "two.lan")];

        for mode in [RunMode::ListOnly, RunMode::ViewAdvancedConfig] {
            let mut updater = RecordingUpdater::default();
            let mut observer = RecordingObserver::default();
            let report = Reconciler::new(mode, &opts)
                .run(&hosts, &mut updater, &mut NoPrompt, &mut observer);

            assert_eq!(observer.views, vec![1, 2]);
            assert!(observer.diffs.is_empty());
            assert!(updater.sent.is_empty());
            assert_eq!(report.summary.viewed, 2);
        }
    }

    #[test]
    fn test_prompt_failure_aborts_run() {
        let opts = PolicyOptions::new();
        let hosts = vec![bare_host(1, "one.lan"), bare_host(2, "two.lan")];

        let mut updater = RecordingUpdater::default();
        let report = Reconciler::new(RunMode::Apply, &opts).run(
            &hosts,
            &mut updater,
            &mut NoPrompt,
            &mut NoObserver,
        );

        assert!(!report.is_complete());
        assert!(report.is_empty());
        assert!(updater.sent.is_empty());
        let reason = report.aborted.unwrap();
        assert!(reason.contains("one.lan"));
        assert!(reason.contains("no prompt available"));
    }

    #[test]
    fn test_prompt_failure_keeps_finished_hosts() {
        let opts = PolicyOptions::new();
        let hosts = vec![
            bare_host(1, "one.lan"),
            compliant_host(2, "two.lan"),
            bare_host(3, "three.lan"),
            bare_host(4, "four.lan"),
        ];

        // one answer, then the prompt fails on host 3
        let mut prompt = ScriptedPrompt::new(&["y"]);
        let mut updater = RecordingUpdater::default();
        let mut observer = RecordingObserver::default();
        let report = Reconciler::new(RunMode::Apply, &opts).run(
            &hosts,
            &mut updater,
            &mut prompt,
            &mut observer,
        );

        assert!(!report.is_complete());
        assert_eq!(report.hosts.len(), 2);
        assert_eq!(report.summary.applied, 1);
        assert_eq!(report.summary.compliant, 1);
        assert_eq!(updater.sent.len(), 1);
        assert_eq!(observer.outcomes, vec![1, 2]);
        assert!(report.aborted.unwrap().contains("three.lan"));
    }

    #[test]
    fn test_hosts_processed_in_input_order() {
        let opts = PolicyOptions::new();
        let hosts = vec![
            bare_host(30, "c.lan"),
            compliant_host(10, "a.lan"),
            bare_host(20, "b.lan"),
        ];

        let mut observer = RecordingObserver::default();
        let report = Reconciler::new(RunMode::DryRun, &opts)
            .run(&hosts, &mut RecordingUpdater::default(), &mut NoPrompt, &mut observer);

        assert_eq!(observer.outcomes, vec![30, 10, 20]);
        assert_eq!(
            report.hosts.iter().map(|h| h.host_id).collect::<Vec<_>>(),
            vec![30, 10, 20]
        );
    }

    #[test]
    fn test_approval_state_is_per_run() {
        let opts = PolicyOptions::new();
        let reconciler = Reconciler::new(RunMode::Apply, &opts);
        let hosts = vec![bare_host(1, "one.lan")];

        let mut prompt = ScriptedPrompt::new(&["a", "n"]);
        reconciler
            .run(&hosts, &mut RecordingUpdater::default(), &mut prompt, &mut NoObserver);
        let second = reconciler
            .run(&hosts, &mut RecordingUpdater::default(), &mut prompt, &mut NoObserver);

        assert_eq!(prompt.asked.len(), 2);
        assert!(matches!(second.hosts[0].outcome, HostOutcome::Skipped { .. }));
    }

    #[test]
    fn test_reconcile_host_threads_approval_state() {
        let opts = PolicyOptions::new();
        let reconciler = Reconciler::new(RunMode::Apply, &opts);
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&["a"]);
        let mut updater = RecordingUpdater::default();

        reconciler
            .reconcile_host(
                &bare_host(1, "one.lan"),
                &mut approval,
                &mut updater,
                &mut prompt,
                &mut NoObserver,
            )
            .unwrap();

        assert_eq!(approval.mode(), ApprovalMode::ApproveAll);
    }

    #[test]
    fn test_update_intent_carries_desired_flags() {
        let opts = PolicyOptions::new().with_websockets(true);
        let host = HostRecord {
            advanced_config: Some("proxy_read_timeout 300;".into()),
            ..bare_host(5, "ws.lan")
        };

        let mut updater = RecordingUpdater::default();
        let mut prompt = ScriptedPrompt::new(&["y"]);
        Reconciler::new(RunMode::Apply, &opts)
            .run(&[host], &mut updater, &mut prompt, &mut NoObserver);

        let payload = &updater.sent[0].payload;
        assert!(payload.ssl_forced && payload.http2_support && payload.hsts_enabled);
        assert!(payload.allow_websocket_upgrade);
        assert!(!payload.block_exploits);
        assert_eq!(payload.advanced_config, "proxy_read_timeout 300;");
    }
}

//! Core types for policy reconciliation

use crate::diff::ChangeSet;
use crate::error::{Error, Result};
use crate::host::HostRecord;
use std::collections::BTreeSet;
use std::fmt;

/// Exemption substrings applied unless explicitly disabled.
///
/// Hosts whose primary domain contains one of these sit behind auth proxies
/// or embed dashboards that break with the exploit-blocking ruleset.
pub const DEFAULT_EXEMPTIONS: &[&str] = &["tinyauth", "vaultls", "pocket-id", "watchyourlan"];

/// One of the seven managed security/performance flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolicyField {
    SslForced,
    Http2Support,
    HstsEnabled,
    HstsSubdomains,
    BlockExploits,
    CachingEnabled,
    AllowWebsocketUpgrade,
}

impl PolicyField {
    /// Canonical field order used by change detection and diff rendering
    pub const ALL: [PolicyField; 7] = [
        PolicyField::SslForced,
        PolicyField::Http2Support,
        PolicyField::HstsEnabled,
        PolicyField::HstsSubdomains,
        PolicyField::BlockExploits,
        PolicyField::CachingEnabled,
        PolicyField::AllowWebsocketUpgrade,
    ];

    /// Wire name of the field
    pub fn name(&self) -> &'static str {
        match self {
            Self::SslForced => "ssl_forced",
            Self::Http2Support => "http2_support",
            Self::HstsEnabled => "hsts_enabled",
            Self::HstsSubdomains => "hsts_subdomains",
            Self::BlockExploits => "block_exploits",
            Self::CachingEnabled => "caching_enabled",
            Self::AllowWebsocketUpgrade => "allow_websocket_upgrade",
        }
    }
}

impl fmt::Display for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Projection of a host onto the seven managed flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyFlags {
    pub ssl_forced: bool,
    pub http2_support: bool,
    pub hsts_enabled: bool,
    pub hsts_subdomains: bool,
    pub block_exploits: bool,
    pub caching_enabled: bool,
    pub allow_websocket_upgrade: bool,
}

impl PolicyFlags {
    /// Current flags of a host; absent values read as `false`
    pub fn from_host(host: &HostRecord) -> Self {
        Self {
            ssl_forced: host.ssl_forced.unwrap_or(false),
            http2_support: host.http2_support.unwrap_or(false),
            hsts_enabled: host.hsts_enabled.unwrap_or(false),
            hsts_subdomains: host.hsts_subdomains.unwrap_or(false),
            block_exploits: host.block_exploits.unwrap_or(false),
            caching_enabled: host.caching_enabled.unwrap_or(false),
            allow_websocket_upgrade: host.allow_websocket_upgrade.unwrap_or(false),
        }
    }

    /// Value of a single field
    pub fn get(&self, field: PolicyField) -> bool {
        match field {
            PolicyField::SslForced => self.ssl_forced,
            PolicyField::Http2Support => self.http2_support,
            PolicyField::HstsEnabled => self.hsts_enabled,
            PolicyField::HstsSubdomains => self.hsts_subdomains,
            PolicyField::BlockExploits => self.block_exploits,
            PolicyField::CachingEnabled => self.caching_enabled,
            PolicyField::AllowWebsocketUpgrade => self.allow_websocket_upgrade,
        }
    }

    /// Iterate `(field, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (PolicyField, bool)> + '_ {
        PolicyField::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}

/// Run-scoped policy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOptions {
    /// Set `hsts_subdomains` to this value on every host
    pub enable_hsts_subdomains: bool,
    /// Force asset caching on
    pub enable_caching: bool,
    /// Force exploit blocking on (except for exempt hosts)
    pub block_exploits: bool,
    /// Force websocket upgrade support on
    pub enable_websockets: bool,
    exemptions: BTreeSet<String>,
}

impl PolicyOptions {
    /// Create options with no flags set and no exemptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `hsts_subdomains` on every host
    pub fn with_hsts_subdomains(mut self, enabled: bool) -> Self {
        self.enable_hsts_subdomains = enabled;
        self
    }

    /// Force asset caching on
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.enable_caching = enabled;
        self
    }

    /// Force exploit blocking on for non-exempt hosts
    pub fn with_block_exploits(mut self, enabled: bool) -> Self {
        self.block_exploits = enabled;
        self
    }

    /// Force websocket upgrade support on
    pub fn with_websockets(mut self, enabled: bool) -> Self {
        self.enable_websockets = enabled;
        self
    }

    /// Add the built-in exemption list
    pub fn with_default_exemptions(mut self) -> Self {
        self.exemptions
            .extend(DEFAULT_EXEMPTIONS.iter().map(|s| (*s).to_string()));
        self
    }

    /// Add an exemption substring
    ///
    /// Empty (or whitespace-only) substrings are rejected since they would
    /// match every domain.
    pub fn add_exemption(&mut self, substring: &str) -> Result<()> {
        let trimmed = substring.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyExemption);
        }
        self.exemptions.insert(trimmed.to_string());
        Ok(())
    }

    /// Exemption substrings in sorted order
    pub fn exemptions(&self) -> impl Iterator<Item = &str> {
        self.exemptions.iter().map(String::as_str)
    }

    /// Check if a domain matches any exemption substring
    pub fn is_exempt(&self, domain: &str) -> bool {
        self.exemptions.iter().any(|s| domain.contains(s.as_str()))
    }
}

/// How a reconciliation run treats each host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Print a summary of each host, compute nothing
    ListOnly,
    /// Print each host's advanced_config, compute nothing
    ViewAdvancedConfig,
    /// Compute and show diffs, apply nothing
    DryRun,
    /// Compute, confirm and apply
    #[default]
    Apply,
}

impl RunMode {
    /// Select the mode from the individual CLI selectors
    pub fn from_flags(list: bool, print_advanced: bool, dry_run: bool) -> Result<Self> {
        let selected: Vec<&str> = [
            (list, "--list"),
            (print_advanced, "--print-advanced"),
            (dry_run, "--dry-run"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();

        if selected.len() > 1 {
            return Err(Error::ConflictingModes(selected.join(", ")));
        }

        Ok(match (list, print_advanced, dry_run) {
            (true, _, _) => Self::ListOnly,
            (_, true, _) => Self::ViewAdvancedConfig,
            (_, _, true) => Self::DryRun,
            _ => Self::Apply,
        })
    }

    /// Whether this mode skips policy evaluation entirely
    pub fn is_view(&self) -> bool {
        matches!(self, Self::ListOnly | Self::ViewAdvancedConfig)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListOnly => "list",
            Self::ViewAdvancedConfig => "print-advanced",
            Self::DryRun => "dry-run",
            Self::Apply => "apply",
        };
        f.write_str(name)
    }
}

/// Result of reconciling one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    /// Shown in a view mode, no policy logic ran
    Viewed,
    /// Already compliant, nothing to do
    Compliant,
    /// Dry run: these changes would be applied
    WouldApply { changes: ChangeSet },
    /// Update sent and accepted
    Applied { changes: ChangeSet },
    /// Operator declined the change set
    Skipped { changes: ChangeSet },
    /// Update sent and rejected
    Failed { changes: ChangeSet, error: String },
}

/// Summary of a reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub viewed: usize,
    pub compliant: usize,
    pub would_apply: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Total number of hosts processed
    pub fn total(&self) -> usize {
        self.viewed + self.compliant + self.would_apply + self.applied + self.skipped + self.failed
    }

    /// Number of update intents emitted
    pub fn updates_sent(&self) -> usize {
        self.applied + self.failed
    }

    /// Check if every emitted update succeeded
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Add an outcome to the summary
    pub fn add_outcome(&mut self, outcome: &HostOutcome) {
        match outcome {
            HostOutcome::Viewed => self.viewed += 1,
            HostOutcome::Compliant => self.compliant += 1,
            HostOutcome::WouldApply { .. } => self.would_apply += 1,
            HostOutcome::Applied { .. } => self.applied += 1,
            HostOutcome::Skipped { .. } => self.skipped += 1,
            HostOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

//! # Reconcile
//!
//! Policy reconciliation for reverse-proxy host entries.
//!
//! Given the hosts listed by a proxy administration API, this crate decides
//! which security/performance flags each host should have, computes the
//! minimal change set, renders a reviewable diff, and walks an operator
//! through approving updates one host at a time.
//!
//! ## Core Concepts
//!
//! - **PolicyFlags**: The seven managed booleans, in a fixed canonical order
//! - **PolicyOptions**: Run-scoped switches plus the exemption list
//! - **ChangeSet**: Fields whose current and desired values differ
//! - **BatchApproval**: Per-host confirmation with a sticky "apply all"
//! - **Reconciler**: Drives a run over a host listing for one [`RunMode`]
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{NoObserver, PolicyOptions, Reconciler, RunMode};
//!
//! let opts = PolicyOptions::new()
//!     .with_block_exploits(true)
//!     .with_default_exemptions();
//!
//! let report = Reconciler::new(RunMode::Apply, &opts)
//!     .run(&hosts, &mut session, &mut prompt, &mut NoObserver);
//!
//! println!("{} hosts updated", report.summary.applied);
//! ```
//!
//! ## Collaborator Traits
//!
//! All I/O is behind traits so the engine runs unchanged in tests:
//!
//! - [`HostUpdater`]: Sends an approved [`UpdateIntent`]
//! - [`ApprovalPrompt`]: Asks the operator for a y / n / a answer
//! - [`RunObserver`]: Receives view records, diffs and outcomes

pub mod approval;
pub mod context;
pub mod diff;
pub mod driver;
pub mod error;
pub mod host;
pub mod policy;
pub mod types;

// Re-export main types at crate root
pub use approval::{ApprovalMode, ApprovalResponse, BatchApproval, Decision};
pub use context::{ApprovalPrompt, HostUpdater, NoObserver, NoPrompt, RunObserver};
pub use diff::{ChangeSet, DiffLine, FieldChange, compute_changes, flag_symbol, render};
pub use driver::{HostReport, Reconciler, RunReport};
pub use error::{Error, Result};
pub use host::{HostMeta, HostRecord, HostUpdate, UpdateIntent, UpdateMeta};
pub use policy::evaluate;
pub use types::{
    DEFAULT_EXEMPTIONS, HostOutcome, PolicyField, PolicyFlags, PolicyOptions, RunMode, RunSummary,
};

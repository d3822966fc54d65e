//! Change set computation and diff rendering for policy flags

use crate::types::{PolicyField, PolicyFlags};
use std::fmt;

/// A single field whose value will change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange {
    pub field: PolicyField,
    pub old: bool,
    pub new: bool,
}

/// Ordered set of changed fields between current and desired flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    /// Check if any field differs
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Number of changed fields
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    /// Just the names of the changed fields
    pub fn fields(&self) -> Vec<PolicyField> {
        self.changes.iter().map(|c| c.field).collect()
    }
}

/// Compare current and desired flags field by field
///
/// Output follows [`PolicyField::ALL`] regardless of which fields differ.
pub fn compute_changes(current: &PolicyFlags, desired: &PolicyFlags) -> ChangeSet {
    let changes = PolicyField::ALL
        .into_iter()
        .filter_map(|field| {
            let old = current.get(field);
            let new = desired.get(field);
            (old != new).then_some(FieldChange { field, old, new })
        })
        .collect();

    ChangeSet { changes }
}

/// One rendered line of a host diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLine {
    pub field: PolicyField,
    pub old: bool,
    pub new: bool,
}

impl DiffLine {
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }

    /// Change marker: `~` for changed lines, blank otherwise
    pub fn marker(&self) -> &'static str {
        if self.is_changed() { "~" } else { " " }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<24}: {} → {}",
            self.marker(),
            self.field.name(),
            flag_symbol(self.old),
            flag_symbol(self.new)
        )
    }
}

/// Display symbol for a flag value
pub fn flag_symbol(value: bool) -> &'static str {
    if value { "✓" } else { "✗" }
}

/// Render every canonical field, changed or not, for operator review
pub fn render(current: &PolicyFlags, desired: &PolicyFlags) -> Vec<DiffLine> {
    PolicyField::ALL
        .into_iter()
        .map(|field| DiffLine {
            field,
            old: current.get(field),
            new: desired.get(field),
        })
        .collect()
}

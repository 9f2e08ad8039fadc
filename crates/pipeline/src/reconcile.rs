//! Label reconciliation.

use std::collections::HashSet;

use crate::LabelName;

/// Returns the labels in `desired` that are not in `current`.
///
/// Both inputs are compared as sets of case-sensitive names; duplicates
/// collapse. The result keeps the first-occurrence order of `desired`.
pub fn delta(current: &[LabelName], desired: &[LabelName]) -> Vec<LabelName> {
    let mut seen: HashSet<&str> = current.iter().map(LabelName::as_str).collect();
    desired
        .iter()
        .filter(|label| seen.insert(label.as_str()))
        .cloned()
        .collect()
}

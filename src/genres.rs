use crate::config::GenrePolicy;
use crate::error::{NormalizeError, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

static GENRES_FIELD: &str = "genres";

/// Collects every genre token referenced by the game records.
///
/// A comma-delimited string is split and trimmed; a sequence contributes its
/// string elements verbatim. Empty tokens are dropped.
pub fn extract_genres(records: &[Value], policy: GenrePolicy) -> Result<BTreeSet<String>> {
    let mut used = BTreeSet::new();

    for (index, record) in records.iter().enumerate() {
        let Some(obj) = record.as_object() else {
            if policy == GenrePolicy::Strict {
                return Err(NormalizeError::record(index, "record is not an object"));
            }
            debug!(index, "skipping non-object game record");
            continue;
        };

        match obj.get(GENRES_FIELD) {
            None => {}
            Some(Value::String(s)) => {
                used.extend(split_genres(s).map(str::to_string));
            }
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(g) if !g.is_empty() => {
                            used.insert(g.clone());
                        }
                        Value::String(_) => {}
                        other => {
                            if policy == GenrePolicy::Strict {
                                return Err(NormalizeError::record(
                                    index,
                                    format!("non-string genre {}", other),
                                ));
                            }
                            debug!(index, value = %other, "ignoring non-string genre");
                        }
                    }
                }
            }
            Some(other) => {
                if policy == GenrePolicy::Strict {
                    return Err(NormalizeError::record(
                        index,
                        format!("genres must be a string or a list, got {}", other),
                    ));
                }
                debug!(index, value = %other, "treating unexpected genres value as absent");
            }
        }
    }

    Ok(used)
}

fn split_genres(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|g| !g.is_empty())
}

/// Outcome of reconciling the genre list against the genres in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Length of the list as read, duplicates included.
    pub before: usize,
    /// Sorted, deduplicated list to persist.
    pub genres: Vec<String>,
    /// Sync: genres used but missing from the list. Prune: entries removed.
    pub diff: Vec<String>,
}

impl Reconciliation {
    pub fn is_noop(&self, current: &[String]) -> bool {
        self.diff.is_empty() && self.genres == current
    }
}

/// Rebuilds the list from scratch as exactly the sorted set of used genres.
pub fn sync(used: &BTreeSet<String>, current: &[String]) -> Reconciliation {
    let listed: BTreeSet<&str> = current.iter().map(String::as_str).collect();
    let diff = used
        .iter()
        .filter(|g| !listed.contains(g.as_str()))
        .cloned()
        .collect();

    Reconciliation {
        before: current.len(),
        genres: used.iter().cloned().collect(),
        diff,
    }
}

/// Keeps only list entries still referenced by at least one record.
pub fn prune(used: &BTreeSet<String>, current: &[String]) -> Reconciliation {
    let listed: BTreeSet<&String> = current.iter().collect();
    let (kept, removed): (Vec<&String>, Vec<&String>) =
        listed.into_iter().partition(|g| used.contains(*g));

    Reconciliation {
        before: current.len(),
        genres: kept.into_iter().cloned().collect(),
        diff: removed.into_iter().cloned().collect(),
    }
}

use crate::config::{AliasTable, DataPaths, GenrePolicy};
use crate::error::NormalizeError;
use crate::genres::{self, Reconciliation};
use crate::normalizer::{self, CanonStats, Keyed};
use crate::output;
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreMode {
    /// Replace the list with the sorted set of genres in use.
    Sync,
    /// Drop list entries no record references.
    Prune,
}

pub fn run_genres(
    paths: &DataPaths,
    mode: GenreMode,
    policy: GenrePolicy,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<Reconciliation> {
    let games_path = paths.games_path();
    let genres_path = paths.genres_path();

    let games: Value = output::read_json(&games_path)?;
    let Value::Array(games) = games else {
        return Err(NormalizeError::shape(&games_path, "an array of game records").into());
    };
    let current: Vec<String> = output::read_json(&genres_path)?;

    let used = genres::extract_genres(&games, policy)?;
    info!(
        records = games.len(),
        used = used.len(),
        listed = current.len(),
        "collected genres"
    );

    let result = match mode {
        GenreMode::Sync => genres::sync(&used, &current),
        GenreMode::Prune => genres::prune(&used, &current),
    };

    if result.is_noop(&current) {
        info!(path = %genres_path.display(), "genre list already up to date");
    }
    if !dry_run {
        output::write_json_atomic(&genres_path, &result.genres)?;
    }

    let report = match mode {
        GenreMode::Sync => output::write_sync_report(out, &genres_path, &result, dry_run),
        GenreMode::Prune => output::write_prune_report(out, &genres_path, &result, dry_run),
    };
    report.context("failed to write report")?;

    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagsSummary {
    pub written: usize,
    pub dropped: usize,
    pub reshaped: bool,
    pub stats: CanonStats,
}

pub fn run_tags(
    paths: &DataPaths,
    aliases: &AliasTable,
    id_field: &str,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<TagsSummary> {
    let tags_path = paths.tags_path();
    let document: Value = output::read_json(&tags_path)?;

    let (mut keyed, reshaped) = match document {
        Value::Array(records) => (normalizer::key_by_identifier(records, id_field), true),
        Value::Object(records) => (
            Keyed {
                records,
                dropped: 0,
            },
            false,
        ),
        _ => {
            return Err(
                NormalizeError::shape(&tags_path, "an array or an object of tag records").into(),
            );
        }
    };

    let stats = normalizer::canonicalize(&mut keyed.records, aliases);
    info!(
        records = keyed.records.len(),
        dropped = keyed.dropped,
        reshaped,
        aliases = aliases.len(),
        tags = stats.tags_rewritten,
        score_keys = stats.score_keys_rewritten,
        "canonicalized tag records"
    );

    if !dry_run {
        output::write_json_atomic(&tags_path, &keyed.records)?;
    }

    let summary = TagsSummary {
        written: keyed.records.len(),
        dropped: keyed.dropped,
        reshaped,
        stats,
    };
    output::write_tags_report(
        out,
        &tags_path,
        summary.written,
        summary.dropped,
        &summary.stats,
        aliases,
        dry_run,
    )
    .context("failed to write report")?;

    Ok(summary)
}

use crate::config::AliasTable;
use crate::error::{NormalizeError, Result};
use crate::genres::Reconciliation;
use crate::normalizer::CanonStats;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Maximum number of removed genres listed before collapsing into a count.
pub const PREVIEW_LIMIT: usize = 10;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| NormalizeError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| NormalizeError::json(path, e))
}

/// Replaces `path` with the pretty-printed JSON of `value`.
///
/// The document is written to a temporary file next to the target and
/// renamed over it, so a failed run never leaves a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| NormalizeError::json(path, e))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| NormalizeError::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| NormalizeError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| NormalizeError::io(tmp.path(), e))?;

    // temp files are created 0600; keep the mode of the file being replaced
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| NormalizeError::io(tmp.path(), e))?;
    }

    tmp.persist(path).map_err(|source| NormalizeError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_outcome(out: &mut dyn Write, path: &Path, count: usize, dry_run: bool) -> io::Result<()> {
    if dry_run {
        writeln!(out, "\nDry run: {} not written ({} genres)", file_name(path), count)
    } else {
        writeln!(out, "\nUpdated {} ({} genres)", file_name(path), count)
    }
}

pub fn write_sync_report(
    out: &mut dyn Write,
    genres_path: &Path,
    result: &Reconciliation,
    dry_run: bool,
) -> io::Result<()> {
    let name = file_name(genres_path);
    writeln!(out, "Genres in use: {}\n", result.genres.len())?;
    writeln!(out, "All genres:")?;
    for (i, genre) in result.genres.iter().enumerate() {
        writeln!(out, "{:2}. {}", i + 1, genre)?;
    }

    if result.diff.is_empty() {
        writeln!(out, "\n{} already covers every genre in use", name)?;
    } else {
        writeln!(out, "\nMissing from {} ({}):", name, result.diff.len())?;
        for genre in &result.diff {
            writeln!(out, "  - {}", genre)?;
        }
    }

    write_outcome(out, genres_path, result.genres.len(), dry_run)
}

pub fn write_prune_report(
    out: &mut dyn Write,
    genres_path: &Path,
    result: &Reconciliation,
    dry_run: bool,
) -> io::Result<()> {
    let name = file_name(genres_path);
    writeln!(out, "Genres listed: {}", result.before)?;
    writeln!(out, "Genres kept:   {}", result.genres.len())?;

    if result.diff.is_empty() {
        writeln!(out, "\nNo unused genres in {}", name)?;
    } else {
        writeln!(out, "\nRemoving {} unused genre(s):", result.diff.len())?;
        for genre in result.diff.iter().take(PREVIEW_LIMIT) {
            writeln!(out, "  - {}", genre)?;
        }
        if result.diff.len() > PREVIEW_LIMIT {
            writeln!(out, "  ... and {} more", result.diff.len() - PREVIEW_LIMIT)?;
        }
    }

    write_outcome(out, genres_path, result.genres.len(), dry_run)
}

pub fn write_tags_report(
    out: &mut dyn Write,
    tags_path: &Path,
    written: usize,
    dropped: usize,
    stats: &CanonStats,
    aliases: &AliasTable,
    dry_run: bool,
) -> io::Result<()> {
    let name = file_name(tags_path);
    if dry_run {
        writeln!(out, "Dry run: {} not written ({} records)", name, written)?;
    } else {
        writeln!(out, "Normalized tag names in {} ({} records)", name, written)?;
    }
    if dropped > 0 {
        writeln!(out, "Dropped {} record(s) without an identifier", dropped)?;
    }
    writeln!(
        out,
        "Rewrote {} tag(s) and {} score key(s)",
        stats.tags_rewritten, stats.score_keys_rewritten
    )?;

    writeln!(out, "Alias table:")?;
    for (alias, canonical) in aliases.iter() {
        writeln!(out, "  {} -> {}", alias, canonical)?;
    }
    Ok(())
}

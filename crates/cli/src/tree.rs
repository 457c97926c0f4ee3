//! Change detection between two local directory trees.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use review_gate_rules::FileDiff;
use tracing::debug;
use walkdir::WalkDir;

/// Relative paths of every file under `root`, `/`-separated.
/// `.git` directories are skipped.
fn list_files(root: &Path) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        let parts: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect();
        files.insert(parts.join("/"));
    }
    Ok(files)
}

fn read_if_present(root: &Path, path: &str) -> Result<Option<Vec<u8>>> {
    let full = root.join(path);
    if !full.is_file() {
        return Ok(None);
    }
    let content = std::fs::read(&full).with_context(|| format!("failed to read {}", full.display()))?;
    Ok(Some(content))
}

/// Classify one path by which trees hold it.
fn classify(base: &Path, head: &Path, path: &str) -> Result<Option<FileDiff>> {
    let diff = match (read_if_present(base, path)?, read_if_present(head, path)?) {
        (Some(old), Some(new)) if old == new => {
            debug!(path, "unchanged");
            return Ok(None);
        }
        (Some(_), Some(_)) => FileDiff::modified(path),
        (None, Some(_)) => FileDiff::added(path),
        (Some(_), None) => FileDiff::deleted(path),
        (None, None) => bail!("{} exists in neither tree", path),
    };
    Ok(Some(diff))
}

/// Diff entries for the given paths, or for every file that differs
/// between the trees when `paths` is empty.
pub fn changed_files(base: &Path, head: &Path, paths: &[String]) -> Result<Vec<FileDiff>> {
    let candidates: BTreeSet<String> = if paths.is_empty() {
        let mut all = list_files(base)?;
        all.extend(list_files(head)?);
        all
    } else {
        paths.iter().map(|p| p.trim_start_matches('/').to_string()).collect()
    };

    let mut diffs = Vec::new();
    for path in &candidates {
        if let Some(diff) = classify(base, head, path)? {
            diffs.push(diff);
        }
    }
    Ok(diffs)
}

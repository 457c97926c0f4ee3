//! Diff-to-file extraction.
//!
//! Turns the output of a unified-diff parser into [`ReviewableFile`]s, one
//! per touched path, tagged with the revisions the content fetcher needs.
//! [`is_version_only_bump`] inspects hunks directly for the narrow case of
//! a single `version:` line edit in a dev or qa environment.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::file::{ReviewableContent, ReviewableFile};

/// Sentinel path marking a side on which the file does not exist.
pub const NULL_PATH: &str = "/dev/null";

/// One hunk of a file diff. `body` holds the hunk lines with their
/// ` `/`+`/`-` markers, without the `@@` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub body: String,
}

/// One file entry of a parsed multi-file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    #[serde(default)]
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    pub fn new(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            hunks: Vec::new(),
        }
    }

    pub fn modified(path: &str) -> Self {
        Self::new(format!("a/{path}"), format!("b/{path}"))
    }

    pub fn added(path: &str) -> Self {
        Self::new(NULL_PATH, format!("b/{path}"))
    }

    pub fn deleted(path: &str) -> Self {
        Self::new(format!("a/{path}"), NULL_PATH)
    }

    pub fn with_hunk(mut self, body: impl Into<String>) -> Self {
        self.hunks.push(Hunk {
            body: body.into(),
            ..Hunk::default()
        });
        self
    }
}

// ── Version bump detection ──────────────────────────────────────────

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `a/<name>-dev/<file>.yml` or `a/<name>-qa/<file>.yml`, one level deep.
fn is_bumpable_path(old_path: &str) -> bool {
    let Some((dir, file)) = old_path.strip_prefix("a/").and_then(|p| p.split_once('/')) else {
        return false;
    };
    let env_ok = dir
        .rsplit_once('-')
        .is_some_and(|(name, env)| is_word(name) && matches!(env, "dev" | "qa"));
    env_ok && file.strip_suffix(".yml").is_some_and(is_word)
}

/// An indented `version:` key behind a `+` or `-` marker.
fn is_version_line(line: &str) -> bool {
    let rest = &line[1..];
    rest.starts_with(char::is_whitespace) && rest.trim_start().starts_with("version:")
}

/// Whether the diff touches exactly one dev/qa YAML file, in one hunk,
/// replacing exactly one `version:` line with another.
///
/// Independent of any rule set: callers use it to approve plain version
/// bumps outright.
pub fn is_version_only_bump(diffs: &[FileDiff]) -> bool {
    let [diff] = diffs else {
        debug!(files = diffs.len(), "not a version bump: expected exactly one file");
        return false;
    };
    if !is_bumpable_path(&diff.old_path) {
        debug!(path = %diff.old_path, "not a version bump: path outside dev/qa YAML");
        return false;
    }
    let [hunk] = diff.hunks.as_slice() else {
        debug!(hunks = diff.hunks.len(), "not a version bump: expected exactly one hunk");
        return false;
    };

    for marker in ['+', '-'] {
        let lines: Vec<&str> = hunk.body.lines().filter(|l| l.starts_with(marker)).collect();
        match lines.as_slice() {
            [line] if is_version_line(line) => {}
            _ => {
                debug!(%marker, lines = lines.len(), "not a version bump: changed lines are not a single version edit");
                return false;
            }
        }
    }
    true
}

/// Strip the `a/` or `b/` prefix git puts on diff paths.
fn repo_path<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}

/// Build one [`ReviewableFile`] per diff entry, in diff order.
///
/// The head side is created unless the new path is [`NULL_PATH`]; the base
/// side unless the old path is. Renames keep both sides with differing paths.
pub fn extract(
    diffs: &[FileDiff],
    owner: &str,
    repo: &str,
    head_revision: &str,
    base_revision: &str,
) -> Vec<ReviewableFile> {
    diffs
        .iter()
        .map(|diff| {
            let head = (diff.new_path != NULL_PATH)
                .then(|| ReviewableContent::new(repo_path(&diff.new_path, "b/"), head_revision));
            let base = (diff.old_path != NULL_PATH)
                .then(|| ReviewableContent::new(repo_path(&diff.old_path, "a/"), base_revision));
            let file = ReviewableFile::new(owner, repo, head, base);
            debug!(
                path = %file.path(),
                added = file.is_added(),
                deleted = file.is_deleted(),
                renamed = file.is_renamed(),
                "extracted reviewable file"
            );
            file
        })
        .collect()
}

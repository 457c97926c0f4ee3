//! Reviewable file model: one file touched by a diff, with optional
//! base and head sides.

use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::error::{GateError, Result};
use crate::flatten::{flatten_documents, DocumentSet, FlatKeyMap};

/// Whether a path names a structured (YAML) document worth decoding.
pub fn is_structured_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}

// ── Content slot ────────────────────────────────────────────────────

/// One side of a reviewable file: a path at a revision, its raw bytes once
/// fetched, and its flattened documents once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewableContent {
    path: String,
    revision: String,
    content: Option<Bytes>,
    documents: Option<DocumentSet>,
}

impl ReviewableContent {
    pub fn new(path: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            revision: revision.into(),
            content: None,
            documents: None,
        }
    }

    /// Build a slot whose documents are already flattened.
    pub fn with_documents(mut self, documents: DocumentSet) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Store the fetched bytes for this side.
    pub fn set_content(&mut self, content: Bytes) {
        self.content = Some(content);
    }

    /// Flattened documents, in stream order. Empty until parsed, and for
    /// files that are not structured documents.
    pub fn documents(&self) -> &[FlatKeyMap] {
        self.documents.as_deref().unwrap_or(&[])
    }

    pub fn is_parsed(&self) -> bool {
        self.documents.is_some()
    }

    /// Decode the fetched bytes into flattened documents.
    ///
    /// Paths without a YAML extension are left undecoded. Decoding errors
    /// are returned with the path and revision attached.
    pub fn parse(&mut self) -> Result<()> {
        if !is_structured_path(&self.path) {
            debug!(path = %self.path, "not a YAML file, skipping decode");
            return Ok(());
        }
        let content = self.content.as_ref().ok_or_else(|| GateError::MissingContent {
            path: self.path.clone(),
            revision: self.revision.clone(),
        })?;
        let documents = flatten_documents(content).map_err(|source| GateError::Decode {
            path: self.path.clone(),
            revision: self.revision.clone(),
            source,
        })?;
        debug!(path = %self.path, revision = %self.revision, documents = documents.len(), "parsed content");
        self.documents = Some(documents);
        Ok(())
    }
}

// ── File ────────────────────────────────────────────────────────────

/// A file touched by a diff. An absent `base` means the file was added; an
/// absent `head` means it was deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewableFile {
    pub owner: String,
    pub repo: String,
    pub head: Option<ReviewableContent>,
    pub base: Option<ReviewableContent>,
}

impl ReviewableFile {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        head: Option<ReviewableContent>,
        base: Option<ReviewableContent>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            head,
            base,
        }
    }

    pub fn is_added(&self) -> bool {
        self.base.is_none() && self.head.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.head.is_none() && self.base.is_some()
    }

    pub fn is_renamed(&self) -> bool {
        match (&self.head, &self.base) {
            (Some(head), Some(base)) => head.path() != base.path(),
            _ => false,
        }
    }

    /// Display path: the head path, or the base path for deletions.
    pub fn path(&self) -> &str {
        self.head
            .as_ref()
            .or(self.base.as_ref())
            .map(ReviewableContent::path)
            .unwrap_or("")
    }

    /// Present sides, head first.
    pub fn sides_mut(&mut self) -> impl Iterator<Item = &mut ReviewableContent> {
        self.head.iter_mut().chain(self.base.iter_mut())
    }

    /// Parse both present sides.
    pub fn parse(&mut self) -> Result<()> {
        for side in self.sides_mut() {
            side.parse()?;
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

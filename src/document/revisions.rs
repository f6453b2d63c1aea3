//! Append-only log of document snapshots.

use super::record::DocumentRecord;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha512};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Hex SHA-512 stamp a revision is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionKey(String);

impl RevisionKey {
    fn stamp(recorded_at: &DateTime<Utc>, label: &str, sequence: u64) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(recorded_at.to_rfc3339().as_bytes());
        hasher.update(label.as_bytes());
        hasher.update(sequence.to_be_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One snapshot in the log.
#[derive(Debug, Clone)]
pub struct Revision {
    pub key: RevisionKey,
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub label: String,
    pub document: DocumentRecord,
}

/// Ordered snapshots of documents, each under a timestamp-derived key.
///
/// Recording copies the document, so later edits to the caller's record do
/// not change the stored revision. Nothing is ever removed.
#[derive(Debug, Default)]
pub struct DocumentRevisions {
    revisions: DashMap<RevisionKey, Revision>,
    sequence: AtomicU64,
}

impl DocumentRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snapshot of `document` labelled `label` and returns its key.
    pub fn record(&self, label: impl Into<String>, document: &DocumentRecord) -> RevisionKey {
        let label = label.into();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let recorded_at = Utc::now();
        let key = RevisionKey::stamp(&recorded_at, &label, sequence);

        info!(
            document = document.name(),
            label = %label,
            revision = key.as_str().get(..16).unwrap_or(key.as_str()),
            "Recorded document revision"
        );
        self.revisions.insert(
            key.clone(),
            Revision {
                key: key.clone(),
                sequence,
                recorded_at,
                label,
                document: document.clone(),
            },
        );
        key
    }

    pub fn get(&self, key: &RevisionKey) -> Option<Revision> {
        self.revisions.get(key).map(|r| r.value().clone())
    }

    /// All revisions in the order they were recorded.
    pub fn revisions(&self) -> Vec<Revision> {
        let mut all: Vec<Revision> = self.revisions.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|r| r.sequence);
        all
    }

    /// Revisions recorded under `label`, oldest first.
    pub fn for_label(&self, label: &str) -> Vec<Revision> {
        self.revisions()
            .into_iter()
            .filter(|r| r.label == label)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentTypeBuilder, FieldValue};
    use crate::schema::FieldType;
    use std::sync::Arc;

    fn invoice() -> DocumentRecord {
        let doc_type = DocumentTypeBuilder::new("Invoice")
            .field("ID", FieldType::Identifier)
            .build()
            .unwrap();
        Arc::new(Arc::new(doc_type).instantiate()).duplicate()
    }

    #[test]
    fn test_revisions_keep_insertion_order() {
        let revisions = DocumentRevisions::new();
        let mut doc = invoice();

        let first = revisions.record("INV-1", &doc);
        doc.set("ID", FieldValue::Identifier("INV-1".into())).unwrap();
        let second = revisions.record("INV-1", &doc);

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 128);
        let all = revisions.revisions();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, first);
        assert_eq!(all[1].key, second);
    }

    #[test]
    fn test_snapshot_is_independent_of_caller_record() {
        let revisions = DocumentRevisions::new();
        let mut doc = invoice();
        let key = revisions.record("draft", &doc);

        doc.set("ID", FieldValue::Identifier("changed".into())).unwrap();

        let stored = revisions.get(&key).unwrap();
        assert_eq!(
            stored.document.get("ID").unwrap(),
            &FieldValue::Identifier(String::new())
        );
        assert_eq!(revisions.for_label("draft").len(), 1);
        assert!(revisions.for_label("final").is_empty());
    }
}

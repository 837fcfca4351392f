use futures::stream::{FuturesUnordered, StreamExt};
use kernel::{validate, FileRecord, Rejection};

use crate::candidate::Candidate;
use crate::store::RecordStore;

/// What happened to one candidate of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Rejected { name: String, reason: Rejection },
    Stored { name: String, record: FileRecord, link: String },
    Failed { name: String, error: String },
}

impl UploadOutcome {
    /// User facing acknowledgement of the outcome.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            UploadOutcome::Rejected { name, reason } => {
                format!("File {name} is not supported or too large: {reason}.")
            }
            UploadOutcome::Stored { record, .. } => {
                format!("File {} uploaded successfully!", record.filename)
            }
            UploadOutcome::Failed { name, error } => format!("Failed to upload {name}: {error}"),
        }
    }

    #[must_use]
    pub fn is_stored(&self) -> bool {
        matches!(self, UploadOutcome::Stored { .. })
    }
}

/// Validates candidate files and hands the valid ones to a store.
#[derive(Debug)]
pub struct UploadController<S> {
    store: S,
    current_upload: Option<String>,
}

impl<S: RecordStore> UploadController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current_upload: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Link of the most recently completed successful upload.
    #[must_use]
    pub fn current_upload(&self) -> Option<&str> {
        self.current_upload.as_deref()
    }

    /// Rejections come first in input order, the uploads follow in the order
    /// they complete.
    pub async fn submit(&mut self, candidates: Vec<Candidate>) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut accepted = Vec::new();
        for candidate in candidates {
            match validate(&candidate.mime, candidate.size) {
                Ok(()) => accepted.push(candidate),
                Err(reason) => {
                    tracing::warn!("{} rejected: {reason}", candidate.name);
                    outcomes.push(UploadOutcome::Rejected {
                        name: candidate.name,
                        reason,
                    });
                }
            }
        }

        let store = &self.store;
        let mut uploads: FuturesUnordered<_> = accepted
            .iter()
            .map(|candidate| async move { (candidate, store.save(candidate).await) })
            .collect();

        while let Some((candidate, result)) = uploads.next().await {
            let outcome = match result {
                Ok(record) => {
                    let link = store.link(&record);
                    UploadOutcome::Stored {
                        name: candidate.name.clone(),
                        record,
                        link,
                    }
                }
                Err(e) => {
                    tracing::error!("upload of {} failed: {e}", candidate.name);
                    UploadOutcome::Failed {
                        name: candidate.name.clone(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        drop(uploads);

        if let Some(UploadOutcome::Stored { link, .. }) =
            outcomes.iter().rev().find(|o| o.is_stored())
        {
            self.current_upload = Some(link.clone());
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::tests::MemoryStore;
    use std::path::PathBuf;

    const MIB: u64 = 1024 * 1024;

    fn candidate(name: &str, mime: &str, size: u64) -> Candidate {
        Candidate {
            name: name.to_owned(),
            mime: mime.to_owned(),
            size,
            path: PathBuf::from(name),
        }
    }

    #[tokio::test]
    async fn oversized_and_foreign_types_never_reach_store() {
        // Arrange
        let store = MemoryStore::default();
        let mut controller = UploadController::new(store.clone());

        // Act
        let outcomes = controller
            .submit(vec![
                candidate("big.jpg", "image/jpeg", 6 * MIB),
                candidate("doc.pdf", "application/pdf", 10),
                candidate("ok.png", "image/png", 2 * MIB),
            ])
            .await;

        // Assert
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            &outcomes[0],
            UploadOutcome::Rejected { reason: Rejection::TooLarge { .. }, .. }
        ));
        assert!(matches!(
            &outcomes[1],
            UploadOutcome::Rejected { reason: Rejection::UnsupportedType(_), .. }
        ));
        assert!(outcomes[2].is_stored());
        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "ok.png");
        drop(records);
        assert_eq!(controller.current_upload(), Some("/media/ok.png"));
    }

    #[tokio::test]
    async fn failures_do_not_block_the_batch() {
        // Arrange
        let store = MemoryStore {
            failing: true,
            ..MemoryStore::default()
        };
        let mut controller = UploadController::new(store);

        // Act
        let outcomes = controller
            .submit(vec![
                candidate("a.png", "image/png", 10),
                candidate("b.gif", "image/gif", 10),
            ])
            .await;

        // Assert
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, UploadOutcome::Failed { .. })));
        assert!(controller.current_upload().is_none());
    }

    #[tokio::test]
    async fn every_valid_candidate_is_stored() {
        let store = MemoryStore::default();
        let mut controller = UploadController::new(store.clone());
        let batch = (0..8)
            .map(|i| candidate(&format!("f{i}.jpg"), "image/jpeg", 100))
            .collect();

        let outcomes = controller.submit(batch).await;

        assert!(outcomes.iter().all(UploadOutcome::is_stored));
        assert_eq!(store.records.lock().unwrap().len(), 8);
        assert!(controller.current_upload().is_some());
    }

    #[test]
    fn notices() {
        let stored = UploadOutcome::Stored {
            name: "cat.png".to_owned(),
            record: FileRecord {
                filename: "cat_1.png".to_owned(),
                display_name: "cat.png".to_owned(),
                url: "/media/cat_1.png".to_owned(),
            },
            link: "/media/cat_1.png".to_owned(),
        };
        let failed = UploadOutcome::Failed {
            name: "cat.png".to_owned(),
            error: "boom".to_owned(),
        };

        assert_eq!(stored.notice(), "File cat_1.png uploaded successfully!");
        assert_eq!(failed.notice(), "Failed to upload cat.png: boom");
    }
}

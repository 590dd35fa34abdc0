//! File repository: list, upload, delete and preview of paper records.
//!
//! Every paper is a metadata row plus one blob. There is no transaction
//! spanning the two, so operations order their writes:
//! - upload writes the blob first and the row second
//! - delete removes the row first and the blob second
//!
//! A row therefore never points at a missing blob. The reverse (a blob
//! with no row) can happen when a compensating delete fails; it is logged
//! and counted, never reported to the caller.

use crate::auth::AuthOutcome;
use crate::metrics;
use crate::service::error::{ServiceError, ServiceResult};
use bytes::Bytes;
use folio_metadata::MetadataStore;
use folio_metadata::models::{NewPaper, PaperRow};
use folio_metadata::repos::PaperRepo;
use folio_storage::{BlobStore, StorageError};
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;

/// An upload as received from the client.
#[derive(Debug, Clone, Default)]
pub struct NewUpload {
    /// File name as sent by the client.
    pub original_name: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i64,
    pub abstract_text: String,
    pub data: Bytes,
}

/// Orchestrates paper records and their blobs.
#[derive(Clone)]
pub struct PaperService {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn BlobStore>,
    public_prefix: String,
}

impl PaperService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn BlobStore>,
        public_prefix: impl Into<String>,
    ) -> Self {
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Self {
            metadata,
            storage,
            public_prefix,
        }
    }

    /// List papers visible to the caller.
    ///
    /// Anonymous callers see the whole catalog; authenticated callers see
    /// only their own papers; an invalid token is rejected.
    pub async fn list(&self, auth: &AuthOutcome) -> ServiceResult<Vec<PaperRow>> {
        match auth {
            AuthOutcome::Invalid => Err(ServiceError::Unauthorized(
                "invalid session token".to_string(),
            )),
            AuthOutcome::Anonymous => Ok(self.metadata.list_papers().await?),
            AuthOutcome::Authenticated { user_id } => {
                Ok(self.metadata.list_papers_for_user(*user_id).await?)
            }
        }
    }

    /// Store an uploaded file and record it under `user_id`.
    pub async fn upload(&self, user_id: i64, upload: NewUpload) -> ServiceResult<PaperRow> {
        let started = Instant::now();
        let key = folio_core::stored_name_for(&upload.original_name);
        let size = upload.data.len();

        self.storage
            .put(&key, upload.data)
            .await
            .map_err(ServiceError::BlobWrite)?;

        let paper = NewPaper {
            title: upload.title,
            author: upload.author,
            publisher: upload.publisher,
            year: upload.year,
            abstract_text: upload.abstract_text,
            file_name: upload.original_name,
            file_path: key.clone(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        };

        let row = match self.metadata.create_paper(&paper).await {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    file_path = %key,
                    error = %e,
                    "paper insert failed after blob write, removing blob"
                );
                if let Err(cleanup) = self.remove_blob(&key).await {
                    metrics::record_orphan_blob("insert_failed");
                    tracing::error!(
                        file_path = %key,
                        error = %cleanup,
                        "failed to remove blob after insert failure; blob is orphaned"
                    );
                }
                return Err(e.into());
            }
        };

        metrics::PAPERS_UPLOADED.inc();
        metrics::BYTES_UPLOADED.inc_by(size as u64);
        metrics::UPLOAD_DURATION.observe(started.elapsed().as_secs_f64());
        tracing::info!(
            paper_id = row.paper_id,
            user_id,
            file_path = %row.file_path,
            size,
            "paper uploaded"
        );
        Ok(row)
    }

    /// Delete a paper owned by `user_id`.
    ///
    /// Missing papers report `NotFound` and touch nothing. Papers owned by
    /// someone else report `Forbidden` and touch nothing.
    pub async fn delete(&self, user_id: i64, paper_id: i64) -> ServiceResult<()> {
        let paper = self
            .metadata
            .get_paper(paper_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("paper {paper_id}")))?;

        if paper.user_id != user_id {
            tracing::info!(paper_id, user_id, "delete rejected: not the owner");
            return Err(ServiceError::Forbidden(format!("paper {paper_id}")));
        }

        // A concurrent delete may have won between the lookup and here.
        if !self.metadata.delete_paper(paper_id, user_id).await? {
            return Err(ServiceError::NotFound(format!("paper {paper_id}")));
        }

        metrics::PAPERS_DELETED.inc();

        if let Err(e) = self.remove_blob(&paper.file_path).await {
            metrics::record_orphan_blob("record_deleted");
            tracing::error!(
                paper_id,
                file_path = %paper.file_path,
                error = %e,
                "record deleted but blob removal failed; blob is orphaned"
            );
        } else {
            tracing::info!(paper_id, user_id, "paper deleted");
        }

        Ok(())
    }

    /// Public URL of a paper's blob.
    ///
    /// Any caller may preview any paper; ownership is not checked.
    pub async fn preview(&self, paper_id: i64) -> ServiceResult<String> {
        let paper = self
            .metadata
            .get_paper(paper_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("paper {paper_id}")))?;
        Ok(self.file_url(&paper.file_path))
    }

    /// URL under which a stored blob is served.
    pub fn file_url(&self, file_path: &str) -> String {
        format!("{}/{}", self.public_prefix, file_path)
    }

    async fn remove_blob(&self, key: &str) -> ServiceResult<()> {
        match self.storage.delete(key).await {
            Ok(()) => Ok(()),
            // Already gone: nothing left to orphan.
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(file_path = %key, "blob already missing on removal");
                Ok(())
            }
            Err(e) => Err(ServiceError::BlobDelete(e)),
        }
    }
}

//! Registry of the user's uploaded documents.

use std::sync::{Arc, Mutex};

use log::info;

use crate::api::{ApiError, Document, StudyApi};

/// Owns the cached document list for the active session.
///
/// The cached list is only ever replaced wholesale after a successful fetch;
/// a failed mutation leaves the previously confirmed list untouched.
#[derive(Clone)]
pub struct DocumentRegistry {
    api: Arc<dyn StudyApi>,
    documents: Arc<Mutex<Vec<Document>>>,
}

impl DocumentRegistry {
    pub fn new(api: Arc<dyn StudyApi>) -> Self {
        Self {
            api,
            documents: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the cached list.
    pub fn documents(&self) -> Vec<Document> {
        self.documents.lock().expect("document lock poisoned").clone()
    }

    /// Fetch the user's documents and replace the cached list.
    pub async fn refresh(&self, user_id: i64) -> Result<Vec<Document>, ApiError> {
        let documents = self.api.documents(user_id).await?;
        *self.documents.lock().expect("document lock poisoned") = documents.clone();
        Ok(documents)
    }

    /// Upload a PDF and re-fetch the list before reporting the new document,
    /// so the returned document is guaranteed to appear in the cached list.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>, user_id: i64) -> Result<Document, ApiError> {
        if bytes.is_empty() {
            return Err(ApiError::Upload("File is empty".to_string()));
        }
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(ApiError::Upload(format!("Only PDF files are supported: {filename}")));
        }

        let receipt = self.api.upload_pdf(filename, bytes, user_id).await?;
        info!("Uploaded document {} ({})", receipt.document_id, receipt.filename);

        let documents = self.refresh(user_id).await?;
        documents
            .into_iter()
            .find(|d| d.id == receipt.document_id)
            .ok_or_else(|| {
                ApiError::InvalidData(format!(
                    "Uploaded document {} missing from listing",
                    receipt.document_id
                ))
            })
    }

    /// Delete a document and re-fetch the list. Selection consequences are
    /// the coordinator's concern.
    pub async fn remove(&self, document_id: i64, user_id: i64) -> Result<(), ApiError> {
        self.api.delete_document(document_id, user_id).await?;
        info!("Deleted document {document_id}");
        self.refresh(user_id).await?;
        Ok(())
    }

    /// Drop the cached list (sign-out).
    pub fn clear(&self) {
        self.documents.lock().expect("document lock poisoned").clear();
    }
}

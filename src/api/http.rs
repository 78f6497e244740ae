//! HTTP implementation of the study backend API.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde_json::json;

use super::{ApiError, ArtifactSummary, Document, FlashcardSetDetail, QuizQuestion, Session, StudyApi, UploadReceipt};

/// reqwest-backed [`StudyApi`] implementation.
///
/// `base_url` may be empty, in which case requests use same-origin relative
/// paths (proxy/dev setups); a non-empty base is used verbatim with any
/// trailing slash stripped.
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            http: Client::new(),
            base_url: base,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extract the FastAPI-style `{"detail": "..."}` message from an error
    /// response, falling back to the status line.
    async fn error_detail(response: Response) -> String {
        let status = response.status();
        match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("detail")
                .and_then(|d| d.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}")),
            Err(_) => format!("HTTP {status}"),
        }
    }

    /// Map a non-success response to the error taxonomy.
    async fn fail(response: Response) -> ApiError {
        let status = response.status();
        let message = Self::error_detail(response).await;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST => ApiError::InvalidData(message),
            _ => ApiError::Network(message),
        }
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::fail(response).await)
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidData(e.to_string()))
    }

    /// Run a request whose body we only care about for errors.
    async fn ack(response: Response) -> Result<(), ApiError> {
        Self::check(response).await.map(|_| ())
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

#[async_trait]
impl StudyApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(transport)?;

        match Self::decode(response).await {
            // Bad credentials arrive as 400; surface them as auth failures
            // with the backend's own message.
            Err(ApiError::InvalidData(message)) => Err(ApiError::Auth(message)),
            other => other,
        }
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(transport)?;

        match Self::ack(response).await {
            // Duplicate username arrives as 400.
            Err(ApiError::InvalidData(message)) => Err(ApiError::Auth(message)),
            other => other,
        }
    }

    async fn documents(&self, user_id: i64) -> Result<Vec<Document>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/documents/user/{user_id}")))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn upload_pdf(&self, filename: &str, bytes: Vec<u8>, user_id: i64) -> Result<UploadReceipt, ApiError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ApiError::Upload(e.to_string()))?;
        let form = multipart::Form::new().part("file", part).text("user_id", user_id.to_string());

        let response = self
            .http
            .post(self.url("/upload/pdf"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        match Self::decode(response).await {
            // Non-PDF or empty content arrives as 400.
            Err(ApiError::InvalidData(message)) => Err(ApiError::Upload(message)),
            other => other,
        }
    }

    async fn delete_document(&self, document_id: i64, user_id: i64) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/documents/{document_id}")))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::ack(response).await
    }

    async fn create_flashcards(&self, user_id: i64, document_id: i64, num_cards: u32) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/flashcard/create"))
            .json(&json!({
                "user_id": user_id,
                "document_id": document_id,
                "num_cards": num_cards,
            }))
            .send()
            .await
            .map_err(transport)?;
        Self::ack(response).await
    }

    async fn flashcard_sets(&self, user_id: i64, document_id: i64) -> Result<Vec<ArtifactSummary>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/flashcard/list/{user_id}")))
            .query(&[("document_id", document_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn flashcard_set(&self, set_id: i64, user_id: i64) -> Result<FlashcardSetDetail, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/flashcard/{set_id}")))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn delete_flashcard_set(&self, set_id: i64, user_id: i64) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/flashcard/{set_id}")))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::ack(response).await
    }

    async fn create_quiz(&self, user_id: i64, document_id: i64, num_questions: u32) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/quiz/create"))
            .json(&json!({
                "user_id": user_id,
                "document_id": document_id,
                "num_questions": num_questions,
            }))
            .send()
            .await
            .map_err(transport)?;
        Self::ack(response).await
    }

    async fn quizzes(&self, user_id: i64, document_id: i64) -> Result<Vec<ArtifactSummary>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/quiz/list/{user_id}")))
            .query(&[("document_id", document_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn quiz(&self, quiz_id: i64, user_id: i64) -> Result<Vec<QuizQuestion>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/quiz/{quiz_id}")))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn delete_quiz(&self, quiz_id: i64, user_id: i64) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/quiz/{quiz_id}")))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(transport)?;
        Self::ack(response).await
    }
}

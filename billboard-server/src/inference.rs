use billboard_lib::PREDICT_FIELD;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("failed to reach inference service: {0}")]
    Request(#[from] reqwest::Error),

    #[error("inference service answered with status {0}")]
    Status(u16),
}

/// Relays uploads to the inference service that draws the detections.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    url: String,
}

impl InferenceClient {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn predict(&self, filename: &str, file_bytes: Vec<u8>) -> Result<Vec<u8>, InferenceError> {
        let form = Form::new().part(PREDICT_FIELD, Part::bytes(file_bytes).file_name(filename.to_string()));
        let response = self.http.post(&self.url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(InferenceError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

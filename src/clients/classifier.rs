use async_trait::async_trait;
use log::debug;
use serde::Serialize;

use crate::clients::errors::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://derrickmuturi-sgd-bert.hf.space/predict";

#[derive(Serialize, Debug)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Grades a block of lyrics
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Grader: Send + Sync {
    /// Classifier response, relayed verbatim
    async fn grade(&self, lyrics: &str) -> Result<serde_json::Value>;
}

/// Client for the hosted text classifier
pub struct ClassifierClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ClassifierClient {
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        ClassifierClient { http, endpoint }
    }

    pub fn try_default(http: reqwest::Client) -> Self {
        let endpoint =
            std::env::var("CLASSIFIER_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(http, endpoint)
    }
}

#[async_trait]
impl Grader for ClassifierClient {
    async fn grade(&self, lyrics: &str) -> Result<serde_json::Value> {
        debug!("Grading {} bytes of lyrics", lyrics.len());
        let response = self
            .http
            .post(&self.endpoint)
            .json(&PredictRequest { text: lyrics })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                service: "classifier",
                status,
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use crate::clients::test_server;

    #[test]
    fn request_body_carries_text_field() {
        let body = serde_json::to_value(PredictRequest {
            text: "Is this the real life?\nIs this just fantasy?",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"text": "Is this the real life?\nIs this just fantasy?"})
        );
    }

    // Answers with fields the facade never looks at, so they must survive untouched
    async fn predict(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        match body["text"].as_str() {
            Some("") | None => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": "text is required"})),
            ),
            Some(text) => (
                StatusCode::OK,
                Json(json!({
                    "results": ["Grade 8", "Grade 9"],
                    "chars": text.chars().count(),
                    "model": "sgd-bert"
                })),
            ),
        }
    }

    async fn client() -> ClassifierClient {
        let base = test_server::spawn(|_| Router::new().route("/predict", post(predict))).await;
        ClassifierClient::new(reqwest::Client::new(), format!("{base}/predict"))
    }

    #[tokio::test]
    async fn grade_posts_text_and_relays_response() {
        let grades = client().await.grade("Is this the real life?").await.unwrap();
        assert_eq!(
            grades,
            json!({"results": ["Grade 8", "Grade 9"], "chars": 22, "model": "sgd-bert"})
        );
    }

    #[tokio::test]
    async fn rejected_text_is_an_upstream_error() {
        match client().await.grade("").await {
            Err(Error::UnexpectedStatus { service, status }) => {
                assert_eq!(service, "classifier");
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            }
            other => panic!("expected a 422 from the classifier, got {other:?}"),
        }
    }
}

//! Client data layer for the viewer.
//!
//! [`NotesSource`] is what the topic browser reads from. [`ApiClient`] talks to
//! a remote API over HTTP; [`LocalClient`] reads a [`CatalogStore`] in process.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::catalog::{run_blocking, CatalogStore};
use crate::error::CatalogError;
use crate::models::{
    CourseSummary, CoursesResponse, ErrorResponse, TopicDetail, TopicResponse, TopicSummary,
    TopicsResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Store(CatalogError),
}

impl From<CatalogError> for ClientError {
    fn from(err: CatalogError) -> Self {
        if err.is_not_found() {
            ClientError::NotFound(err.to_string())
        } else {
            ClientError::Store(err)
        }
    }
}

#[async_trait]
pub trait NotesSource: Send + Sync {
    async fn courses(&self) -> Result<Vec<CourseSummary>, ClientError>;

    async fn topics(&self, course_id: &str) -> Result<Vec<TopicSummary>, ClientError>;

    async fn topic(&self, topic_id: &str) -> Result<TopicDetail, ClientError>;
}

/// Decoded body of a successful response.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub data: T,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `path` (which must start with `/`) relative to the base address.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            let data = response.json::<T>().await?;
            return Ok(ApiResponse { status, data });
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(message));
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl NotesSource for ApiClient {
    async fn courses(&self) -> Result<Vec<CourseSummary>, ClientError> {
        let res = self.get::<CoursesResponse>("/api/courses").await?;
        Ok(res.data.courses)
    }

    async fn topics(&self, course_id: &str) -> Result<Vec<TopicSummary>, ClientError> {
        let path = format!("/api/courses/{}/topics", urlencoding::encode(course_id));
        let res = self.get::<TopicsResponse>(&path).await?;
        Ok(res.data.topics)
    }

    async fn topic(&self, topic_id: &str) -> Result<TopicDetail, ClientError> {
        let path = format!("/api/topics/{}", urlencoding::encode(topic_id));
        let res = self.get::<TopicResponse>(&path).await?;
        Ok(res.data.topic)
    }
}

#[derive(Clone)]
pub struct LocalClient {
    store: Arc<dyn CatalogStore>,
}

impl LocalClient {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        LocalClient { store }
    }
}

#[async_trait]
impl NotesSource for LocalClient {
    async fn courses(&self) -> Result<Vec<CourseSummary>, ClientError> {
        Ok(run_blocking(&self.store, |store| store.list_courses()).await?)
    }

    async fn topics(&self, course_id: &str) -> Result<Vec<TopicSummary>, ClientError> {
        let course_id = course_id.to_string();
        Ok(run_blocking(&self.store, move |store| store.list_topics(&course_id)).await?)
    }

    async fn topic(&self, topic_id: &str) -> Result<TopicDetail, ClientError> {
        let topic_id = topic_id.to_string();
        Ok(run_blocking(&self.store, move |store| store.get_topic(&topic_id)).await?)
    }
}

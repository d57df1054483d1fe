//! Typed wrappers for the recognition backend's HTTP API.
//!
//! Every operation sends exactly one request and returns the parsed body
//! unchanged. There are no retries and no client-side timeout.

use crate::config::ClientConfig;
use facedesk_core::{
    ApiError, ApiResponse, IdentitiesResponse, LogResponse, PersonDetails, RebuildStatus,
    RecognitionResult, Recognizer, SelectedFile, StatsResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the backend API. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base: Url,
    images_base: Url,
    poll_interval: Duration,
    poll_max: u32,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason,
        };

        let base = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
        }

        let api_base = with_segments(&base, split_prefix(&config.api_prefix))
            .ok_or_else(|| invalid("URL cannot be a base".into()))?;
        let images_base = with_segments(&base, split_prefix(&config.images_prefix))
            .ok_or_else(|| invalid("URL cannot be a base".into()))?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        tracing::debug!(api = %api_base, images = %images_base, "api client configured");

        Ok(Self {
            http,
            api_base,
            images_base,
            poll_interval: Duration::from_millis(config.rebuild_poll_interval_ms),
            poll_max: config.rebuild_poll_max.max(1),
        })
    }

    /// `POST /recognize` with the image as multipart field `image`.
    pub async fn recognize(&self, image: &SelectedFile) -> Result<RecognitionResult, ApiError> {
        let form = Form::new().part("image", file_part(image)?);
        let req = self.request(Method::POST, &["recognize"])?.multipart(form);
        self.send_json(req, "/recognize").await
    }

    /// `POST /enroll` a new person with one or more images.
    pub async fn enroll(
        &self,
        name: &str,
        info: &str,
        images: &[SelectedFile],
        auto_rebuild: bool,
    ) -> Result<ApiResponse, ApiError> {
        let mut form = Form::new()
            .text("name", name.to_string())
            .text("info", info.to_string())
            .text("auto_rebuild", flag(auto_rebuild));
        for image in images {
            form = form.part("images", file_part(image)?);
        }
        tracing::info!(name, images = images.len(), auto_rebuild, "enrolling person");

        let req = self.request(Method::POST, &["enroll"])?.multipart(form);
        self.send_json(req, "/enroll").await
    }

    /// `POST /add_image` to an existing person.
    pub async fn add_image(
        &self,
        person: &str,
        image: &SelectedFile,
        auto_rebuild: bool,
    ) -> Result<ApiResponse, ApiError> {
        let form = Form::new()
            .text("person", person.to_string())
            .part("image", file_part(image)?)
            .text("auto_rebuild", flag(auto_rebuild));
        let req = self.request(Method::POST, &["add_image"])?.multipart(form);
        self.send_json(req, "/add_image").await
    }

    /// `POST /delete_person`.
    pub async fn delete_person(&self, person: &str, auto_rebuild: bool) -> Result<ApiResponse, ApiError> {
        tracing::info!(person, auto_rebuild, "deleting person");
        let req = self
            .request(Method::POST, &["delete_person"])?
            .form(&[("person", person), ("auto_rebuild", flag(auto_rebuild))]);
        self.send_json(req, "/delete_person").await
    }

    /// `POST /delete_image`.
    pub async fn delete_image(
        &self,
        person: &str,
        filename: &str,
        auto_rebuild: bool,
    ) -> Result<ApiResponse, ApiError> {
        tracing::info!(person, filename, auto_rebuild, "deleting image");
        let req = self.request(Method::POST, &["delete_image"])?.form(&[
            ("person", person),
            ("filename", filename),
            ("auto_rebuild", flag(auto_rebuild)),
        ]);
        self.send_json(req, "/delete_image").await
    }

    /// `POST /rebuild_db` to trigger an index rebuild.
    pub async fn rebuild_database(&self) -> Result<ApiResponse, ApiError> {
        let req = self.request(Method::POST, &["rebuild_db"])?;
        self.send_json(req, "/rebuild_db").await
    }

    /// `GET /rebuild_status`.
    pub async fn rebuild_status(&self) -> Result<RebuildStatus, ApiError> {
        let req = self.request(Method::GET, &["rebuild_status"])?;
        self.send_json(req, "/rebuild_status").await
    }

    /// Poll `rebuild_status` until the backend stops reporting a running rebuild.
    ///
    /// Gives up after the configured number of polls and returns the last status,
    /// which may still be running.
    pub async fn wait_for_rebuild(&self) -> Result<RebuildStatus, ApiError> {
        let mut polls = 0;
        loop {
            let status = self.rebuild_status().await?;
            polls += 1;
            if !status.is_running() {
                tracing::info!(polls, "rebuild finished");
                return Ok(status);
            }
            if polls >= self.poll_max {
                tracing::warn!(polls, "rebuild still running; stopped polling");
                return Ok(status);
            }
            tracing::debug!(polls, progress = ?status.progress, "rebuild in progress");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// `GET /stats`.
    pub async fn stats(&self) -> Result<StatsResponse, ApiError> {
        let req = self.request(Method::GET, &["stats"])?;
        self.send_json(req, "/stats").await
    }

    /// `GET /identities`.
    pub async fn identities(&self) -> Result<IdentitiesResponse, ApiError> {
        let req = self.request(Method::GET, &["identities"])?;
        self.send_json(req, "/identities").await
    }

    /// `GET /person/{name}`.
    pub async fn person(&self, name: &str) -> Result<PersonDetails, ApiError> {
        let req = self.request(Method::GET, &["person", name])?;
        self.send_json(req, "/person/{name}").await
    }

    /// `GET /latest_log`.
    pub async fn latest_log(&self) -> Result<LogResponse, ApiError> {
        let req = self.request(Method::GET, &["latest_log"])?;
        self.send_json(req, "/latest_log").await
    }

    /// URL of a stored image, without fetching it.
    pub fn image_url(&self, person: &str, filename: &str) -> Result<Url, ApiError> {
        with_segments(&self.images_base, [person, filename])
            .ok_or_else(|| ApiError::Transport("image URL cannot be built".into()))
    }

    /// `GET /images/{person}/{filename}`, returning the raw bytes.
    pub async fn image(&self, person: &str, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.image_url(person, filename)?;
        let response = self
            .execute(self.http.request(Method::GET, url), "/images/{person}/{filename}")
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = with_segments(&self.api_base, segments.iter().copied())
            .ok_or_else(|| ApiError::Transport("endpoint URL cannot be built".into()))?;
        Ok(self.http.request(method, url))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let response = self.execute(req, path).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::warn!(path, error = %e, "unexpected response body");
            ApiError::Decode(e.to_string())
        })
    }

    async fn execute(&self, req: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        tracing::debug!(path, "api request");
        let response = req.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "api request failed to send");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(path, status = status.as_u16(), "api response");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_field(&body);
        tracing::warn!(path, status = status.as_u16(), error = ?message, "api request rejected");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl Recognizer for ApiClient {
    async fn recognize(&self, file: &SelectedFile) -> Result<RecognitionResult, ApiError> {
        ApiClient::recognize(self, file).await
    }
}

fn file_part(file: &SelectedFile) -> Result<Part, ApiError> {
    Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime)
        .map_err(|e| ApiError::Transport(format!("invalid MIME type {:?}: {e}", file.mime)))
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn split_prefix(prefix: &str) -> impl Iterator<Item = &str> {
    prefix.split('/').filter(|s| !s.is_empty())
}

/// Append percent-encoded path segments to `base`. `None` if `base` cannot carry a path.
fn with_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}

/// The `error` string of a JSON error body, if there is one.
fn error_field(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_paths_under_api_prefix() {
        let c = client("http://backend:8000");
        let url = with_segments(&c.api_base, ["stats"]).unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/api/stats");
    }

    #[test]
    fn test_base_url_with_trailing_slash_and_path() {
        let c = client("http://backend:8000/faces/");
        let url = with_segments(&c.api_base, ["identities"]).unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/faces/api/identities");
    }

    #[test]
    fn test_image_url_encodes_segments() {
        let c = client("http://backend:8000");
        let url = c.image_url("Jane Doe", "a/b.jpg").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/images/Jane%20Doe/a%2Fb.jpg");
    }

    #[test]
    fn test_rejects_non_http_base() {
        let err = ApiClient::new(&ClientConfig {
            base_url: "ftp://backend".into(),
            ..ClientConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ApiClient::new(&ClientConfig {
            base_url: "not a url".into(),
            ..ClientConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_error_field_extraction() {
        assert_eq!(error_field(r#"{"error":"Person not found"}"#).as_deref(), Some("Person not found"));
        assert_eq!(error_field(r#"{"detail":"x"}"#), None);
        assert_eq!(error_field("<html>502</html>"), None);
        assert_eq!(error_field(r#"{"error": 42}"#), None);
    }

    #[test]
    fn test_flag_text() {
        assert_eq!(flag(true), "true");
        assert_eq!(flag(false), "false");
    }
}

//! Blocking HTTP client for the BoTTube REST API.
//!
//! Every call returns its outcome as data: a failing request is logged and
//! handed back as an [`ApiError`], never propagated as a panic, so one bad
//! call cannot take down the scheduling loop.  Nothing is retried.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use bottube_common::config::{Config, Credentials};
use bottube_common::personality::derive_display_name;
use bottube_common::protocol::{
    truncate_chars, CommentRequest, RegisterRequest, TrendingResponse, TrendingVideo,
    UploadMeta, Vote, VoteRequest,
};

use crate::media::{PrepareError, Prepared, Transcoder};

/// Timeout for small reads and writes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the multipart upload.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

const API_KEY_HEADER: &str = "X-API-Key";
const USER_AGENT: &str = concat!("bottube-agent/", env!("CARGO_PKG_VERSION"));

/// Outcome of a single API call.
pub type ApiResult = Result<Value, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-200 answer; the body is passed through untouched.
    #[error("HTTP {status}: {body}")]
    Rejected { status: u16, body: Value },
    /// Non-200 answer whose body is deliberately dropped.
    #[error("Status {0}")]
    Status(u16),
    /// Timeout, refused connection, TLS failure…
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("video preparation failed: {0}")]
    Prepare(#[from] PrepareError),
    #[error("cannot open {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ApiError {
    /// Legacy JSON shape: the rejected body itself, or `{"error": msg}`.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Rejected { body, .. } => body.clone(),
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// Synchronous client bound to one agent's credentials.
pub struct PlatformClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
    display_name: String,
    transcoder: Transcoder,
}

impl PlatformClient {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        display_name: String,
        transcoder: Transcoder,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            display_name,
            transcoder,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let display_name = derive_display_name(config.credentials.agent_name());
        let transcoder = Transcoder::new(&config.ffmpeg_bin, &config.video_dir);
        Self::new(
            &config.base_url,
            config.credentials.clone(),
            display_name,
            transcoder,
        )
    }

    pub fn agent_name(&self) -> &str {
        self.credentials.agent_name()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(API_KEY_HEADER, self.credentials.api_key())
    }

    // ── registration & profile ───────────────────────────────────────

    /// `POST /register`.
    pub fn register(&self) -> ApiResult {
        let body = RegisterRequest {
            agent_name: self.agent_name().to_string(),
            display_name: self.display_name.clone(),
        };
        let result = self
            .http
            .post(self.url("/register"))
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(ApiError::from)
            .and_then(read_response);
        match &result {
            Ok(_) => info!("Agent registered: {}", self.agent_name()),
            Err(e) => error!("Registration failed: {e}"),
        }
        result
    }

    /// `GET /agents/{name}`.
    pub fn get_agent_info(&self) -> ApiResult {
        let url = self.url(&format!("/agents/{}", self.agent_name()));
        let resp = self.http.get(&url).timeout(REQUEST_TIMEOUT).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            debug!("GET {url} returned {status}");
            return Err(ApiError::Status(status.as_u16()));
        }
        read_response(resp)
    }

    // ── media ────────────────────────────────────────────────────────

    /// Transcode a local file so it fits the upload limits.
    pub fn prepare_video(&self, path: &Path) -> Result<Prepared, PrepareError> {
        self.transcoder.prepare(path)
    }

    /// `POST /upload` (multipart).  Title and description are cut to the
    /// platform limits; the video is prepared first.
    pub fn upload_video(
        &self,
        path: &Path,
        title: &str,
        description: &str,
        tags: &[String],
    ) -> ApiResult {
        let prepared = self.prepare_video(path).inspect_err(|e| {
            error!("Upload of {} aborted: {e}", path.display());
        })?;

        let meta = UploadMeta::new(title, description, tags);
        // The form owns the open file; it is closed when the request is
        // dropped, whether it succeeded or not.
        let form = multipart::Form::new()
            .text("title", meta.title.clone())
            .text("description", meta.description)
            .text("tags", meta.tags)
            .file("video", prepared.path())
            .map_err(|source| ApiError::Io {
                path: prepared.path().to_path_buf(),
                source,
            })?;

        let result = self
            .authed(self.http.post(self.url("/upload")))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .map_err(ApiError::from)
            .and_then(read_response);
        match &result {
            Ok(_) => info!("Video uploaded: {}", meta.title),
            Err(e) => error!("Upload failed: {e}"),
        }
        result
    }

    // ── social actions ───────────────────────────────────────────────

    /// `POST /videos/{id}/comment`.  Content is cut to 5000 characters.
    pub fn comment(&self, video_id: &str, content: &str) -> ApiResult {
        let body = CommentRequest::new(content);
        let result = self
            .authed(self.http.post(self.url(&format!("/videos/{video_id}/comment"))))
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(ApiError::from)
            .and_then(read_response);
        match &result {
            Ok(_) => info!(
                "Commented on {video_id}: {}...",
                truncate_chars(&body.content, 30)
            ),
            Err(e) => error!("Comment on {video_id} failed: {e}"),
        }
        result
    }

    /// `POST /videos/{id}/vote`.
    pub fn vote(&self, video_id: &str, vote: Vote) -> ApiResult {
        let result = self
            .authed(self.http.post(self.url(&format!("/videos/{video_id}/vote"))))
            .json(&VoteRequest::from(vote))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(ApiError::from)
            .and_then(read_response);
        match &result {
            Ok(_) => info!("Sent {} on {video_id}", vote.label()),
            Err(e) => error!("Vote on {video_id} failed: {e}"),
        }
        result
    }

    // ── discovery ────────────────────────────────────────────────────

    /// `GET /trending?limit=N`.  Any failure yields an empty list.
    pub fn get_trending(&self, limit: usize) -> Vec<TrendingVideo> {
        match self.fetch_trending(limit) {
            Ok(videos) => videos,
            Err(e) => {
                warn!("Cannot fetch trending videos: {e}");
                Vec::new()
            }
        }
    }

    fn fetch_trending(&self, limit: usize) -> Result<Vec<TrendingVideo>, ApiError> {
        let url = self.url(&format!("/trending?limit={limit}"));
        let resp = self.http.get(&url).timeout(REQUEST_TIMEOUT).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body: TrendingResponse = resp
            .json()
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(body.videos)
    }
}

/// Turn a response into an [`ApiResult`]: 200 → parsed body, anything
/// else → [`ApiError::Rejected`] with the body unchanged.
fn read_response(resp: reqwest::blocking::Response) -> ApiResult {
    let status = resp.status();
    let text = resp.text()?;
    let parsed = serde_json::from_str::<Value>(&text);

    if status == StatusCode::OK {
        return parsed.map_err(|e| ApiError::Malformed(e.to_string()));
    }

    // A non-JSON error page is still passed back as a string body.
    let body = parsed.unwrap_or(Value::String(text));
    Err(ApiError::Rejected {
        status: status.as_u16(),
        body,
    })
}

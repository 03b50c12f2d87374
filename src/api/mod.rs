use crate::models::RenderedFragment;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    pub(crate) fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("Block render failed ({status}): {body}"),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_CREATE_BLOCK_PATH: &str = "/manager/block/create";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    pub api_url: String,

    #[serde(default = "default_create_block_path")]
    pub create_block_path: String,
}

fn default_create_block_path() -> String {
    DEFAULT_CREATE_BLOCK_PATH.to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            create_block_path: default_create_block_path(),
        }
    }
}

impl EditorConfig {
    /// Read the manager base url from the page.
    ///
    /// Both `window.ENV.API_URL` and `window.ENV.api_url` are honoured; anything
    /// else falls back to the default.
    pub fn from_env() -> Self {
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                return Self {
                                    api_url: url_str,
                                    ..Self::default()
                                };
                            }
                        }
                    }
                }
            }
        }

        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn create_block_url(&self) -> String {
        format!(
            "{}{}",
            self.api_url.trim_end_matches('/'),
            self.create_block_path
        )
    }
}

/// Body of a block creation request.
///
/// The renderer binds these to its own model, hence the PascalCase keys.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateBlockRequest {
    #[serde(rename = "TypeName")]
    pub type_name: String,
    #[serde(rename = "BlockIndex")]
    pub block_index: usize,
}

/// Remote service that renders a new block's form fragment.
#[async_trait(?Send)]
pub trait BlockRenderer {
    async fn render_block(&self, req: &CreateBlockRequest) -> ApiResult<RenderedFragment>;
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    config: EditorConfig,
}

impl ApiClient {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    async fn request_html(&self, url: String, body: &impl Serialize) -> ApiResult<String> {
        let client = reqwest::Client::new();
        let res = client
            .post(url)
            .header("Accept", "text/html")
            .json(body)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.text().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http_status(status, &body))
        }
    }
}

#[async_trait(?Send)]
impl BlockRenderer for ApiClient {
    async fn render_block(&self, req: &CreateBlockRequest) -> ApiResult<RenderedFragment> {
        let html = self
            .request_html(self.config.create_block_url(), req)
            .await?;
        if html.trim().is_empty() {
            return Err(ApiError::parse("empty block fragment"));
        }
        Ok(RenderedFragment::new(html))
    }
}

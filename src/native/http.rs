use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::error::{UiError, UiResult};

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> UiError {
    if err.is_timeout() {
        UiError::Network(format!("request timed out: {}", err))
    } else if err.is_decode() {
        UiError::Decode(err.to_string())
    } else {
        UiError::Network(err.to_string())
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// reqwest-backed transport; every response body is read as text.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> UiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self { client, base_url: base_url.to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> UiResult<ApiResponse> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };
        if let Some(body) = request.body {
            builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json").body(body);
        }
        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;
        Ok(ApiResponse { status, body })
    }
}

//! HTTP transport seam.
//!
//! Requests are plain data so they can be cloned and replayed verbatim after a
//! token refresh. Multipart bodies are kept as parts and only turned into a
//! `reqwest` form at send time.

use crate::config::Settings;
use async_trait::async_trait;
use console_core::observability::{inject_request_id, new_request_id};
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Which backend a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Central auth backend.
    Central,
    /// Application backend (users, players, dashboard).
    App,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime: mime.into(),
                bytes,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Vec<u8>),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub backend: Backend,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl ApiRequest {
    /// New request with a fresh `x-request-id`.
    pub fn new(backend: Backend, method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        inject_request_id(&mut headers, &new_request_id());
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            backend,
            method,
            path: path.into(),
            query: Vec::new(),
            headers,
            body: RequestBody::Empty,
        }
    }

    pub fn get(backend: Backend, path: impl Into<String>) -> Self {
        Self::new(backend, Method::GET, path)
    }

    pub fn post(backend: Backend, path: impl Into<String>) -> Self {
        Self::new(backend, Method::POST, path)
    }

    pub fn patch(backend: Backend, path: impl Into<String>) -> Self {
        Self::new(backend, Method::PATCH, path)
    }

    pub fn delete(backend: Backend, path: impl Into<String>) -> Self {
        Self::new(backend, Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = RequestBody::Json(serde_json::to_vec(body)?);
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    /// Multipart body. Any `Content-Type` set here is dropped again when
    /// credentials are attached, so the transport can write the boundary.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Failures where no HTTP response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// `reqwest` transport addressing both backends.
pub struct ReqwestTransport {
    client: reqwest::Client,
    central_url: String,
    app_url: String,
}

impl ReqwestTransport {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        Self::with_urls(
            &settings.central_api.base_url,
            &settings.app_api.base_url,
            settings.http.request_timeout(),
        )
    }

    pub fn with_urls(
        central_url: &str,
        app_url: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("admin-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            central_url: central_url.trim_end_matches('/').to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        let base = match request.backend {
            Backend::Central => &self.central_url,
            Backend::App => &self.app_url,
        };
        format!("{}{}", base, request.path)
    }

    fn build_form(parts: Vec<FormPart>) -> Result<reqwest::multipart::Form, TransportError> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            form = match part.value {
                FormValue::Text(value) => form.text(part.name, value),
                FormValue::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let file = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| TransportError::Request(e.to_string()))?;
                    form.part(part.name, file)
                }
            };
        }
        Ok(form)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request);
        let method = request.method.clone();
        let started = Instant::now();

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts)?),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %method, url = %url, error = %e, "HTTP request failed");
            map_reqwest_error(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HTTP response received"
        );

        Ok(ApiResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

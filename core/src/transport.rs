//! Executing `HttpRequest` values.
//!
//! A `Transport` is the one place network I/O happens. Non-2xx statuses come
//! back as an ordinary `HttpResponse`; `Err` is reserved for exchanges that
//! never produced a response, so status interpretation stays in
//! `SnippetClient::parse_*`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;
use crate::http::{FormField, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Convert the plain-data form into reqwest's streaming form.
pub fn encode_form(form: MultipartForm) -> Result<Form, ApiError> {
    let mut encoded = Form::new();
    for field in form.fields {
        encoded = match field {
            FormField::Text { name, value } => encoded.text(name, value),
            FormField::File {
                name,
                file_name,
                content_type,
                content,
            } => {
                let part = Part::text(content)
                    .file_name(file_name)
                    .mime_str(&content_type)
                    .map_err(|e| ApiError::Encoding(e.to_string()))?;
                encoded.part(name, part)
            }
        };
    }
    Ok(encoded)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(method(request.method), &request.path);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.body(body),
            Some(RequestBody::Multipart(form)) => builder.multipart(encode_form(form)?),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

// HTTP client wrapper for the Miseventos API

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use miseventos_core::RemoteId;

use crate::config::ClientConfig;
use crate::error::ClientError;

pub struct Client {
    base_url: String,
    origin: Url,
    http: reqwest::Client,
    jar: Arc<Jar>,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url().to_string();
        let origin = Url::parse(&format!("{}/", base_url))
            .map_err(|e| ClientError::Config(format!("{base_url}: {e}")))?;

        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder().cookie_provider(jar.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            origin,
            http: builder.build()?,
            jar,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookies the backend has set so far, as a `Cookie` header value
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.origin)
            .and_then(|value| value.to_str().ok().map(str::to_string))
            .filter(|value| !value.is_empty())
    }

    /// Re-install cookies saved with [`Client::cookie_header`]
    pub fn restore_cookies(&self, header: &str) {
        for cookie in header.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            self.jar.add_cookie_str(cookie, &self.origin);
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "PUT");
        let response = self.http.put(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "DELETE");
        let response = self.http.delete(&url).send().await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let _: Value = self.handle_response(response).await?;
        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }

        let text = response.text().await?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else if status.is_success() {
            serde_json::from_str(&text)?
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            // Plain-text bodies are kept as-is; JSON without a message yields none
            let message = error_message(&body)
                .or_else(|| body.is_null().then_some(text))
                .unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = error_message(&body)
                .unwrap_or_else(|| "La operación fue rechazada".to_string());
            tracing::debug!(%message, "Backend reported success=false");
            return Err(ClientError::Rejected(message));
        }

        Ok(serde_json::from_value(body)?)
    }
}

/// `error_message` (or FastAPI's `detail`) from a response body
pub(crate) fn error_message(body: &Value) -> Option<String> {
    ["error_message", "detail", "message"]
        .iter()
        .filter_map(|key| body.get(key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        })
}

/// First id found at one of the JSON pointers
///
/// Ids may arrive as strings or numbers.
pub fn find_id(body: &Value, pointers: &[&str]) -> Option<RemoteId> {
    pointers
        .iter()
        .filter_map(|pointer| body.pointer(pointer))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(RemoteId::new(s.clone())),
            Value::Number(n) => Some(RemoteId::new(n.to_string())),
            _ => None,
        })
}

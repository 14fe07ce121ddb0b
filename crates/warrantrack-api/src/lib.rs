// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use warrantrack_app::{WarrantyId, WarrantyPayload, WarrantyRecord};

pub const API_PREFIX: &str = "warrantyapi";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: HttpClient,
}

impl Client {
    pub fn new(api_root: &str, timeout: Duration) -> Result<Self> {
        let trimmed = api_root.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let mut base_url =
            Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }
        base_url
            .path_segments_mut()
            .map_err(|()| anyhow!("api.base_url {trimmed:?} cannot carry a path"))?
            .pop_if_empty()
            .push(API_PREFIX);

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn create(&self, payload: &WarrantyPayload) -> Result<Option<WarrantyRecord>> {
        let url = self.endpoint(&["add"])?;
        let response = self.send(self.http.post(url).json(payload), "POST /add")?;
        Ok(echoed_record(response, "POST /add"))
    }

    pub fn get(&self, id: &str) -> Result<Option<WarrantyRecord>> {
        let url = self.endpoint(&["get", id])?;
        debug!(%url, "GET warranty");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(id, "warranty not found");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "GET /get failed");
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read warranty body")?;
        decode_record(&body).context("decode warranty")
    }

    pub fn get_by_id(&self, id: WarrantyId) -> Result<Option<WarrantyRecord>> {
        self.get(&id.to_string())
    }

    pub fn list(&self) -> Result<Vec<WarrantyRecord>> {
        let url = self.endpoint(&["all"])?;
        let response = self.send(self.http.get(url), "GET /all")?;
        response.json().context("decode warranty list")
    }

    pub fn update(
        &self,
        id: WarrantyId,
        payload: &WarrantyPayload,
    ) -> Result<Option<WarrantyRecord>> {
        let url = self.endpoint(&["update", &id.to_string()])?;
        let response = self.send(self.http.put(url).json(payload), "PUT /update")?;
        Ok(echoed_record(response, "PUT /update"))
    }

    pub fn delete(&self, id: WarrantyId) -> Result<()> {
        let url = self.endpoint(&["delete", &id.to_string()])?;
        self.send(self.http.delete(url), "DELETE /delete")?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("cannot extend {}", self.base_url))?
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, label: &str) -> Result<Response> {
        debug!(request = label, "sending");
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(request = label, status = status.as_u16(), "request failed");
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

fn decode_record(body: &str) -> Result<Option<WarrantyRecord>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

// Writes may answer 2xx with no record body.
fn echoed_record(response: Response, label: &str) -> Option<WarrantyRecord> {
    let body = match response.text() {
        Ok(body) => body,
        Err(error) => {
            debug!(request = label, %error, "unreadable success body");
            return None;
        }
    };
    match decode_record(&body) {
        Ok(record) => record,
        Err(error) => {
            debug!(request = label, %error, "success body is not a warranty");
            None
        }
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {base_url} timed out -- is the warranty API overloaded? ({error})");
    }
    anyhow!(
        "cannot reach {} -- check that the warranty API is running and api.base_url is correct ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

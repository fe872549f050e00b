// Health record store adapter over its HTTP API
use crate::application::measurement_store::MeasurementStore;
use crate::domain::glucose::STORE_UNIT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct HealthRecordStore {
    host: String,
    token: String,
    record_type: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    record_type: &'a str,
    value: f64,
    unit: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    deleted: u64,
}

#[derive(Debug, Serialize)]
struct AuthorizeRequest<'a> {
    record_type: &'a str,
    access: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    granted: bool,
}

impl HealthRecordStore {
    pub fn new(host: String, token: String, record_type: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            record_type,
            client: reqwest::Client::new(),
        }
    }

    fn records_url(&self) -> String {
        format!("{}/api/v1/records", self.host)
    }

    fn delete_url(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{}?record_type={}&start={}&end={}",
            self.records_url(),
            urlencoding::encode(&self.record_type),
            urlencoding::encode(&start.to_rfc3339()),
            urlencoding::encode(&end.to_rfc3339())
        )
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("health store responded with status {}: {}", status, body);
        }
        Ok(response)
    }
}

#[async_trait]
impl MeasurementStore for HealthRecordStore {
    async fn write(&self, value: f64, timestamp: DateTime<Utc>) -> Result<()> {
        let body = WriteRequest {
            record_type: &self.record_type,
            value,
            unit: STORE_UNIT.to_string(),
            timestamp: timestamp.to_rfc3339(),
        };

        let response = self
            .client
            .post(self.records_url())
            .header("Authorization", format!("Token {}", self.token))
            .json(&body)
            .send()
            .await
            .context("Failed to send write to health store")?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        let response = self
            .client
            .delete(self.delete_url(start, end))
            .header("Authorization", format!("Token {}", self.token))
            .send()
            .await
            .context("Failed to send delete to health store")?;

        let response = Self::check_status(response).await?;
        let data = response
            .json::<DeleteResponse>()
            .await
            .context("Failed to parse health store delete response")?;

        Ok(data.deleted)
    }

    async fn request_access(&self) -> Result<bool> {
        let body = AuthorizeRequest {
            record_type: &self.record_type,
            access: &["read", "write"],
        };

        let response = self
            .client
            .post(format!("{}/api/v1/authorize", self.host))
            .header("Authorization", format!("Token {}", self.token))
            .json(&body)
            .send()
            .await
            .context("Failed to request health store access")?;

        let response = Self::check_status(response).await?;
        let data = response
            .json::<AuthorizeResponse>()
            .await
            .context("Failed to parse health store authorize response")?;

        Ok(data.granted)
    }
}

//! HTTP record source.
//!
//! Issues a single `GET <endpoint>` and decodes the body as a JSON array
//! of records.
//!
//! # Failure mapping
//!
//! | Cause | [`LoadError`] |
//! |-------|---------------|
//! | Connect error, timeout, body read error | `Fetch` |
//! | Non-2xx status | `Status` |
//! | Body is not a record array | `Decode` |
//!
//! There is no retry; a failed load is retried only when the caller loads
//! again.

use async_trait::async_trait;
use directory_search_core::models::RecordCollection;
use directory_search_core::store::{decode_records, LoadError, RecordSource};

use crate::config::SourceConfig;

pub struct HttpRecordSource {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRecordSource {
    pub fn new(config: &SourceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport_error(e: reqwest::Error) -> LoadError {
    LoadError::Fetch {
        message: e.to_string(),
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_all(&self) -> Result<RecordCollection, LoadError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        decode_records(&body)
    }
}

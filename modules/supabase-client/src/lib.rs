pub mod error;

pub use error::{Result, SupabaseError};

use std::time::Duration;

use serde::Serialize;

pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    /// Insert `rows` into `table` as a single PostgREST request.
    /// PostgREST wraps a bulk insert in one transaction, so the call is all-or-nothing.
    pub async fn insert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        let endpoint = self.table_url(table)?;

        let resp = self
            .client
            .post(&endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(table, rows = rows.len(), "Inserted rows");
        Ok(())
    }

    fn table_url(&self, table: &str) -> Result<String> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(SupabaseError::InvalidTable(table.to_string()));
        }
        Ok(format!("{}/rest/v1/{}", self.base_url, table))
    }
}

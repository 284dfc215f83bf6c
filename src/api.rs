//! REST client for the records backend.
//!
//! Every operation normalizes failures through [`ApiError`] before they
//! leave this module; list-style operations race the request against a
//! [`CancelHandle`] and resolve to `Ok(None)` when superseded.

use serde_json::Value;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::fetch::CancelHandle;
use crate::models::{ListResponse, Record, RecordPayload, RecordStats, RecordsList};
use crate::query::FilterState;

const LOAD_RECORDS_FALLBACK: &str = "Unable to load clinical records. Please try again.";
const LOAD_DEPARTMENTS_FALLBACK: &str = "Unable to load departments. Please try again.";
const LOAD_STATS_FALLBACK: &str = "Unable to load records statistics.";
const CREATE_FALLBACK: &str = "Unable to create the record. Please try again.";
const UPDATE_FALLBACK: &str = "Unable to update the record. Please try again.";
const DELETE_FALLBACK: &str = "Unable to delete the record. Please try again.";

/// Typed client over the records endpoints.
#[derive(Debug, Clone)]
pub struct RecordsApi {
    client: reqwest::Client,
    base_url: String,
    timeout: std::time::Duration,
}

impl RecordsApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    /// GET `/records` filtered by the given state. `Ok(None)` means the
    /// request was cancelled and the caller must treat it as a no-op.
    pub async fn list_records(
        &self,
        filters: &FilterState,
        cancel: &CancelHandle,
    ) -> Result<Option<RecordsList>, ApiError> {
        let url = format!("{}/records?{}", self.base_url, filters.to_request_query());
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(%url, "records request cancelled");
                Ok(None)
            }
            result = self.fetch_records(&url) => result.map(Some),
        }
    }

    async fn fetch_records(&self, url: &str) -> Result<RecordsList, ApiError> {
        tracing::debug!(%url, "fetching records");
        let payload = self.get_json(url, LOAD_RECORDS_FALLBACK).await?;
        match serde_json::from_value::<ListResponse>(payload) {
            Ok(response) => Ok(response.into()),
            Err(err) => {
                tracing::warn!(error = %err, "unrecognized records payload shape, treating as empty");
                Ok(RecordsList::default())
            }
        }
    }

    /// GET `/departments`; non-array payloads decode to an empty list.
    pub async fn list_departments(
        &self,
        cancel: &CancelHandle,
    ) -> Result<Option<Vec<String>>, ApiError> {
        let url = format!("{}/departments", self.base_url);
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("departments request cancelled");
                Ok(None)
            }
            result = self.fetch_departments(&url) => result.map(Some),
        }
    }

    async fn fetch_departments(&self, url: &str) -> Result<Vec<String>, ApiError> {
        let payload = self.get_json(url, LOAD_DEPARTMENTS_FALLBACK).await?;
        Ok(serde_json::from_value(payload).unwrap_or_default())
    }

    /// GET `/records/stats`.
    pub async fn get_stats(&self, cancel: &CancelHandle) -> Result<Option<RecordStats>, ApiError> {
        let url = format!("{}/records/stats", self.base_url);
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("stats request cancelled");
                Ok(None)
            }
            result = self.fetch_stats(&url) => result.map(Some),
        }
    }

    async fn fetch_stats(&self, url: &str) -> Result<RecordStats, ApiError> {
        let payload = self.get_json(url, LOAD_STATS_FALLBACK).await?;
        Ok(serde_json::from_value(payload).unwrap_or_default())
    }

    /// POST `/records`. 409 signals a duplicate patient id and 400 a
    /// server-side validation failure; both keep their status so the
    /// form layer can map them onto fields.
    pub async fn create_record(&self, payload: &RecordPayload) -> Result<Record, ApiError> {
        let url = format!("{}/records", self.base_url);
        tracing::info!(patient_id = %payload.patient_id, "creating record");
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| ApiError::from_transport(err, CREATE_FALLBACK))?;
        let body = Self::success_body(response, CREATE_FALLBACK).await?;
        serde_json::from_value(body).map_err(|err| {
            tracing::warn!(error = %err, "created record payload did not decode");
            ApiError::Other(CREATE_FALLBACK.to_string())
        })
    }

    /// PUT `/records/{id}`; same error contract as create.
    pub async fn update_record(
        &self,
        id: Uuid,
        payload: &RecordPayload,
    ) -> Result<Record, ApiError> {
        let url = format!("{}/records/{}", self.base_url, id);
        tracing::info!(record_id = %id, "updating record");
        let response = self
            .client
            .put(&url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| ApiError::from_transport(err, UPDATE_FALLBACK))?;
        let body = Self::success_body(response, UPDATE_FALLBACK).await?;
        serde_json::from_value(body).map_err(|err| {
            tracing::warn!(error = %err, "updated record payload did not decode");
            ApiError::Other(UPDATE_FALLBACK.to_string())
        })
    }

    /// DELETE `/records/{id}`; no body expected.
    pub async fn delete_record(&self, id: Uuid) -> Result<(), ApiError> {
        let url = format!("{}/records/{}", self.base_url, id);
        tracing::info!(record_id = %id, "deleting record");
        let response = self
            .client
            .delete(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| ApiError::from_transport(err, DELETE_FALLBACK))?;
        Self::success_body(response, DELETE_FALLBACK).await?;
        Ok(())
    }

    async fn get_json(&self, url: &str, fallback: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| ApiError::from_transport(err, fallback))?;
        Self::success_body(response, fallback).await
    }

    /// Resolve a response into its JSON body, normalizing non-2xx
    /// statuses. An unparseable body on a successful response is
    /// treated as an empty payload, never as a failure.
    async fn success_body(response: reqwest::Response, fallback: &str) -> Result<Value, ApiError> {
        let status = response.status();
        let payload: Option<Value> = response.json().await.ok();
        if !status.is_success() {
            return Err(ApiError::from_status(
                status.as_u16(),
                payload.as_ref(),
                fallback,
            ));
        }
        Ok(payload.unwrap_or(Value::Null))
    }
}

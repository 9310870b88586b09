//! reqwest implementation of [`VehicleCheckApi`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    is_one, is_true, FinePhoto, FinesReport, FinesResponse, InsurancePolicy, InsuranceResponse,
    PhotoResponse,
};
use crate::VehicleCheckApi;

const UNKNOWN_API_ERROR: &str = "Unknown API error";
const PHOTO_FALLBACK_ERROR: &str = "Failed to retrieve photo";

/// HTTP client for the OSAGO and fines services.
#[derive(Clone)]
pub struct VehicleCheckClient {
    http: Client,
    config: ClientConfig,
}

impl VehicleCheckClient {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http, config })
    }

    /// Single GET; returns the body decoded as `T`. Transport errors and non-2xx map to
    /// [`ApiError::Request`], undecodable bodies to [`ApiError::Decode`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ApiError::from_reqwest)?;

        let body = response.text().await.map_err(ApiError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body_len = body.len(), "Upstream body is not valid JSON");
            ApiError::Decode
        })
    }

    async fn check_insurance(&self, query: &[(&str, &str)]) -> ApiResult<Vec<InsurancePolicy>> {
        let response: InsuranceResponse = self
            .get_json(&self.config.insurance_api_url, query)
            .await?;
        if is_one(response.success.as_ref()) {
            Ok(response.policies.unwrap_or_default())
        } else {
            Err(ApiError::Upstream(
                response
                    .error
                    .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string()),
            ))
        }
    }
}

/// Logs the outcome of a lookup and hands the result back unchanged.
fn log_outcome<T>(operation: &str, result: ApiResult<T>, count: impl Fn(&T) -> usize) -> ApiResult<T> {
    match &result {
        Ok(data) => info!(operation, records = count(data), "step: lookup succeeded"),
        Err(e) => warn!(operation, error = %e, "step: lookup failed"),
    }
    result
}

#[async_trait]
impl VehicleCheckApi for VehicleCheckClient {
    #[instrument(skip(self))]
    async fn check_insurance_by_vin(&self, vin: &str) -> ApiResult<Vec<InsurancePolicy>> {
        let key = self.config.insurance_api_key.as_str();
        let result = self.check_insurance(&[("key", key), ("vin", vin)]).await;
        log_outcome("check_insurance_by_vin", result, Vec::len)
    }

    #[instrument(skip(self))]
    async fn check_insurance_by_reg_number(
        &self,
        reg_number: &str,
    ) -> ApiResult<Vec<InsurancePolicy>> {
        let key = self.config.insurance_api_key.as_str();
        let result = self
            .check_insurance(&[("key", key), ("regNumber", reg_number)])
            .await;
        log_outcome("check_insurance_by_reg_number", result, Vec::len)
    }

    #[instrument(skip(self))]
    async fn check_fines(&self, reg_number: &str, sts_number: &str) -> ApiResult<FinesReport> {
        let key = self.config.fines_api_key.as_str();
        let query = [("key", key), ("regNumber", reg_number), ("sts", sts_number)];
        let result = match self
            .get_json::<FinesResponse>(&self.config.fines_api_url, &query)
            .await
        {
            Ok(response) if is_true(response.fines_done.as_ref()) => Ok(FinesReport {
                fines: response.fines.unwrap_or_default(),
                message: response.message,
            }),
            // Failure text precedence: message, then error, then the generic fallback.
            Ok(response) => Err(ApiError::Upstream(
                response
                    .message
                    .or(response.error)
                    .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string()),
            )),
            Err(e) => Err(e),
        };
        log_outcome("check_fines", result, |report| report.fines.len())
    }

    #[instrument(skip(self))]
    async fn get_fine_photo(
        &self,
        photo_token: &str,
        reg_number: &str,
        num_post: &str,
        division_id: &str,
    ) -> ApiResult<FinePhoto> {
        let key = self.config.fines_api_key.as_str();
        let query = [
            ("key", key),
            ("getPhoto", "1"),
            ("photoToken", photo_token),
            ("regNumber", reg_number),
            ("numPost", num_post),
            ("divisionId", division_id),
        ];
        let result = match self
            .get_json::<PhotoResponse>(&self.config.fines_api_url, &query)
            .await
        {
            Ok(PhotoResponse {
                image_done,
                image_base64: Some(image_base64),
                additional_images_base64,
                ..
            }) if is_one(image_done.as_ref()) => Ok(FinePhoto {
                image_base64,
                additional_images_base64: additional_images_base64.unwrap_or_default(),
            }),
            Ok(response) => Err(ApiError::Upstream(
                response
                    .error
                    .unwrap_or_else(|| PHOTO_FALLBACK_ERROR.to_string()),
            )),
            Err(e) => Err(e),
        };
        log_outcome("get_fine_photo", result, |photo| {
            1 + photo.additional_images_base64.len()
        })
    }
}

//! # Vehicle check API client
//!
//! Talks to the two upstream lookup services:
//!
//! - the OSAGO (vehicle insurance) endpoint, queried by VIN or registration number;
//! - the traffic fines endpoint, queried by registration number + STS number, plus photo retrieval.
//!
//! Every call is a single GET with an explicit timeout and no retries. The heterogeneous upstream
//! success/error shapes are normalized into [`ApiResult`]: `Ok` with the records, or an [`ApiError`]
//! whose display text is safe to show to the user.
//!
//! Handlers depend on the [`VehicleCheckApi`] trait so they can be tested without a network.

use async_trait::async_trait;

mod client;
mod config;
mod error;
mod types;

pub use client::VehicleCheckClient;
pub use config::{ClientConfig, DEFAULT_FINES_API_URL, DEFAULT_INSURANCE_API_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use types::{Fine, FinePhoto, FinesReport, InsurancePolicy};

/// Lookup operations offered by the upstream services.
#[async_trait]
pub trait VehicleCheckApi: Send + Sync {
    /// Insurance policies for a VIN. Success when the response has `success == 1`.
    async fn check_insurance_by_vin(&self, vin: &str) -> ApiResult<Vec<InsurancePolicy>>;

    /// Insurance policies for a registration number; same contract as [`Self::check_insurance_by_vin`].
    async fn check_insurance_by_reg_number(
        &self,
        reg_number: &str,
    ) -> ApiResult<Vec<InsurancePolicy>>;

    /// Fines for a registration number and STS number. Success when `fines_done` is `true`;
    /// the upstream informational message is passed through on success.
    async fn check_fines(&self, reg_number: &str, sts_number: &str) -> ApiResult<FinesReport>;

    /// Photo evidence for a fine. Success when `image_done == 1`.
    async fn get_fine_photo(
        &self,
        photo_token: &str,
        reg_number: &str,
        num_post: &str,
        division_id: &str,
    ) -> ApiResult<FinePhoto>;
}

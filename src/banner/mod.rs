pub mod parser;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;
use crate::models::CourseInfo;

/// Banner class-detail endpoint used when `BANNER_URL` is not set.
pub const DEFAULT_DETAIL_URL: &str =
    "https://oscar.gatech.edu/bprod/bwckschd.p_disp_detail_sched";

/// One slow section must not stall a whole poll cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone, Debug)]
pub struct BannerConfig {
    pub detail_url: String,
    pub term: String,
}

impl BannerConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let detail_url =
            env::var("BANNER_URL").unwrap_or_else(|_| DEFAULT_DETAIL_URL.to_string());
        let term = env::var("BANNER_TERM")
            .map_err(|_| AppError::BadRequest("BANNER_TERM is not set".to_string()))?;

        Ok(Self { detail_url, term })
    }
}

/// Lookup surface against the registration system.
///
/// `fetch_info` distinguishes "no record for this CRN" (`Ok(None)`) from
/// "the lookup or the page failed" (`Err`); the provided methods keep
/// that distinction.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    async fn fetch_info(&self, crn: &str) -> Result<Option<CourseInfo>, AppError>;

    async fn exists(&self, crn: &str) -> Result<bool, AppError> {
        Ok(self.fetch_info(crn).await?.is_some())
    }

    async fn is_addable(&self, crn: &str) -> Result<bool, AppError> {
        let info = self
            .fetch_info(crn)
            .await?
            .ok_or_else(|| AppError::CourseNotFound(crn.to_string()))?;
        Ok(info.is_addable())
    }
}

pub struct BannerClient {
    client: Client,
    config: BannerConfig,
}

impl BannerClient {
    pub fn new(config: BannerConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RegistrationApi for BannerClient {
    async fn fetch_info(&self, crn: &str) -> Result<Option<CourseInfo>, AppError> {
        let response = self
            .client
            .get(&self.config.detail_url)
            .query(&[("term_in", self.config.term.as_str()), ("crn_in", crn)])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parser::parse(&body)
    }
}

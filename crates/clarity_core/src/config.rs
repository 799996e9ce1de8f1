//! Session configuration.
//!
//! # Responsibility
//! - Hold the server base URL and API version a session talks to.
//! - Build collection URIs for id-based lookups.
//!
//! # Invariants
//! - `base_url` is an absolute http(s) URL without a trailing slash.
//! - `api_version` looks like `v2`.

use crate::error::{ClarityError, ClarityResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_VERSION: &str = "v2";

static BASE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+(/[^\s?#]*)?$").expect("valid base url regex"));
static API_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v[0-9]+$").expect("valid api version regex"));

/// Where a session sends its requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Server root, e.g. `https://lims.example.org:8443`.
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl SessionConfig {
    /// Creates a validated config with the default API version.
    pub fn new(base_url: &str) -> ClarityResult<Self> {
        let config = Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_version: default_api_version(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_version(mut self, api_version: &str) -> ClarityResult<Self> {
        self.api_version = api_version.trim().to_string();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ClarityResult<()> {
        if !BASE_URL_RE.is_match(&self.base_url) || self.base_url.ends_with('/') {
            return Err(ClarityError::InvalidArgument(format!(
                "base_url must be an absolute http(s) URL without trailing slash, got `{}`",
                self.base_url
            )));
        }
        if !API_VERSION_RE.is_match(&self.api_version) {
            return Err(ClarityError::InvalidArgument(format!(
                "api_version must look like `v2`, got `{}`",
                self.api_version
            )));
        }
        Ok(())
    }

    /// `{base_url}/api/{api_version}`.
    pub fn api_root(&self) -> String {
        format!("{}/api/{}", self.base_url, self.api_version)
    }

    /// Joins `segments` under the API root.
    pub fn api_uri(&self, segments: &[&str]) -> String {
        let mut uri = self.api_root();
        for segment in segments {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                uri.push('/');
                uri.push_str(segment);
            }
        }
        uri
    }
}

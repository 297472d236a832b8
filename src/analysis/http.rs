//! Analysis service over HTTP.

use reqwest::blocking::Client;

use crate::config::ClientConfig;
use crate::error::ScanError;
use crate::transport::{build_client, decode_json, send_error};

use super::models::{AnalysisReport, AnalysisRequest};
use super::service::AnalysisService;

/// POSTs requests as JSON to the analyze endpoint.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: Client,
    url: String,
}

impl HttpAnalysisService {
    pub fn new(config: &ClientConfig) -> Result<Self, ScanError> {
        Ok(Self {
            client: build_client(config)?,
            url: config.analysis_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AnalysisService for HttpAnalysisService {
    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, ScanError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(send_error)?;

        decode_json(response)
    }
}

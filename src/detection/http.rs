//! Detection service over HTTP.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use crate::config::ClientConfig;
use crate::error::ScanError;
use crate::transport::{build_client, decode_json, send_error};

use super::client::DetectionTransport;
use super::models::RemoteDetectionResponse;

const UPLOAD_FIELD: &str = "file";
const UPLOAD_FILENAME: &str = "capture.jpg";
const JPEG_MIME: &str = "image/jpeg";

/// Uploads captures as a multipart `file` part.
#[derive(Debug, Clone)]
pub struct HttpDetectionTransport {
    client: Client,
    url: String,
}

impl HttpDetectionTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ScanError> {
        Ok(Self {
            client: build_client(config)?,
            url: config.detection_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DetectionTransport for HttpDetectionTransport {
    fn detect(&self, jpeg: &[u8]) -> Result<RemoteDetectionResponse, ScanError> {
        let part = Part::bytes(jpeg.to_vec())
            .file_name(UPLOAD_FILENAME)
            .mime_str(JPEG_MIME)
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(send_error)?;

        decode_json(response)
    }
}

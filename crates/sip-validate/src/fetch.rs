//! Schema source retrieval: blocking HTTP for remote locations, the
//! filesystem for everything else.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use sip_model::SchemaReference;

use crate::error::ValidateError;

pub struct SchemaFetcher {
    client: Client,
}

impl SchemaFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ValidateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ValidateError::HttpClient(error.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch the raw schema bytes for a reference.
    pub fn fetch(&self, reference: &SchemaReference) -> Result<Vec<u8>, ValidateError> {
        if reference.is_remote() {
            self.fetch_remote(&reference.location)
        } else {
            std::fs::read(&reference.location).map_err(|error| ValidateError::ReadFile {
                location: reference.location.clone(),
                message: error.to_string(),
            })
        }
    }

    fn fetch_remote(&self, location: &str) -> Result<Vec<u8>, ValidateError> {
        debug!(location, "fetching remote schema");
        let response = self
            .client
            .get(location)
            .send()
            .map_err(|error| ValidateError::Fetch {
                location: location.to_string(),
                message: error.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(ValidateError::FetchStatus {
                location: location.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().map_err(|error| ValidateError::Fetch {
            location: location.to_string(),
            message: error.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

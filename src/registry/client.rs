// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client for a remote `GET /api/deployed-circles`

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::server::{DeployedCircles, ErrorBody};
use crate::config::constants::DEPLOYED_CIRCLES_ROUTE;
use crate::errors::RegistryError;

/// Fetches the deployed-circle list from a registry server
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    endpoint: Url,
}

impl RegistryClient {
    /// Create a client for the registry served at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Like [`new`](Self::new) with a caller-supplied HTTP client
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, RegistryError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(DEPLOYED_CIRCLES_ROUTE))
            .map_err(|_| RegistryError::InvalidUrl {
                url: base_url.to_string(),
            })?;
        Ok(Self { http, endpoint })
    }

    /// Full URL of the address list endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the address list
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    pub async fn fetch_circle_addresses(&self) -> Result<Vec<String>, RegistryError> {
        let response = self.http.get(self.endpoint.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_default();
            return Err(RegistryError::UnexpectedResponse {
                status: status.as_u16(),
                message,
            });
        }

        let body: DeployedCircles = response.json().await?;
        debug!(count = body.addresses.len(), "Fetched circle addresses");
        Ok(body.addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_route() {
        let client = RegistryClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:3000/api/deployed-circles"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            RegistryClient::new("not a url"),
            Err(RegistryError::InvalidUrl { .. })
        ));
    }
}

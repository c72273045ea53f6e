// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP routes serving the deployed-circle registry

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};

use super::load_circle_addresses;
use crate::config::constants::{CIRCLES_ROUTE, DEPLOYED_CIRCLES_ROUTE};
use crate::reader::CircleReader;
use crate::types::CircleListItem;

/// Shared state of the registry routes
#[derive(Debug, Clone)]
pub struct RegistryState {
    /// Reader used to build listings
    pub reader: Arc<CircleReader>,
    /// Address list file
    pub circles_file: PathBuf,
}

impl RegistryState {
    pub fn new(reader: Arc<CircleReader>, circles_file: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            circles_file: circles_file.into(),
        }
    }
}

/// Body of a successful `GET /api/deployed-circles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedCircles {
    pub addresses: Vec<String>,
}

/// Body of a successful `GET /api/circles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleListing {
    pub circles: Vec<CircleListItem>,
}

/// Body of every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

async fn read_addresses(state: &RegistryState) -> Result<Vec<String>, ApiError> {
    load_circle_addresses(&state.circles_file)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load circle addresses");
            internal_error("Failed to read deployed circles")
        })
}

/// Handler for `GET /api/deployed-circles`
async fn get_deployed_circles(
    State(state): State<RegistryState>,
) -> Result<Json<DeployedCircles>, ApiError> {
    let addresses = read_addresses(&state).await?;
    Ok(Json(DeployedCircles { addresses }))
}

/// Handler for `GET /api/circles`
async fn get_circles(State(state): State<RegistryState>) -> Result<Json<CircleListing>, ApiError> {
    let addresses = read_addresses(&state).await?;
    let circles = state.reader.list_circles(&addresses).await;
    Ok(Json(CircleListing { circles }))
}

async fn health() -> &'static str {
    "ok"
}

/// Router exposing the registry and listing endpoints
pub fn registry_router(state: RegistryState) -> Router {
    Router::new()
        .route(DEPLOYED_CIRCLES_ROUTE, get(get_deployed_circles))
        .route(CIRCLES_ROUTE, get(get_circles))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the registry routes on `listener` until the server stops
pub async fn serve_registry(listener: TcpListener, state: RegistryState) -> anyhow::Result<()> {
    let app = registry_router(state);
    let addr = listener.local_addr()?;

    info!(address = ?addr, "Starting server");

    axum::serve(listener, app).await?;

    Ok(())
}

// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Deployed-circle registry
//!
//! The list of deployed circles is a newline-delimited file of addresses. It
//! is served over HTTP as `GET /api/deployed-circles` and can be fetched back
//! with [`RegistryClient`].

mod client;
mod file;
mod server;

pub use client::RegistryClient;
pub use file::{load_circle_addresses, parse_address_list};
pub use server::{
    registry_router, serve_registry, CircleListing, DeployedCircles, ErrorBody, RegistryState,
};

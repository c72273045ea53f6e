// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Newline-delimited address list on disk

use std::path::Path;

use tracing::debug;

use crate::errors::RegistryError;

/// Split `contents` into addresses
///
/// Lines are trimmed and blank lines are skipped. Every other line is
/// returned verbatim, so a malformed entry surfaces later as an unreadable
/// circle rather than failing the whole list.
pub fn parse_address_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and parse the address list at `path`
///
/// # Errors
///
/// Returns [`RegistryError::ReadFailed`] if the file cannot be read.
pub async fn load_circle_addresses(path: impl AsRef<Path>) -> Result<Vec<String>, RegistryError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RegistryError::read_failed(path, e))?;

    let addresses = parse_address_list(&contents);
    debug!(path = %path.display(), count = addresses.len(), "Loaded circle addresses");
    Ok(addresses)
}

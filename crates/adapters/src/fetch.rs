// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pinned-source network fetches for the stdcell cache bootstrap (§4.1).
//!
//! Two shapes are needed: a single raw file at a pinned git revision (ASAP7,
//! and the OpenLane sky130 cell library fallback), and a pinned source
//! tarball (sky130hd). Both go through one blocking `reqwest` client so the
//! short per-request timeouts in §5 (20s for raw files, 60s for the tarball)
//! are enforced in one place.

use std::io::Read;
use std::time::Duration;

/// Default per-request timeout for a single raw-file fetch.
pub const RAW_FILE_TIMEOUT: Duration = Duration::from_secs(20);
/// Default timeout for the (larger) source tarball download.
pub const TARBALL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("tar extraction failed: {0}")]
    Tar(#[from] std::io::Error),
}

/// Fetch a single raw file's bytes over HTTP(S) with a bounded timeout.
/// Returns `Ok(None)` for a 404 (caller tries the next pinned source) and
/// `Err` for anything else that prevented a clean answer.
pub fn fetch_raw_file(url: &str, timeout: Duration) -> Result<Option<Vec<u8>>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let resp = client.get(url).send().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;

    if resp.status().as_u16() == 404 {
        return Ok(None);
    }
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    let bytes = resp.bytes().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;
    Ok(Some(bytes.to_vec()))
}

/// Download a `.tar.gz` source tarball and extract every entry into
/// `dest_root`, preserving its internal directory structure. Used for the
/// sky130hd PDK source archive (`cells/`, `models/`).
pub fn fetch_and_extract_tarball(
    url: &str,
    dest_root: &std::path::Path,
    timeout: Duration,
) -> Result<(), FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let resp = client.get(url).send().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;
    if !resp.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }
    let bytes = resp.bytes().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;

    extract_tar_gz(bytes.as_ref(), dest_root)?;
    Ok(())
}

/// Extract an in-memory `.tar.gz` byte buffer into `dest_root`. Split out
/// from the network call so tests can exercise extraction without a live
/// HTTP fetch.
pub fn extract_tar_gz(bytes: &[u8], dest_root: &std::path::Path) -> std::io::Result<()> {
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    std::fs::create_dir_all(dest_root)?;
    archive.unpack(dest_root)?;
    Ok(())
}

/// Compute the sha256 of a file's contents, for the stdcell manifest.
pub fn sha256_file(path: &std::path::Path) -> std::io::Result<String> {
    use sha2::{Digest, Sha256};
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

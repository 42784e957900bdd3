//! Integration test: `fetch_release` against a local server that fails
//! the first requests.

mod common;

use common::http_server::{self, ServerOptions};
use common::upstream::{release_tarball, sha256_hex};
use debrel_core::fetch::{fetch_release, FetchOptions, FetchOutcome};
use debrel_core::release::ReleaseDescriptor;
use debrel_core::retry::{classify, ErrorKind, FetchError, RetryPolicy};
use debrel_core::storage::temp_path;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn fast_retry(max_attempts: u32) -> FetchOptions {
    FetchOptions {
        retry: RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        ..FetchOptions::default()
    }
}

fn url(server: &http_server::TestServer) -> String {
    format!("{}/archive/all-v0.2.1.tar.gz", server.base_url)
}

#[test]
fn throttled_responses_are_retried_until_success() {
    let body = release_tarball("0.2.1");
    let server = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            fail_first: 3,
            ..ServerOptions::default()
        },
    );
    let release = ReleaseDescriptor::new("0.2.1", &sha256_hex(&body)).unwrap();
    let dir = tempdir().unwrap();
    let dest = dir.path().join("azure-cli_0.2.1.orig.tar.gz");

    let out = fetch_release(&url(&server), &release, &dest, &fast_retry(5)).unwrap();
    assert_eq!(server.hits(), 4);
    assert!(matches!(out, FetchOutcome::Downloaded { .. }));
    assert_eq!(fs::read(&dest).unwrap(), body);
}

#[test]
fn retries_stop_at_max_attempts() {
    let body = release_tarball("0.2.1");
    let server = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            fail_first: 10,
            ..ServerOptions::default()
        },
    );
    let release = ReleaseDescriptor::new("0.2.1", &sha256_hex(&body)).unwrap();
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.tar.gz");

    let err = fetch_release(&url(&server), &release, &dest, &fast_retry(3)).unwrap_err();
    assert!(format!("{:#}", err).contains("HTTP 503"), "{:#}", err);
    assert_eq!(server.hits(), 3);
    assert!(!dest.exists());
    assert!(!temp_path(&dest).exists());
}

#[test]
fn truncated_body_is_retried() {
    let body = release_tarball("0.2.1");
    let server = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            truncate_first: 1,
            ..ServerOptions::default()
        },
    );
    let release = ReleaseDescriptor::new("0.2.1", &sha256_hex(&body)).unwrap();
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.tar.gz");

    fetch_release(&url(&server), &release, &dest, &fast_retry(3)).unwrap();
    assert_eq!(server.hits(), 2);
    assert_eq!(fs::read(&dest).unwrap(), body);
}

#[test]
fn truncated_body_is_a_connection_failure() {
    let body = release_tarball("0.2.1");
    let server = http_server::start_with_options(
        body.clone(),
        ServerOptions {
            truncate_first: 1,
            ..ServerOptions::default()
        },
    );
    let release = ReleaseDescriptor::new("0.2.1", &sha256_hex(&body)).unwrap();
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out.tar.gz");
    let opts = FetchOptions {
        retry: RetryPolicy::single_attempt(),
        ..FetchOptions::default()
    };

    let err = fetch_release(&url(&server), &release, &dest, &opts).unwrap_err();
    let fetch_err = err
        .downcast_ref::<FetchError>()
        .unwrap_or_else(|| panic!("not a FetchError: {:#}", err));
    // libcurl reports a short body itself; either form must be retryable.
    assert!(
        matches!(
            fetch_err,
            FetchError::Curl(_) | FetchError::PartialTransfer { .. }
        ),
        "{:?}",
        fetch_err
    );
    assert_eq!(classify(fetch_err), ErrorKind::Connection);
    assert_eq!(server.hits(), 1);
    assert!(!dest.exists());
}

//! This module controls configuration from the end user, providing a
//! convenience mechanism for the rest of the program. Crashes are most likely
//! to originate from this code, intentionally.
//!
//! Only the stream name, the endpoint URL and the seed come from the command
//! line. Every other knob is a named constant here; [`Config`] carries them so
//! that tests may shrink a run.

use std::num::NonZeroU16;

use reqwest::Url;

/// The largest nominal size, in bytes, of one batch.
pub const MAX_PAYLOAD_BYTES: usize = 25_000;

/// Estimated bytes of envelope, message and protocol framing charged against
/// the payload budget for every event, in addition to the event's raw size.
pub const EVENT_OVERHEAD_BYTES: usize = 200;

/// The number of accumulators running concurrently.
pub const PRODUCER_COUNT: NonZeroU16 = match NonZeroU16::new(100) {
    Some(count) => count,
    None => panic!("producer count must be non-zero"),
};

/// The number of size requests a run produces.
pub const TOTAL_EVENTS: u64 = 100_000_000;

/// Size requests are drawn from `[0, MAX_EVENT_BYTES)`.
pub const MAX_EVENT_BYTES: usize = 25_000;

/// Substituted for a size request of zero.
pub const ZERO_SIZE_SUBSTITUTE: usize = 200;

/// The default destination stream.
pub const DEFAULT_STREAM_NAME: &str = "test";

/// Sentinel for an endpoint URL that was never supplied.
pub const URL_NOT_SET: &str = "NOT_SET";

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The endpoint URL was not supplied.
    #[error("Api URL not set")]
    UrlNotSet,
    /// The endpoint URL could not be parsed.
    #[error("Api URL {url} is invalid: {reason}")]
    InvalidUrl {
        /// The URL as supplied
        url: String,
        /// Why parsing failed
        reason: String,
    },
    /// The endpoint URL is not HTTP or HTTPS.
    #[error("Api URL {url} must use http or https, not {scheme}")]
    UnsupportedScheme {
        /// The URL as supplied
        url: String,
        /// The offending scheme
        scheme: String,
    },
}

/// Main configuration struct for this program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The stream every message is addressed to.
    pub stream_name: String,
    /// The ingest endpoint every message is posted to.
    pub target_uri: Url,
    /// The seed for random operations in this run.
    pub seed: u64,
    /// The number of size requests the distributor produces.
    pub total_events: u64,
    /// The number of concurrent accumulators.
    pub producers: NonZeroU16,
    /// The nominal byte budget of a single batch.
    pub max_payload_bytes: usize,
    /// Bytes charged against the budget per event beyond its raw size.
    pub overhead_bytes: usize,
    /// Exclusive upper bound of a size request.
    pub max_event_bytes: usize,
    /// Substituted for a size request of zero.
    pub zero_size_substitute: usize,
}

impl Config {
    /// Create a new `Config` with the default tunables.
    ///
    /// # Errors
    ///
    /// Function will return an error if `url` is empty, left at
    /// [`URL_NOT_SET`], does not parse or is not an HTTP(S) URL.
    pub fn new(stream_name: impl Into<String>, url: &str, seed: u64) -> Result<Self, Error> {
        let url = url.trim();
        if url.is_empty() || url == URL_NOT_SET {
            return Err(Error::UrlNotSet);
        }
        let target_uri = Url::parse(url).map_err(|err| Error::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        match target_uri.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::UnsupportedScheme {
                    url: url.to_string(),
                    scheme: scheme.to_string(),
                });
            }
        }

        Ok(Self {
            stream_name: stream_name.into(),
            target_uri,
            seed,
            total_events: TOTAL_EVENTS,
            producers: PRODUCER_COUNT,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            overhead_bytes: EVENT_OVERHEAD_BYTES,
            max_event_bytes: MAX_EVENT_BYTES,
            zero_size_substitute: ZERO_SIZE_SUBSTITUTE,
        })
    }
}

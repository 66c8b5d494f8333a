//! The transport message.
//!
//! An envelope is carried to the ingest endpoint inside a JSON object shaped
//! like a Kinesis `PutRecord` request:
//!
//! ```json
//! { "PartitionKey": "<uuid>", "StreamName": "<stream>", "Data": "<base64>" }
//! ```
//!
//! `Data` is the standard base64 alphabet with padding and no line wrapping.

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    common,
    envelope::{self, Event},
};

/// Errors produced by [`Message`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [`envelope::Error`]
    #[error(transparent)]
    Envelope(#[from] envelope::Error),
    /// Json message could not be encoded or decoded
    #[error("Json message could not be encoded or decoded: {0}")]
    Json(#[from] serde_json::Error),
    /// The `Data` field is not valid base64
    #[error("Message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A routed envelope, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    /// Per-message unique token the destination uses to shard records.
    pub partition_key: String,
    /// The destination stream.
    pub stream_name: String,
    /// Base64 text of the binary envelope.
    pub data: String,
}

impl Message {
    /// Wrap an encoded envelope for delivery to `stream_name`.
    #[must_use]
    pub fn wrap(envelope: &[u8], stream_name: &str, partition_key: String) -> Self {
        Self {
            partition_key,
            stream_name: stream_name.to_string(),
            data: STANDARD.encode(envelope),
        }
    }

    /// Serialize this message as the JSON transport body.
    ///
    /// # Errors
    ///
    /// Function will return an error if JSON serialization fails.
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Parse a JSON transport body.
    ///
    /// # Errors
    ///
    /// Function will return an error if `body` is not a JSON message.
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode `data` back into the envelope bytes.
    ///
    /// # Errors
    ///
    /// Function will return an error if `data` is not valid base64.
    pub fn envelope(&self) -> Result<Vec<u8>, Error> {
        Ok(STANDARD.decode(&self.data)?)
    }

    /// Decode `data` back into the events of the envelope.
    ///
    /// # Errors
    ///
    /// Function will return an error if `data` is not valid base64 or the
    /// decoded bytes are not a valid envelope.
    pub fn events(&self) -> Result<Vec<Event>, Error> {
        let envelope = self.envelope()?;
        Ok(envelope::decode(&envelope)?)
    }
}

/// Build the transport body for a batch of `events` bound for
/// `stream_name`. The partition key is a fresh UUID drawn from `rng`.
///
/// # Errors
///
/// Function will return an error if the envelope or the message cannot be
/// serialized.
pub fn prepare<R>(rng: &mut R, stream_name: &str, events: Vec<Event>) -> Result<Bytes, Error>
where
    R: Rng + ?Sized,
{
    let envelope = envelope::encode(events)?;
    let message = Message::wrap(&envelope, stream_name, common::random_uuid(rng));
    message.to_bytes()
}

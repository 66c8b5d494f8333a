//! The binary event envelope.
//!
//! A batch of events travels as one protobuf `Group` message, see
//! `proto/envelope/v1/envelope.proto`. Encoding is deterministic for a given
//! sequence of events and decoding returns the events in append order.

use bytes::{Bytes, BytesMut};
use prost::Message;

pub use crate::proto::envelope::{Event, Group};

/// Errors produced by envelope encoding and decoding.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [`prost::EncodeError`]
    #[error("Envelope could not be encoded: {0}")]
    Encode(#[from] prost::EncodeError),
    /// See [`prost::DecodeError`]
    #[error("Envelope could not be decoded: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl Event {
    /// Construct a new `Event`.
    #[must_use]
    pub fn with_raw(id: String, raw: Vec<u8>) -> Self {
        Self { id, raw }
    }
}

/// Encode `events`, in order, into a single envelope.
///
/// # Errors
///
/// Function will return an error if the envelope buffer cannot hold the
/// encoded group. The buffer is sized ahead of time so this should not occur.
pub fn encode(events: Vec<Event>) -> Result<Bytes, Error> {
    let group = Group { events };
    let mut buf = BytesMut::with_capacity(group.encoded_len());
    group.encode(&mut buf)?;
    Ok(buf.freeze())
}

/// Decode an envelope back into its events.
///
/// # Errors
///
/// Function will return an error if `buf` is not a valid envelope.
pub fn decode(buf: &[u8]) -> Result<Vec<Event>, Error> {
    let group = Group::decode(buf)?;
    Ok(group.events)
}

#[cfg(test)]
mod test {
    use proptest::{collection, prelude::*};

    use super::{Event, decode, encode};

    #[test]
    fn two_events_round_trip() {
        let events = vec![
            Event::with_raw("a".to_string(), b"x".to_vec()),
            Event::with_raw("b".to_string(), b"yy".to_vec()),
        ];

        let envelope = encode(events.clone()).expect("failed to encode");
        let decoded = decode(&envelope).expect("failed to decode");

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, "a");
        assert_eq!(decoded[0].raw, b"x");
        assert_eq!(decoded[1].id, "b");
        assert_eq!(decoded[1].raw, b"yy");
        assert_eq!(decoded, events);
    }

    #[test]
    fn empty_group_encodes_to_nothing() {
        let envelope = encode(Vec::new()).expect("failed to encode");
        assert!(envelope.is_empty());
        assert!(decode(&envelope).expect("failed to decode").is_empty());
    }

    #[test]
    fn encoding_is_deterministic() {
        let events = vec![Event::with_raw("id".to_string(), b"raw".to_vec())];
        let left = encode(events.clone()).expect("failed to encode");
        let right = encode(events).expect("failed to encode");
        assert_eq!(left, right);
    }

    #[test]
    fn garbage_does_not_decode() {
        // Field 1, wire type 2, with a length far past the end of the buffer.
        let garbage = [0x0a, 0xff, 0x01, 0x00];
        assert!(decode(&garbage).is_err());
    }

    fn event() -> impl Strategy<Value = Event> {
        (
            "[a-zA-Z0-9-]{0,36}",
            collection::vec(any::<u8>(), 0..1_024),
        )
            .prop_map(|(id, raw)| Event::with_raw(id, raw))
    }

    // Decoding an encoded envelope yields the same events in the same order.
    proptest! {
        #[test]
        fn envelope_preserves_events(events in collection::vec(event(), 0..32)) {
            let envelope = encode(events.clone())?;
            let decoded = decode(&envelope)?;
            prop_assert_eq!(decoded, events);
        }
    }
}

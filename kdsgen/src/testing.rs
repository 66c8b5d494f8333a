//! In-memory transports for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use kdsgen_payload::{Event, Message};

use crate::sender::{self, Transport};

/// Records every body it is asked to send.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    bodies: Mutex<Vec<Bytes>>,
}

impl Recorder {
    /// Every recorded body, decoded back into its events.
    pub(crate) fn batches(&self) -> Vec<Vec<Event>> {
        self.bodies
            .lock()
            .expect("poisoned")
            .iter()
            .map(|body| {
                Message::from_slice(body)
                    .and_then(|message| message.events())
                    .expect("undecodable body")
            })
            .collect()
    }

    /// Every recorded body, as sent.
    pub(crate) fn bodies(&self) -> Vec<Bytes> {
        self.bodies.lock().expect("poisoned").clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, body: Bytes) -> Result<(), sender::Error> {
        self.bodies.lock().expect("poisoned").push(body);
        Ok(())
    }
}

/// Fails every send.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Refuser;

#[async_trait]
impl Transport for Refuser {
    async fn send(&self, _body: Bytes) -> Result<(), sender::Error> {
        let source = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("request should not build");
        Err(sender::Error::RequestFailed {
            uri: "not a url".to_string(),
            source: Box::new(source),
        })
    }
}

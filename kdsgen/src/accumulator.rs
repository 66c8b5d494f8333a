//! The batch accumulator.
//!
//! An accumulator pulls size requests from the shared handoff channel,
//! synthesizes an event of exactly that size and appends it to its own
//! [`Batch`]. Before each append the batch is flushed if the new event would
//! take it over budget. When the handoff channel closes the final partial
//! batch is flushed. Flushes are synchronous: the accumulator takes no more
//! work until the endpoint has the batch.
//!
//! Any error is fatal to the run. The accumulator that hits it fires the
//! abort signal and every other accumulator stops at its next await point,
//! without flushing.

use std::sync::Arc;

use kdsgen_payload::{
    Event, common,
    message::{self, prepare},
};
use rand::{SeedableRng, rngs::SmallRng};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

use crate::{
    batch::Batch,
    config::Config,
    sender::{self, Transport},
};

/// The receiving end of the handoff channel, shared by every accumulator.
pub type Requests = Arc<Mutex<mpsc::Receiver<usize>>>;

/// Errors produced by [`Accumulator`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [`message::Error`]
    #[error("Accumulator {id} failed to encode batch: {source}")]
    Encode {
        /// The failing accumulator
        id: u16,
        /// Underlying encoding error
        #[source]
        source: message::Error,
    },
    /// See [`sender::Error`]
    #[error("Accumulator {id} failed to send batch: {source}")]
    Send {
        /// The failing accumulator
        id: u16,
        /// Underlying transport error
        #[source]
        source: sender::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Tally of the work an accumulator did.
pub struct Report {
    /// Size requests taken from the handoff channel.
    pub requests: u64,
    /// Events delivered to the endpoint.
    pub events: u64,
    /// Batches delivered to the endpoint.
    pub batches: u64,
}

impl std::ops::AddAssign for Report {
    fn add_assign(&mut self, rhs: Self) {
        self.requests += rhs.requests;
        self.events += rhs.events;
        self.batches += rhs.batches;
    }
}

#[derive(Debug)]
/// A single worker owning one batch in progress.
pub struct Accumulator<T> {
    id: u16,
    rng: SmallRng,
    batch: Batch,
    stream_name: Arc<str>,
    transport: Arc<T>,
    abort_watcher: kdsgen_signal::Watcher,
    abort_broadcaster: kdsgen_signal::Broadcaster,
    report: Report,
}

impl<T> Accumulator<T>
where
    T: Transport,
{
    /// Create a new [`Accumulator`].
    ///
    /// The accumulator's random stream is derived from the run seed and `id`
    /// so that every accumulator in a run produces distinct events.
    #[must_use]
    pub fn new(
        id: u16,
        config: &Config,
        transport: Arc<T>,
        abort_watcher: kdsgen_signal::Watcher,
        abort_broadcaster: kdsgen_signal::Broadcaster,
    ) -> Self {
        let seed = config.seed.wrapping_add(u64::from(id)).wrapping_add(1);
        Self {
            id,
            rng: SmallRng::seed_from_u64(seed),
            batch: Batch::new(config.max_payload_bytes, config.overhead_bytes),
            stream_name: Arc::from(config.stream_name.as_str()),
            transport,
            abort_watcher,
            abort_broadcaster,
            report: Report::default(),
        }
    }

    /// Run [`Accumulator`] until the handoff channel closes or the abort
    /// signal is received.
    ///
    /// # Errors
    ///
    /// Function will return an error if a batch cannot be encoded or sent. The
    /// abort signal is fired before the error is returned.
    pub async fn spin(self, requests: Requests) -> Result<Report, Error> {
        let id = self.id;
        let abort = self.abort_broadcaster.clone();
        let res = self.spin_inner(requests).await;
        if let Err(err) = &res {
            if abort.signal() {
                error!("accumulator {id} aborting run: {err}");
            }
        }
        res
    }

    async fn spin_inner(mut self, requests: Requests) -> Result<Report, Error> {
        let watcher = self.abort_watcher.clone();
        loop {
            let request = tokio::select! {
                biased;

                () = watcher.recv() => {
                    debug!(accumulator = self.id, pending = self.batch.len(), "abort signal received");
                    return Ok(self.report);
                }
                request = async { requests.lock().await.recv().await } => request,
            };
            let Some(size) = request else {
                break;
            };
            self.report.requests += 1;

            if self.batch.would_overflow(size) {
                tokio::select! {
                    biased;

                    () = watcher.recv() => return Ok(self.report),
                    res = self.flush() => res?,
                }
            }

            let raw = common::alphanumeric(&mut self.rng, size);
            let id = common::random_uuid(&mut self.rng);
            self.batch.push(Event::with_raw(id, raw));
        }

        if !self.batch.is_empty() {
            tokio::select! {
                biased;

                () = watcher.recv() => return Ok(self.report),
                res = self.flush() => res?,
            }
        }
        debug!(
            accumulator = self.id,
            events = self.report.events,
            batches = self.report.batches,
            "handoff closed, accumulator finished"
        );
        Ok(self.report)
    }

    async fn flush(&mut self) -> Result<(), Error> {
        let id = self.id;
        let fill = self.batch.fill();
        let events = self.batch.take();
        let count = events.len() as u64;
        debug!(accumulator = id, events = count, fill, "flushing batch");

        let body = prepare(&mut self.rng, &self.stream_name, events)
            .map_err(|source| Error::Encode { id, source })?;
        self.transport
            .send(body)
            .await
            .map_err(|source| Error::Send { id, source })?;

        self.report.events += count;
        self.report.batches += 1;
        Ok(())
    }
}

//! The work distributor.
//!
//! The distributor produces a finite, lazily generated stream of payload size
//! requests and hands each one to whichever accumulator is first ready to take
//! it. It performs no I/O of its own. When the stream is exhausted the handoff
//! channel is closed so that every accumulator may flush its final batch.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;

/// Errors produced by [`Distributor`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Every accumulator went away before the stream was exhausted.
    #[error("Handoff channel closed after {produced} size requests")]
    Closed {
        /// Size requests delivered before the channel closed
        produced: u64,
    },
}

/// Draw a payload size uniformly from `[0, max_event_bytes)`, substituting
/// `zero_size_substitute` for a draw of zero.
pub fn random_size<R>(rng: &mut R, max_event_bytes: usize, zero_size_substitute: usize) -> usize
where
    R: Rng + ?Sized,
{
    if max_event_bytes == 0 {
        return zero_size_substitute;
    }
    match rng.random_range(0..max_event_bytes) {
        0 => zero_size_substitute,
        size => size,
    }
}

#[derive(Debug)]
/// A finite stream of payload size requests.
///
/// The stream cannot be rewound, construct a new `SizeRequests` to start over.
pub struct SizeRequests<R> {
    rng: R,
    remaining: u64,
    max_event_bytes: usize,
    zero_size_substitute: usize,
}

impl<R> SizeRequests<R>
where
    R: Rng,
{
    /// Create a stream of `total` size requests drawn from `rng`.
    pub fn new(rng: R, total: u64, max_event_bytes: usize, zero_size_substitute: usize) -> Self {
        Self {
            rng,
            remaining: total,
            max_event_bytes,
            zero_size_substitute,
        }
    }
}

impl<R> Iterator for SizeRequests<R>
where
    R: Rng,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(random_size(
            &mut self.rng,
            self.max_event_bytes,
            self.zero_size_substitute,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[derive(Debug)]
/// Fans size requests out to the accumulator pool.
pub struct Distributor {
    requests: SizeRequests<StdRng>,
    abort: kdsgen_signal::Watcher,
}

impl Distributor {
    /// Create a new [`Distributor`] for `config`.
    #[must_use]
    pub fn new(config: &Config, abort: kdsgen_signal::Watcher) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            requests: SizeRequests::new(
                rng,
                config.total_events,
                config.max_event_bytes,
                config.zero_size_substitute,
            ),
            abort,
        }
    }

    /// Run [`Distributor`] until its stream is exhausted or the abort signal
    /// is received, returning the number of size requests handed off.
    ///
    /// The handoff channel is closed when this function returns.
    ///
    /// # Errors
    ///
    /// Function will return an error if the handoff channel closes before the
    /// stream is exhausted without the abort signal having been fired.
    pub async fn spin(self, snd: mpsc::Sender<usize>) -> Result<u64, Error> {
        let Self { requests, abort } = self;
        let mut produced: u64 = 0;

        for size in requests {
            tokio::select! {
                biased;

                () = abort.recv() => {
                    info!("abort signal received, stopping after {produced} size requests");
                    return Ok(produced);
                }
                res = snd.send(size) => {
                    if res.is_err() {
                        if abort.try_recv() {
                            return Ok(produced);
                        }
                        return Err(Error::Closed { produced });
                    }
                    produced += 1;
                }
            }
        }

        debug!("size request stream exhausted after {produced} requests, closing handoff");
        Ok(produced)
    }
}

//! A single kdsgen run.
//!
//! Spawns the accumulator pool, drives the distributor to completion and then
//! waits on every accumulator so that each tail batch is delivered before the
//! run returns. The first accumulator error aborts the run and is returned.

use std::sync::Arc;

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinSet,
};
use tracing::{error, info};

use crate::{
    accumulator::{self, Accumulator, Report, Requests},
    config::Config,
    distributor::{self, Distributor},
    sender::Transport,
};

/// Errors produced by [`run`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [`accumulator::Error`]
    #[error(transparent)]
    Accumulator(#[from] accumulator::Error),
    /// See [`distributor::Error`]
    #[error(transparent)]
    Distributor(#[from] distributor::Error),
    /// An accumulator task could not be joined.
    #[error("Could not join the spawned accumulator task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run a load generation cycle to completion.
///
/// # Errors
///
/// Function will return the first error encountered by any accumulator, or an
/// error if the distributor could not hand off every size request.
pub async fn run<T>(config: Config, transport: Arc<T>) -> Result<Report, Error>
where
    T: Transport + 'static,
{
    let (abort_watcher, abort_broadcaster) = kdsgen_signal::signal();
    // Tokio will not construct a zero capacity channel. A capacity of one
    // keeps the distributor at most one request ahead of the pool.
    let (snd, rcv) = mpsc::channel(1);
    let requests: Requests = Arc::new(Mutex::new(rcv));

    let mut accumulators = JoinSet::new();
    for id in 0..config.producers.get() {
        let accumulator = Accumulator::new(
            id,
            &config,
            Arc::clone(&transport),
            abort_watcher.clone(),
            abort_broadcaster.clone(),
        );
        accumulators.spawn(accumulator.spin(Arc::clone(&requests)));
    }
    drop(requests);

    let distributor = Distributor::new(&config, abort_watcher);
    let produced = distributor.spin(snd).await;

    let mut report = Report::default();
    let mut first_error: Option<Error> = None;
    while let Some(res) = accumulators.join_next().await {
        match res {
            Ok(Ok(accumulator_report)) => report += accumulator_report,
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(Error::Accumulator(err));
                }
            }
            Err(err) => {
                error!("Could not join the spawned accumulator task: {err}");
                abort_broadcaster.signal();
                if first_error.is_none() {
                    first_error = Some(Error::Join(err));
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    let produced = produced?;
    info!(
        produced,
        events = report.events,
        batches = report.batches,
        "all accumulators drained"
    );
    Ok(report)
}

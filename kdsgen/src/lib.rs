//! The kdsgen streaming ingest load generation tool.
//!
//! This library supports the kdsgen binary found elsewhere in this project. A
//! run is one [`distributor::Distributor`] handing payload size requests to a
//! fixed pool of [`accumulator::Accumulator`] tasks. Each accumulator packs
//! synthetic events into batches bounded by a byte budget and posts every full
//! batch to the ingest endpoint through a [`sender::Transport`].

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

pub mod accumulator;
pub mod batch;
pub mod config;
pub mod distributor;
pub mod run;
pub mod sender;

#[cfg(test)]
mod testing;

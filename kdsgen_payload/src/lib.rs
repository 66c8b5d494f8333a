//! The kdsgen payloads
//!
//! This library supports payload construction for the kdsgen project: the
//! synthetic event bodies, the binary envelope that groups them and the JSON
//! message that carries an envelope to the ingest endpoint.

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

pub mod common;
pub mod envelope;
pub mod message;

pub use envelope::{Event, Group};
pub use message::Message;

/// Structs generated from `proto/`
pub(crate) mod proto {
    /// The envelope schema, v1.
    pub(crate) mod envelope {
        #![allow(clippy::pedantic)]
        #![allow(missing_docs)]
        #![allow(unreachable_pub)]
        include!("proto/kdsgen.envelope.v1.rs");
    }
}

//! Test harness for the pinboard client.
//!
//! Real loopback servers and invariant checks, shared by the integration
//! tests of every crate above the protocol layer.
//!
//! # Servers
//!
//! - [`SimServer`]: a complete in-process bulletin board speaking the wire
//!   protocol, with the same join replay and broadcast rules as the reference
//!   server. Message ids come from a seeded RNG so runs are reproducible.
//! - [`ScriptedPeer`]: a single-connection fake server driven line by line
//!   from the test, for exact wire-level assertions.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties of a
//! [`SessionSnapshot`](pinboard_client::SessionSnapshot) that must hold after
//! any sequence of events. Use [`InvariantRegistry::standard()`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod scripted_peer;
pub mod sim_server;

pub use invariants::{
    FetchStateExclusive, Invariant, InvariantRegistry, InvariantResult, LocalMembership,
    UniqueHeaders, Violation,
};
pub use scripted_peer::{PeerConnection, ScriptedPeer};
pub use sim_server::{DEFAULT_GROUPS, SimServer, SimServerConfig};

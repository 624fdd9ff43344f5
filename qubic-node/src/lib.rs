//! Native-protocol client for Qubic nodes: framed TCP transport, typed
//! response decoding and a pooled connection factory over peer discovery.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod peers;
pub mod pool;
pub mod transport;

pub extern crate qubic_base;
pub extern crate qubic_proto;

pub use client::Client;
pub use error::{Error, Result};
pub use peers::{PeerList, PeerSource, StaticPeers};
pub use pool::{Pool, PoolConfig};
pub use transport::Connection;

#[cfg(feature = "http")]
pub use peers::HttpPeerSource;

//! Quiz show state shared between a co-host and its display screens: the
//! game store, command replication and the websocket relay.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod protocol;
pub mod pulse;
pub mod relay;
pub mod state;
pub mod sync;
pub mod types;
pub mod ws;

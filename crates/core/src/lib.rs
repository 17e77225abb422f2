//! Domain types and pure validation logic shared by every Pixelift crate.
//!
//! Nothing in here touches the database, the filesystem or the network.

pub mod enhancement;
pub mod error;
pub mod naming;
pub mod types;
pub mod upload;

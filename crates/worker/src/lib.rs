//! Background enhancement processing.
//!
//! - [`delay`] -- the injectable wait that stands in for model inference
//! - [`processor`] -- the simulated transform (existence check, wait, copy)
//! - [`queue`] -- bounded job queue and worker pool that record outcomes

pub mod delay;
pub mod processor;
pub mod queue;

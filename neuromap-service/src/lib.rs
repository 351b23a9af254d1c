//! NeuroMap: an anatomy tutor backed by a generative model.
//!
//! Three use cases share one shape: build a prompt, call the model once, and
//! (for quiz and labeling) recover JSON from the free-form reply.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod startup;

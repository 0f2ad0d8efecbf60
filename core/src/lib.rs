//! Issue triage relay core: repository policies, classification, the decision
//! engine, the dedup cache and the dispatcher.

pub mod api;
pub mod classifier;
pub mod config;
pub mod context;
pub mod decision;
pub mod dedup;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod metrics;
pub mod policy;

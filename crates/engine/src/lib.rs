//! Asynchronous job engine: store, runner, and progress notifier.
//!
//! The [`store::JobStore`] is the single shared mutable resource; the
//! [`runner::JobRunner`] is the sole writer for the jobs it owns, and any
//! number of [`notifier::ProgressNotifier`] subscriptions read concurrently.

pub mod notifier;
pub mod runner;
pub mod store;

pub use notifier::{ProgressNotifier, ProgressStream, ProgressUpdate};
pub use runner::{ExhaustionPolicy, JobRunner, RunnerConfig};
pub use store::JobStore;

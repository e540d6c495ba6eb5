//! Publishing of unpublished packages
//!
//! [`Publisher`] walks the `unpublished` list of a status artifact, building
//! and publishing each package in order. Batch runs continue past failures;
//! interactive runs consult a [`Prompter`] before each package and after each
//! failure.

pub mod prompter;
pub mod publisher;

pub use prompter::{Decision, LinePrompter, Prompter};
pub use publisher::{PublishInterrupted, PublishMode, PublishRun, Publisher, StepError};

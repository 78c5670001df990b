//! State management module
//!
//! This module handles all profile state:
//! - The profile view-model and its completion handling (profile.rs)
//! - Selection identity and the loading state machine (selection.rs)
//! - Shared data structures (data.rs)

pub mod data;
pub mod profile;
pub mod selection;

pub use profile::{LoadCompletion, ProfileViewModel};
pub use selection::{SelectionState, SelectionToken};

//! Core domain models
//!
//! This module defines the fundamental data structures that represent
//! steps, their arguments and their timeout policy.

pub mod arg;
pub mod secret;
pub mod step;
pub mod timeout;

pub use arg::*;
pub use secret::*;
pub use step::*;
pub use timeout::Timeouts;

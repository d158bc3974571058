//! stepline - execution core for a behavior-driven test automation DSL

pub mod core;
pub mod driver;
pub mod els;
pub mod error;
pub mod events;
pub mod output;
pub mod recorder;
pub mod suite;

// Re-export commonly used types
pub use crate::core::{Secret, SharedStep, Step, StepArg, StepStatus};
pub use crate::driver::{Driver, DriverRegistry, ElementHandle, ElementLocator, Locator};
pub use crate::els::{ElementCheck, ElementOp, TestRun};
pub use crate::error::StepError;
pub use crate::events::{EventBus, EventKind, StepEvent};
pub use crate::recorder::{Recorder, TaskHandle};
pub use crate::suite::{Suite, SuiteConfig};

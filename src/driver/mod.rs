//! Driver capability registry
//!
//! Drivers are external automation backends. The core only cares about
//! one capability: locating elements. Resolution scans drivers in
//! registration order and picks the first one exposing the capability;
//! several capable drivers keep that precedence but log a diagnostic.

use crate::error::StepError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// An opaque description of zero or more elements in the automation
/// target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Visible text content
    Text(String),
}

impl Locator {
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Text(_) => "text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(value) | Locator::XPath(value) | Locator::Text(value) => value,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }
}

impl From<String> for Locator {
    fn from(selector: String) -> Self {
        Locator::Css(selector)
    }
}

/// A handle to one located element, valid for the duration of the task
/// that located it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned element id
    pub id: String,

    /// Human-readable description for logs and error messages
    pub description: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        ElementHandle {
            id: id.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "#{}", self.id)
        } else {
            f.write_str(&self.description)
        }
    }
}

/// The element-locating capability.
#[async_trait]
pub trait ElementLocator: Send + Sync + fmt::Debug {
    /// Locate all elements matching `locator`, in document order.
    async fn locate(&self, locator: &Locator) -> Result<Vec<ElementHandle>, StepError>;
}

/// An automation driver.
///
/// Any driver may register; drivers able to locate elements return
/// themselves as that capability.
pub trait Driver: Send + Sync {
    fn name(&self) -> &str;

    fn as_element_locator(self: Arc<Self>) -> Option<Arc<dyn ElementLocator>> {
        None
    }
}

/// Registration-ordered set of drivers for one test run.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.push(driver);
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Resolve the element-locating driver.
    ///
    /// First-registered wins when several drivers expose the capability;
    /// zero capable drivers is a fatal configuration error.
    pub fn resolve_element_locator(&self) -> Result<Arc<dyn ElementLocator>, StepError> {
        let mut capable = self.drivers.iter().filter_map(|driver| {
            Arc::clone(driver)
                .as_element_locator()
                .map(|locator| (driver.name().to_string(), locator))
        });

        let Some((chosen, locator)) = capable.next() else {
            return Err(StepError::Configuration(
                "no enabled driver can locate elements".to_string(),
            ));
        };

        let others: Vec<String> = capable.map(|(name, _)| name).collect();
        if !others.is_empty() {
            warn!(
                "several drivers can locate elements; using first-registered '{}' over {}",
                chosen,
                others.join(", ")
            );
        }

        Ok(locator)
    }
}

//! Suite configuration sink
//!
//! External collaborator of the execution core: a separate configuration
//! step writes retry counts, timeouts, tags and per-driver settings onto
//! a suite record. The core never reads this API; it only consumes the
//! resulting effective timeout through `Step::set_timeout`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A test suite's effective configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suite {
    pub title: String,

    /// Retry count for the suite's tests
    pub retries: Option<usize>,

    /// Suite-wide timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Tags appended to the title, `@`-prefixed
    pub tags: Vec<String>,

    /// Arbitrary per-driver configuration
    pub driver_config: HashMap<String, serde_json::Value>,
}

impl Suite {
    pub fn new(title: impl Into<String>) -> Self {
        Suite {
            title: title.into(),
            ..Suite::default()
        }
    }
}

/// Chainable configuration over a suite.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    suite: Suite,
}

impl SuiteConfig {
    pub fn new(suite: Suite) -> Self {
        SuiteConfig { suite }
    }

    /// Retry the suite's tests this number of times.
    pub fn retry(mut self, retries: usize) -> Self {
        self.suite.retries = Some(retries);
        self
    }

    /// Set the suite-wide timeout, in milliseconds.
    pub fn timeout(mut self, timeout_ms: u64) -> Self {
        self.suite.timeout_ms = Some(timeout_ms);
        self
    }

    /// Append a tag to the suite title; the `@` prefix is added when
    /// missing.
    pub fn tag(mut self, tag_name: &str) -> Self {
        let tag = if tag_name.starts_with('@') {
            tag_name.to_string()
        } else {
            format!("@{}", tag_name)
        };
        self.suite.title = format!("{} {}", self.suite.title.trim(), tag);
        self.suite.tags.push(tag);
        self
    }

    /// Store configuration for one driver by name.
    pub fn config(mut self, driver: &str, value: serde_json::Value) -> Self {
        self.suite.driver_config.insert(driver.to_string(), value);
        self
    }

    pub fn into_suite(self) -> Suite {
        self.suite
    }
}

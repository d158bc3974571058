//! Secret values that render masked everywhere

use serde::{Serialize, Serializer};
use std::fmt;

/// The fixed token shown in place of a secret value.
pub const MASK: &str = "*****";

/// A wrapped sensitive value.
///
/// Wherever a step or its arguments are displayed, logged or serialized,
/// a `Secret` renders as [`MASK`], never as its inner value. The inner
/// value is only reachable through [`Secret::reveal`], which drivers call
/// at the moment they actually need it.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// The real value, for handing to a driver.
    pub fn reveal(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> &'static str {
        MASK
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(MASK)
    }
}

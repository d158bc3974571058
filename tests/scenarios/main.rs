//! Scenario-based tests for stepline

#[path = "../helpers.rs"]
mod helpers;

mod driver_precedence;
mod each_element;

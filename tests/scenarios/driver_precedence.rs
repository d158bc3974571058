//! Driver capability resolution

use crate::helpers::MockDriver;
use std::sync::Arc;
use stepline::{Driver, DriverRegistry, ElementOp, StepError, TestRun};

struct NoLocate;

impl Driver for NoLocate {
    fn name(&self) -> &str {
        "screenshots-only"
    }
}

#[tokio::test]
async fn test_first_registered_capable_driver_wins_without_error() {
    let first = MockDriver::with_elements("first", 1);
    let second = MockDriver::with_elements("second", 1);

    let mut drivers = DriverRegistry::new();
    drivers.register(first.clone());
    drivers.register(second.clone());
    let run = TestRun::new(drivers);

    let op = ElementOp::new("el.focus()", |_el, _i| async { Ok(()) });
    let handle = run.element(None, "#login", op).unwrap().unwrap();
    handle.await.unwrap();

    assert_eq!(first.locate_calls(), 1);
    assert_eq!(second.locate_calls(), 0);
}

#[tokio::test]
async fn test_incapable_drivers_are_skipped_in_registration_order() {
    let capable = MockDriver::with_elements("capable", 1);

    let mut drivers = DriverRegistry::new();
    drivers.register(Arc::new(NoLocate));
    drivers.register(capable.clone());
    let run = TestRun::new(drivers);

    let op = ElementOp::new("el.focus()", |_el, _i| async { Ok(()) });
    let handle = run.element(None, "#login", op).unwrap().unwrap();
    handle.await.unwrap();

    assert_eq!(capable.locate_calls(), 1);
}

#[tokio::test]
async fn test_no_capable_driver_is_fatal_at_call_time() {
    let mut drivers = DriverRegistry::new();
    drivers.register(Arc::new(NoLocate));
    let run = TestRun::new(drivers);

    let op = ElementOp::new("el.focus()", |_el, _i| async { Ok(()) });
    let err = run.element(None, "#login", op).unwrap_err();
    assert!(matches!(err, StepError::Configuration(_)));

    // Nothing was queued; the error never touched the recorder.
    assert_eq!(run.recorder().pending(), 0);
    run.recorder().drain().await.unwrap();
}

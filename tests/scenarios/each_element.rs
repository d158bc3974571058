//! Partial-failure semantics of `each_element`

use crate::helpers::{run_with_elements, EventLog};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stepline::{ElementOp, EventKind, StepError};

#[tokio::test]
async fn test_failing_elements_do_not_stop_the_iteration() {
    let (run, _driver) = run_with_elements(5);
    let calls = Arc::new(AtomicUsize::new(0));

    let op = {
        let calls = Arc::clone(&calls);
        // Elements #2 and #4 (1-based) fail; the others succeed.
        ElementOp::new("el.press()", move |_el, index| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if index == 1 || index == 3 {
                    Err(StepError::Element(format!("element {} broke", index)))
                } else {
                    Ok(())
                }
            }
        })
    };

    let handle = run.each_element(None, "#rows", op).unwrap().unwrap();
    let err = handle.await.unwrap_err();

    // Every element was visited despite the failures in the middle.
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    // The call fails with the first recorded error; later ones are only
    // kept in the log output.
    match err {
        StepError::Element(message) => assert_eq!(message, "element 1 broke"),
        other => panic!("expected element error, got {:?}", other),
    }

    assert!(run.recorder().drain().await.is_err());
}

#[tokio::test]
async fn test_all_elements_passing_is_a_passed_step() {
    let (run, _driver) = run_with_elements(3);
    let log = EventLog::attach(&run);
    let calls = Arc::new(AtomicUsize::new(0));

    let op = {
        let calls = Arc::clone(&calls);
        ElementOp::new("el.press()", move |_el, _index| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    };

    let handle = run.each_element(None, "#rows", op).unwrap().unwrap();
    handle.await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        log.kinds(),
        vec![
            EventKind::StepStarted,
            EventKind::StepAfter,
            EventKind::StepPassed,
            EventKind::StepFinished
        ]
    );
}

#[tokio::test]
async fn test_failure_emits_failed_and_finished_only() {
    let (run, _driver) = run_with_elements(2);
    let log = EventLog::attach(&run);

    let op = ElementOp::new("el.press()", |_el, _index| async {
        Err(StepError::Element("broken".to_string()))
    });

    let handle = run.each_element(None, "#rows", op).unwrap().unwrap();
    assert!(handle.await.is_err());

    assert_eq!(
        log.kinds(),
        vec![
            EventKind::StepStarted,
            EventKind::StepFailed,
            EventKind::StepFinished
        ]
    );
    run.recorder().reset();
}

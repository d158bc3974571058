//! Test utility functions for stepline

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stepline::{
    Driver, DriverRegistry, ElementHandle, ElementLocator, EventKind, Locator, StepError, TestRun,
};

/// Install a logging subscriber for the test process, once.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Driver that serves a fixed element list and counts locate calls.
#[derive(Debug)]
pub struct MockDriver {
    name: &'static str,
    elements: Vec<ElementHandle>,
    locate_calls: AtomicUsize,
}

impl MockDriver {
    pub fn with_elements(name: &'static str, count: usize) -> Arc<Self> {
        let elements = (0..count)
            .map(|i| ElementHandle::new(i.to_string(), format!("{}-el-{}", name, i)))
            .collect();
        Arc::new(MockDriver {
            name,
            elements,
            locate_calls: AtomicUsize::new(0),
        })
    }

    /// How many times the DSL asked this driver to locate elements.
    pub fn locate_calls(&self) -> usize {
        self.locate_calls.load(Ordering::SeqCst)
    }
}

impl Driver for MockDriver {
    fn name(&self) -> &str {
        self.name
    }

    fn as_element_locator(self: Arc<Self>) -> Option<Arc<dyn ElementLocator>> {
        Some(self)
    }
}

#[async_trait]
impl ElementLocator for MockDriver {
    async fn locate(&self, _locator: &Locator) -> Result<Vec<ElementHandle>, StepError> {
        self.locate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.elements.clone())
    }
}

/// Build a run over a single mock driver serving `count` elements.
#[allow(dead_code)]
pub fn run_with_elements(count: usize) -> (TestRun, Arc<MockDriver>) {
    let driver = MockDriver::with_elements("mock", count);
    let mut drivers = DriverRegistry::new();
    drivers.register(driver.clone());
    (TestRun::new(drivers), driver)
}

/// Record of every lifecycle event, in emission order.
pub struct EventLog {
    entries: Arc<Mutex<Vec<(EventKind, String)>>>,
}

#[allow(dead_code)]
impl EventLog {
    /// Subscribe to all five event kinds on the run's bus.
    pub fn attach(run: &TestRun) -> Self {
        let entries = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let entries = Arc::clone(&entries);
            run.events().on(kind, move |event| {
                let name = event
                    .step()
                    .read()
                    .map(|step| step.name.clone())
                    .unwrap_or_default();
                entries.lock().unwrap().push((event.kind(), name));
            });
        }
        EventLog { entries }
    }

    pub fn entries(&self) -> Vec<(EventKind, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.entries().into_iter().map(|(kind, _)| kind).collect()
    }

    /// Step names of all events of one kind, in emission order.
    pub fn names_for(&self, kind: EventKind) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name)
            .collect()
    }

    pub fn started_names(&self) -> Vec<String> {
        self.names_for(EventKind::StepStarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepline::ElementOp;

    #[tokio::test]
    async fn test_mock_driver_counts_locate_calls() {
        let (run, driver) = run_with_elements(2);
        let op = ElementOp::new("el.focus()", |_el, _i| async { Ok(()) });

        let handle = run.element(None, "#login", op).unwrap().unwrap();
        handle.await.unwrap();

        assert_eq!(driver.locate_calls(), 1);
    }

    #[tokio::test]
    async fn test_event_log_records_all_kinds() {
        let (run, _driver) = run_with_elements(1);
        let log = EventLog::attach(&run);

        let op = ElementOp::new("el.focus()", |_el, _i| async { Ok(()) });
        let handle = run.element(None, "#login", op).unwrap().unwrap();
        handle.await.unwrap();

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
}

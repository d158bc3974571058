//! Element-action DSL
//!
//! `TestRun` is the explicit context of one test execution: the task
//! queue, the event bus, the driver registry and the dry-run flag. Each
//! DSL call resolves the element-locating driver, wraps itself in a
//! [`Step`], and submits exactly one task to the recorder; the task
//! locates the elements, runs the user-supplied operation and emits the
//! step lifecycle events around the try/fail boundary.

use crate::core::{SharedStep, Step, StepArg, StepStatus};
use crate::driver::{DriverRegistry, ElementHandle, ElementLocator, Locator};
use crate::error::StepError;
use crate::events::{EventBus, StepEvent};
use crate::recorder::{BoxFuture, Recorder, TaskHandle};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

/// A user-supplied asynchronous operation on one located element.
///
/// Rust closures have no source text, so the operation carries a label:
/// the human-readable text rendered into the step's arguments and named
/// by assertion errors.
#[derive(Clone)]
pub struct ElementOp {
    label: String,
    f: Arc<dyn Fn(ElementHandle, usize) -> BoxFuture<Result<(), StepError>> + Send + Sync>,
}

impl ElementOp {
    pub fn new<F, Fut>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(ElementHandle, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), StepError>> + Send + 'static,
    {
        ElementOp {
            label: label.into(),
            f: Arc::new(move |el, index| Box::pin(f(el, index))),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    async fn call(&self, el: ElementHandle, index: usize) -> Result<(), StepError> {
        (self.f)(el, index).await
    }
}

/// A user-supplied asynchronous predicate over one located element.
#[derive(Clone)]
pub struct ElementCheck {
    label: String,
    f: Arc<dyn Fn(ElementHandle) -> BoxFuture<Result<bool, StepError>> + Send + Sync>,
}

impl ElementCheck {
    pub fn new<F, Fut>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(ElementHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, StepError>> + Send + 'static,
    {
        ElementCheck {
            label: label.into(),
            f: Arc::new(move |el| Box::pin(f(el))),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    async fn call(&self, el: ElementHandle) -> Result<bool, StepError> {
        (self.f)(el).await
    }
}

/// Context of one test execution.
///
/// Created at run start and injected into every component that submits
/// work; one `TestRun` means one linear action order.
pub struct TestRun {
    recorder: Recorder,
    events: Arc<EventBus>,
    drivers: Arc<DriverRegistry>,
    dry_run: bool,
}

impl TestRun {
    /// Create a run over the given drivers. Requires a tokio runtime.
    pub fn new(drivers: DriverRegistry) -> Self {
        TestRun {
            recorder: Recorder::new(),
            events: Arc::new(EventBus::new()),
            drivers: Arc::new(drivers),
            dry_run: false,
        }
    }

    /// In a dry run every DSL call is a no-op: nothing is resolved,
    /// built or submitted.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    /// Apply an operation to the first element matching `locator`.
    ///
    /// The operation's error is the call's error.
    #[track_caller]
    pub fn element(
        &self,
        purpose: Option<&str>,
        locator: impl Into<Locator>,
        op: ElementOp,
    ) -> Result<Option<TaskHandle>, StepError> {
        let purpose = purpose.unwrap_or("first element");
        let locator = locator.into();
        let Some((step, locating)) = self.prepare_step(purpose, &locator, op.label())? else {
            return Ok(None);
        };

        let action: BoxFuture<Result<(), StepError>> = Box::pin(async move {
            let els = locating.locate(&locator).await?;
            debug!("found {} elements, using first element", els.len());

            let Some(first) = els.into_iter().next() else {
                return Err(StepError::Element(format!(
                    "no elements matched \"{}\"",
                    locator
                )));
            };
            op.call(first, 0).await
        });

        Ok(Some(self.execute_step(step, action)))
    }

    /// Apply an operation to every element matching `locator`, in
    /// location order.
    ///
    /// A failing element is logged and recorded but does not stop the
    /// iteration; after the full pass the call fails with the first
    /// recorded error.
    #[track_caller]
    pub fn each_element(
        &self,
        purpose: Option<&str>,
        locator: impl Into<Locator>,
        op: ElementOp,
    ) -> Result<Option<TaskHandle>, StepError> {
        let purpose = purpose.unwrap_or("for each element");
        let locator = locator.into();
        let Some((step, locating)) = self.prepare_step(purpose, &locator, op.label())? else {
            return Ok(None);
        };

        let action: BoxFuture<Result<(), StepError>> = Box::pin(async move {
            let els = locating.locate(&locator).await?;
            debug!("found {} elements for each element to iterate", els.len());

            let mut errs = Vec::new();
            for (index, el) in els.into_iter().enumerate() {
                let described = el.clone();
                if let Err(err) = op.call(el, index).await {
                    error!(
                        "each element: failed operation on element #{} ({}): {}",
                        index, described, err
                    );
                    errs.push(err);
                }
            }

            match errs.into_iter().next() {
                Some(first) => Err(first),
                None => Ok(()),
            }
        });

        Ok(Some(self.execute_step(step, action)))
    }

    /// Assert that the predicate holds for the first element matching
    /// `locator`.
    #[track_caller]
    pub fn expect_element(
        &self,
        locator: impl Into<Locator>,
        check: ElementCheck,
    ) -> Result<Option<TaskHandle>, StepError> {
        let locator = locator.into();
        let Some((step, locating)) = self.prepare_step("expect element", &locator, check.label())?
        else {
            return Ok(None);
        };

        let subject = format!("element ({})", locator);
        let predicate = check.label().to_string();
        let action: BoxFuture<Result<(), StepError>> = Box::pin(async move {
            let els = locating.locate(&locator).await?;
            debug!("found {} elements, first will be used for assertion", els.len());

            let satisfied = match els.into_iter().next() {
                Some(first) => check.call(first).await?,
                None => false,
            };
            if !satisfied {
                return Err(StepError::assertion(subject, predicate));
            }
            Ok(())
        });

        Ok(Some(self.execute_step(step, action)))
    }

    /// Assert that the predicate holds for at least one element matching
    /// `locator`, short-circuiting on the first satisfying element.
    #[track_caller]
    pub fn expect_any_element(
        &self,
        locator: impl Into<Locator>,
        check: ElementCheck,
    ) -> Result<Option<TaskHandle>, StepError> {
        let locator = locator.into();
        let Some((step, locating)) =
            self.prepare_step("expect any element", &locator, check.label())?
        else {
            return Ok(None);
        };

        let subject = format!("any element of ({})", locator);
        let predicate = check.label().to_string();
        let action: BoxFuture<Result<(), StepError>> = Box::pin(async move {
            let els = locating.locate(&locator).await?;
            debug!(
                "found {} elements, at least one should pass the assertion",
                els.len()
            );

            let mut found = false;
            for el in els {
                if check.call(el).await? {
                    found = true;
                    break;
                }
            }
            if !found {
                return Err(StepError::assertion(subject, predicate));
            }
            Ok(())
        });

        Ok(Some(self.execute_step(step, action)))
    }

    /// Assert that the predicate holds for every element matching
    /// `locator`, failing fast on the first element that does not.
    #[track_caller]
    pub fn expect_all_elements(
        &self,
        locator: impl Into<Locator>,
        check: ElementCheck,
    ) -> Result<Option<TaskHandle>, StepError> {
        let locator = locator.into();
        let Some((step, locating)) =
            self.prepare_step("expect all elements", &locator, check.label())?
        else {
            return Ok(None);
        };

        let predicate = check.label().to_string();
        let action: BoxFuture<Result<(), StepError>> = Box::pin(async move {
            let els = locating.locate(&locator).await?;
            debug!("found {} elements, all should pass the assertion", els.len());

            for (index, el) in els.into_iter().enumerate() {
                let position = index + 1;
                debug!("checking element #{}: {}", position, el);
                if !check.call(el).await? {
                    return Err(StepError::assertion(
                        format!("element #{} of ({})", position, locator),
                        predicate,
                    ));
                }
            }
            Ok(())
        });

        Ok(Some(self.execute_step(step, action)))
    }

    /// Shared preamble of every DSL call.
    ///
    /// Returns `None` in a dry run; resolves the locating driver (a
    /// fatal configuration error when there is none) and builds the
    /// step describing the call.
    #[track_caller]
    fn prepare_step(
        &self,
        purpose: &str,
        locator: &Locator,
        op_label: &str,
    ) -> Result<Option<(SharedStep, Arc<dyn ElementLocator>)>, StepError> {
        if self.dry_run {
            return Ok(None);
        }

        let locating = self.drivers.resolve_element_locator()?;

        let is_assertion = purpose.starts_with("expect");
        let mut step = Step::new(format!(
            "{} within \"{}\" {}",
            purpose,
            locator,
            if is_assertion { "to be" } else { "to" }
        ));
        step.set_actor("EL");
        step.set_arguments(vec![StepArg::Code(op_label.to_string())]);
        step.helper_method = "locate".to_string();

        Ok(Some((step.into_shared(), locating)))
    }

    /// Run the action as one recorder task, with the step lifecycle
    /// events emitted around it.
    fn execute_step(&self, step: SharedStep, action: BoxFuture<Result<(), StepError>>) -> TaskHandle {
        let events = Arc::clone(&self.events);
        self.recorder.add("element action wrapper", async move {
            if let Ok(mut s) = step.write() {
                s.set_status(StepStatus::Running);
            }
            events.emit(&StepEvent::Started(Arc::clone(&step)));

            match action.await {
                Ok(()) => {
                    if let Ok(mut s) = step.write() {
                        s.set_status(StepStatus::Passed);
                    }
                    events.emit(&StepEvent::After(Arc::clone(&step)));
                    events.emit(&StepEvent::Passed(Arc::clone(&step)));
                    events.emit(&StepEvent::Finished(step));
                    Ok(())
                }
                Err(err) => {
                    if let Ok(mut s) = step.write() {
                        s.set_status(StepStatus::Failed);
                    }
                    events.emit(&StepEvent::Failed(Arc::clone(&step), Arc::new(err.clone())));
                    events.emit(&StepEvent::Finished(step));
                    Err(err)
                }
            }
        })
    }
}

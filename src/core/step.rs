//! Step domain model
//!
//! Every DSL action is wrapped in a `Step`: a renderable record of the
//! actor, action name, arguments, timeout policy and lifecycle status.
//! Steps nest through a non-owning meta-step back-reference used for
//! hierarchical reporting; status set on a child bubbles up the chain.

use crate::core::arg::StepArg;
use crate::core::timeout::Timeouts;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, OnceLock, RwLock, Weak};

/// A step shared between its executing task and event listeners.
pub type SharedStep = Arc<RwLock<Step>>;

/// Lifecycle status of a step.
///
/// Transitions only move forward: pending → running → passed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Passed | StepStatus::Failed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A single DSL action: who performs it, what it does, with which
/// arguments, and how it went.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Action name
    pub name: String,

    /// Prefix label of the DSL subject performing the action
    pub actor: String,

    /// Which driver capability backs this action
    pub helper_method: String,

    /// Ordered, opaque arguments (sensitive ones render masked)
    pub args: Vec<StepArg>,

    /// Current lifecycle status
    pub status: StepStatus,

    /// Rendering decorations
    pub prefix: String,
    pub suffix: String,

    /// Call site captured at construction time
    #[serde(serialize_with = "serialize_location")]
    location: &'static Location<'static>,

    /// Timeout entries by priority order
    #[serde(skip)]
    timeouts: Timeouts,

    /// Non-owning back-reference to the logical parent step
    #[serde(skip)]
    meta_step: Option<Weak<RwLock<Step>>>,
}

fn serialize_location<S: Serializer>(
    location: &&'static Location<'static>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{}:{}", location.file(), location.line()))
}

fn bdd_keyword() -> &'static Regex {
    static BDD_KEYWORD: OnceLock<Regex> = OnceLock::new();
    BDD_KEYWORD.get_or_init(|| {
        Regex::new(r"^(Given|When|Then|And)").expect("BDD keyword pattern is valid")
    })
}

impl Step {
    /// Create a pending step, capturing the caller's source location.
    #[track_caller]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Step {
            helper_method: name.clone(),
            name,
            actor: "I".to_string(),
            args: Vec::new(),
            status: StepStatus::Pending,
            prefix: String::new(),
            suffix: String::new(),
            location: Location::caller(),
            timeouts: Timeouts::new(),
            meta_step: None,
        }
    }

    /// Wrap this step for sharing with event listeners and child steps.
    pub fn into_shared(self) -> SharedStep {
        Arc::new(RwLock::new(self))
    }

    pub fn set_arguments(&mut self, args: Vec<StepArg>) {
        self.args = args;
    }

    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.actor = actor.into();
    }

    /// Attach the logical parent step. The reference is non-owning: a
    /// dropped parent simply stops receiving propagated status.
    pub fn set_meta_step(&mut self, meta_step: &SharedStep) {
        self.meta_step = Some(Arc::downgrade(meta_step));
    }

    /// Insert or overwrite the timeout entry at `order`, in milliseconds.
    pub fn set_timeout(&mut self, timeout_ms: u64, order: i32) {
        self.timeouts.set(timeout_ms, order);
    }

    /// Effective timeout in milliseconds, resolved over all entries.
    pub fn timeout(&self) -> Option<u64> {
        self.timeouts.current()
    }

    /// Set this step's status and propagate it up the meta-step chain.
    ///
    /// Propagation is unconditional assignment at every level; the last
    /// setter wins.
    pub fn set_status(&mut self, status: StepStatus) {
        self.status = status;
        if let Some(parent) = self.meta_step.as_ref().and_then(Weak::upgrade) {
            if let Ok(mut parent) = parent.write() {
                parent.set_status(status);
            }
        }
    }

    /// The action name as space-separated lowercase words.
    pub fn humanize(&self) -> String {
        humanize_string(&self.name)
    }

    /// All arguments rendered for display, comma-separated. Secret
    /// arguments render as the mask token.
    pub fn humanize_args(&self) -> String {
        self.args
            .iter()
            .map(StepArg::render)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The captured call site, as `file:line`.
    pub fn line(&self) -> String {
        format!("at {}:{}", self.location.file(), self.location.line())
    }

    /// Styled one-line rendering for terminal reporters.
    pub fn to_cli_styled(&self) -> String {
        use console::style;
        format!(
            "{}{} {} {}{}",
            self.prefix,
            self.actor,
            style(self.humanize()).italic(),
            style(self.humanize_args()).yellow(),
            self.suffix
        )
    }

    /// Code-like rendering: `actor.name(args)`.
    pub fn to_code(&self) -> String {
        format!(
            "{}{}.{}({}){}",
            self.prefix,
            self.actor,
            self.name,
            self.humanize_args(),
            self.suffix
        )
    }

    /// True if any ancestor's actor starts with a BDD keyword
    /// (`Given`/`When`/`Then`/`And`). Stops at the first match or at a
    /// step with no further meta-step.
    pub fn has_bdd_ancestor(&self) -> bool {
        let mut current = self.meta_step.as_ref().and_then(Weak::upgrade);
        while let Some(step) = current {
            let Ok(guard) = step.read() else {
                return false;
            };
            if bdd_keyword().is_match(&guard.actor) {
                return true;
            }
            let next = guard.meta_step.as_ref().and_then(Weak::upgrade);
            drop(guard);
            current = next;
        }
        false
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = format!(
            "{}{} {} {}{}",
            self.prefix,
            self.actor,
            self.humanize(),
            self.humanize_args(),
            self.suffix
        );
        f.write_str(ucfirst(line.trim()).trim())
    }
}

/// Split a camelCase or snake_case action name into lowercase words.
fn humanize_string(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_uppercase() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            out.extend(ch.to_lowercase());
        } else if ch == '_' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

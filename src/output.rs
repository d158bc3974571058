//! Console formatting for steps and lifecycle events

use crate::core::{Step, StepStatus};
use crate::events::StepEvent;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Format a step status for display
pub fn format_status(status: StepStatus) -> String {
    match status {
        StepStatus::Pending => style("PENDING").dim().to_string(),
        StepStatus::Running => style("RUNNING").yellow().to_string(),
        StepStatus::Passed => style("PASSED").green().to_string(),
        StepStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a step with its call site for display
pub fn format_step(step: &Step) -> String {
    format!("{} {}", step.to_cli_styled(), style(step.line()).dim())
}

/// Format a lifecycle event for display
pub fn format_step_event(event: &StepEvent) -> String {
    let line = event
        .step()
        .read()
        .map(|step| step.to_string())
        .unwrap_or_else(|_| "<step>".to_string());

    match event {
        StepEvent::Started(_) => format!("{}{}", SPINNER, style(line).cyan()),
        StepEvent::After(_) => format!("{}{}", INFO, style(line).dim()),
        StepEvent::Passed(_) => format!("{}{}", CHECK, line),
        StepEvent::Failed(_, err) => {
            format!("{}{} ({})", CROSS, line, style(err).red())
        }
        StepEvent::Finished(_) => style(line).dim().to_string(),
    }
}

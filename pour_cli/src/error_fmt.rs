//! Human-readable error descriptions and structured JSON error formatting.

use pour_core::error::{BuildError, PourError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingMeter => {
                "What happened: No flow meter was provided to the pour monitor.\nLikely causes: The meter failed to construct or was not wired into the builder.\nHow to fix: Ensure the FlowMeter is created successfully and passed via with_meter(...).".to_string()
            }
            BuildError::MissingPresenter => {
                "What happened: No presenter was provided to the pour monitor.\nLikely causes: Display setup failed or was not wired into the builder.\nHow to fix: Pass a presenter via with_presenter(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<PourError>() {
        return format!(
            "What happened: {pe}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("attach flow sensor") || lower.contains("gpio") {
        return "What happened: Failed to attach the flow sensor interrupt.\nLikely causes: Wrong GPIO pin, missing permissions, or not running on the target board.\nHow to fix: Check [hardware] gpio_pin in the config and GPIO access rights, or build without the hardware feature.".to_string();
    }

    if lower.contains("parse config") || lower.contains("must be") {
        return format!(
            "What happened: Configuration is invalid.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("state file") {
        return format!(
            "What happened: The counter store could not be read or written.\nDetails: {msg}\nHow to fix: Check the --state path and its permissions; delete the file to start from zero."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured error object for --json mode.
pub fn json_error(err: &eyre::Report) -> String {
    serde_json::json!({
        "event": "error",
        "message": err.to_string(),
        "detail": humanize(err),
    })
    .to_string()
}

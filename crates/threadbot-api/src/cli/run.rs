//! `threadbot run`: one post, then exit.

use anyhow::Result;
use console::style;

use threadbot_core::thread::engine::RunReport;

use crate::state::ConcreteEngine;

/// Perform one run and print what was posted.
///
/// Any failure propagates, giving a non-zero exit status for external
/// schedulers.
pub async fn run_once(engine: &ConcreteEngine, json: bool, quiet: bool) -> Result<()> {
    let report = engine.run_once().await?;
    print_report(&report, json, quiet)
}

pub fn print_report(report: &RunReport, json: bool, quiet: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "sequence": report.sequence,
            "persona": report.persona_handle,
            "message": report.message,
            "reply": report.reply,
            "uri": report.strong_ref.uri,
            "cid": report.strong_ref.cid,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    let kind = if report.reply { "reply" } else { "new thread" };
    println!();
    println!(
        "  {} Posted #{} as {} ({})",
        style("✓").green().bold(),
        report.sequence,
        style(&report.persona_handle).cyan(),
        kind
    );
    println!("    {}", report.message);
    println!("    {}", style(&report.strong_ref.uri).dim());
    println!();
    Ok(())
}

//! `threadbot personas`: list the configured cast.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Print persona handles, display names and the env vars holding their
/// credentials. Secret values are never read here.
pub fn list_personas(state: &AppState, json: bool) -> Result<()> {
    let personas = &state.config.personas;

    if json {
        println!("{}", serde_json::to_string_pretty(personas)?);
        return Ok(());
    }

    if personas.is_empty() {
        println!();
        println!(
            "  {} No personas configured in {}",
            style("!").yellow().bold(),
            style(state.config_path.display()).dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Handle").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Login Env").fg(Color::White),
    ]);

    for persona in personas {
        table.add_row(vec![
            Cell::new(&persona.handle).fg(Color::Cyan),
            Cell::new(&persona.display_name),
            Cell::new(format!("{} / {}", persona.identifier_env, persona.password_env))
                .fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} persona{}",
        style(personas.len()).bold(),
        if personas.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

//! `threadbot show`: print the stored thread.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use threadbot_core::repository::conversation::load_or_empty;
use threadbot_types::thread::ConversationStore;

use crate::state::AppState;

/// Load the snapshot and print every post in order.
pub async fn show_thread(state: &AppState, json: bool) -> Result<()> {
    let repo = state.snapshot_repository();
    let store = load_or_empty(&repo).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&store)?);
        return Ok(());
    }

    if store.is_empty() {
        println!();
        println!(
            "  {} No posts yet at {}. Start the thread with: {}",
            style("i").blue().bold(),
            style(repo.path().display()).dim(),
            style("threadbot run").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", render_table(&store));
    println!();
    println!(
        "  {} post{} in {}",
        style(store.post_count()).bold(),
        if store.post_count() == 1 { "" } else { "s" },
        style(repo.path().display()).dim()
    );
    if let Some(first) = store.first() {
        println!("  Root: {}", style(&first.strong_ref.uri).dim());
    }
    println!();

    Ok(())
}

fn render_table(store: &ConversationStore) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Persona").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("Replying To").fg(Color::White),
    ]);

    for post in store.posts() {
        // Show the parent by its sequence number when it is in the store.
        let parent_cell = match post.parent_strong_ref() {
            None => Cell::new("root").fg(Color::Green),
            Some(parent) => {
                let label = store
                    .posts()
                    .iter()
                    .find(|p| &p.strong_ref == parent)
                    .map(|p| format!("#{}", p.id))
                    .unwrap_or_else(|| parent.uri.clone());
                Cell::new(label).fg(Color::DarkGrey)
            }
        };

        table.add_row(vec![
            Cell::new(post.id),
            Cell::new(&post.username).fg(Color::Cyan),
            Cell::new(&post.message),
            parent_cell,
        ]);
    }

    table
}

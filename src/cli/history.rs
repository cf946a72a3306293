use super::ui;
use crate::core::{History, KeyValueStorage};
use anyhow::Result;
use chrono::Local;
use comfy_table::Cell;
use std::sync::Arc;

/// One row per converted target, oldest conversion first.
pub fn history_table(history: &History) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Amount"),
    ]);
    for entry in history.entries() {
        let date = entry
            .timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        for (i, (target, amount)) in entry.targets.iter().zip(&entry.amounts).enumerate() {
            let (date_cell, from_cell) = if i == 0 {
                (Cell::new(&date), Cell::new(entry.from.to_string()))
            } else {
                (Cell::new(""), Cell::new(""))
            };
            table.add_row(vec![
                date_cell,
                from_cell,
                Cell::new(target.to_string()),
                ui::amount_cell(*amount),
            ]);
        }
    }
    table.to_string()
}

pub fn run(storage: Arc<dyn KeyValueStorage>) -> Result<()> {
    let history = History::load(storage);
    if history.is_empty() {
        println!(
            "{}",
            ui::style_text("No conversions recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    println!(
        "\n{}",
        ui::style_text("Transaction History", ui::StyleType::Title)
    );
    println!("{}", history_table(&history));
    Ok(())
}

use super::ui;
use crate::core::{CurrencyCode, FavoritePair, Favorites, KeyValueStorage};
use anyhow::Result;
use comfy_table::Cell;
use std::sync::Arc;

pub fn favorites_table(favorites: &Favorites) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("From"),
        ui::header_cell("To"),
    ]);
    for pair in favorites.iter() {
        table.add_row(vec![
            Cell::new(pair.as_str()),
            Cell::new(pair.from_currency().to_string()),
            Cell::new(pair.to_currency().to_string()),
        ]);
    }
    table.to_string()
}

/// Lists favorites, optionally toggling the `from`/`to` pair first.
pub fn run(storage: Arc<dyn KeyValueStorage>, toggle: Option<(&str, &str)>) -> Result<()> {
    let mut favorites = Favorites::load(storage);

    if let Some((from, to)) = toggle {
        let pair = FavoritePair::new(&CurrencyCode::new(from)?, &CurrencyCode::new(to)?);
        let verb = if favorites.toggle(pair.clone()) {
            "Added"
        } else {
            "Removed"
        };
        println!("{verb} favorite {pair}");
    }

    if favorites.is_empty() {
        println!(
            "{}",
            ui::style_text("No favorite currency pairs yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    println!(
        "\n{}",
        ui::style_text("Favorite Currencies", ui::StyleType::Title)
    );
    println!("{}", favorites_table(&favorites));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::favorites::FAVORITES_KEY;
    use crate::store::memory::MemoryStorage;

    #[test]
    fn test_run_toggles_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        run(storage.clone(), Some(("INR", "usd"))).unwrap();
        assert_eq!(
            storage.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["inr_usd"]"#)
        );

        run(storage.clone(), Some(("inr", "usd"))).unwrap();
        assert_eq!(storage.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_run_rejects_bad_codes() {
        let storage = Arc::new(MemoryStorage::new());
        assert!(run(storage.clone(), Some(("in r", "usd"))).is_err());
        assert!(storage.get(FAVORITES_KEY).unwrap().is_none());
    }

    #[test]
    fn test_favorites_table() {
        let storage = Arc::new(MemoryStorage::with_entries([(
            FAVORITES_KEY,
            r#"["inr_usd"]"#,
        )]));
        let rendered = favorites_table(&Favorites::load(storage));
        assert!(rendered.contains("inr_usd"));
        assert!(rendered.contains("USD"));
    }
}

use super::ui;
use crate::core::{CurrencyCode, RateProvider, RateTable};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub fn rates_table(table: &RateTable) -> String {
    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {})", table.base())),
    ]);
    for (code, rate) in table.iter() {
        out.add_row(vec![
            Cell::new(code.to_string()),
            Cell::new(rate.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    out.to_string()
}

pub async fn run(provider: &dyn RateProvider, base: &str) -> Result<()> {
    let base = CurrencyCode::new(base)?;
    let pb = ui::new_spinner(&format!("Fetching {base} rates"));
    let result = provider.fetch_rates(&base).await;
    pb.finish_and_clear();

    let table = result?;
    println!(
        "\n{} {}",
        ui::style_text("Rates for", ui::StyleType::Title),
        ui::style_text(&base.to_string(), ui::StyleType::Title)
    );
    println!("{}", rates_table(&table));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_table_lists_every_code() {
        let code = |s: &str| CurrencyCode::new(s).unwrap();
        let table = RateTable::new(code("inr"), vec![(code("usd"), 0.012)]);
        let rendered = rates_table(&table);
        assert!(rendered.contains("Rate (1 INR)"));
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("0.012"));
        assert!(rendered.contains("INR"));
    }
}

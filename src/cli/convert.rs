use super::ui;
use crate::core::config::FormDefaults;
use crate::core::{ConverterForm, CurrencyCode, KeyValueStorage, RateProvider, RateUpdate};
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use std::sync::Arc;

/// Renders the current form: the amount being converted and one row per
/// target with its converted amount and favorite marker.
pub fn form_table(form: &ConverterForm) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("To"),
        ui::header_cell("Amount"),
        ui::header_cell("Favorite"),
    ]);
    for (i, (target, amount)) in form.targets().iter().zip(form.amounts()).enumerate() {
        let favorite = if form.is_favorite(i) { "★" } else { "" };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(target.to_string()),
            ui::amount_cell(*amount),
            Cell::new(favorite),
        ]);
    }
    format!(
        "From: {} {}\n{}",
        ui::format_amount(form.amount()),
        form.from(),
        table
    )
}

/// Builds a form for `from` -> `targets`, fetches rates, converts `amount`
/// and records it in the history.
pub async fn run(
    defaults: &FormDefaults,
    storage: Arc<dyn KeyValueStorage>,
    provider: &dyn RateProvider,
    amount: f64,
    from: &str,
    targets: &[String],
) -> Result<()> {
    let mut form = ConverterForm::new(defaults, storage);
    form.change_amount(amount)?;
    let request = form.change_from(CurrencyCode::new(from)?);
    for (i, target) in targets.iter().enumerate() {
        if i > 0 {
            form.add_target();
        }
        form.change_target_currency(i, CurrencyCode::new(target)?)?;
    }
    // Configured defaults may list more targets than were asked for
    while form.targets().len() > targets.len().max(1) {
        form.remove_target(form.targets().len() - 1)?;
    }

    let base = request.base.clone();
    match super::fetch_rates_for(&mut form, provider, request).await {
        RateUpdate::Applied => {}
        RateUpdate::Failed(e) => return Err(e).context("Cannot convert without rates"),
        RateUpdate::Stale => bail!("Rates for {base} were superseded"),
    }

    form.submit_convert()?;
    println!(
        "\n{}",
        ui::style_text(&form.submit_label(), ui::StyleType::Title)
    );
    println!("{}", form_table(&form));
    Ok(())
}

use super::ui;
use crate::core::{Conversion, ErrorKind, ExchangeRateApi, RateCache, RateStore};
use anyhow::{Result, anyhow};
use comfy_table::Cell;

/// Renders the converted amounts, one row per currency.
pub fn display_as_table(amount: f64, source: &str, conversions: &[Conversion]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per {source})")),
        ui::header_cell("Amount"),
    ]);

    for conversion in conversions {
        let is_source = conversion.code == source;
        table.add_row(vec![
            Cell::new(&conversion.code),
            ui::number_cell(format!("{:.6}", conversion.rate), is_source),
            ui::number_cell(format!("{:.2}", conversion.amount), is_source),
        ]);
    }

    let title = format!("{amount:.2} {source}");
    format!(
        "Converting {}\n\n{}",
        ui::style_text(&title, ui::StyleType::Title),
        table
    )
}

pub async fn run<A: ExchangeRateApi, S: RateStore>(
    rates: &RateCache<A, S>,
    amount: f64,
    source: &str,
) -> Result<()> {
    if !amount.is_finite() {
        return Err(anyhow!("Amount must be a finite number, got {amount}"));
    }
    let source = source.to_uppercase();

    super::refresh_quietly(rates).await;

    let conversions = rates.convert(amount, &source).map_err(|e| match e.kind() {
        ErrorKind::UnknownCurrencyCode => anyhow!(
            "Unknown currency code {source}. Run `fxcache currencies` to list known codes"
        ),
        _ => e.into(),
    })?;

    println!("{}", display_as_table(amount, &source, &conversions));
    println!("\n{}", ui::last_update_line(rates.last_update()?));
    Ok(())
}

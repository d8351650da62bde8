use super::ui;
use crate::core::{BASE_CURRENCY, ExchangeRateApi, RateCache, RateStore};
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

pub fn display_as_table(codes: &[String], usd_rates: &HashMap<String, f64>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per {BASE_CURRENCY})")),
    ]);

    for code in codes {
        let rate = usd_rates
            .get(code)
            .map_or("N/A".to_string(), |r| format!("{r:.6}"));
        table.add_row(vec![
            Cell::new(code),
            ui::number_cell(rate, code == BASE_CURRENCY),
        ]);
    }
    table.to_string()
}

pub async fn run<A: ExchangeRateApi, S: RateStore>(rates: &RateCache<A, S>) -> Result<()> {
    super::refresh_quietly(rates).await;

    let mut codes = rates.list_currency_codes()?;
    codes.sort();
    let usd_rates = rates.compute_rates(BASE_CURRENCY)?;

    println!("{}", display_as_table(&codes, &usd_rates));
    println!("\n{}", ui::last_update_line(rates.last_update()?));
    Ok(())
}

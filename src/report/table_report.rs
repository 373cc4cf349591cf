use std::fmt::Write;

use strum::IntoEnumIterator;

use crate::{
    application::engine::AggregationOutcome,
    domain::{
        table::AggregateTable,
        valuation::{Valuation, ValueTier},
    },
};

const CURRENCY_HEADER: &str = "Currency";
const DELIMITER: char = '\t';
const LABEL_WIDTH: usize = 15;
const GRAND_TOTAL_LABEL: &str = "TOTAL";

/// Renders the table as tab-separated text, ready to paste into a spreadsheet.
pub fn render_tsv(table: &AggregateTable) -> String {
    let mut out = String::new();

    let header: Vec<&str> = std::iter::once(CURRENCY_HEADER)
        .chain(table.columns())
        .collect();
    push_line(&mut out, &header);

    for row in table.rows() {
        let cells: Vec<String> = std::iter::once(row.currency.clone())
            .chain(row.amounts.iter().map(f64::to_string))
            .chain(std::iter::once(row.total.to_string()))
            .collect();
        push_line(&mut out, &cells);
    }

    out
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            out.push(DELIMITER);
        }
        out.push_str(cell.as_ref());
    }
    out.push('\n');
}

pub fn summary_line(table: &AggregateTable) -> String {
    let summary = table.summary();
    if summary.exchanges == 0 {
        return "No data was retrieved. Please configure `exchanges` in the config file.".to_string();
    }
    format!(
        "Retrieved balances for {} currencies ({} with balances) from {} exchanges.",
        summary.currencies, summary.with_balance, summary.exchanges
    )
}

/// One line per exchange telling where its balances came from.
pub fn render_sources(outcome: &AggregationOutcome) -> String {
    let width = outcome
        .sources
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (name, source) in &outcome.sources {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{name:>width$}: {source}");
    }
    out
}

/// Currencies grouped by dollar value, then the dollars held on each exchange
/// and the grand total.
pub fn render_valuation(valuation: &Valuation) -> String {
    let mut out = String::new();

    for tier in ValueTier::iter() {
        let _ = writeln!(out, "{tier} VALUE");
        for token in valuation.tokens_in(tier) {
            let _ = writeln!(
                out,
                "{:>LABEL_WIDTH$}: {:>11.2} = ${:>9.2}",
                token.currency, token.amount, token.usd
            );
        }
        out.push('\n');
    }

    for (exchange, usd) in valuation.by_exchange() {
        let _ = writeln!(out, "{exchange:>LABEL_WIDTH$}: {usd:.2}");
    }
    out.push('\n');
    let _ = writeln!(
        out,
        "{GRAND_TOTAL_LABEL:>LABEL_WIDTH$}: {:.2}",
        valuation.total()
    );
    out
}

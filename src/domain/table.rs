use std::collections::BTreeSet;

use super::balance::BalanceSnapshot;

/// One currency line of the aggregate table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub currency: String,
    /// Amounts in the same order as [`AggregateTable::exchange_columns`].
    pub amounts: Vec<f64>,
    pub total: f64,
}

/// Counts gathered while merging, before zero rows are filtered out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub currencies: usize,
    pub with_balance: usize,
    pub exchanges: usize,
}

/// Currency-by-exchange balances with a total per currency.
///
/// Rows are sorted by currency symbol (byte order). Columns are the exchanges
/// in the order they were merged, followed by the total column.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    exchange_columns: Vec<String>,
    total_column: String,
    rows: Vec<TableRow>,
    summary: TableSummary,
}

impl AggregateTable {
    /// Merges the snapshots of every exchange into one table.
    ///
    /// Every symbol of every snapshot gets a row, as does every symbol in
    /// `required_rows`. When `exclude_zeros` is set, rows whose total is
    /// exactly zero are dropped after totaling, unless they are required.
    pub fn merge(
        columns: &[(&str, &BalanceSnapshot)],
        total_column: &str,
        required_rows: &[String],
        exclude_zeros: bool,
    ) -> Self {
        let currencies: BTreeSet<&str> = columns
            .iter()
            .flat_map(|(_, snapshot)| snapshot.symbols())
            .chain(required_rows.iter().map(String::as_str))
            .collect();

        let mut summary = TableSummary {
            currencies: currencies.len(),
            with_balance: 0,
            exchanges: columns.len(),
        };

        let rows = currencies
            .into_iter()
            .filter_map(|currency| {
                let amounts: Vec<f64> = columns
                    .iter()
                    .map(|(_, snapshot)| snapshot.amount(currency))
                    .collect();
                let total: f64 = amounts.iter().sum();

                if total != 0.0 {
                    summary.with_balance += 1;
                } else if exclude_zeros && !required_rows.iter().any(|r| r == currency) {
                    return None;
                }

                Some(TableRow {
                    currency: currency.to_string(),
                    amounts,
                    total,
                })
            })
            .collect();

        Self {
            exchange_columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
            total_column: total_column.to_string(),
            rows,
            summary,
        }
    }

    pub fn exchange_columns(&self) -> &[String] {
        &self.exchange_columns
    }

    pub fn total_column(&self) -> &str {
        &self.total_column
    }

    /// Exchange columns followed by the total column.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.exchange_columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.total_column.as_str()))
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, currency: &str) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.currency == currency)
    }

    /// Amount of `currency` held on `exchange`, if both are in the table.
    pub fn amount(&self, currency: &str, exchange: &str) -> Option<f64> {
        let column = self
            .exchange_columns
            .iter()
            .position(|name| name == exchange)?;
        self.row(currency).map(|row| row.amounts[column])
    }

    pub fn summary(&self) -> TableSummary {
        self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, f64)]) -> BalanceSnapshot {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_merge_fills_missing_with_zero() {
        let polo = snapshot(&[("BTC", 1.0), ("ETH", 2.0)]);
        let gdax = snapshot(&[("BTC", 2.0)]);

        let table =
            AggregateTable::merge(&[("Poloniex", &polo), ("GDAX", &gdax)], "Total", &[], true);

        assert_eq!(table.len(), 2);
        assert_eq!(table.amount("ETH", "GDAX"), Some(0.0));
        assert_eq!(table.row("ETH").unwrap().total, 2.0);
        assert_eq!(table.row("BTC").unwrap().amounts, vec![1.0, 2.0]);
        assert_eq!(table.row("BTC").unwrap().total, 3.0);
    }

    #[test]
    fn test_rows_are_sorted_by_symbol() {
        let a = snapshot(&[("XRP", 1.0), ("BTC", 1.0)]);
        let b = snapshot(&[("ETH", 1.0), ("ADA", 1.0)]);

        let table = AggregateTable::merge(&[("A", &a), ("B", &b)], "Total", &[], true);
        let order: Vec<&str> = table.rows().iter().map(|r| r.currency.as_str()).collect();

        assert_eq!(order, vec!["ADA", "BTC", "ETH", "XRP"]);
    }

    #[test]
    fn test_columns_keep_merge_order_and_end_with_total() {
        let empty = BalanceSnapshot::new();
        let table =
            AggregateTable::merge(&[("Zeta", &empty), ("Alpha", &empty)], "Subtotal", &[], true);
        assert_eq!(
            table.columns().collect::<Vec<_>>(),
            vec!["Zeta", "Alpha", "Subtotal"]
        );
    }

    #[test]
    fn test_zero_total_rows_are_excluded() {
        let a = snapshot(&[("BTC", 5.0), ("ETH", 0.0)]);
        let b = snapshot(&[("BTC", 0.0), ("DOGE", 0.0)]);

        let table = AggregateTable::merge(&[("A", &a), ("B", &b)], "Total", &[], true);

        assert_eq!(table.len(), 1);
        assert_eq!(table.row("BTC").unwrap().total, 5.0);
        assert_eq!(
            table.summary(),
            TableSummary {
                currencies: 3,
                with_balance: 1,
                exchanges: 2
            }
        );
    }

    #[test]
    fn test_zero_rows_are_kept_when_filtering_is_disabled() {
        let a = snapshot(&[("BTC", 5.0), ("ETH", 0.0)]);
        let table = AggregateTable::merge(&[("A", &a)], "Total", &[], false);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row("ETH").unwrap().total, 0.0);
    }

    #[test]
    fn test_required_rows_always_present() {
        let a = snapshot(&[("BTC", 5.0)]);
        let required = vec!["USD".to_string()];

        let table = AggregateTable::merge(&[("A", &a)], "Total", &required, true);

        let usd = table.row("USD").unwrap();
        assert_eq!(usd.amounts, vec![0.0]);
        assert_eq!(usd.total, 0.0);
    }

    #[test]
    fn test_merge_without_exchanges_is_empty() {
        let table = AggregateTable::merge(&[], "Total", &[], true);
        assert!(table.is_empty());
        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["Total"]);
    }
}

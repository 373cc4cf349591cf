pub mod table_report;

pub use table_report::{render_sources, render_tsv, render_valuation, summary_line};

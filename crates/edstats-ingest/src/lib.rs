pub mod csv_table;
pub mod labels;
pub mod polars_utils;
pub mod writer;

pub use csv_table::{CsvTable, ReadOptions, read_csv_table, read_csv_table_with_options};
pub use labels::{LabelVocabulary, translate_tables};
pub use polars_utils::{any_to_f64, any_to_string, format_numeric, parse_f64};
pub use writer::{render_csv, render_table, write_csv, write_table};

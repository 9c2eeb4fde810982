//! Tabular parsing: raw delimited text → rows of trimmed strings, plus the
//! cell-level helpers shared by the snapshot and population loaders.

pub mod csv;
pub mod date_parser;
pub mod utils;

pub use self::csv::{is_blank, parse_csv, RawRow};
pub use date_parser::parse_iso_date;
pub use utils::{clean_str, first_year, parse_count, parse_population};

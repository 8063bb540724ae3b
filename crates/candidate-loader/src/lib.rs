//! Candidate Loader
//!
//! Turns the tabular stock universe into validated [`swipe_core::Candidate`]
//! records. Two failure policies coexist: rows whose column count
//! does not match the header are skipped, while an unparsable number or an
//! invalid record aborts the whole load.

pub mod csv_parser;
pub mod loaders;

pub use csv_parser::{parse_candidates, parse_row, HeaderIndex, LoadReport, RowOutcome};
pub use loaders::{CsvCandidateLoader, StaticCandidateLoader};

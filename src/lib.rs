//! Data reshaping for a monthly financial report: loads the pre-computed
//! JSON summary, resolves display labels and builds chart series and tables.
pub mod error;
pub mod index;
pub mod loader;
pub mod output;
pub mod reports;
pub mod series;
pub mod translations;
pub mod types;
pub mod util;

pub use error::{ReportError, Result};
pub use index::{Selection, YearIndex};
pub use translations::Translator;

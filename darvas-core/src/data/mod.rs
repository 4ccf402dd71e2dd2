//! Price sources, roster loading and series validation.

pub mod circuit_breaker;
pub mod csv_dir;
pub mod provider;
pub mod symbols;
pub mod synthetic;
pub mod validate;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_dir::CsvDirProvider;
pub use provider::{
    DataError, DataProvider, DataSource, FetchResult, LastCloseQuotes, NoQuotes, QuoteSource,
    RawBar, StaticQuotes,
};
pub use symbols::{load_symbol_list, parse_symbol_list, DEFAULT_SYMBOL_COLUMN};
pub use synthetic::{generate_synthetic_bars, SyntheticProvider};
pub use validate::validate_series;
pub use yahoo::{YahooProvider, YahooSettings};

//! City population: the historical wide table with interpolation, the current
//! area table with multi-pass matching, and birth-date routing between them.

pub mod areas;
pub mod index;
pub mod matching;
pub mod names;
pub mod resolver;

pub use areas::{AreaRecord, AreaTable};
pub use index::{population_in_year, PopulationIndex, YearSeries};
pub use matching::{find_area, AreaMatch};
pub use names::PlaceQuery;
pub use resolver::{
    CurrentPopulationLookup, CurrentResolver, HistoricalResolver, PopulationResolver, Route,
    CURRENT_FALLBACK_YEAR, HISTORICAL_CUTOFF_YEAR,
};

/// Shown when a place cannot be matched. Not finding a place is an expected
/// answer, so callers show this instead of a generic error.
pub const NOT_FOUND_MESSAGE: &str = "records indicate this city/state does not exist, \
was not incorporated at the date of birth, or the spelling is incorrect";

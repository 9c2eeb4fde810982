//! "Today's facts": canonical fields, the alias table, static defaults and the
//! fallback-chain resolver.

pub mod defaults;
pub mod fields;
pub mod record;
pub mod resolver;
pub mod table;

pub use defaults::{default_record, PRESIDENT, VICE_PRESIDENT};
pub use fields::Field;
pub use record::SnapshotRecord;
pub use resolver::SnapshotResolver;
pub use table::{map_table, DatedSnapshots, Orientation};

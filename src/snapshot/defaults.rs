use super::fields::Field;
use super::record::SnapshotRecord;

/// Always overrides whatever the sheet publishes.
pub const PRESIDENT: &str = "Donald J. Trump";
pub const VICE_PRESIDENT: &str = "JD Vance";

/// Last-resort values for every canonical field except the metals, which are
/// never given a made-up price.
const DEFAULTS: &[(Field, &str)] = &[
    (Field::GallonOfGasoline, "$3.15"),
    (Field::MinimumWage, "$7.25"),
    (Field::LoafOfBread, "$2.00"),
    (Field::DozenEggs, "$3.00"),
    (Field::GallonOfMilk, "$4.00"),
    (Field::DowJonesClose, "42,000"),
    (Field::NumberOneSong, "Unavailable"),
    (Field::NumberOneMovie, "Unavailable"),
    (Field::WonLastSuperbowl, "Philadelphia Eagles"),
    (Field::WonLastWorldSeries, "Los Angeles Dodgers"),
    (Field::UsPopulation, "340,000,000"),
    (Field::WorldPopulation, "8,200,000,000"),
    (Field::President, PRESIDENT),
    (Field::VicePresident, VICE_PRESIDENT),
];

/// The static default record, without `GOLD OZ`/`SILVER OZ`.
pub fn default_record() -> SnapshotRecord {
    let mut rec = SnapshotRecord::new();
    for (field, value) in DEFAULTS {
        rec.set(*field, *value);
    }
    rec
}

/// Stamp the compiled-in office holders over whatever is there.
pub fn apply_office_holders(rec: &mut SnapshotRecord) {
    rec.set(Field::President, PRESIDENT);
    rec.set(Field::VicePresident, VICE_PRESIDENT);
}

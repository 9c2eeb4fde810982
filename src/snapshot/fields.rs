use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// The closed set of snapshot keys the rest of the app understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    GallonOfGasoline,
    MinimumWage,
    LoafOfBread,
    DozenEggs,
    GallonOfMilk,
    GoldOz,
    SilverOz,
    DowJonesClose,
    NumberOneSong,
    NumberOneMovie,
    WonLastSuperbowl,
    WonLastWorldSeries,
    UsPopulation,
    WorldPopulation,
    President,
    VicePresident,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::GallonOfGasoline,
        Field::MinimumWage,
        Field::LoafOfBread,
        Field::DozenEggs,
        Field::GallonOfMilk,
        Field::GoldOz,
        Field::SilverOz,
        Field::DowJonesClose,
        Field::NumberOneSong,
        Field::NumberOneMovie,
        Field::WonLastSuperbowl,
        Field::WonLastWorldSeries,
        Field::UsPopulation,
        Field::WorldPopulation,
        Field::President,
        Field::VicePresident,
    ];

    pub const METALS: [Field; 2] = [Field::GoldOz, Field::SilverOz];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::GallonOfGasoline => "GALLON OF GASOLINE",
            Field::MinimumWage => "MINIMUM WAGE",
            Field::LoafOfBread => "LOAF OF BREAD",
            Field::DozenEggs => "DOZEN EGGS",
            Field::GallonOfMilk => "GALLON OF MILK",
            Field::GoldOz => "GOLD OZ",
            Field::SilverOz => "SILVER OZ",
            Field::DowJonesClose => "DOW JONES CLOSE",
            Field::NumberOneSong => "#1 SONG",
            Field::NumberOneMovie => "#1 MOVIE",
            Field::WonLastSuperbowl => "WON LAST SUPERBOWL",
            Field::WonLastWorldSeries => "WON LAST WORLD SERIES",
            Field::UsPopulation => "US POPULATION",
            Field::WorldPopulation => "WORLD POPULATION",
            Field::President => "PRESIDENT",
            Field::VicePresident => "VICE PRESIDENT",
        }
    }

    /// Exact canonical spelling, ignoring case and surrounding whitespace.
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Field::ALL.iter().copied().find(|f| f.as_str() == upper)
    }

    /// Canonical field for a raw spreadsheet header, via the exact spelling or
    /// the alias table.
    pub fn resolve_alias(raw: &str) -> Option<Self> {
        let upper = collapse_whitespace(&raw.trim().to_uppercase());
        Field::from_str(&upper).or_else(|| ALIASES.get(upper.as_str()).copied())
    }

    pub fn is_metal(&self) -> bool {
        Field::METALS.contains(self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

static ALIASES: Lazy<HashMap<&'static str, Field>> = Lazy::new(|| {
    use Field::*;
    let table: &[(&str, Field)] = &[
        ("GAS", GallonOfGasoline),
        ("GAS (GALLON)", GallonOfGasoline),
        ("GASOLINE", GallonOfGasoline),
        ("GAS PRICE", GallonOfGasoline),
        ("GALLON OF GAS", GallonOfGasoline),
        ("MIN WAGE", MinimumWage),
        ("FEDERAL MINIMUM WAGE", MinimumWage),
        ("MINIMUM WAGE (HOURLY)", MinimumWage),
        ("BREAD", LoafOfBread),
        ("LOAF OF WHITE BREAD", LoafOfBread),
        ("BREAD (LOAF)", LoafOfBread),
        ("EGGS", DozenEggs),
        ("EGGS (DOZEN)", DozenEggs),
        ("DOZEN OF EGGS", DozenEggs),
        ("MILK", GallonOfMilk),
        ("MILK (GALLON)", GallonOfMilk),
        ("GOLD", GoldOz),
        ("GOLD PRICE", GoldOz),
        ("TROY OUNCE OF GOLD", GoldOz),
        ("GOLD (OZ)", GoldOz),
        ("GOLD OUNCE", GoldOz),
        ("SILVER", SilverOz),
        ("SILVER PRICE", SilverOz),
        ("TROY OUNCE OF SILVER", SilverOz),
        ("SILVER (OZ)", SilverOz),
        ("SILVER OUNCE", SilverOz),
        ("DOW", DowJonesClose),
        ("DOW JONES", DowJonesClose),
        ("DJIA", DowJonesClose),
        ("DOW CLOSE", DowJonesClose),
        ("TOP SONG", NumberOneSong),
        ("NUMBER ONE SONG", NumberOneSong),
        ("#1 SONG ON BILLBOARD", NumberOneSong),
        ("NO. 1 SONG", NumberOneSong),
        ("TOP MOVIE", NumberOneMovie),
        ("NUMBER ONE MOVIE", NumberOneMovie),
        ("BOX OFFICE #1", NumberOneMovie),
        ("NO. 1 MOVIE", NumberOneMovie),
        ("SUPER BOWL CHAMPION", WonLastSuperbowl),
        ("SUPERBOWL WINNER", WonLastSuperbowl),
        ("SUPER BOWL WINNER", WonLastSuperbowl),
        ("WON LAST SUPER BOWL", WonLastSuperbowl),
        ("WORLD SERIES CHAMPION", WonLastWorldSeries),
        ("WORLD SERIES WINNER", WonLastWorldSeries),
        ("U.S. POPULATION", UsPopulation),
        ("USA POPULATION", UsPopulation),
        ("POPULATION (US)", UsPopulation),
        ("GLOBAL POPULATION", WorldPopulation),
        ("POPULATION (WORLD)", WorldPopulation),
        ("POTUS", President),
        ("US PRESIDENT", President),
        ("VP", VicePresident),
        ("VPOTUS", VicePresident),
        ("US VICE PRESIDENT", VicePresident),
    ];
    table.iter().copied().collect()
});

//! Place-name normalisation: census suffixes, state names, candidate keys.

/// `(abbreviation, full name)`, lower-case.
const STATES: &[(&str, &str)] = &[
    ("al", "alabama"),
    ("ak", "alaska"),
    ("az", "arizona"),
    ("ar", "arkansas"),
    ("ca", "california"),
    ("co", "colorado"),
    ("ct", "connecticut"),
    ("de", "delaware"),
    ("dc", "district of columbia"),
    ("fl", "florida"),
    ("ga", "georgia"),
    ("hi", "hawaii"),
    ("id", "idaho"),
    ("il", "illinois"),
    ("in", "indiana"),
    ("ia", "iowa"),
    ("ks", "kansas"),
    ("ky", "kentucky"),
    ("la", "louisiana"),
    ("me", "maine"),
    ("md", "maryland"),
    ("ma", "massachusetts"),
    ("mi", "michigan"),
    ("mn", "minnesota"),
    ("ms", "mississippi"),
    ("mo", "missouri"),
    ("mt", "montana"),
    ("ne", "nebraska"),
    ("nv", "nevada"),
    ("nh", "new hampshire"),
    ("nj", "new jersey"),
    ("nm", "new mexico"),
    ("ny", "new york"),
    ("nc", "north carolina"),
    ("nd", "north dakota"),
    ("oh", "ohio"),
    ("ok", "oklahoma"),
    ("or", "oregon"),
    ("pa", "pennsylvania"),
    ("pr", "puerto rico"),
    ("ri", "rhode island"),
    ("sc", "south carolina"),
    ("sd", "south dakota"),
    ("tn", "tennessee"),
    ("tx", "texas"),
    ("ut", "utah"),
    ("vt", "vermont"),
    ("va", "virginia"),
    ("wa", "washington"),
    ("wv", "west virginia"),
    ("wi", "wisconsin"),
    ("wy", "wyoming"),
];

/// Administrative designations census tables append to place names,
/// longest first so multi-word forms win.
const CENSUS_SUFFIXES: &[&str] = &[
    "metropolitan government (balance)",
    "consolidated government (balance)",
    "unified government (balance)",
    "metro government (balance)",
    "city and borough",
    "urban county",
    "metro township",
    "municipality",
    "corporation",
    "plantation",
    "township",
    "borough",
    "village",
    "(balance)",
    "city",
    "town",
    "cdp",
];

/// Full lower-case state name for a 2–3 letter abbreviation (`"MO"`, `"D.C."`).
pub fn expand_state(abbr: &str) -> Option<&'static str> {
    let key: String = abbr
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .collect::<String>()
        .to_lowercase();
    if !(2..=3).contains(&key.len()) {
        return None;
    }
    STATES.iter().find(|(a, _)| *a == key).map(|(_, full)| *full)
}

/// Abbreviation for a full state name.
pub fn abbreviate_state(full: &str) -> Option<&'static str> {
    let key = collapse(&full.trim().to_lowercase());
    STATES.iter().find(|(_, f)| *f == key).map(|(a, _)| *a)
}

/// Full state name whether given an abbreviation or the name itself.
pub fn full_state_name(state: &str) -> Option<&'static str> {
    expand_state(state).or_else(|| {
        let key = collapse(&state.trim().to_lowercase());
        STATES.iter().find(|(_, f)| *f == key).map(|(_, f)| *f)
    })
}

/// Strip one trailing census designation from a city name (`"Kansas City city"`
/// → `"Kansas City"`). Matches whole trailing words only and never strips the
/// entire name.
///
/// A trailing "city" is part of the name ("Carson City", "Oklahoma City")
/// unless it is doubled or written in census casing after a capitalised name
/// ("Tulsa city"). Pass the name before lower-casing it.
pub fn strip_census_suffix(city: &str) -> String {
    let city = city.trim();
    let lower = city.to_lowercase();
    for suffix in CENSUS_SUFFIXES {
        if lower.len() <= suffix.len() || !lower.ends_with(suffix) {
            continue;
        }
        let head_len = lower.len() - suffix.len();
        if !lower[..head_len].ends_with(' ') {
            continue;
        }
        // lower-casing can change byte lengths outside ASCII
        let head = if lower.len() != city.len() || !city.is_char_boundary(head_len) {
            lower[..head_len].trim_end()
        } else {
            city[..head_len].trim_end()
        };
        if *suffix == "city" && !city_is_designation(city, head) {
            return city.to_string();
        }
        return head.to_string();
    }
    city.to_string()
}

fn city_is_designation(city: &str, head: &str) -> bool {
    let head_lower = head.to_lowercase();
    if head_lower == "city" || head_lower.ends_with(" city") {
        return true;
    }
    city.ends_with(" city") && head.chars().any(char::is_uppercase)
}

/// Strip a census suffix from the city segment of a `"city, state"` area.
pub fn strip_area_suffix(area: &str) -> String {
    match area.split_once(',') {
        Some((city, state)) => format!("{}, {}", strip_census_suffix(city), state.trim()),
        None => strip_census_suffix(area),
    }
}

/// Lower-case, punctuation to spaces, whitespace collapsed.
pub fn normalize_text(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();
    collapse(&mapped)
}

/// Canonical `"city, state"` form of a stored area: leading `.` removed,
/// lower-cased, single space after the first comma.
pub fn normalize_area(raw: &str) -> String {
    let s = collapse(&raw.trim().trim_start_matches('.').to_lowercase());
    match s.split_once(',') {
        Some((city, state)) => format!("{}, {}", city.trim(), state.trim()),
        None => s,
    }
}

/// `haystack` contains `needle` as a run of whole words. Both must already be
/// [`normalize_text`]-ed.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

/// Lower-cased `(city, state)` split on the first comma; no comma means an
/// empty state.
pub fn split_place(place: &str) -> (String, String) {
    let (city, state) = split_raw(place);
    (collapse(&city.to_lowercase()), collapse(&state.to_lowercase()))
}

fn split_raw(place: &str) -> (&str, &str) {
    let place = place.trim();
    match place.split_once(',') {
        Some((c, s)) => (c.trim(), s.trim()),
        None => (place, ""),
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A user-entered place, split and normalised for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    /// Lower-case city segment as typed.
    pub city: String,
    /// City with its census suffix removed (equal to `city` when none).
    pub city_stripped: String,
    /// Lower-case state segment as typed; empty when the input had no comma.
    pub state: String,
    pub state_full: Option<&'static str>,
    pub state_abbr: Option<&'static str>,
}

impl PlaceQuery {
    pub fn parse(place: &str) -> Self {
        let (city, state) = split_place(place);
        let state_full = full_state_name(&state);
        let state_abbr = state_full.and_then(abbreviate_state);
        let raw_city = collapse(split_raw(place).0);
        Self {
            city_stripped: strip_census_suffix(&raw_city).to_lowercase(),
            city,
            state,
            state_full,
            state_abbr,
        }
    }

    pub fn has_state(&self) -> bool {
        !self.state.is_empty()
    }

    /// Full state name when known, else the state as typed.
    pub fn state_name(&self) -> &str {
        match self.state_full {
            Some(full) => full,
            None => &self.state,
        }
    }

    /// Lookup keys in priority order: raw, suffix-stripped, state expanded,
    /// state abbreviated; each with and without a space after the comma.
    pub fn candidate_keys(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |key: String| {
            if !key.is_empty() && !out.contains(&key) {
                out.push(key);
            }
        };

        if !self.has_state() {
            push(self.city.clone());
            push(self.city_stripped.clone());
            return out;
        }

        let cities = [self.city.as_str(), self.city_stripped.as_str()];
        let mut states = vec![self.state.as_str()];
        if let Some(full) = self.state_full {
            states.push(full);
        }
        if let Some(abbr) = self.state_abbr {
            states.push(abbr);
        }

        for state in states {
            for city in cities {
                push(format!("{}, {}", city, state));
                push(format!("{},{}", city, state));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_tables_work_both_ways() {
        assert_eq!(expand_state("MO"), Some("missouri"));
        assert_eq!(expand_state(" d.c. "), Some("district of columbia"));
        assert_eq!(expand_state("ZZ"), None);
        assert_eq!(expand_state("Missouri"), None);
        assert_eq!(abbreviate_state("New  York"), Some("ny"));
        assert_eq!(full_state_name("Texas"), Some("texas"));
        assert_eq!(full_state_name("tx"), Some("texas"));
        assert_eq!(full_state_name("Atlantis"), None);
    }

    #[test]
    fn census_suffixes_strip_whole_trailing_words() {
        assert_eq!(strip_census_suffix("Kansas City city"), "Kansas City");
        assert_eq!(strip_census_suffix("Juneau city and borough"), "Juneau");
        assert_eq!(
            strip_census_suffix("Nashville-Davidson metropolitan government (balance)"),
            "Nashville-Davidson"
        );
        assert_eq!(strip_census_suffix("Paradise CDP"), "Paradise");
        assert_eq!(strip_census_suffix("Boroughtown"), "Boroughtown");
        assert_eq!(strip_census_suffix("Velocity"), "Velocity");
        assert_eq!(strip_census_suffix("City"), "City");
        assert_eq!(strip_census_suffix("Plains"), "Plains");
    }

    #[test]
    fn city_in_a_proper_name_is_kept() {
        assert_eq!(strip_census_suffix("Carson City"), "Carson City");
        assert_eq!(strip_census_suffix("Oklahoma City"), "Oklahoma City");
        assert_eq!(strip_census_suffix("Oklahoma City city"), "Oklahoma City");
        assert_eq!(strip_census_suffix("KANSAS CITY CITY"), "KANSAS CITY");
        assert_eq!(strip_census_suffix("Tulsa city"), "Tulsa");
        // all lower-case is ambiguous; keep it whole
        assert_eq!(strip_census_suffix("tulsa city"), "tulsa city");
        assert_eq!(strip_census_suffix("Boise Town"), "Boise");

        let q = PlaceQuery::parse("Carson City, NV");
        assert_eq!(q.city_stripped, "carson city");
        let q = PlaceQuery::parse("Tulsa city, OK");
        assert_eq!(q.city_stripped, "tulsa");
    }

    #[test]
    fn areas_normalise_to_city_comma_state() {
        assert_eq!(
            normalize_area(".Kansas City city,  Missouri"),
            "kansas city city, missouri"
        );
        assert_eq!(normalize_area("United States"), "united states");
        assert_eq!(
            strip_area_suffix("kansas city city, missouri"),
            "kansas city, missouri"
        );
    }

    #[test]
    fn normalize_text_drops_punctuation() {
        assert_eq!(normalize_text("St. Louis,  MO"), "st louis mo");
        assert_eq!(normalize_text("Winston-Salem"), "winston salem");
        assert!(contains_words("kansas city city missouri", "kansas city"));
        assert!(!contains_words("new york city new york", "york city x"));
        assert!(!contains_words("newark new jersey", "new ark"));
    }

    #[test]
    fn candidate_keys_cover_every_spelling_in_order() {
        let q = PlaceQuery::parse("Kansas City city, MO");
        assert_eq!(q.city, "kansas city city");
        assert_eq!(q.city_stripped, "kansas city");
        assert_eq!(q.state_full, Some("missouri"));
        let keys = q.candidate_keys();
        assert_eq!(
            &keys[..4],
            &[
                "kansas city city, mo",
                "kansas city city,mo",
                "kansas city, mo",
                "kansas city,mo",
            ]
        );
        assert!(keys.contains(&"kansas city, missouri".to_string()));
        assert!(keys.contains(&"kansas city city,missouri".to_string()));
        // abbreviation entered → abbreviation form already present once
        assert_eq!(keys.iter().filter(|k| *k == "kansas city, mo").count(), 1);
    }

    #[test]
    fn full_state_input_also_yields_abbreviation() {
        let keys = PlaceQuery::parse("Tulsa, Oklahoma").candidate_keys();
        assert_eq!(keys, vec!["tulsa, oklahoma", "tulsa,oklahoma", "tulsa, ok", "tulsa,ok"]);
    }

    #[test]
    fn place_splits_on_first_comma_only() {
        assert_eq!(
            split_place(" Washington,  D.C., USA "),
            ("washington".to_string(), "d.c., usa".to_string())
        );
        assert_eq!(split_place("Boise"), ("boise".to_string(), String::new()));
    }

    #[test]
    fn bare_city_has_no_state() {
        let q = PlaceQuery::parse("Boise");
        assert!(!q.has_state());
        assert_eq!(q.candidate_keys(), vec!["boise"]);
    }
}

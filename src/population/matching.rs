//! Deterministic multi-pass place matching against the current area table.
//!
//! Passes run strictest first and stop at the first hit. Passes 3 to 6 need a
//! state in the query and compare it to the state segment of each area (the
//! text after its first comma) by equality, so "virginia" never matches
//! "west virginia". A bare city name can only match exactly.

use tracing::{debug, trace};

use super::areas::{AreaRecord, AreaTable};
use super::names::{contains_words, normalize_text, PlaceQuery};

/// Shortest city fragment pass 5 will accept as a substring.
const MIN_PARTIAL_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaMatch<'a> {
    pub record: &'a AreaRecord,
    /// 1-based pass that produced the match.
    pub pass: u8,
}

/// Query text pre-normalised once for the fuzzy passes.
struct Normalised {
    city: String,
    city_stripped: String,
    state_name: String,
    state_abbr: Option<&'static str>,
}

impl Normalised {
    fn new(q: &PlaceQuery) -> Self {
        Self {
            city: normalize_text(&q.city),
            city_stripped: normalize_text(&q.city_stripped),
            state_name: normalize_text(q.state_name()),
            state_abbr: q.state_abbr,
        }
    }

    /// `state` is a normalised state segment.
    fn state_matches(&self, state: &str) -> bool {
        state == self.state_name || self.state_abbr == Some(state)
    }
}

/// A stored area split into normalised city and state segments.
struct Segments<'a> {
    record: &'a AreaRecord,
    city: String,
    state: String,
}

impl<'a> Segments<'a> {
    fn new(record: &'a AreaRecord) -> Self {
        let (city, state) = record.area.split_once(',').unwrap_or((record.area.as_str(), ""));
        Self {
            record,
            city: normalize_text(city),
            state: normalize_text(state),
        }
    }
}

pub fn find_area<'a>(table: &'a AreaTable, query: &PlaceQuery) -> Option<AreaMatch<'a>> {
    let candidates = query.candidate_keys();
    trace!(?candidates, "matching candidates");

    let hit = |record: &'a AreaRecord, pass: u8| {
        debug!(pass, area = %record.area, population = record.population, "area matched");
        Some(AreaMatch { record, pass })
    };

    // ─── 1) exact candidate keys ─────────────────────────────────────────
    if let Some(rec) = candidates.iter().find_map(|k| table.get_exact(k)) {
        return hit(rec, 1);
    }

    // ─── 2) candidates against suffix-stripped stored areas ──────────────
    if let Some(rec) = candidates.iter().find_map(|k| table.get_stripped(k)) {
        return hit(rec, 2);
    }

    if !query.has_state() || query.city.is_empty() {
        debug!(place = %query.city, "no state given; fuzzy passes skipped");
        return None;
    }
    let n = Normalised::new(query);
    let in_state: Vec<Segments> = table
        .records()
        .iter()
        .map(Segments::new)
        .filter(|s| n.state_matches(&s.state))
        .collect();
    trace!(areas = in_state.len(), state = %n.state_name, "areas in the query state");

    // ─── 3) city words inside the stored city ────────────────────────────
    if let Some(s) = in_state.iter().find(|s| contains_words(&s.city, &n.city)) {
        return hit(s.record, 3);
    }

    // ─── 4) area starts with the bare city ───────────────────────────────
    let comma_prefix = format!("{},", query.city_stripped);
    let space_prefix = format!("{} ", query.city_stripped);
    if let Some(s) = in_state.iter().find(|s| {
        s.record.area.starts_with(&comma_prefix) || s.record.area.starts_with(&space_prefix)
    }) {
        return hit(s.record, 4);
    }

    // ─── 5) city segments contain one another ────────────────────────────
    if let Some(s) = in_state.iter().find(|s| {
        let (short, long) = if s.city.len() <= n.city.len() {
            (&s.city, &n.city)
        } else {
            (&n.city, &s.city)
        };
        short.len() >= MIN_PARTIAL_LEN && long.contains(short.as_str())
    }) {
        return hit(s.record, 5);
    }

    // ─── 6) suffix-stripped city words ───────────────────────────────────
    if let Some(s) = in_state.iter().find(|s| contains_words(&s.city, &n.city_stripped)) {
        return hit(s.record, 6);
    }

    debug!(place = %query.city, state = %query.state, "no area matched");
    None
}

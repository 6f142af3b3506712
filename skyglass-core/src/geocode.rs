//! Place-name formatting for city autocomplete.

use crate::model::RawPlace;

/// Minimum input length before the geocoder is consulted.
pub const MIN_QUERY_CHARS: usize = 3;

/// `"<name>, <state>, <country>"` when a state is known, else `"<name>, <country>"`.
pub fn format_place(place: &RawPlace) -> String {
    match place.state.as_deref().filter(|s| !s.is_empty()) {
        Some(state) => format!("{}, {}, {}", place.name, state, place.country),
        None => format!("{}, {}", place.name, place.country),
    }
}

/// Format every place, keeping upstream order and duplicates.
pub fn format_places(places: &[RawPlace]) -> Vec<String> {
    places.iter().map(format_place).collect()
}

pub(crate) fn long_enough(partial: &str) -> bool {
    partial.chars().count() >= MIN_QUERY_CHARS
}

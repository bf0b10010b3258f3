//! Reply templates and fragment composition

use crate::models::WeatherFact;

/// Generic clarification when no place could be extracted.
pub const NO_PLACE_CLARIFICATION: &str =
    "I don't know if this place exists. Please provide a valid location name.";

/// Clarification for length-of-stay questions without a destination.
pub const TRIP_DURATION_CLARIFICATION: &str = "Trip length is up to you! Tell me which \
destination you have in mind and I can help with the weather and the places worth seeing.";

/// Clarification for general trip-planning questions without a destination.
pub const TRIP_PLANNING_CLARIFICATION: &str =
    "I can help you plan your trip! Please tell me which city or place you want to visit.";

#[must_use]
pub fn weather_reply(fact: &WeatherFact) -> String {
    format!(
        "In {} it's currently {}°C with a chance of {}% to rain.",
        fact.place,
        fact.format_temperature(),
        fact.precipitation_probability
    )
}

#[must_use]
pub fn places_reply(place: &str, attractions: &[String]) -> String {
    if attractions.is_empty() {
        return no_attractions(place);
    }

    let listing = attractions
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("In {place} these are the places you can go:\n{listing}")
}

#[must_use]
pub fn no_attractions(place: &str) -> String {
    format!("Unable to find tourist attractions in {place}.")
}

#[must_use]
pub fn no_weather(place: &str) -> String {
    format!("Unable to fetch weather information for {place}.")
}

#[must_use]
pub fn unknown_place(place: &str) -> String {
    format!("I don't know if {place} exists. Please check the spelling or try a different location.")
}

/// Joins collaborator fragments into one reply.
///
/// With the connective requested (weather and places were both asked for
/// and both produced data) the places label is stripped at its first
/// `":\n"` and the two bodies are glued with the fixed connective.
/// Everything else joins with a blank line.
#[must_use]
pub fn compose(fragments: &[String], use_connective: bool) -> String {
    match fragments {
        [] => String::new(),
        [single] => single.clone(),
        [weather, places, ..] if use_connective => match places.split_once(":\n") {
            Some((_, listing)) => {
                format!("{weather} And these are the places you can go:\n{listing}")
            }
            None => fragments.join("\n\n"),
        },
        _ => fragments.join("\n\n"),
    }
}

//! Endpoint catalog
//!
//! The fixed, ordered list of SportMonks v3 endpoints a sweep exercises.
//! Paths are relative to the configured base URL.

use crate::models::{Category, EndpointDescriptor};

const FIXTURE_INCLUDES: &[(&str, &str)] = &[(
    "include",
    "participants,league,venue,state,scores,events.type",
)];
const LIVE_INCLUDES: &[(&str, &str)] = &[("include", "participants,league,scores,events.type")];

static CATALOG: [EndpointDescriptor; 13] = [
    // Fixtures
    EndpointDescriptor::new(
        "Today Fixtures",
        "football/fixtures/date/{today}",
        Category::Fixtures,
    )
    .with_params(FIXTURE_INCLUDES),
    EndpointDescriptor::new("Live Scores", "football/livescores", Category::Fixtures)
        .with_params(LIVE_INCLUDES),
    EndpointDescriptor::new(
        "Upcoming Fixtures",
        "football/fixtures/between/{today}/{week_ahead}",
        Category::Fixtures,
    )
    .with_params(&[("include", "participants,league"), ("per_page", "50")]),
    // Predictions
    EndpointDescriptor::new(
        "Prediction Probabilities",
        "football/predictions/probabilities",
        Category::Predictions,
    )
    .with_params(&[("include", "type,fixture")])
    .premium(),
    EndpointDescriptor::new(
        "Value Bets",
        "football/predictions/value-bets",
        Category::Predictions,
    )
    .with_params(&[("include", "type,fixture")])
    .premium(),
    EndpointDescriptor::new(
        "Fixture Predictions Today",
        "football/fixtures/date/{today}",
        Category::Predictions,
    )
    .with_params(&[("include", "participants,predictions.type")])
    .premium(),
    // Odds
    EndpointDescriptor::new("Pre-match Odds", "odds/pre-match", Category::Odds)
        .with_params(&[("include", "fixture,bookmaker,market"), ("per_page", "200")])
        .premium(),
    EndpointDescriptor::new(
        "Latest Pre-match Odds",
        "football/odds/pre-match/latest",
        Category::Odds,
    )
    .premium(),
    EndpointDescriptor::new("Markets", "odds/markets", Category::Odds),
    // Bookmakers
    EndpointDescriptor::new("Bookmakers", "odds/bookmakers", Category::Bookmakers),
    EndpointDescriptor::new(
        "Bookmaker Search",
        "odds/bookmakers/search/bet365",
        Category::Bookmakers,
    ),
    // Teams
    EndpointDescriptor::new("Teams", "football/teams", Category::Teams)
        .with_params(&[("include", "country,venue")]),
    EndpointDescriptor::new(
        "Team Search",
        "football/teams/search/arsenal",
        Category::Teams,
    ),
];

/// All endpoints, in sweep order
pub fn list_endpoints() -> &'static [EndpointDescriptor] {
    &CATALOG
}

/// Endpoints in the given categories, catalog order preserved.
/// An empty filter selects the whole catalog.
pub fn by_category(categories: &[Category]) -> Vec<EndpointDescriptor> {
    list_endpoints()
        .iter()
        .filter(|e| categories.is_empty() || categories.contains(&e.category))
        .copied()
        .collect()
}

/// Look up an endpoint by name (case-insensitive)
pub fn find(name: &str) -> Option<&'static EndpointDescriptor> {
    list_endpoints()
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}

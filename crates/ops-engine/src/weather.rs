//! Weather compatibility between a drone's rating and a mission's forecast.

use ops_domain::WeatherRating;

/// Whether a drone rated `drone_rating` may fly in `required`.
///
/// `required` is either a forecast condition (`"Rainy"`) or a rating label
/// (`"IP43"`). Unrecognised labels on either side are incompatible.
#[must_use]
pub fn can_operate(drone_rating: &str, required: &str) -> bool {
    match (WeatherRating::parse(drone_rating), WeatherRating::required_for(required)) {
        (Some(rating), Some(min)) => rating_allows(rating, min),
        _ => false,
    }
}

/// Rating order check: the drone must be at least as hardened as required.
#[must_use]
pub fn rating_allows(rating: WeatherRating, required: WeatherRating) -> bool {
    rating >= required
}

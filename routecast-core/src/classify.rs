//! Weather condition → marker style lookup.

use crate::model::WeatherStyle;

const fn style(icon_id: &'static str, color: &'static str) -> WeatherStyle {
    WeatherStyle { icon_id, color }
}

/// Style used for any condition missing from [`STYLES`].
pub const DEFAULT_STYLE: WeatherStyle = style("weather-partly-cloudy", "#90A4AE");

/// Known condition categories, matched exactly.
const STYLES: &[(&str, WeatherStyle)] = &[
    ("Clear", style("weather-sunny", "#FFB300")),
    ("Clouds", style("weather-cloudy", "#78909C")),
    ("Rain", style("weather-rainy", "#29B6F6")),
    ("Snow", style("weather-snowy", "#00B0FF")),
    ("Thunderstorm", style("weather-lightning", "#FDD835")),
    ("Drizzle", style("weather-partly-rainy", "#4FC3F7")),
    ("Mist", style("weather-fog", "#B0BEC5")),
    ("Fog", style("weather-fog", "#B0BEC5")),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherClassifier;

impl WeatherClassifier {
    pub fn classify(&self, condition: &str) -> WeatherStyle {
        STYLES
            .iter()
            .find(|(category, _)| *category == condition)
            .map(|(_, style)| *style)
            .unwrap_or(DEFAULT_STYLE)
    }
}

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::Password;
use routecast_core::{
    Config, ProviderId, RadarOverlay, RouteAnalysis, RoutePlanner, SearchRequest, SearchSession,
    WeatherMarker,
};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "routecast", version, about = "Weather along a driving route")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, "mapbox" or "openweather".
        provider: String,
    },

    /// Show weather along the driving route between two places.
    Route {
        /// Where the trip starts, e.g. "Ankara".
        origin: String,

        /// Where the trip ends, e.g. "Istanbul".
        destination: String,

        /// Avoid toll roads (also enabled by the saved preference).
        #[arg(long)]
        avoid_tolls: bool,

        /// Kilometers between weather samples.
        #[arg(long)]
        interval_km: Option<f64>,

        /// Skip samples this close to the destination.
        #[arg(long)]
        end_exclusion_km: Option<f64>,

        /// Weather lookups in flight at once.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show or toggle the live precipitation overlay.
    Radar {
        #[arg(value_enum)]
        state: Option<Toggle>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Route {
                origin,
                destination,
                avoid_tolls,
                interval_km,
                end_exclusion_km,
                concurrency,
                json,
            } => {
                let mut config = Config::load()?;
                if let Some(interval_km) = interval_km {
                    config.sampling.interval_km = interval_km;
                }
                if let Some(end_exclusion_km) = end_exclusion_km {
                    config.sampling.end_exclusion_km = end_exclusion_km;
                }
                if let Some(concurrency) = concurrency {
                    config.sampling.weather_concurrency = concurrency;
                }

                let planner =
                    RoutePlanner::from_config(&config).map_err(|e| anyhow!(e.user_message()))?;
                let request = SearchRequest::new(origin, destination)
                    .avoid_tolls(avoid_tolls || config.preferences.avoid_tolls);

                let mut session = SearchSession::new();
                planner.run(&mut session, &request).await;

                if let Some(err) = session.error() {
                    debug!(error = %err, "search failed");
                    return Err(anyhow!(err.user_message()));
                }
                let analysis = session
                    .analysis()
                    .ok_or_else(|| anyhow!("Search finished without a result"))?;

                if json {
                    let out = serde_json::to_string_pretty(analysis)
                        .context("Failed to serialize route analysis")?;
                    println!("{out}");
                } else {
                    print_analysis(analysis);
                    let radar = RadarOverlay::from_preference(
                        config.preferences.show_radar,
                        config.provider_api_key(ProviderId::OpenWeather),
                    );
                    if let Some(radar) = radar {
                        println!("\nPrecipitation radar tiles: {}", radar.url_template());
                    }
                }
                Ok(())
            }
            Command::Radar { state } => {
                let mut config = Config::load()?;
                if let Some(state) = state {
                    config.preferences.show_radar = state == Toggle::On;
                    config.save()?;
                }
                let status = if config.preferences.show_radar { "on" } else { "off" };
                println!("Precipitation radar: {status}");
                Ok(())
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("{id} API key ({}):", id.purpose()))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.upsert_provider_api_key(id, api_key.to_string());
    config.save()?;

    println!("Saved {id} API key to {}", Config::config_file_path()?.display());
    let missing = config.missing_providers();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(ProviderId::as_str).collect();
        println!("Still missing: {}", names.join(", "));
    }
    Ok(())
}

fn print_analysis(analysis: &RouteAnalysis) {
    println!(
        "{} {} -> {} {}  ({:.0} km, {} route points)",
        analysis.origin,
        analysis.start,
        analysis.destination,
        analysis.end,
        analysis.route_km,
        analysis.route.len(),
    );

    if analysis.markers.is_empty() {
        println!("No weather data available along this route.");
        return;
    }

    for (i, marker) in analysis.markers.iter().enumerate() {
        println!("{:>3}. {}", i + 1, format_marker(marker));
    }

    let dropped = analysis.samples.len() - analysis.markers.len();
    if dropped > 0 {
        println!("({dropped} sample point(s) skipped: weather unavailable)");
    }
}

fn format_marker(marker: &WeatherMarker) -> String {
    let obs = &marker.observation;
    let mut line = format!(
        "{}  {:>3}°C  {:<12} wind {:>3} km/h from {:<2}  [{} {}]",
        marker.point,
        obs.temperature_c,
        marker.condition,
        obs.wind_speed_kmh,
        compass(obs.wind_direction_deg),
        marker.style.icon_id,
        marker.style.color,
    );
    if let Some(at) = marker.observed_at {
        line.push_str(&format!("  @ {}", at.format("%H:%M UTC")));
    }
    line
}

/// Eight-point compass name for a bearing in degrees.
fn compass(deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    POINTS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use routecast_core::{GeoPoint, WeatherObservation, WeatherStyle};

    #[test]
    fn parses_route_flags() {
        let cli = Cli::try_parse_from([
            "routecast",
            "-v",
            "route",
            "Ankara",
            "Istanbul",
            "--avoid-tolls",
            "--interval-km",
            "45",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Route {
                origin,
                destination,
                avoid_tolls,
                interval_km,
                json,
                ..
            } => {
                assert_eq!(origin, "Ankara");
                assert_eq!(destination, "Istanbul");
                assert!(avoid_tolls);
                assert_eq!(interval_km, Some(45.0));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_radar_toggle() {
        let cli = Cli::try_parse_from(["routecast", "radar", "off"]).unwrap();
        assert!(matches!(cli.command, Command::Radar { state: Some(Toggle::Off) }));

        let cli = Cli::try_parse_from(["routecast", "radar"]).unwrap();
        assert!(matches!(cli.command, Command::Radar { state: None }));
    }

    #[test]
    fn route_requires_both_places() {
        assert!(Cli::try_parse_from(["routecast", "route", "Ankara"]).is_err());
    }

    #[test]
    fn compass_points() {
        assert_eq!(compass(0.0), "N");
        assert_eq!(compass(359.0), "N");
        assert_eq!(compass(90.0), "E");
        assert_eq!(compass(200.0), "S");
        assert_eq!(compass(250.0), "W");
        assert_eq!(compass(-45.0), "NW");
    }

    #[test]
    fn marker_line_has_temperature_and_style() {
        let marker = WeatherMarker {
            point: GeoPoint::new(39.92, 32.85),
            condition: "Rain".into(),
            observation: WeatherObservation {
                temperature_c: 12,
                wind_speed_kmh: 15,
                wind_direction_deg: 270.0,
            },
            style: WeatherStyle {
                icon_id: "weather-rainy",
                color: "#29B6F6",
            },
            observed_at: None,
        };

        let line = format_marker(&marker);
        assert!(line.contains("12°C"));
        assert!(line.contains("from W"));
        assert!(line.contains("weather-rainy #29B6F6"));
    }
}

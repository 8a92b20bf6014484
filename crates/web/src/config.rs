use std::{env, fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use annotation::{controller::DEFAULT_SNAP_RADIUS_M, AcceptanceMode};
use overpass::OverpassConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_STATIC_DIR: &str = "./resources/www/";
pub const DEFAULT_VIEW_IDLE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind: SocketAddr,
    pub static_dir: String,
    pub default_mode: AcceptanceMode,
    pub snap_radius_m: f64,
    pub http_trace: bool,
    /// Views without requests for this long are closed.
    pub view_idle: Duration,
    pub overpass: OverpassConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            static_dir: DEFAULT_STATIC_DIR.to_owned(),
            default_mode: AcceptanceMode::RoadSnap,
            snap_radius_m: DEFAULT_SNAP_RADIUS_M,
            http_trace: false,
            view_idle: DEFAULT_VIEW_IDLE,
            overpass: OverpassConfig::default(),
        }
    }
}

/// Reads `key` and parses it, falling back to `default` if the variable is
/// missing or unusable.
fn var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|why| {
            log::warn!("Ignoring {key}='{value}': {why}");
            default
        }),
        Err(_) => default,
    }
}

impl WebConfig {
    /// Logging has to be set up before the rest of the configuration is read.
    pub fn http_trace_from_env() -> bool {
        env::var("ANNOTATOR_HTTP_TRACE").is_ok()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut snap_radius_m = var_or("ANNOTATOR_SNAP_RADIUS_M", defaults.snap_radius_m);
        if !snap_radius_m.is_finite() || snap_radius_m <= 0.0 {
            log::warn!(
                "ANNOTATOR_SNAP_RADIUS_M must be positive, using {}m.",
                DEFAULT_SNAP_RADIUS_M
            );
            snap_radius_m = DEFAULT_SNAP_RADIUS_M;
        }

        let view_idle = match var_or("ANNOTATOR_VIEW_IDLE_SECS", defaults.view_idle.as_secs()) {
            0 => {
                log::warn!("ANNOTATOR_VIEW_IDLE_SECS must be positive, using the default.");
                DEFAULT_VIEW_IDLE
            }
            secs => Duration::from_secs(secs),
        };

        Self {
            bind: var_or("ANNOTATOR_BIND", defaults.bind),
            static_dir: env::var("ANNOTATOR_STATIC_DIR").unwrap_or(defaults.static_dir),
            default_mode: var_or("ANNOTATOR_MODE", defaults.default_mode),
            snap_radius_m,
            http_trace: Self::http_trace_from_env(),
            view_idle,
            overpass: OverpassConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WebConfig::default();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.default_mode, AcceptanceMode::RoadSnap);
        assert_eq!(config.snap_radius_m, DEFAULT_SNAP_RADIUS_M);
        assert_eq!(config.view_idle, Duration::from_secs(1800));
    }

    #[test]
    fn unparsable_values_fall_back() {
        assert_eq!(var_or("ANNOTATOR_TEST_UNSET_VARIABLE", 7u16), 7);
        env::set_var("ANNOTATOR_TEST_BAD_MODE", "teleport");
        assert_eq!(
            var_or("ANNOTATOR_TEST_BAD_MODE", AcceptanceMode::FreeDraw),
            AcceptanceMode::FreeDraw
        );
        env::set_var("ANNOTATOR_TEST_GOOD_MODE", "road-snap");
        assert_eq!(
            var_or("ANNOTATOR_TEST_GOOD_MODE", AcceptanceMode::FreeDraw),
            AcceptanceMode::RoadSnap
        );
    }
}

use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::{config_error, Error},
    external::google_maps::{GoogleMapsConfig, DEFAULT_GEOCODING_API_BASE, DEFAULT_ROUTES_API_BASE},
};

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub google_maps: GoogleMapsConfig,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub map_dir: PathBuf,
    pub map_retention: Duration,
}

impl Config {
    /// Reads the environment, after loading `.env` if one is present.
    pub fn from_env() -> Result<Self, Error> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::info!("loaded environment from {}", path.display());
        }

        let google_maps = GoogleMapsConfig {
            api_key: env::var("GOOGLE_MAPS_API_KEY")?,
            geocoding_api_base: try_load("GOOGLE_GEOCODING_API_BASE", DEFAULT_GEOCODING_API_BASE)?,
            routes_api_base: try_load("GOOGLE_ROUTES_API_BASE", DEFAULT_ROUTES_API_BASE)?,
            timeout: Duration::from_secs(try_load("UPSTREAM_TIMEOUT_SECS", "10")?),
        };

        Ok(Self {
            listen_addr: try_load("LISTEN_ADDR", "127.0.0.1:3000")?,
            google_maps,
            database_url: env::var("DATABASE_URL").ok(),
            database_max_connections: try_load("DATABASE_MAX_CONNECTIONS", "5")?,
            map_dir: try_load("MAP_DIR", "maps")?,
            map_retention: Duration::from_secs(try_load("MAP_RETENTION_SECS", "3600")?),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        tracing::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    value.parse().map_err(|err| config_error(key, err))
}

#[test]
fn unset_keys_fall_back_to_defaults() {
    let addr: SocketAddr = try_load("WAYFARER_TEST_UNSET_ADDR", "127.0.0.1:3000").unwrap();
    assert_eq!(addr.port(), 3000);

    let secs: u64 = try_load("WAYFARER_TEST_UNSET_SECS", "10").unwrap();
    assert_eq!(secs, 10);
}

#[test]
fn unparsable_values_are_config_errors() {
    let err = try_load::<u32>("WAYFARER_TEST_UNSET_BAD", "five").unwrap_err();

    assert_eq!(err.code, 9);
    assert!(err.message.contains("WAYFARER_TEST_UNSET_BAD"));
}

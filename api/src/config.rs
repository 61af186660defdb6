use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_CATALOG_YAML: &str = include_str!("../catalog.yaml");

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./rooms.db?mode=rwc";

/// Limits and defaults applied while normalizing search requests
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub default_limit: u32,
    pub max_limit: u32,
    pub default_radius_km: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            default_radius_km: 10.0,
        }
    }
}

/// Platform lookup tables, loaded once at startup and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl Catalog {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).context("Invalid catalog YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_yaml(&yaml)
    }

    pub fn builtin() -> Self {
        Self::from_yaml(DEFAULT_CATALOG_YAML).unwrap_or_else(|e| {
            tracing::error!("Embedded catalog is invalid: {:#}", e);
            Self {
                cities: Vec::new(),
                amenities: Vec::new(),
            }
        })
    }

    /// Catalog spelling of an amenity tag, or the trimmed tag when it is not in the vocabulary
    pub fn canonical_amenity(&self, tag: &str) -> String {
        let tag = tag.trim();
        self.amenities
            .iter()
            .find(|known| known.eq_ignore_ascii_case(tag))
            .cloned()
            .unwrap_or_else(|| tag.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub environment: String,
    pub search: SearchSettings,
    pub catalog: Catalog,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = SearchSettings::default();
        let max_limit = env_parse("SEARCH_MAX_LIMIT", defaults.max_limit).max(1);
        let search = SearchSettings {
            default_limit: env_parse("SEARCH_DEFAULT_LIMIT", defaults.default_limit)
                .clamp(1, max_limit),
            max_limit,
            default_radius_km: positive_or(
                env_parse("SEARCH_DEFAULT_RADIUS_KM", defaults.default_radius_km),
                defaults.default_radius_km,
            ),
        };

        let catalog = match env::var("CATALOG_PATH") {
            Ok(path) if !path.trim().is_empty() => {
                let catalog = Catalog::load(Path::new(path.trim()))?;
                tracing::info!(
                    "Loaded catalog from {} ({} cities, {} amenities)",
                    path,
                    catalog.cities.len(),
                    catalog.amenities.len()
                );
                catalog
            }
            _ => Catalog::builtin(),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            port: env_parse("PORT", 8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            search,
            catalog,
        })
    }
}

fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(
                "Ignoring invalid {}={:?}, using default {}",
                name,
                raw,
                default
            );
            default
        }),
        Err(_) => default,
    }
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

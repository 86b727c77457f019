use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vitrine_core::recommendations::{
    DiversitySampler, Placement, PlacementSpec, RankingEngine, RecommendationOrchestrator,
    RecommendationService, DEFAULT_CACHE_CAPACITY, DEFAULT_PAGE_SIZE, DEFAULT_PER_CATEGORY_CAP,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppConfig {
    pub recommendations: RecommendationConfig,
    pub placements: PlacementConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationConfig {
    pub per_category_cap: usize,
    pub cache_capacity: usize,
    pub default_page_size: usize,
    /// Fixed seed for the diversity shuffle; unset means a fresh shuffle per request.
    pub shuffle_seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacementConfig {
    pub similar_items_limit: usize,
    pub frequently_bought_together_limit: usize,
    pub checkout_upsell_limit: usize,
    pub you_might_like_limit: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub per_category_cap: Option<usize>,
    pub default_page_size: Option<usize>,
    pub shuffle_seed: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recommendations: RecommendationConfig {
                per_category_cap: DEFAULT_PER_CATEGORY_CAP,
                cache_capacity: DEFAULT_CACHE_CAPACITY,
                default_page_size: DEFAULT_PAGE_SIZE,
                shuffle_seed: None,
            },
            placements: PlacementConfig {
                similar_items_limit: 12,
                frequently_bought_together_limit: 8,
                checkout_upsell_limit: 6,
                you_might_like_limit: 12,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl RecommendationConfig {
    /// Service wired with the configured category cap and cache capacity.
    pub fn build_service(&self) -> RecommendationService {
        let orchestrator = RecommendationOrchestrator::new(
            RankingEngine::default(),
            DiversitySampler::new(self.per_category_cap),
        );
        RecommendationService::new(orchestrator, self.cache_capacity)
    }
}

impl PlacementConfig {
    pub fn limit_for(&self, placement: Placement) -> usize {
        match placement {
            Placement::SimilarItems => self.similar_items_limit,
            Placement::FrequentlyBoughtTogether => self.frequently_bought_together_limit,
            Placement::CheckoutUpsell => self.checkout_upsell_limit,
            Placement::YouMightLike => self.you_might_like_limit,
        }
    }

    /// Specs for the given placements with their configured limits and default strategies.
    pub fn specs(&self, placements: &[Placement]) -> Vec<PlacementSpec> {
        placements
            .iter()
            .map(|placement| PlacementSpec::new(*placement, self.limit_for(*placement)))
            .collect()
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("vitrine.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(recommendations) = patch.recommendations {
            if let Some(per_category_cap) = recommendations.per_category_cap {
                self.recommendations.per_category_cap = per_category_cap;
            }
            if let Some(cache_capacity) = recommendations.cache_capacity {
                self.recommendations.cache_capacity = cache_capacity;
            }
            if let Some(default_page_size) = recommendations.default_page_size {
                self.recommendations.default_page_size = default_page_size;
            }
            if let Some(shuffle_seed) = recommendations.shuffle_seed {
                self.recommendations.shuffle_seed = Some(shuffle_seed);
            }
        }

        if let Some(placements) = patch.placements {
            if let Some(limit) = placements.similar_items_limit {
                self.placements.similar_items_limit = limit;
            }
            if let Some(limit) = placements.frequently_bought_together_limit {
                self.placements.frequently_bought_together_limit = limit;
            }
            if let Some(limit) = placements.checkout_upsell_limit {
                self.placements.checkout_upsell_limit = limit;
            }
            if let Some(limit) = placements.you_might_like_limit {
                self.placements.you_might_like_limit = limit;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("VITRINE_RECOMMENDATIONS_PER_CATEGORY_CAP") {
            self.recommendations.per_category_cap =
                parse_usize("VITRINE_RECOMMENDATIONS_PER_CATEGORY_CAP", &value)?;
        }
        if let Some(value) = read_env("VITRINE_RECOMMENDATIONS_CACHE_CAPACITY") {
            self.recommendations.cache_capacity =
                parse_usize("VITRINE_RECOMMENDATIONS_CACHE_CAPACITY", &value)?;
        }
        if let Some(value) = read_env("VITRINE_RECOMMENDATIONS_DEFAULT_PAGE_SIZE") {
            self.recommendations.default_page_size =
                parse_usize("VITRINE_RECOMMENDATIONS_DEFAULT_PAGE_SIZE", &value)?;
        }
        if let Some(value) = read_env("VITRINE_RECOMMENDATIONS_SHUFFLE_SEED") {
            self.recommendations.shuffle_seed =
                Some(parse_u64("VITRINE_RECOMMENDATIONS_SHUFFLE_SEED", &value)?);
        }

        if let Some(value) = read_env("VITRINE_PLACEMENTS_SIMILAR_ITEMS_LIMIT") {
            self.placements.similar_items_limit =
                parse_usize("VITRINE_PLACEMENTS_SIMILAR_ITEMS_LIMIT", &value)?;
        }
        if let Some(value) = read_env("VITRINE_PLACEMENTS_FREQUENTLY_BOUGHT_TOGETHER_LIMIT") {
            self.placements.frequently_bought_together_limit =
                parse_usize("VITRINE_PLACEMENTS_FREQUENTLY_BOUGHT_TOGETHER_LIMIT", &value)?;
        }
        if let Some(value) = read_env("VITRINE_PLACEMENTS_CHECKOUT_UPSELL_LIMIT") {
            self.placements.checkout_upsell_limit =
                parse_usize("VITRINE_PLACEMENTS_CHECKOUT_UPSELL_LIMIT", &value)?;
        }
        if let Some(value) = read_env("VITRINE_PLACEMENTS_YOU_MIGHT_LIKE_LIMIT") {
            self.placements.you_might_like_limit =
                parse_usize("VITRINE_PLACEMENTS_YOU_MIGHT_LIKE_LIMIT", &value)?;
        }

        let log_level = read_env("VITRINE_LOGGING_LEVEL").or_else(|| read_env("VITRINE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("VITRINE_LOGGING_FORMAT").or_else(|| read_env("VITRINE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(per_category_cap) = overrides.per_category_cap {
            self.recommendations.per_category_cap = per_category_cap;
        }
        if let Some(default_page_size) = overrides.default_page_size {
            self.recommendations.default_page_size = default_page_size;
        }
        if let Some(shuffle_seed) = overrides.shuffle_seed {
            self.recommendations.shuffle_seed = Some(shuffle_seed);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_recommendations(&self.recommendations)?;
        validate_placements(&self.placements)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("vitrine.toml"), PathBuf::from("config/vitrine.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_recommendations(recommendations: &RecommendationConfig) -> Result<(), ConfigError> {
    if recommendations.per_category_cap == 0 {
        return Err(ConfigError::Validation(
            "recommendations.per_category_cap must be greater than zero".to_string(),
        ));
    }

    if recommendations.cache_capacity == 0 {
        return Err(ConfigError::Validation(
            "recommendations.cache_capacity must be greater than zero".to_string(),
        ));
    }

    if recommendations.default_page_size == 0 || recommendations.default_page_size > 500 {
        return Err(ConfigError::Validation(
            "recommendations.default_page_size must be in range 1..=500".to_string(),
        ));
    }

    Ok(())
}

fn validate_placements(placements: &PlacementConfig) -> Result<(), ConfigError> {
    for placement in Placement::ALL {
        if placements.limit_for(placement) == 0 {
            return Err(ConfigError::Validation(format!(
                "placements.{placement}_limit must be greater than zero"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    recommendations: Option<RecommendationPatch>,
    placements: Option<PlacementPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationPatch {
    per_category_cap: Option<usize>,
    cache_capacity: Option<usize>,
    default_page_size: Option<usize>,
    shuffle_seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PlacementPatch {
    similar_items_limit: Option<usize>,
    frequently_bought_together_limit: Option<usize>,
    checkout_upsell_limit: Option<usize>,
    you_might_like_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

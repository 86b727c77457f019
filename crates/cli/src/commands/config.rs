use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use crate::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let recommendations = &config.recommendations;
    let placements = &config.placements;
    let fields: [(&str, String, &[&str]); 10] = [
        (
            "recommendations.per_category_cap",
            recommendations.per_category_cap.to_string(),
            &["VITRINE_RECOMMENDATIONS_PER_CATEGORY_CAP"],
        ),
        (
            "recommendations.cache_capacity",
            recommendations.cache_capacity.to_string(),
            &["VITRINE_RECOMMENDATIONS_CACHE_CAPACITY"],
        ),
        (
            "recommendations.default_page_size",
            recommendations.default_page_size.to_string(),
            &["VITRINE_RECOMMENDATIONS_DEFAULT_PAGE_SIZE"],
        ),
        (
            "recommendations.shuffle_seed",
            recommendations
                .shuffle_seed
                .map(|seed| seed.to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
            &["VITRINE_RECOMMENDATIONS_SHUFFLE_SEED"],
        ),
        (
            "placements.similar_items_limit",
            placements.similar_items_limit.to_string(),
            &["VITRINE_PLACEMENTS_SIMILAR_ITEMS_LIMIT"],
        ),
        (
            "placements.frequently_bought_together_limit",
            placements.frequently_bought_together_limit.to_string(),
            &["VITRINE_PLACEMENTS_FREQUENTLY_BOUGHT_TOGETHER_LIMIT"],
        ),
        (
            "placements.checkout_upsell_limit",
            placements.checkout_upsell_limit.to_string(),
            &["VITRINE_PLACEMENTS_CHECKOUT_UPSELL_LIMIT"],
        ),
        (
            "placements.you_might_like_limit",
            placements.you_might_like_limit.to_string(),
            &["VITRINE_PLACEMENTS_YOU_MIGHT_LIKE_LIMIT"],
        ),
        ("logging.level", config.logging.level.clone(), &["VITRINE_LOGGING_LEVEL", "VITRINE_LOG_LEVEL"]),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["VITRINE_LOGGING_FORMAT", "VITRINE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_keys) in &fields {
        let source = field_source(
            key_path,
            env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(key_path, value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("vitrine.toml"), PathBuf::from("config/vitrine.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

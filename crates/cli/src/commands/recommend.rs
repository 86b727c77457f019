use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;
use vitrine_core::domain::catalog::Catalog;
use vitrine_core::domain::item::{Item, ItemId};
use vitrine_core::errors::ApplicationError;
use vitrine_core::recommendations::{Placement, PlacementList};

use crate::commands::CommandResult;
use crate::config::{AppConfig, ConfigOverrides, LoadOptions};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone)]
pub struct RecommendArgs {
    pub catalog: PathBuf,
    pub reference: String,
    /// Placement names; empty means every placement.
    pub placements: Vec<String>,
    pub page: usize,
    pub page_size: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct RecommendReport<'a> {
    command: &'static str,
    status: &'static str,
    reference_id: &'a str,
    catalog_version: &'a str,
    placements: Vec<PlacementReport<'a>>,
}

#[derive(Debug, Serialize)]
struct PlacementReport<'a> {
    placement: &'static str,
    title: &'static str,
    strategy: &'static str,
    page_number: usize,
    page_size: usize,
    total_count: usize,
    page_count: usize,
    items: Vec<ItemSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct ItemSummary<'a> {
    id: &'a str,
    title: &'a str,
    category: Option<&'a str>,
    price: Option<f64>,
}

pub fn run(args: &RecommendArgs) -> CommandResult {
    let overrides = ConfigOverrides { shuffle_seed: args.seed, ..ConfigOverrides::default() };
    let config = match AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2)
        }
    };

    let items = match load_catalog(&args.catalog) {
        Ok(items) => items,
        Err(error) => return CommandResult::failure(COMMAND, "catalog_read", format!("{error:#}"), 3),
    };

    let catalog = match Catalog::try_new(items) {
        Ok(catalog) => catalog,
        Err(error) => return rejected(ApplicationError::from(error), "invalid_catalog", &args.reference),
    };

    let placements = match parse_placements(&args.placements) {
        Ok(placements) => placements,
        Err(error) => return rejected(error, "invalid_input", &args.reference),
    };

    let specs = config.placements.specs(&placements);
    let mut service = config.recommendations.build_service();
    let mut rng = match config.recommendations.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let reference_id = ItemId::new(args.reference.as_str());
    let set = service.recommend(&reference_id, &catalog, &specs, &mut rng);

    info!(
        event_name = "cli.recommend.completed",
        reference_id = %reference_id,
        catalog_version = %catalog.version(),
        placements = set.placements.len(),
        total_items = set.total_items(),
        "recommendations built"
    );

    let page_size = args.page_size.unwrap_or(config.recommendations.default_page_size);
    let report = RecommendReport {
        command: COMMAND,
        status: "ok",
        reference_id: reference_id.as_str(),
        catalog_version: catalog.version().0.as_str(),
        placements: set
            .placements
            .iter()
            .map(|list| placement_report(list, page_size, args.page))
            .collect(),
    };

    CommandResult::report(COMMAND, &report)
}

fn load_catalog(path: &Path) -> anyhow::Result<Vec<Item>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read catalog `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse catalog `{}`", path.display()))
}

/// Requested placements in first-mention order, or all of them when none are named.
fn parse_placements(names: &[String]) -> Result<Vec<Placement>, ApplicationError> {
    if names.is_empty() {
        return Ok(Placement::ALL.to_vec());
    }

    let mut placements = Vec::with_capacity(names.len());
    for name in names {
        let placement = name.parse::<Placement>()?;
        if !placements.contains(&placement) {
            placements.push(placement);
        }
    }
    Ok(placements)
}

fn placement_report<'a>(
    list: &PlacementList<'a>,
    page_size: usize,
    page_number: usize,
) -> PlacementReport<'a> {
    let page = list.page(page_size, page_number);

    PlacementReport {
        placement: list.placement.as_str(),
        title: list.placement.title(),
        strategy: list.strategy.as_str(),
        page_number: page.info.page_number,
        page_size: page.info.page_size,
        total_count: page.info.total_count,
        page_count: page.info.page_count,
        items: page
            .items
            .iter()
            .copied()
            .map(|item| ItemSummary {
                id: item.id.as_str(),
                title: item.title.as_str(),
                category: item.category(),
                price: item.effective_price(),
            })
            .collect(),
    }
}

fn rejected(error: ApplicationError, error_class: &str, reference: &str) -> CommandResult {
    let interface = error.into_interface(format!("{COMMAND}:{reference}"));
    CommandResult::failure(COMMAND, error_class, interface.to_string(), 4)
}

use cinerank_core::Item;
use serde::Serialize;

use crate::commands::{load_catalog, load_config, CommandResult, DataSources, SkippedLine};

#[derive(Debug, Serialize)]
struct CatalogPayload<'a> {
    dimension: Option<usize>,
    items: Vec<&'a Item>,
    skipped: &'a [SkippedLine],
}

pub fn run(sources: &DataSources) -> CommandResult {
    let dataset = match load_config(sources).and_then(|config| load_catalog(&config)) {
        Ok(dataset) => dataset,
        Err(error) => return CommandResult::from_error("catalog", &error),
    };

    let payload = CatalogPayload {
        dimension: dataset.catalog.dimension(),
        items: dataset.catalog.items().map(|item| &**item).collect(),
        skipped: &dataset.skipped,
    };
    CommandResult::success_with_data("catalog", dataset.catalog.to_string(), payload)
}

use clap::ValueEnum;
use cinerank_core::{ApplicationError, Item, RecommendationEngine};
use serde::Serialize;
use tracing::info;

use crate::commands::{load_config, load_dataset, CommandResult, DataSources};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Similarity between the user's preference vector and each movie.
    Content,
    /// Predicted rating from the k most similar movies the user rated.
    Cf,
}

#[derive(Debug, Serialize)]
struct RecommendPayload<'a> {
    user: &'a str,
    strategy: Strategy,
    neighbors: Option<usize>,
    item: Option<&'a Item>,
    score: Option<f64>,
}

pub fn run(
    sources: &DataSources,
    user: &str,
    strategy: Strategy,
    neighbors: Option<usize>,
) -> CommandResult {
    let config = match load_config(sources) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("recommend", &error),
    };
    let dataset = match load_dataset(&config) {
        Ok(dataset) => dataset,
        Err(error) => return CommandResult::from_error("recommend", &error),
    };
    let Some(profile) = dataset.find_user(user) else {
        return CommandResult::unknown_user("recommend", user);
    };

    let engine = RecommendationEngine::from_config(&config.engine);
    let k = neighbors.unwrap_or(engine.default_neighbors());
    let result = match strategy {
        Strategy::Content => engine.recommend_by_content(profile.ratings(), &dataset.catalog),
        Strategy::Cf => engine.recommend_by_cf(profile.ratings(), k, &dataset.catalog),
    };
    let recommendation = match result {
        Ok(recommendation) => recommendation,
        Err(error) => {
            return CommandResult::from_error("recommend", &ApplicationError::from(error));
        }
    };

    let payload = RecommendPayload {
        user,
        strategy,
        neighbors: (strategy == Strategy::Cf).then_some(k),
        item: recommendation.as_ref().map(|winner| &*winner.item),
        score: recommendation.as_ref().map(|winner| winner.score),
    };
    match &recommendation {
        Some(winner) => {
            info!(
                event_name = "cli.recommend.completed",
                user,
                strategy = ?strategy,
                item = %winner.item,
                score = winner.score,
                "recommendation produced"
            );
            CommandResult::success_with_data("recommend", winner.item.to_string(), payload)
        }
        None => CommandResult::empty(
            "recommend",
            format!("no recommendation available for `{user}`"),
            payload,
        ),
    }
}

use cinerank_core::{ApplicationError, PredictionPolicy, RecommendationEngine};
use serde::Serialize;

use crate::commands::{load_config, load_dataset, CommandResult, DataSources};

#[derive(Debug, Serialize)]
struct PredictPayload<'a> {
    user: &'a str,
    title: &'a str,
    year: i32,
    neighbors: usize,
    policy: PredictionPolicy,
    score: f64,
}

pub fn run(
    sources: &DataSources,
    user: &str,
    title: &str,
    year: i32,
    neighbors: Option<usize>,
) -> CommandResult {
    let config = match load_config(sources) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("predict", &error),
    };
    let dataset = match load_dataset(&config) {
        Ok(dataset) => dataset,
        Err(error) => return CommandResult::from_error("predict", &error),
    };
    let Some(profile) = dataset.find_user(user) else {
        return CommandResult::unknown_user("predict", user);
    };

    let engine = RecommendationEngine::from_config(&config.engine);
    let k = neighbors.unwrap_or(engine.default_neighbors());
    match engine.predict_score_by_title(profile.ratings(), title, year, k, &dataset.catalog) {
        Ok(score) => CommandResult::success_with_data(
            "predict",
            format!("{score:.4}"),
            PredictPayload { user, title, year, neighbors: k, policy: engine.policy(), score },
        ),
        Err(error) => CommandResult::from_error("predict", &ApplicationError::from(error)),
    }
}

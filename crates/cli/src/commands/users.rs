use serde::Serialize;

use crate::commands::{load_config, load_dataset, CommandResult, DataSources, SkippedLine};

#[derive(Debug, Serialize)]
struct UserSummary<'a> {
    name: &'a str,
    rated: usize,
}

#[derive(Debug, Serialize)]
struct UsersPayload<'a> {
    users: Vec<UserSummary<'a>>,
    skipped: &'a [SkippedLine],
}

pub fn run(sources: &DataSources) -> CommandResult {
    let dataset = match load_config(sources).and_then(|config| load_dataset(&config)) {
        Ok(dataset) => dataset,
        Err(error) => return CommandResult::from_error("users", &error),
    };

    let listing = dataset.catalog.to_string();
    let message: String =
        dataset.users.iter().map(|user| format!("name: {}\n{listing}", user.name())).collect();
    let payload = UsersPayload {
        users: dataset
            .users
            .iter()
            .map(|user| UserSummary { name: user.name(), rated: user.ratings().len() })
            .collect(),
        skipped: &dataset.skipped,
    };
    CommandResult::success_with_data("users", message, payload)
}

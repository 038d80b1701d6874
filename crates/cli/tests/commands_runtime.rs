use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use cinerank_cli::commands::recommend::Strategy;
use cinerank_cli::commands::{catalog, config, predict, recommend, users, DataSources};
use serde_json::Value;
use tempfile::TempDir;

const MOVIES: &str = "\
Titanic-1997 7 2 9 1
Spider-Man-2002 8 8 3 5
Heat-1995 9 1 2 8
Up-2009 2 9 8 3
Alien-1979 9 2 1 9
";

const USERS: &str = "\
User Titanic-1997 Spider-Man-2002 Heat-1995 Up-2009 Alien-1979
Sofia 10 NA 2 9 NA
Michael 3 8 NA NA 9
Dana 5 5 5 5 5
";

struct Fixture {
    _dir: TempDir,
    sources: DataSources,
}

fn fixture(movies: &str, users: &str) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let movies_path = dir.path().join("movies.txt");
    let users_path = dir.path().join("users.txt");
    fs::write(&movies_path, movies).expect("write movies");
    fs::write(&users_path, users).expect("write users");
    let sources =
        DataSources { config_path: None, movies: Some(movies_path), users: Some(users_path) };
    Fixture { _dir: dir, sources }
}

#[test]
fn catalog_lists_items_by_year_then_name() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = catalog::run(&fixture.sources);
        assert_eq!(result.exit_code, 0, "expected catalog listing to succeed");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "catalog");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["dimension"], 4);
        assert_eq!(payload["data"]["items"][0]["name"], "Alien");
        assert_eq!(payload["data"]["items"][4]["name"], "Up");
        assert_eq!(
            payload["message"],
            "Alien (1979)\nHeat (1995)\nTitanic (1997)\nSpider-Man (2002)\nUp (2009)\n"
        );
    });
}

#[test]
fn catalog_reports_skipped_records_in_lenient_mode() {
    with_env(&[], || {
        let fixture = fixture("Heat-1995 9 1 2 8\nAlien-1979 0 2 1 9\n", USERS);
        let result = catalog::run(&fixture.sources);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(payload["data"]["skipped"][0]["line"], 2);
    });
}

#[test]
fn strict_mode_turns_bad_records_into_load_failures() {
    with_env(&[("CINERANK_DATA_STRICT", "true")], || {
        let fixture = fixture("Heat-1995 9 1 2 8\nAlien-1979 0 2 1 9\n", USERS);
        let result = catalog::run(&fixture.sources);
        assert_eq!(result.exit_code, 3, "expected load failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "load");
    });
}

#[test]
fn missing_catalog_path_is_a_config_failure() {
    with_env(&[], || {
        let result = catalog::run(&DataSources::default());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn missing_catalog_file_is_a_load_failure() {
    with_env(&[], || {
        let sources = DataSources {
            movies: Some(PathBuf::from("does/not/exist/movies.txt")),
            ..DataSources::default()
        };
        let result = catalog::run(&sources);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "load");
    });
}

#[test]
fn users_prints_each_user_followed_by_the_catalog() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = users::run(&fixture.sources);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.starts_with("name: Sofia\nAlien (1979)\n"));
        assert!(message.contains("name: Michael\n"));
        assert_eq!(payload["data"]["users"][0]["rated"], 3);
        assert_eq!(payload["data"]["users"][2]["name"], "Dana");
    });
}

#[test]
fn content_recommendation_picks_closest_unseen_movie() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);

        let sofia = parse_payload(
            &recommend::run(&fixture.sources, "Sofia", Strategy::Content, None).output,
        );
        assert_eq!(sofia["status"], "ok");
        assert_eq!(sofia["message"], "Spider-Man (2002)");
        assert_eq!(sofia["data"]["strategy"], "content");
        assert_eq!(sofia["data"]["neighbors"], Value::Null);

        let michael = parse_payload(
            &recommend::run(&fixture.sources, "Michael", Strategy::Content, None).output,
        );
        assert_eq!(michael["data"]["item"]["name"], "Heat");
        assert_eq!(michael["data"]["item"]["year"], 1995);
    });
}

#[test]
fn cf_recommendation_depends_on_neighbor_count() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);

        let k1 = parse_payload(
            &recommend::run(&fixture.sources, "Sofia", Strategy::Cf, Some(1)).output,
        );
        // Alien and Spider-Man tie at 2.0; the earlier item keeps the lead.
        assert_eq!(k1["message"], "Alien (1979)");
        assert_eq!(k1["data"]["neighbors"], 1);

        let k2 = parse_payload(
            &recommend::run(&fixture.sources, "Sofia", Strategy::Cf, Some(2)).output,
        );
        assert_eq!(k2["message"], "Spider-Man (2002)");
    });
}

#[test]
fn cf_recommendation_uses_configured_neighbors_by_default() {
    with_env(&[("CINERANK_ENGINE_NEIGHBORS", "1")], || {
        let fixture = fixture(MOVIES, USERS);
        let payload = parse_payload(
            &recommend::run(&fixture.sources, "Sofia", Strategy::Cf, None).output,
        );

        assert_eq!(payload["data"]["neighbors"], 1);
        assert_eq!(payload["message"], "Alien (1979)");
    });
}

#[test]
fn user_who_rated_everything_gets_empty_status() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = recommend::run(&fixture.sources, "Dana", Strategy::Content, None);
        assert_eq!(result.exit_code, 0, "empty result is not a failure");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "empty");
        assert_eq!(payload["data"]["item"], Value::Null);
    });
}

#[test]
fn zero_neighbors_is_an_invalid_argument() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = recommend::run(&fixture.sources, "Sofia", Strategy::Cf, Some(0));
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_argument");
    });
}

#[test]
fn unknown_user_has_its_own_exit_code() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = recommend::run(&fixture.sources, "Nobody", Strategy::Content, None);
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "unknown_user");
    });
}

#[test]
fn predict_returns_weighted_neighbor_score() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = predict::run(&fixture.sources, "Sofia", "Spider-Man", 2002, Some(3));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["policy"], "raw");
        assert_eq!(payload["data"]["neighbors"], 3);
        let score = payload["data"]["score"].as_f64().unwrap_or(f64::NAN);
        assert!((score - 6.850_746_510_071_2).abs() < 1e-6, "unexpected score {score}");
    });
}

#[test]
fn predict_unknown_title_is_item_not_found() {
    with_env(&[], || {
        let fixture = fixture(MOVIES, USERS);
        let result = predict::run(&fixture.sources, "Sofia", "Jaws", 1975, None);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "item_not_found");
    });
}

#[test]
fn config_reports_env_file_and_default_sources() {
    with_env(&[("CINERANK_LOG_LEVEL", "debug")], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("cinerank.toml");
        fs::write(&path, "[engine]\nneighbors = 5\nprediction_policy = \"mean_centered\"\n")
            .expect("write config");

        let result = config::run(Some(path.as_path()));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or("");
        let file_source = format!("(source: file ({}))", path.display());
        assert!(message.contains(&format!("- engine.neighbors = 5 {file_source}")));
        assert!(message
            .contains(&format!("- engine.prediction_policy = mean_centered {file_source}")));
        assert!(message.contains("- logging.level = debug (source: env (CINERANK_LOG_LEVEL))"));
        assert!(message.contains("- data.strict = false (source: default)"));
    });
}

#[test]
fn config_does_not_attribute_blank_env_values() {
    with_env(&[("CINERANK_LOGGING_LEVEL", ""), ("CINERANK_DATA_STRICT", "  ")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("- logging.level = info (source: default)"));
        assert!(message.contains("- data.strict = false (source: default)"));
    });
}

#[test]
fn config_rejects_invalid_values() {
    with_env(&[("CINERANK_ENGINE_NEIGHBORS", "0")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CINERANK_ENGINE_NEIGHBORS",
        "CINERANK_ENGINE_PREDICTION_POLICY",
        "CINERANK_DATA_MOVIES_PATH",
        "CINERANK_DATA_USERS_PATH",
        "CINERANK_DATA_STRICT",
        "CINERANK_LOGGING_LEVEL",
        "CINERANK_LOGGING_FORMAT",
        "CINERANK_LOG_LEVEL",
        "CINERANK_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

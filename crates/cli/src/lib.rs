pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use cinerank_core::config::AppConfig;

use crate::commands::recommend::Strategy;
use crate::commands::DataSources;

#[derive(Debug, Parser)]
#[command(
    name = "cinerank",
    about = "Cinerank movie recommendation CLI",
    long_about = "Load a movie catalog and user ratings, then recommend or score movies.",
    after_help = "Examples:\n  cinerank catalog --movies movies.txt\n  \
                  cinerank recommend --user Sofia --strategy cf --k 2\n  cinerank config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a cinerank.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct DataArgs {
    #[arg(long, help = "Movie catalog file (overrides data.movies_path)")]
    movies: Option<PathBuf>,
    #[arg(long, help = "User ratings file (overrides data.users_path)")]
    users: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List catalogued movies ordered by year, then name")]
    Catalog {
        #[arg(long, help = "Movie catalog file (overrides data.movies_path)")]
        movies: Option<PathBuf>,
    },
    #[command(about = "List loaded users followed by the catalog")]
    Users {
        #[command(flatten)]
        data: DataArgs,
    },
    #[command(about = "Recommend one unseen movie for a user")]
    Recommend {
        #[arg(long, help = "User name as it appears in the users file")]
        user: String,
        #[arg(long, value_enum, default_value_t = Strategy::Content)]
        strategy: Strategy,
        #[arg(long, help = "Neighbors used by the cf strategy (defaults to engine.neighbors)")]
        k: Option<usize>,
        #[command(flatten)]
        data: DataArgs,
    },
    #[command(about = "Predict a user's rating for a catalogued movie")]
    Predict {
        #[arg(long)]
        user: String,
        #[arg(long, help = "Movie name without the year")]
        title: String,
        #[arg(long)]
        year: i32,
        #[arg(long, help = "Neighbors to aggregate (defaults to engine.neighbors)")]
        k: Option<usize>,
        #[command(flatten)]
        data: DataArgs,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging = AppConfig::load(commands::load_options(&DataSources {
        config_path: cli.config.clone(),
        ..DataSources::default()
    }))
    .map(|config| config.logging)
    .unwrap_or_else(|_| AppConfig::default().logging);
    if let Err(error) = logging::init_logging(&logging) {
        eprintln!("logging disabled: {error:#}");
    }

    let result = match cli.command {
        Command::Catalog { movies } => {
            commands::catalog::run(&DataSources { config_path: cli.config, movies, users: None })
        }
        Command::Users { data } => commands::users::run(&sources(cli.config, data)),
        Command::Recommend { user, strategy, k, data } => {
            commands::recommend::run(&sources(cli.config, data), &user, strategy, k)
        }
        Command::Predict { user, title, year, k, data } => {
            commands::predict::run(&sources(cli.config, data), &user, &title, year, k)
        }
        Command::Config => commands::config::run(cli.config.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn sources(config_path: Option<PathBuf>, data: DataArgs) -> DataSources {
    DataSources { config_path, movies: data.movies, users: data.users }
}

use std::process::ExitCode;

fn main() -> ExitCode {
    cinerank_cli::run()
}

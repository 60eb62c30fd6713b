//! Binary entrypoint for the `goldthread` CLI.

use std::process::ExitCode;

use goldthread::Outcome;

fn main() -> ExitCode {
    match goldthread::run(std::env::args_os()) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::IssuesFound) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}

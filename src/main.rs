//! depotctl binary entry point.

use std::process::ExitCode;

use depotctl::ui::output;

fn main() -> ExitCode {
    match depotctl::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

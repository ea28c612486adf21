mod cli;
mod commands;
mod infra;

use attendance::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}

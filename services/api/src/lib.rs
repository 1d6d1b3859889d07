mod cli;
mod infra;
mod plan;
mod routes;
mod server;

use offer_planner::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

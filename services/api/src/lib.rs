mod cli;
mod dashboard;
mod infra;
mod render;
mod routes;
mod server;

use property_insight::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

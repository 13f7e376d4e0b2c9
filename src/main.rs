use clap::Parser;
use dotenv::dotenv;

use matjip_query_backend::config::Config;
use matjip_query_backend::controller::{self, AppState};
use matjip_query_backend::helpers::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logger();

    let config = Config::parse();
    let app_state = AppState::from_config(&config)?;

    controller::serve(app_state, &config).await
}

use std::str::FromStr;

use showmycards::{
    config::Config,
    domain::{
        evaluator,
        inventory::{self, ResortSelector, SortPipeline},
    },
    outbound::sqlx::postgres::Postgres,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from_str(&config.rust_log)?)
        .init();

    let db = Postgres::new(&config.database_url).await?;
    let evaluator = evaluator::Service::new(db.clone());
    let pipeline = inventory::Service::new(db.clone(), evaluator, db.clone(), db.clone());

    loop {
        match pipeline.resort(ResortSelector::All).await {
            Ok(report) => info!(
                processed = report.processed,
                updated = report.updated,
                errors = report.errors,
                "resort pass complete"
            ),
            Err(err) => error!(%err, "resort pass failed"),
        }

        tokio::time::sleep(config.resort_interval).await;
    }
}

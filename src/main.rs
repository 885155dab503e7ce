// src/main.rs
use anyhow::Context;
use dotenvy::dotenv;
use finance_dashboard::config::{Args, Command};
use finance_dashboard::{backend, database};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse_args();
    init_logging(&args);

    tracing::info!("finance-dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?args, "parsed arguments");

    let pool = database::db::connection::get_db_pool(&args.database_url)
        .await
        .with_context(|| format!("failed to open database {}", args.database_url))?;

    database::db::migrate::run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;

    match args.command() {
        Command::Migrate => {
            tracing::info!("migrations applied");
        }
        Command::Serve => {
            tracing::info!("starting backend server");
            backend::run_server(pool, &args.serve).await?;
        }
    }
    Ok(())
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

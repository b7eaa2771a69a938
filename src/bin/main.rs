use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitvavo_notifier::config::{BitvavoConfig, Config};
use bitvavo_notifier::exchange::bitvavo::Bitvavo;
use bitvavo_notifier::exchange::PortfolioSource;
use bitvavo_notifier::notify;
use bitvavo_notifier::telegram::TelegramNotifier;
use bitvavo_notifier::volatility;

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the portfolio and send the summary to Telegram
    Notify,
    /// Fetch the portfolio and log it without sending anything
    Balance,
    /// Rank the most liquid markets by intraday volatility and send a report
    Volatility {
        #[arg(long, default_value_t = 100)]
        markets: usize,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitvavo_notifier=info,notifier=info,reqwest=warn".into()),
        )
        .with(fmt::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        None | Some(Commands::Notify) => run_notify().await,
        Some(Commands::Balance) => run_balance().await,
        Some(Commands::Volatility { markets, top }) => run_volatility(markets, top).await,
    };

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run_notify() -> Result<()> {
    let config = Config::from_env()?;
    let exchange = Bitvavo::new(config.bitvavo);
    let notifier = TelegramNotifier::new(config.telegram);

    notify::run(&exchange, &notifier).await?;

    Ok(())
}

async fn run_balance() -> Result<()> {
    let config = BitvavoConfig::from_env()?;
    let exchange = Bitvavo::new(config);

    let summary = exchange.portfolio().await?;
    info!("{}", summary);
    info!("Remaining rate limit : {}", summary.remaining_limit);

    Ok(())
}

async fn run_volatility(markets: usize, top: usize) -> Result<()> {
    let config = Config::from_env()?;
    let exchange = Bitvavo::new(config.bitvavo);
    let notifier = TelegramNotifier::new(config.telegram);

    let ranked = volatility::scan(&exchange, markets).await?;
    let message = volatility::format_report(&ranked, top, Utc::now());
    notifier.send_message(&message).await?;
    info!("Volatility report sent ({} markets scored)", ranked.len());

    Ok(())
}

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::error::NotifyError;
use crate::exchange::bitvavo::Bitvavo;
use crate::exchange::PortfolioSource;
use crate::portfolio::{Holding, PortfolioSummary, QUOTE_ASSET};

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub available: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub in_order: Decimal,
}

impl AssetBalance {
    pub fn total(&self) -> Decimal {
        self.available + self.in_order
    }
}

impl Bitvavo {
    pub async fn balance(&self) -> Result<Vec<AssetBalance>, NotifyError> {
        self.signed_get("/balance").await
    }
}

impl PortfolioSource for Bitvavo {
    async fn portfolio(&self) -> Result<PortfolioSummary, NotifyError> {
        let balances = self.balance().await?;

        let mut holdings = Vec::new();
        for balance in balances {
            let amount = balance.total();
            if amount.is_zero() {
                continue;
            }

            let price = if balance.symbol == QUOTE_ASSET {
                None
            } else {
                let market = format!("{}-{}", balance.symbol, QUOTE_ASSET);
                match self.ticker_price(&market).await {
                    Ok(price) => Some(price),
                    Err(err) => {
                        // Listed without a value rather than failing the run.
                        warn!("No price for {} : {}", market, err);
                        None
                    }
                }
            };

            holdings.push(Holding::valued(balance.symbol, amount, price));
        }

        let mut summary = PortfolioSummary::new(self.remaining_limit());
        for holding in holdings {
            summary.push(holding);
        }

        Ok(summary)
    }
}

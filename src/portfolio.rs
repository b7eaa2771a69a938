use std::fmt::Display;

use chrono::{DateTime, Utc};
use colored::Colorize;
use rust_decimal::Decimal;

pub const QUOTE_ASSET: &str = "EUR";

#[derive(Clone, Debug, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub amount: Decimal,
    pub value: Option<Decimal>,
}

impl Holding {
    /// The quote asset is worth its face amount; anything else needs a price.
    pub fn valued(symbol: String, amount: Decimal, price: Option<Decimal>) -> Self {
        let value = if symbol == QUOTE_ASSET {
            Some(amount)
        } else {
            price.map(|price| amount * price)
        };
        Self {
            symbol,
            amount,
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub total_value: Decimal,
    pub remaining_limit: i64,
}

impl PortfolioSummary {
    pub fn new(remaining_limit: i64) -> Self {
        Self {
            holdings: Vec::new(),
            total_value: Decimal::ZERO,
            remaining_limit,
        }
    }

    pub fn push(&mut self, holding: Holding) {
        if let Some(value) = holding.value {
            self.total_value += value;
        }
        self.holdings.push(holding);
    }

    pub fn to_message(&self, at: DateTime<Utc>) -> String {
        let mut message = format!(
            "📊 *Bitvavo Portfolio Update* ({})\n\n",
            at.format("%Y-%m-%d %H:%M:%S")
        );

        if self.holdings.is_empty() {
            message.push_str("No holdings.\n");
        } else {
            message.push_str("📈 *Holdings*:\n");
            for holding in &self.holdings {
                match holding.value {
                    Some(value) if holding.symbol != QUOTE_ASSET => {
                        message.push_str(&format!(
                            "{}: {} (≈{:.2} {})\n",
                            holding.symbol, holding.amount, value, QUOTE_ASSET
                        ));
                    }
                    _ => {
                        message.push_str(&format!("{}: {}\n", holding.symbol, holding.amount));
                    }
                }
            }
            message.push_str(&format!("Total: ≈{:.2} {}\n", self.total_value, QUOTE_ASSET));
        }

        message.push_str(&format!(
            "\n🔒 *Remaining rate limit*: {}",
            self.remaining_limit
        ));
        message
    }
}

impl Display for PortfolioSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = vec![];
        for holding in &self.holdings {
            s.push(format!(
                "{}: {} (~{})",
                holding.symbol,
                holding.amount.to_string().purple(),
                holding.value.unwrap_or(Decimal::ZERO)
            ));
        }
        write!(
            f,
            "~{} {} : {}",
            self.total_value.to_string().yellow(),
            QUOTE_ASSET,
            s.join(" / ")
        )
    }
}

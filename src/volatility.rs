use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::error::NotifyError;
use crate::exchange::bitvavo::Bitvavo;
use crate::portfolio::QUOTE_ASSET;

const CANDLE_INTERVAL: &str = "1m";
const CANDLE_LIMIT: u32 = 1440;
const MINUTES_PER_DAY: f64 = 1440.0;
const MAX_CONCURRENT_FETCHES: usize = 10;

#[derive(Clone, Debug)]
pub struct MarketVolatility {
    pub market: String,
    pub volatility: f64,
}

/// Population standard deviation of log returns, scaled to a full day of
/// one-minute samples. Needs at least two usable closing prices.
pub fn log_return_volatility(closes: &[Decimal]) -> Option<f64> {
    let closes = closes
        .iter()
        .filter_map(|close| close.to_f64())
        .filter(|close| *close > 0.0)
        .collect::<Vec<f64>>();
    if closes.len() < 2 {
        return None;
    }

    let returns = closes
        .windows(2)
        .map(|w| (w[1] / w[0]).ln())
        .collect::<Vec<f64>>();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;

    Some(variance.sqrt() * MINUTES_PER_DAY.sqrt())
}

// Score the most liquid quote-asset markets, most volatile first. Markets
// whose candles cannot be fetched or scored are dropped from the ranking.
pub async fn scan(exchange: &Bitvavo, markets: usize) -> Result<Vec<MarketVolatility>, NotifyError> {
    let suffix = format!("-{}", QUOTE_ASSET);
    let mut tickers = exchange.ticker_24h().await?;
    tickers.retain(|ticker| ticker.market.ends_with(&suffix));
    tickers.sort_by(|a, b| b.volume_quote.cmp(&a.volume_quote));
    tickers.truncate(markets);

    info!("Scoring {} markets by volatility", tickers.len());

    let scored = stream::iter(tickers)
        .map(|ticker| async move {
            match exchange
                .candles(&ticker.market, CANDLE_INTERVAL, CANDLE_LIMIT)
                .await
            {
                Ok(candles) => {
                    let closes = candles.iter().map(|c| c.close).collect::<Vec<Decimal>>();
                    log_return_volatility(&closes).map(|volatility| MarketVolatility {
                        market: ticker.market,
                        volatility,
                    })
                }
                Err(err) => {
                    error!("Failed to fetch candles for {} : {}", ticker.market, err);
                    None
                }
            }
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect::<Vec<Option<MarketVolatility>>>()
        .await;

    let mut scored = scored.into_iter().flatten().collect::<Vec<MarketVolatility>>();
    scored.sort_by(|a, b| b.volatility.total_cmp(&a.volatility));

    Ok(scored)
}

pub fn format_report(ranked: &[MarketVolatility], top: usize, at: DateTime<Utc>) -> String {
    let mut message = format!(
        "🌊 *Bitvavo Volatility Report* ({})\n\n",
        at.format("%Y-%m-%d %H:%M:%S")
    );

    if ranked.is_empty() {
        message.push_str("No markets scored.");
        return message;
    }

    message.push_str("📈 *Most volatile markets*:\n");
    for (i, entry) in ranked.iter().take(top).enumerate() {
        message.push_str(&format!("{}. {}: {:.4}\n", i + 1, entry.market, entry.volatility));
    }

    if ranked.len() > top {
        message.push_str("\n📉 *Least volatile markets*:\n");
        let tail = &ranked[ranked.len() - top.min(ranked.len())..];
        for (i, entry) in tail.iter().rev().enumerate() {
            message.push_str(&format!("{}. {}: {:.4}\n", i + 1, entry.market, entry.volatility));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_constant_series_has_zero_volatility() {
        let closes = vec![dec!(100), dec!(100), dec!(100), dec!(100)];
        assert_eq!(log_return_volatility(&closes), Some(0.0));
    }

    #[test]
    fn test_short_series_has_no_score() {
        assert_eq!(log_return_volatility(&[]), None);
        assert_eq!(log_return_volatility(&[dec!(100)]), None);
    }

    #[test]
    fn test_oscillating_series_scores_higher() {
        let calm = vec![dec!(100), dec!(100.1), dec!(100.2), dec!(100.3)];
        let wild = vec![dec!(100), dec!(110), dec!(95), dec!(112)];

        let calm = log_return_volatility(&calm).unwrap();
        let wild = log_return_volatility(&wild).unwrap();
        assert!(wild > calm);
    }

    #[test]
    fn test_format_report_lists_extremes() {
        let ranked = vec![
            MarketVolatility {
                market: String::from("AAA-EUR"),
                volatility: 0.9,
            },
            MarketVolatility {
                market: String::from("BBB-EUR"),
                volatility: 0.5,
            },
            MarketVolatility {
                market: String::from("CCC-EUR"),
                volatility: 0.1,
            },
        ];

        let at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        let message = format_report(&ranked, 1, at);
        assert!(message.contains("Most volatile markets"));
        assert!(message.contains("1. AAA-EUR: 0.9000"));
        assert!(message.contains("Least volatile markets"));
        assert!(message.contains("1. CCC-EUR: 0.1000"));
    }

    #[test]
    fn test_format_report_empty() {
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert!(format_report(&[], 10, at).contains("No markets scored."));
    }
}

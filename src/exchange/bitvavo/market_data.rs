use anyhow::anyhow;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::NotifyError;
use crate::exchange::bitvavo::Bitvavo;

#[derive(Deserialize, Debug, Clone)]
pub struct TickerPrice {
    pub market: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub market: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub volume: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub volume_quote: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct Candle {
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl TryFrom<Value> for Candle {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let value = if let Value::Array(value) = value {
            value
        } else {
            return Err(anyhow!("Expected an array for candle data"));
        };
        if value.len() < 6 {
            return Err(anyhow!("Candle array needs at least 6 elements"));
        }
        let candle = Candle {
            timestamp: value[0]
                .as_i64()
                .ok_or_else(|| anyhow!("Invalid candle timestamp"))?,
            open: value[1]
                .as_str()
                .ok_or(anyhow!("Invalid open price"))
                .and_then(|v| {
                    Decimal::from_str(v).map_err(|e| anyhow!("Invalid decimal: {}", e))
                })?,
            high: value[2]
                .as_str()
                .ok_or(anyhow!("Invalid high price"))
                .and_then(|v| {
                    Decimal::from_str(v).map_err(|e| anyhow!("Invalid decimal: {}", e))
                })?,
            low: value[3]
                .as_str()
                .ok_or(anyhow!("Invalid low price"))
                .and_then(|v| {
                    Decimal::from_str(v).map_err(|e| anyhow!("Invalid decimal: {}", e))
                })?,
            close: value[4]
                .as_str()
                .ok_or(anyhow!("Invalid close price"))
                .and_then(|v| {
                    Decimal::from_str(v).map_err(|e| anyhow!("Invalid decimal: {}", e))
                })?,
            volume: value[5]
                .as_str()
                .ok_or(anyhow!("Invalid volume"))
                .and_then(|v| {
                    Decimal::from_str(v).map_err(|e| anyhow!("Invalid decimal: {}", e))
                })?,
        };
        Ok(candle)
    }
}

impl Bitvavo {
    pub async fn ticker_price(&self, market: &str) -> Result<Decimal, NotifyError> {
        let ticker: TickerPrice = self
            .signed_get(&format!("/ticker/price?market={market}"))
            .await?;
        ticker
            .price
            .ok_or_else(|| NotifyError::ExchangeUnavailable(format!("no price for {market}")))
    }

    pub async fn ticker_24h(&self) -> Result<Vec<Ticker24h>, NotifyError> {
        self.signed_get("/ticker/24h").await
    }

    pub async fn candles(
        &self,
        market: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, NotifyError> {
        let raw: Vec<Value> = self
            .signed_get(&format!("/{market}/candles?interval={interval}&limit={limit}"))
            .await?;

        // The exchange returns newest-first; drop malformed rows like any
        // other unusable market data.
        let mut candles = raw
            .into_iter()
            .flat_map(|v| v.try_into())
            .collect::<Vec<Candle>>();
        candles.sort_by_key(|candle| candle.timestamp);

        Ok(candles)
    }
}

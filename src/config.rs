use std::env;

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct BitvavoConfig {
    pub api_key: String,
    pub api_secret: String,
}

impl BitvavoConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("BITVAVO_API_KEY").context("BITVAVO_API_KEY is not set")?,
            api_secret: env::var("BITVAVO_API_SECRET").context("BITVAVO_API_SECRET is not set")?,
        })
    }
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_token: env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN is not set")?,
            chat_id: env::var("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID is not set")?,
        })
    }
}

pub struct Config {
    pub bitvavo: BitvavoConfig,
    pub telegram: TelegramConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bitvavo: BitvavoConfig::from_env()?,
            telegram: TelegramConfig::from_env()?,
        })
    }
}

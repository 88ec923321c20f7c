// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::parsing::parse_token_amount;
use crate::domain::constants;
use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,
    pub chain_id: Option<u64>,

    // Identity
    pub wallet_key: String,
    pub wallet_address: Address,

    // RPC endpoints, keyed by chain id as a string ("1" -> url)
    pub http_providers: Option<HashMap<String, String>>,

    // Swap route
    pub token_in: Option<Address>,
    pub token_out: Option<Address>,
    pub router: Option<Address>,
    #[serde(default = "default_token_in_decimals")]
    pub token_in_decimals: u8,
    #[serde(default = "default_token_in_symbol")]
    pub token_in_symbol: String,
    #[serde(default = "default_token_out_symbol")]
    pub token_out_symbol: String,
    /// Human units of token_in to sell (e.g. "1" or "0.5").
    #[serde(default = "default_amount")]
    pub amount: String,

    // Execution
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u64,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Approve U256::MAX instead of the exact swap amount.
    #[serde(default = "default_false")]
    pub approve_max: bool,
    #[serde(default = "default_max_gas")]
    pub max_gas_price_gwei: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,

    pub etherscan_api_key: Option<String>,
}

// Defaults
fn default_debug() -> bool {
    false
}
fn default_false() -> bool {
    false
}
fn default_token_in_decimals() -> u8 {
    6
}
fn default_token_in_symbol() -> String {
    "USDT".to_string()
}
fn default_token_out_symbol() -> String {
    "ETH".to_string()
}
fn default_amount() -> String {
    "1".to_string()
}
fn default_slippage_bps() -> u64 {
    100
}
fn default_deadline_secs() -> u64 {
    300
}
fn default_max_gas() -> u64 {
    500
}
fn default_receipt_poll_ms() -> u64 {
    500
}
fn default_receipt_timeout_ms() -> u64 {
    12_000
}

fn resolve_config_path(path: Option<&str>) -> Option<String> {
    let explicit = path.map(str::trim).filter(|p| !p.is_empty());
    if let Some(p) = explicit {
        return Some(p.to_string());
    }
    std::env::var("CONFIG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let selected_config = resolve_config_path(path);
        let mut builder = Config::builder();

        if let Some(ref selected_path) = selected_config {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > selected profile file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;

        // Basic Validation
        if settings.wallet_key.is_empty() {
            return Err(AppError::Config("WALLET_KEY is missing".to_string()));
        }
        if settings.slippage_bps > 10_000 {
            return Err(AppError::Config(format!(
                "slippage_bps {} exceeds 10000",
                settings.slippage_bps
            )));
        }
        settings.swap_amount()?;

        Ok(settings)
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_with_path(None)
    }

    /// HTTP RPC URL for a chain. Env vars `http_provider_<id>` and
    /// `http_provider` override the config map.
    pub fn get_http_provider(&self, chain_id: u64) -> Result<String, AppError> {
        let env_specific = std::env::var(format!("http_provider_{chain_id}"))
            .ok()
            .filter(|s| !s.is_empty());
        if let Some(url) = env_specific {
            return Ok(url);
        }
        if let Some(url) = std::env::var("http_provider").ok().filter(|s| !s.is_empty()) {
            return Ok(url);
        }
        if let Some(map) = &self.http_providers {
            if let Some(url) = map.get(&chain_id.to_string()).filter(|s| !s.is_empty()) {
                return Ok(url.clone());
            }
        }
        Err(AppError::Config(format!(
            "No http provider configured for chain {chain_id}"
        )))
    }

    /// Best-effort HTTP RPC URL for chain auto-detection.
    pub fn primary_http_provider(&self) -> Option<String> {
        if let Some(url) = std::env::var("http_provider").ok().filter(|s| !s.is_empty()) {
            return Some(url);
        }
        if let Some(map) = &self.http_providers {
            if let Some((_, v)) = map.iter().min_by_key(|(k, _)| k.parse::<u64>().ok()) {
                return Some(v.clone());
            }
        }
        std::env::var("http_provider_1")
            .ok()
            .filter(|s| !s.is_empty())
    }

    pub fn token_in_value(&self, chain_id: u64) -> Result<Address, AppError> {
        if let Some(addr) = self.token_in {
            return Ok(addr);
        }
        if chain_id == constants::CHAIN_ETHEREUM {
            return Ok(constants::USDT_MAINNET);
        }
        Err(AppError::Config(format!(
            "token_in is required on chain {chain_id}"
        )))
    }

    pub fn token_out_value(&self, chain_id: u64) -> Address {
        self.token_out
            .unwrap_or_else(|| constants::wrapped_native_for_chain(chain_id))
    }

    pub fn router_value(&self, chain_id: u64) -> Result<Address, AppError> {
        if let Some(addr) = self.router {
            return Ok(addr);
        }
        constants::default_router_for_chain(chain_id).ok_or_else(|| {
            AppError::Config(format!("No default V2 router known for chain {chain_id}"))
        })
    }

    pub fn swap_amount(&self) -> Result<U256, AppError> {
        parse_token_amount(&self.amount, self.token_in_decimals).ok_or_else(|| {
            AppError::Config(format!(
                "amount {:?} is not a valid {}-decimal token amount",
                self.amount, self.token_in_decimals
            ))
        })
    }

    /// Re-parse the configured amount once the on-chain decimals are known.
    pub fn swap_amount_with_decimals(&self, decimals: u8) -> Result<U256, AppError> {
        parse_token_amount(&self.amount, decimals).ok_or_else(|| {
            AppError::Config(format!(
                "amount {:?} is not a valid {}-decimal token amount",
                self.amount, decimals
            ))
        })
    }

    pub fn receipt_poll_ms_value(&self) -> u64 {
        self.receipt_poll_ms.max(100)
    }

    pub fn receipt_timeout_ms_value(&self) -> u64 {
        self.receipt_timeout_ms.max(self.receipt_poll_ms_value())
    }

    pub fn etherscan_api_key_value(&self) -> Option<String> {
        self.etherscan_api_key
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

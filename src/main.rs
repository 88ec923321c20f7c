// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use mitander_swap::app::config::GlobalSettings;
use mitander_swap::app::logging::setup_logging;
use mitander_swap::common::parsing::{parse_address_hex, parse_boolish, parse_token_amount};
use mitander_swap::domain::constants::DEFAULT_LOG_LEVEL;
use mitander_swap::domain::error::AppError;
use mitander_swap::infrastructure::network::gas::GasOracle;
use mitander_swap::infrastructure::network::nonce::NonceManager;
use mitander_swap::infrastructure::network::provider::ConnectionFactory;
use mitander_swap::services::swap::executor::{SwapExecutor, SwapPlan};
use mitander_swap::services::swap::quote::units_to_float;
use mitander_swap::services::swap::wallet::PortfolioView;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(author, version, about = "mitander swap")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Do not submit transactions, only quote/log
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Human units of the sell token (overrides config/env)
    #[arg(long)]
    amount: Option<String>,

    /// Slippage basis points for the swap (overrides config/env)
    #[arg(long)]
    slippage_bps: Option<u64>,

    /// Sell token address (overrides config/env)
    #[arg(long)]
    token_in: Option<String>,

    /// Buy-side token address for the route (overrides config/env)
    #[arg(long)]
    token_out: Option<String>,

    /// V2-compatible router address (overrides config/env)
    #[arg(long)]
    router: Option<String>,
}

fn cli_address(raw: Option<&str>) -> Result<Option<alloy::primitives::Address>, AppError> {
    match raw {
        Some(s) => parse_address_hex(s)
            .map(Some)
            .ok_or_else(|| AppError::InvalidAddress(s.to_string())),
        None => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug {
            "debug"
        } else {
            DEFAULT_LOG_LEVEL
        },
        settings.log_json,
    );

    if let Some(key) = settings.etherscan_api_key_value()
        && std::env::var("ETHERSCAN_API_KEY").is_err()
    {
        unsafe { std::env::set_var("ETHERSCAN_API_KEY", key) };
    }

    let wallet_signer = PrivateKeySigner::from_str(&settings.wallet_key)
        .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))?;
    let wallet_address = wallet_signer.address();
    if wallet_address != settings.wallet_address {
        return Err(AppError::Config(format!(
            "wallet_address {} does not match wallet_key address {}",
            settings.wallet_address, wallet_address
        )));
    }

    // Auto-detect chain if not explicitly configured
    let chain_id: u64 = match settings.chain_id {
        Some(cid) => cid,
        None => {
            let url = settings.primary_http_provider().ok_or_else(|| {
                AppError::Config(
                    "No chain_id configured and no http_provider available to auto-detect".into(),
                )
            })?;
            let http = ConnectionFactory::http(&url)?;
            let cid = http
                .get_chain_id()
                .await
                .map_err(|e| AppError::Connection(format!("chain_id detect failed: {e}")))?;
            tracing::info!(target: "config", detected_chain = cid, rpc = %url, "Auto-detected chain_id from RPC");
            cid
        }
    };

    let http_provider_url = settings.get_http_provider(chain_id)?;
    let http_provider = ConnectionFactory::http(&http_provider_url)?;

    let token_in = match cli_address(cli.token_in.as_deref())? {
        Some(addr) => addr,
        None => settings.token_in_value(chain_id)?,
    };
    let token_out = cli_address(cli.token_out.as_deref())?
        .unwrap_or_else(|| settings.token_out_value(chain_id));
    let router = match cli_address(cli.router.as_deref())? {
        Some(addr) => addr,
        None => settings.router_value(chain_id)?,
    };

    let portfolio = PortfolioView::new(http_provider.clone(), wallet_address);
    let token_in_decimals = match portfolio.token_decimals(token_in).await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(
                target: "swap",
                token = %format!("{token_in:#x}"),
                error = %e,
                fallback = settings.token_in_decimals,
                "decimals() call failed; using configured value"
            );
            settings.token_in_decimals
        }
    };

    let amount_in = match cli.amount.as_deref() {
        Some(raw) => parse_token_amount(raw, token_in_decimals).ok_or_else(|| {
            AppError::Config(format!("Invalid --amount '{raw}' for {token_in_decimals} decimals"))
        })?,
        None => settings.swap_amount_with_decimals(token_in_decimals)?,
    };
    let dry_run = cli.dry_run
        || std::env::var("DRY_RUN")
            .ok()
            .and_then(|v| parse_boolish(&v))
            .unwrap_or(false);
    let slippage_bps = cli.slippage_bps.unwrap_or(settings.slippage_bps);
    if slippage_bps > 10_000 {
        return Err(AppError::Config(format!(
            "slippage_bps {slippage_bps} exceeds 10000"
        )));
    }

    let plan = SwapPlan {
        token_in,
        token_out,
        router,
        amount_in,
        token_in_decimals,
        token_in_symbol: settings.token_in_symbol.clone(),
        token_out_symbol: settings.token_out_symbol.clone(),
        slippage_bps,
        deadline_secs: settings.deadline_secs,
        approve_max: settings.approve_max,
    };
    tracing::info!(
        target: "swap",
        chain_id,
        token_in = %format!("{token_in:#x}"),
        token_out = %format!("{token_out:#x}"),
        router = %format!("{router:#x}"),
        amount = units_to_float(amount_in, token_in_decimals),
        slippage_bps,
        dry_run,
        "Swap plan ready"
    );

    let gas_oracle = GasOracle::new(http_provider.clone(), chain_id);
    let nonce_manager = NonceManager::new(http_provider.clone(), wallet_address);

    let executor = SwapExecutor::new(
        http_provider,
        wallet_signer,
        chain_id,
        plan,
        gas_oracle,
        nonce_manager,
        portfolio,
        dry_run,
        settings.max_gas_price_gwei,
        settings.receipt_poll_ms_value(),
        settings.receipt_timeout_ms_value(),
    );
    executor.run().await
}

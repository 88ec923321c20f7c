// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::network::provider::HttpProvider;
use crate::services::swap::bindings::UniV2Router;
use crate::services::swap::time_utils::current_unix;
use alloy::primitives::{Address, U256};
use std::time::Duration;

/// Read-side view of a V2-compatible router.
#[derive(Clone)]
pub struct Quoter {
    provider: HttpProvider,
    router: Address,
}

impl Quoter {
    pub fn new(provider: HttpProvider, router: Address) -> Self {
        Self { provider, router }
    }

    /// `getAmountsOut` for a path, returning the final hop's amount.
    pub async fn amount_out(&self, amount_in: U256, path: Vec<Address>) -> Result<U256, AppError> {
        let contract = UniV2Router::new(self.router, self.provider.clone());
        let amounts: Vec<U256> = retry_async(
            move |_| {
                let c = contract.clone();
                let p = path.clone();
                async move { c.getAmountsOut(amount_in, p).call().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Swap(format!("V2 quote failed: {}", e)))?;

        amounts
            .last()
            .copied()
            .ok_or_else(|| AppError::Swap("V2 quote missing amounts".into()))
    }
}

/// Minimum acceptable output after applying slippage in basis points (floor).
pub fn min_out_after_slippage(expected_out: U256, slippage_bps: u64) -> U256 {
    let keep_bps = 10_000u64.saturating_sub(slippage_bps);
    expected_out.saturating_mul(U256::from(keep_bps)) / U256::from(10_000u64)
}

/// Swap deadline as an absolute UNIX timestamp.
pub fn swap_deadline(offset_secs: u64) -> U256 {
    U256::from(current_unix().saturating_add(offset_secs))
}

pub fn units_to_float(value: U256, decimals: u8) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let num = value.to_string().parse::<f64>().unwrap_or(0.0);
    num / scale
}

pub fn wei_to_eth_f64(value: U256) -> f64 {
    units_to_float(value, 18)
}

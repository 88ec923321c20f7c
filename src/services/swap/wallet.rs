// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::network::provider::HttpProvider;
use crate::services::swap::bindings::ERC20;
use crate::services::swap::quote::units_to_float;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use std::time::Duration;

// 0.01 ETH kept aside so the wallet can still pay for gas.
const GAS_RESERVE_WEI: u64 = 10_000_000_000_000_000;

/// On-chain balance reads for the signing wallet.
#[derive(Clone)]
pub struct PortfolioView {
    provider: HttpProvider,
    wallet_address: Address,
}

impl PortfolioView {
    pub fn new(provider: HttpProvider, wallet_address: Address) -> Self {
        Self {
            provider,
            wallet_address,
        }
    }

    pub async fn native_balance(&self) -> Result<U256, AppError> {
        let provider = self.provider.clone();
        let addr = self.wallet_address;
        retry_async(
            move |_| {
                let provider = provider.clone();
                async move { provider.get_balance(addr).await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Connection(format!("Balance check failed: {}", e)))
    }

    pub async fn token_balance(&self, token: Address) -> Result<U256, AppError> {
        let contract = ERC20::new(token, self.provider.clone());
        let addr = self.wallet_address;
        retry_async(
            move |_| {
                let c = contract.clone();
                async move { c.balanceOf(addr).call().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Connection(format!("Token balance failed: {}", e)))
    }

    /// Token decimals as reported on chain; callers fall back to config on error.
    pub async fn token_decimals(&self, token: Address) -> Result<u8, AppError> {
        let contract = ERC20::new(token, self.provider.clone());
        retry_async(
            move |_| {
                let c = contract.clone();
                async move { c.decimals().call().await }
            },
            2,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Connection(format!("decimals() failed: {}", e)))
    }

    /// Reject a swap the wallet cannot pay for.
    pub fn ensure_token_funding(
        &self,
        balance: U256,
        required: U256,
        decimals: u8,
    ) -> Result<(), AppError> {
        if balance < required {
            return Err(AppError::InsufficientFunds {
                required: format!("{}", units_to_float(required, decimals)),
                available: format!("{}", units_to_float(balance, decimals)),
            });
        }
        Ok(())
    }

    /// Native balance must cover the gas reserve before any write goes out.
    pub fn ensure_gas_reserve(&self, native_balance: U256) -> Result<(), AppError> {
        let gas_reserve = U256::from(GAS_RESERVE_WEI);
        if native_balance < gas_reserve {
            return Err(AppError::InsufficientFunds {
                required: gas_reserve.to_string(),
                available: native_balance.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn dummy_view() -> PortfolioView {
        let provider = HttpProvider::new_http(Url::parse("http://localhost:8545").unwrap());
        PortfolioView::new(provider, Address::ZERO)
    }

    #[test]
    fn funding_guard_rejects_short_balance() {
        let view = dummy_view();
        let err = view
            .ensure_token_funding(U256::from(500_000u64), U256::from(1_000_000u64), 6)
            .unwrap_err();
        match err {
            AppError::InsufficientFunds {
                required,
                available,
            } => {
                assert_eq!(required, "1");
                assert_eq!(available, "0.5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn funding_guard_accepts_exact_balance() {
        let view = dummy_view();
        assert!(
            view.ensure_token_funding(U256::from(1_000_000u64), U256::from(1_000_000u64), 6)
                .is_ok()
        );
    }

    #[test]
    fn gas_reserve_guard_uses_native_floor() {
        let view = dummy_view();
        assert!(view.ensure_gas_reserve(U256::from(GAS_RESERVE_WEI)).is_ok());
        assert!(
            view.ensure_gas_reserve(U256::from(GAS_RESERVE_WEI - 1))
                .is_err()
        );
    }
}

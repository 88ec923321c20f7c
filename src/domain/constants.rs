// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, B256, address};
use lazy_static::lazy_static;
use std::collections::HashMap;

// Common assets (mainnet unless suffixed)
pub const WETH_MAINNET: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const USDT_MAINNET: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
pub const WETH_OPTIMISM: Address = address!("4200000000000000000000000000000000000006");
pub const WETH_ARBITRUM: Address = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");
pub const WBNB_BSC: Address = address!("BB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_OPTIMISM: u64 = 10;
pub const CHAIN_BSC: u64 = 56;
pub const CHAIN_ARBITRUM: u64 = 42161;

// =============================================================================
// GAS & TRANSACTION CONSTANTS
// =============================================================================

pub const APPROVE_GAS_LIMIT: u64 = 70_000;
pub const SWAP_GAS_LIMIT: u64 = 180_000;
pub const DEFAULT_PRIORITY_FEE_GWEI: u64 = 2;

lazy_static! {
    // V2-compatible routers we know how to talk to, per chain.
    pub static ref V2_ROUTERS_MAINNET: HashMap<&'static str, Address> = {
        let mut m = HashMap::new();
        m.insert("uniswap_v2_router02", address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        m.insert("sushiswap_router", address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F"));
        m
    };

    pub static ref V2_ROUTERS_BSC: HashMap<&'static str, Address> = {
        let mut m = HashMap::new();
        m.insert("pancakeswap_v2_router", address!("10ED43C718714eb63d5aA57B78B54704E256024E"));
        m
    };

    pub static ref V2_ROUTERS_BY_CHAIN: HashMap<u64, &'static HashMap<&'static str, Address>> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, &*V2_ROUTERS_MAINNET);
        m.insert(CHAIN_BSC, &*V2_ROUTERS_BSC);
        m
    };

    pub static ref WRAPPED_NATIVE_BY_CHAIN: HashMap<u64, Address> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, WETH_MAINNET);
        m.insert(CHAIN_OPTIMISM, WETH_OPTIMISM);
        m.insert(CHAIN_ARBITRUM, WETH_ARBITRUM);
        m.insert(CHAIN_BSC, WBNB_BSC);
        m
    };
}

pub fn default_router_for_chain(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_ETHEREUM => V2_ROUTERS_MAINNET.get("uniswap_v2_router02").copied(),
        CHAIN_BSC => V2_ROUTERS_BSC.get("pancakeswap_v2_router").copied(),
        _ => None,
    }
}

pub fn wrapped_native_for_chain(chain_id: u64) -> Address {
    WRAPPED_NATIVE_BY_CHAIN
        .get(&chain_id)
        .copied()
        .unwrap_or(WETH_MAINNET)
}

/// Block-explorer link for a submitted transaction, where we know one.
pub fn explorer_tx_url(chain_id: u64, hash: B256) -> Option<String> {
    let base = match chain_id {
        CHAIN_ETHEREUM => "https://etherscan.io",
        CHAIN_OPTIMISM => "https://optimistic.etherscan.io",
        CHAIN_ARBITRUM => "https://arbiscan.io",
        CHAIN_BSC => "https://bscscan.com",
        _ => return None,
    };
    Some(format!("{base}/tx/{hash:#x}"))
}

// =============================================================================
// LOGGING DEFAULTS
// =============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_links_cover_known_chains() {
        let hash = B256::repeat_byte(0x11);
        let link = explorer_tx_url(CHAIN_ETHEREUM, hash).unwrap();
        assert!(link.starts_with("https://etherscan.io/tx/0x1111"));
        assert!(explorer_tx_url(999_999, hash).is_none());
    }

    #[test]
    fn mainnet_router_defaults_to_uniswap_v2() {
        assert_eq!(
            default_router_for_chain(CHAIN_ETHEREUM),
            Some(address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"))
        );
        assert!(default_router_for_chain(777).is_none());
    }
}

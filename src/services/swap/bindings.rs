// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract UniV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) returns (uint256[] memory amounts);
        function swapExactTokensForETHSupportingFeeOnTransferTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract ERC20 {
        function balanceOf(address) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn approve_selector_matches_erc20_abi() {
        let call = ERC20::approveCall {
            spender: Address::from([1u8; 20]),
            amount: U256::from(1_000_000u64),
        };
        let encoded = call.abi_encode();
        assert_eq!(hex::encode(&encoded[..4]), "095ea7b3");
    }

    #[test]
    fn swap_selectors_match_router_abi() {
        let path = vec![Address::from([1u8; 20]), Address::from([2u8; 20])];
        let swap = UniV2Router::swapExactTokensForETHSupportingFeeOnTransferTokensCall {
            amountIn: U256::from(1u64),
            amountOutMin: U256::from(1u64),
            path: path.clone(),
            to: Address::from([3u8; 20]),
            deadline: U256::from(1u64),
        };
        assert_eq!(hex::encode(&swap.abi_encode()[..4]), "791ac947");

        let quote = UniV2Router::getAmountsOutCall {
            amountIn: U256::from(1u64),
            path,
        };
        assert_eq!(hex::encode(&quote.abi_encode()[..4]), "d06ca61f");
    }

    #[test]
    fn swap_calldata_roundtrips() {
        let path = vec![Address::from([7u8; 20]), Address::from([8u8; 20])];
        let call = UniV2Router::swapExactTokensForETHSupportingFeeOnTransferTokensCall {
            amountIn: U256::from(1_000_000u64),
            amountOutMin: U256::from(42u64),
            path: path.clone(),
            to: Address::from([9u8; 20]),
            deadline: U256::from(1_900_000_000u64),
        };
        let encoded = call.abi_encode();
        let decoded =
            UniV2Router::swapExactTokensForETHSupportingFeeOnTransferTokensCall::abi_decode(
                &encoded,
            )
            .unwrap();
        assert_eq!(decoded.amountIn, U256::from(1_000_000u64));
        assert_eq!(decoded.amountOutMin, U256::from(42u64));
        assert_eq!(decoded.path, path);
    }
}

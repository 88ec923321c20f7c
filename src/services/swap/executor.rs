// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::retry::retry_async;
use crate::domain::constants::{APPROVE_GAS_LIMIT, SWAP_GAS_LIMIT, explorer_tx_url};
use crate::network::gas::{GasFees, GasOracle};
use crate::network::nonce::NonceManager;
use crate::network::provider::HttpProvider;
use crate::services::swap::bindings::{ERC20, UniV2Router};
use crate::services::swap::quote::{Quoter, min_out_after_slippage, swap_deadline, units_to_float, wei_to_eth_f64};
use crate::services::swap::wallet::PortfolioView;
use alloy::consensus::{SignableTransaction, TxEip1559};
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip2930::{AccessList, AccessListItem};
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, Bytes, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy_consensus::TxEnvelope;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Everything the one-shot swap needs to know about its route.
#[derive(Clone, Debug)]
pub struct SwapPlan {
    pub token_in: Address,
    pub token_out: Address,
    pub router: Address,
    pub amount_in: U256,
    pub token_in_decimals: u8,
    pub token_in_symbol: String,
    pub token_out_symbol: String,
    pub slippage_bps: u64,
    pub deadline_secs: u64,
    pub approve_max: bool,
}

impl SwapPlan {
    pub fn path(&self) -> Vec<Address> {
        vec![self.token_in, self.token_out]
    }
}

pub struct SwapExecutor {
    http_provider: HttpProvider,
    signer: PrivateKeySigner,
    chain_id: u64,
    plan: SwapPlan,
    portfolio: PortfolioView,
    quoter: Quoter,
    gas_oracle: GasOracle,
    nonce_manager: NonceManager,
    dry_run: bool,
    max_gas_price_gwei: u64,
    receipt_poll_ms: u64,
    receipt_timeout_ms: u64,
}

impl SwapExecutor {
    pub fn new(
        http_provider: HttpProvider,
        signer: PrivateKeySigner,
        chain_id: u64,
        plan: SwapPlan,
        gas_oracle: GasOracle,
        nonce_manager: NonceManager,
        portfolio: PortfolioView,
        dry_run: bool,
        max_gas_price_gwei: u64,
        receipt_poll_ms: u64,
        receipt_timeout_ms: u64,
    ) -> Self {
        let quoter = Quoter::new(http_provider.clone(), plan.router);
        Self {
            http_provider,
            signer,
            chain_id,
            plan,
            portfolio,
            quoter,
            gas_oracle,
            nonce_manager,
            dry_run,
            max_gas_price_gwei,
            receipt_poll_ms,
            receipt_timeout_ms,
        }
    }

    /// Run the whole sequence: balances, quote, allowance, swap, receipt.
    pub async fn run(&self) -> Result<(), AppError> {
        let native_before = self.portfolio.native_balance().await?;
        tracing::info!(
            target: "swap",
            wallet = %format!("{:#x}", self.signer.address()),
            eth = wei_to_eth_f64(native_before),
            "Wallet balance before swap"
        );

        self.log_unit_price().await;

        let token_balance = self.portfolio.token_balance(self.plan.token_in).await?;
        tracing::info!(
            target: "swap",
            token = %self.plan.token_in_symbol,
            balance = units_to_float(token_balance, self.plan.token_in_decimals),
            "Token balance"
        );
        self.portfolio.ensure_token_funding(
            token_balance,
            self.plan.amount_in,
            self.plan.token_in_decimals,
        )?;
        self.portfolio.ensure_gas_reserve(native_before)?;

        let gas_fees = self.gas_oracle.estimate_eip1559_fees().await?;
        let gas_cap_wei = u128::from(self.max_gas_price_gwei).saturating_mul(1_000_000_000);
        if gas_fees.max_fee_per_gas > gas_cap_wei {
            return Err(AppError::Swap(format!(
                "max_fee_per_gas {} exceeds cap of {} gwei",
                gas_fees.max_fee_per_gas, self.max_gas_price_gwei
            )));
        }

        let mut nonce_cursor = self.nonce_manager.pending_nonce().await?;
        self.ensure_allowance(&gas_fees, &mut nonce_cursor).await?;
        let swap_hash = self.send_swap(&gas_fees, nonce_cursor).await?;

        if !self.dry_run {
            match self.await_receipt(swap_hash).await? {
                Some(true) => {
                    tracing::info!(target: "swap", tx_hash = %format!("{swap_hash:#x}"), "Swap confirmed");
                }
                Some(false) => {
                    return Err(AppError::Transaction {
                        hash: format!("{swap_hash:#x}"),
                        reason: "reverted on-chain".to_string(),
                    });
                }
                None => {
                    tracing::warn!(
                        target: "swap",
                        tx_hash = %format!("{swap_hash:#x}"),
                        "No receipt before timeout; the transaction may still land"
                    );
                }
            }
        }

        match self.portfolio.native_balance().await {
            Ok(native_after) => {
                tracing::info!(
                    target: "swap",
                    eth = wei_to_eth_f64(native_after),
                    "Wallet balance after swap"
                );
            }
            Err(e) => {
                tracing::warn!(target: "swap", error = %e, "Final balance read failed");
            }
        }

        Ok(())
    }

    /// Informational unit-price print. A failed quote is not fatal.
    async fn log_unit_price(&self) {
        let one_unit = U256::from(10u64).pow(U256::from(self.plan.token_in_decimals));
        match self.quoter.amount_out(one_unit, self.plan.path()).await {
            Ok(out) => {
                tracing::info!(
                    target: "swap",
                    "For 1 {} you can buy: {} {}",
                    self.plan.token_in_symbol,
                    wei_to_eth_f64(out),
                    self.plan.token_out_symbol
                );
            }
            Err(e) => {
                tracing::warn!(target: "swap", error = %e, "Unit price quote failed");
            }
        }
    }

    async fn needs_approval(&self, required: U256) -> Result<bool, AppError> {
        let erc20 = ERC20::new(self.plan.token_in, self.http_provider.clone());
        let owner = self.signer.address();
        let spender = self.plan.router;
        let allowance: U256 = retry_async(
            move |_| {
                let c = erc20.clone();
                async move { c.allowance(owner, spender).call().await }
            },
            2,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Swap(format!("Allowance check failed: {}", e)))?;
        Ok(allowance < required)
    }

    /// Send an approval when the router allowance is short. The swap follows
    /// on the next nonce without waiting for this receipt; the node orders
    /// both by nonce.
    async fn ensure_allowance(
        &self,
        gas_fees: &GasFees,
        nonce_cursor: &mut u64,
    ) -> Result<(), AppError> {
        if !self.needs_approval(self.plan.amount_in).await? {
            tracing::info!(
                target: "swap",
                token = %self.plan.token_in_symbol,
                "Allowance already covers the swap amount, skipping approval"
            );
            return Ok(());
        }

        let approve_amount = if self.plan.approve_max {
            U256::MAX
        } else {
            self.plan.amount_in
        };
        let calldata = ERC20::new(self.plan.token_in, self.http_provider.clone())
            .approve(self.plan.router, approve_amount)
            .calldata()
            .to_vec();

        let nonce = *nonce_cursor;
        *nonce_cursor = nonce_cursor.saturating_add(1);
        let fallback = Self::access_list_for(self.plan.router, &[self.plan.token_in]);
        let (raw, hash) = self
            .sign_request(
                self.plan.token_in,
                APPROVE_GAS_LIMIT,
                U256::ZERO,
                gas_fees,
                nonce,
                calldata,
                fallback,
            )
            .await?;
        self.submit(&raw, hash, "approve").await
    }

    async fn send_swap(&self, gas_fees: &GasFees, nonce: u64) -> Result<B256, AppError> {
        let expected_out = self
            .quoter
            .amount_out(self.plan.amount_in, self.plan.path())
            .await?;
        let min_out = min_out_after_slippage(expected_out, self.plan.slippage_bps);
        let deadline = swap_deadline(self.plan.deadline_secs);
        tracing::info!(
            target: "swap",
            amount_in = units_to_float(self.plan.amount_in, self.plan.token_in_decimals),
            expected_out = wei_to_eth_f64(expected_out),
            min_out = wei_to_eth_f64(min_out),
            slippage_bps = self.plan.slippage_bps,
            "Swap quote"
        );

        let calldata = UniV2Router::new(self.plan.router, self.http_provider.clone())
            .swapExactTokensForETHSupportingFeeOnTransferTokens(
                self.plan.amount_in,
                min_out,
                self.plan.path(),
                self.signer.address(),
                deadline,
            )
            .calldata()
            .to_vec();

        let fallback = Self::access_list_for(self.plan.router, &[self.plan.token_in]);
        let (raw, hash) = self
            .sign_request(
                self.plan.router,
                SWAP_GAS_LIMIT,
                U256::ZERO,
                gas_fees,
                nonce,
                calldata,
                fallback,
            )
            .await?;
        self.submit(&raw, hash, "swap").await?;
        Ok(hash)
    }

    async fn populate_access_list(&self, req: &mut TransactionRequest) {
        match self.http_provider.create_access_list(&req.clone()).await {
            Ok(res) => {
                let list = res.ensure_ok().map(|r| r.access_list).unwrap_or_default();
                if !list.0.is_empty() {
                    req.access_list = Some(list);
                }
            }
            Err(e) => {
                tracing::debug!(
                    target: "access_list",
                    error = %e,
                    "eth_createAccessList failed; continuing without access list"
                );
            }
        }
    }

    async fn sign_request(
        &self,
        to: Address,
        gas_limit: u64,
        value: U256,
        gas_fees: &GasFees,
        nonce: u64,
        calldata: Vec<u8>,
        fallback: AccessList,
    ) -> Result<(Vec<u8>, B256), AppError> {
        let input_bytes = Bytes::from(calldata);
        let mut request = TransactionRequest {
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(to)),
            max_fee_per_gas: Some(gas_fees.max_fee_per_gas),
            max_priority_fee_per_gas: Some(gas_fees.max_priority_fee_per_gas),
            gas: Some(gas_limit),
            value: Some(value),
            input: TransactionInput::new(input_bytes.clone()),
            nonce: Some(nonce),
            chain_id: Some(self.chain_id),
            ..Default::default()
        };
        self.populate_access_list(&mut request).await;
        let access_list = request.access_list.clone().unwrap_or(fallback);

        let mut tx = TxEip1559 {
            chain_id: self.chain_id,
            nonce,
            max_priority_fee_per_gas: gas_fees.max_priority_fee_per_gas,
            max_fee_per_gas: gas_fees.max_fee_per_gas,
            gas_limit,
            to: TxKind::Call(to),
            value,
            access_list,
            input: input_bytes,
        };

        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
            .map_err(|e| AppError::Swap(format!("Sign tx failed: {}", e)))?;
        let signed: TxEnvelope = tx.into_signed(sig).into();
        let raw = signed.encoded_2718();
        Ok((raw, *signed.tx_hash()))
    }

    async fn submit(&self, raw: &[u8], hash: B256, label: &str) -> Result<(), AppError> {
        if self.dry_run {
            tracing::info!(
                target: "swap",
                label,
                tx_hash = %format!("{hash:#x}"),
                "Dry-run: transaction signed but not broadcast"
            );
            return Ok(());
        }

        self.http_provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| AppError::Transaction {
                hash: format!("{hash:#x}"),
                reason: e.to_string(),
            })?;

        match explorer_tx_url(self.chain_id, hash) {
            Some(link) => {
                tracing::info!(target: "swap", label, %link, "Transaction submitted");
            }
            None => {
                tracing::info!(
                    target: "swap",
                    label,
                    tx_hash = %format!("{hash:#x}"),
                    "Transaction submitted"
                );
            }
        }
        Ok(())
    }

    /// Poll for a receipt until the configured timeout. None means unknown.
    async fn await_receipt(&self, hash: B256) -> Result<Option<bool>, AppError> {
        let give_up_at = Instant::now() + Duration::from_millis(self.receipt_timeout_ms);
        loop {
            if let Ok(Some(rcpt)) = self.http_provider.get_transaction_receipt(hash).await {
                return Ok(Some(rcpt.status()));
            }
            if Instant::now() >= give_up_at {
                return Ok(None);
            }
            sleep(Duration::from_millis(self.receipt_poll_ms)).await;
        }
    }

    fn access_list_for(router: Address, tokens: &[Address]) -> AccessList {
        let mut items = Vec::with_capacity(tokens.len() + 1);
        items.push(AccessListItem {
            address: router,
            storage_keys: Vec::new(),
        });
        for token in tokens {
            items.push(AccessListItem {
                address: *token,
                storage_keys: Vec::new(),
            });
        }
        AccessList(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::{USDT_MAINNET, WETH_MAINNET};

    #[test]
    fn plan_path_orders_token_in_first() {
        let plan = SwapPlan {
            token_in: USDT_MAINNET,
            token_out: WETH_MAINNET,
            router: Address::ZERO,
            amount_in: U256::from(1_000_000u64),
            token_in_decimals: 6,
            token_in_symbol: "USDT".to_string(),
            token_out_symbol: "ETH".to_string(),
            slippage_bps: 100,
            deadline_secs: 300,
            approve_max: false,
        };
        assert_eq!(plan.path(), vec![USDT_MAINNET, WETH_MAINNET]);
    }

    #[test]
    fn fallback_access_list_covers_router_and_tokens() {
        let router = Address::from([1u8; 20]);
        let token = Address::from([2u8; 20]);
        let list = SwapExecutor::access_list_for(router, &[token]);
        assert_eq!(list.0.len(), 2);
        assert_eq!(list.0[0].address, router);
        assert_eq!(list.0[1].address, token);
        assert!(list.0.iter().all(|item| item.storage_keys.is_empty()));
    }
}

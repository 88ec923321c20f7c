// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::{Address, U256};
use std::str::FromStr;

pub fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    Address::from_str(strip_0x(s)).ok()
}

/// Parse a human decimal amount (e.g. "1.5") into base units of a token.
/// Rejects more fractional digits than the token carries.
pub fn parse_token_amount(raw: &str, decimals: u8) -> Option<U256> {
    let s = raw.trim();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.len() > decimals as usize {
        return None;
    }
    let digits_only =
        |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !int_part.is_empty() && !digits_only(int_part) {
        return None;
    }
    if !frac_part.is_empty() && !digits_only(frac_part) {
        return None;
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_val = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).ok()?
    };
    let frac_val = if frac_part.is_empty() {
        U256::ZERO
    } else {
        let pad = decimals as usize - frac_part.len();
        let raw_frac = U256::from_str_radix(frac_part, 10).ok()?;
        raw_frac.checked_mul(U256::from(10u64).pow(U256::from(pad as u64)))?
    };

    int_val.checked_mul(scale)?.checked_add(frac_val)
}

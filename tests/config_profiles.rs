// SPDX-License-Identifier: MIT
// Profile-file loading behavior for GlobalSettings, exercised through real
// files on disk instead of in-memory builders.

use mitander_swap::app::config::GlobalSettings;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

const WALLET_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const WALLET_ADDR: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

fn write_profile(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create profile");
    file.write_all(body.as_bytes()).expect("write profile");
    path.to_string_lossy().into_owned()
}

#[test]
fn explicit_profile_path_loads_and_defaults_apply() {
    let _env_lock = env_lock_guard();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_profile(
        &dir,
        "swap.toml",
        &format!(
            r#"
wallet_key = "{WALLET_KEY}"
wallet_address = "{WALLET_ADDR}"
chain_id = 1
amount = "2.5"

[http_providers]
"1" = "http://localhost:8545"
"#
        ),
    );

    let settings = GlobalSettings::load_with_path(Some(&path)).expect("load profile");
    assert_eq!(settings.chain_id, Some(1));
    assert_eq!(settings.amount, "2.5");
    // Defaults kick in for everything the profile leaves out.
    assert_eq!(settings.slippage_bps, 100);
    assert_eq!(settings.deadline_secs, 300);
    assert_eq!(settings.token_in_symbol, "USDT");
    assert!(!settings.approve_max);
    assert_eq!(
        settings.get_http_provider(1).expect("rpc url"),
        "http://localhost:8545"
    );
}

#[test]
fn config_path_env_var_selects_profile() {
    let _env_lock = env_lock_guard();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_profile(
        &dir,
        "env-selected.toml",
        &format!(
            r#"
wallet_key = "{WALLET_KEY}"
wallet_address = "{WALLET_ADDR}"
slippage_bps = 50
"#
        ),
    );

    unsafe { std::env::set_var("CONFIG_PATH", &path) };
    let loaded = GlobalSettings::load_with_path(None);
    unsafe { std::env::remove_var("CONFIG_PATH") };

    let settings = loaded.expect("load via CONFIG_PATH");
    assert_eq!(settings.slippage_bps, 50);
}

#[test]
fn out_of_range_slippage_is_rejected_at_load() {
    let _env_lock = env_lock_guard();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_profile(
        &dir,
        "bad-slippage.toml",
        &format!(
            r#"
wallet_key = "{WALLET_KEY}"
wallet_address = "{WALLET_ADDR}"
slippage_bps = 10001
"#
        ),
    );

    let err = GlobalSettings::load_with_path(Some(&path)).expect_err("slippage over 100%");
    assert!(err.to_string().contains("slippage_bps"));
}

#[test]
fn missing_wallet_key_is_rejected_at_load() {
    let _env_lock = env_lock_guard();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_profile(
        &dir,
        "no-key.toml",
        &format!(
            r#"
wallet_address = "{WALLET_ADDR}"
"#
        ),
    );

    assert!(GlobalSettings::load_with_path(Some(&path)).is_err());
}

#[test]
fn malformed_wallet_address_is_rejected_at_load() {
    let _env_lock = env_lock_guard();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_profile(
        &dir,
        "bad-address.toml",
        &format!(
            r#"
wallet_key = "{WALLET_KEY}"
wallet_address = "not-an-address"
"#
        ),
    );

    assert!(GlobalSettings::load_with_path(Some(&path)).is_err());
}

#[test]
fn malformed_amount_is_rejected_at_load() {
    let _env_lock = env_lock_guard();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_profile(
        &dir,
        "bad-amount.toml",
        &format!(
            r#"
wallet_key = "{WALLET_KEY}"
wallet_address = "{WALLET_ADDR}"
amount = "one point five"
"#
        ),
    );

    let err = GlobalSettings::load_with_path(Some(&path)).expect_err("non-numeric amount");
    assert!(err.to_string().contains("amount"));
}

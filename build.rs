//! Exports build metadata to the crate as compile-time environment variables
//!
//! `KAFKA_BRIDGE_CALLBACK_ABI` comes from `[package.metadata]` in the manifest,
//! `KAFKA_BRIDGE_BUILD_TIME` from the clock and `KAFKA_BRIDGE_GIT_HASH` from the
//! checkout. Anything that cannot be determined is reported as "unknown".

use std::path::Path;
use std::process::Command;

fn callback_abi(manifest: &Path) -> Option<i64> {
    let text = std::fs::read_to_string(manifest).ok()?;
    let table: toml::Table = text.parse().ok()?;
    table
        .get("package")?
        .get("metadata")?
        .get("callback_abi_version")?
        .as_integer()
}

fn short_git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_owned()).filter(|hash| !hash.is_empty())
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_owned());
    let manifest = Path::new(&manifest_dir).join("Cargo.toml");

    let abi = callback_abi(&manifest).map_or_else(|| "unknown".to_owned(), |abi| abi.to_string());
    let built = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let hash = short_git_hash().unwrap_or_else(|| "unknown".to_owned());

    println!("cargo:rustc-env=KAFKA_BRIDGE_CALLBACK_ABI={abi}");
    println!("cargo:rustc-env=KAFKA_BRIDGE_BUILD_TIME={built}");
    println!("cargo:rustc-env=KAFKA_BRIDGE_GIT_HASH={hash}");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

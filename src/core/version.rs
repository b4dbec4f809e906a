//! Build metadata and callback ABI version
//!
//! Values are exported by the build script from `Cargo.toml` and the git
//! checkout.

const CALLBACK_ABI_VERSION: &str = env!("KAFKA_BRIDGE_CALLBACK_ABI");
const BUILD_TIME: &str = env!("KAFKA_BRIDGE_BUILD_TIME");
const GIT_HASH: &str = env!("KAFKA_BRIDGE_GIT_HASH");

const FALLBACK_ABI_VERSION: u32 = 20250727;

/// Version of the callback signatures this build expects from the library
pub fn callback_abi_version() -> u32 {
    CALLBACK_ABI_VERSION.parse().unwrap_or(FALLBACK_ABI_VERSION)
}

pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured at build time, or "unknown"
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line version banner for `--version` and the run summary
pub fn version_line() -> String {
    format!(
        "{} {} (abi {}, {}, built {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        callback_abi_version(),
        git_hash(),
        build_time()
    )
}

//! Build script for macrotrack
//!
//! Embeds a build number and timestamp. Packagers can pin both through
//! `MACROTRACK_BUILD_NUMBER` and `SOURCE_DATE_EPOCH`; otherwise the counter in
//! `build_number.txt` is bumped and the current time is used.

use std::env;
use std::fs;
use std::path::PathBuf;

const BUILD_NUMBER_VAR: &str = "MACROTRACK_BUILD_NUMBER";
const TIMESTAMP_VAR: &str = "MACROTRACK_BUILD_TIMESTAMP";

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed={}", BUILD_NUMBER_VAR);
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let build_number = match env::var(BUILD_NUMBER_VAR).ok().and_then(|v| v.trim().parse().ok()) {
        Some(pinned) => pinned,
        None => bump_counter(),
    };

    let timestamp = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(chrono::Utc::now)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();

    println!("cargo:rustc-env={}={}", BUILD_NUMBER_VAR, build_number);
    println!("cargo:rustc-env={}={}", TIMESTAMP_VAR, timestamp);
}

/// Increment the counter file next to Cargo.toml and return the new value
fn bump_counter() -> u64 {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(manifest_dir).join("build_number.txt");

    let previous: u64 = fs::read_to_string(&path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let next = previous + 1;

    // A read-only source tree still builds, just without a fresh number
    if let Err(e) = fs::write(&path, next.to_string()) {
        println!("cargo:warning=could not update {}: {}", path.display(), e);
    }
    next
}

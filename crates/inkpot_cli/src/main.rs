//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `inkpot_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // A tiny probe validates core crate wiring independently from any host
    // application or transport layer setup.
    println!("inkpot_core ping={}", inkpot_core::ping());
    println!("inkpot_core version={}", inkpot_core::core_version());
}

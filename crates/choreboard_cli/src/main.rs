//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `choreboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("choreboard_core ping={}", choreboard_core::ping());
    println!("choreboard_core version={}", choreboard_core::core_version());
}

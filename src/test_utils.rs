//! Test-only helpers shared by the proptest suites.

pub fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
}

fn is_ci() -> bool {
    std::env::var_os("CI").is_some()
}

/// Number of proptest cases to run.
///
/// `PROPTEST_CASES` overrides everything; CI runs the suite's default;
/// local runs are clamped down so `cargo test` stays quick.
pub fn proptest_cases(default: u32) -> u32 {
    if let Some(value) = env_u32("PROPTEST_CASES") {
        return value.max(1);
    }
    if is_ci() {
        return default.max(1);
    }
    default.clamp(1, 4)
}

#![allow(dead_code)]

pub use unitypipe_test_utils::builders;
pub use unitypipe_test_utils::fake_executor::FakeExecutor;
pub use unitypipe_test_utils::{init_tracing, with_timeout};

/// Value following `flag` in an argv.
pub fn arg_after<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
    argv.iter()
        .position(|a| a == flag)
        .and_then(|i| argv.get(i + 1))
        .map(String::as_str)
}

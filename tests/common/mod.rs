#![allow(dead_code, unused_imports)]

pub use arkforge_test_utils::builders::{self, ConfigBuilder, sh};
pub use arkforge_test_utils::{CapturedEvent, LogCapture, init_tracing, with_timeout};

use arkforge::exec::Runner;

/// A runner whose records land in a fresh capture.
pub fn capturing_runner() -> (Runner, LogCapture) {
    let capture = LogCapture::new();
    let runner = Runner::new(capture.dispatch());
    (runner, capture)
}

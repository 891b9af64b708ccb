#![allow(dead_code)]

pub mod synthetic_scene;

/// Routes `log` output through the test harness; repeat calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

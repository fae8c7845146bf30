//! Test-only tracing setup, patterned on the `flow_cli_common::init_logging`
//! convention this workspace's reference codebase uses for its binaries — except
//! this crate ships no binary, so the subscriber is only ever installed from
//! integration tests via [`init_test_tracing`].

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a compact, ANSI-free `tracing` subscriber writing to stderr at
/// `debug` level, exactly once per process. Safe to call from every test in a
/// suite; later calls are no-ops.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_ansi(false)
            .with_test_writer()
            .init();
    });
}

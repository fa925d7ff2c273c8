//! Test modules for the executor crate.
//!
//! Every test drives the engine through a scripted [`mock::MockRunner`]; no
//! test touches the network.

pub mod mock;


/// Route engine logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

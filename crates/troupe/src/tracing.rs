/// Initializes the tracing/logging infrastructure for the host program.
///
/// Structured logging via the `tracing` crate with environment-based
/// filtering: set `RUST_LOG` to control verbosity, e.g. `RUST_LOG=debug` or
/// `RUST_LOG=troupe=trace` for just the runtime's own events (actor
/// creation and death at `debug`, mailbox overflow at `warn`, per-message
/// relay at `trace`).
///
/// Call once, early in `main`. Libraries embedding the runtime should leave
/// subscriber installation to the binary.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

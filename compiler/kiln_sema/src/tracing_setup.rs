//! Tracing subscriber installation.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a global tracing subscriber.
///
/// The filter comes from `KILN_LOG`, falling back to `RUST_LOG`; nothing is
/// installed when neither is set. `KILN_LOG_TREE=1` switches to indented
/// span-tree output. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = std::env::var("KILN_LOG")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
        else {
            return;
        };
        let filter = EnvFilter::new(directives);

        let registry = tracing_subscriber::registry().with(filter);
        let result = if std::env::var_os("KILN_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };
        // Another subscriber may already be installed by the host.
        let _ = result;
    });
}

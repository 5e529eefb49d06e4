//! Tracing subscriber for debugging the analyses.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a global subscriber filtered by `STRAND_LOG`.
///
/// Does nothing unless `STRAND_LOG` is set, e.g. `STRAND_LOG=strand_async=trace`.
/// With `STRAND_LOG_TREE` set, events are printed as an indented tree of
/// spans instead of one line each. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(directives) = std::env::var("STRAND_LOG") else {
            return;
        };
        let filter = EnvFilter::new(directives);
        let registry = tracing_subscriber::registry().with(filter);
        // Another subscriber may already be installed by the embedding tool.
        let _ = if std::env::var_os("STRAND_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .try_init()
        };
    });
}

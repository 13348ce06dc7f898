use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`). With `trace` set, spans
/// are also recorded for chrome://tracing or https://ui.perfetto.dev/.
///
/// Make sure to store the returned guard in a variable in the scope to be instrumented,
/// otherwise the trace will be flushed and closed immediately.
pub fn init(trace: bool) -> Option<FlushGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_filter(filter);

    if trace {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(chrome_layer)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry().with(fmt_layer).init();
        None
    }
}

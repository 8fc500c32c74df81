use crate::core::settings::DEFAULT_LOG_DIRECTIVES;
use anyhow::Result;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

/// Empty time formatter that doesn't print anything
struct EmptyTime;

impl FormatTime for EmptyTime {
    fn format_time(&self, _: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

/// Filter from `RUST_LOG` plus the default directives
pub fn log_filter() -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Install a colored, timestamp-free subscriber for hosts that don't use
/// Bevy's `LogPlugin`. Fails if a global subscriber is already set.
pub fn init_logger() -> Result<()> {
    let format = format()
        .with_timer(EmptyTime)
        .with_level(true)
        .with_target(true)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_filter(log_filter()?),
        )
        .try_init()?;
    Ok(())
}

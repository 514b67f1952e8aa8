//! Structured logging setup: `slog-term` (human, default) or `slog-json`
//! (`--log-format json`), wrapped in `slog-async` so logging from
//! request-handling tasks never blocks on I/O.

use slog::{o, Drain};

use crate::config::LogFormat;

pub fn build_logger(format: LogFormat, verbose: bool) -> slog::Logger {
    let level = if verbose {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };

    match format {
        LogFormat::Pretty => {
            let decorator = slog_term::TermDecorator::new().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            let drain = slog_async::Async::new(drain).build().fuse();
            let drain = slog::LevelFilter::new(drain, level).fuse();
            slog::Logger::root(drain, o!())
        }
        LogFormat::Json => {
            let drain = slog_json::Json::default(std::io::stdout()).fuse();
            let drain = slog_async::Async::new(drain).build().fuse();
            let drain = slog::LevelFilter::new(drain, level).fuse();
            slog::Logger::root(drain, o!())
        }
    }
}

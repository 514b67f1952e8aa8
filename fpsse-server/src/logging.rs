//! Structured logging setup, mirroring `fpsse-client`'s: `slog-term` or
//! `slog-json`, wrapped in `slog-async` for non-blocking logging from
//! request-handling tasks.

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

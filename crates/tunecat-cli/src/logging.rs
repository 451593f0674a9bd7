//! Structured event output for the core library's `tracing` events

use crate::GlobalOpts;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tunecat_logger as logger;

/// Filter directive for the given options; `RUST_LOG` takes precedence
pub fn default_directive(opts: &GlobalOpts) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbosity_level() {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a compact stderr layer, plus a plain-text copy into the log file
/// when the logger has one
pub fn init_tracing(opts: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(opts)));

    let file_layer = logger::open_log_file().map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let mut opts = GlobalOpts::default();
        assert_eq!(default_directive(&opts), "warn");

        opts.verbose = 1;
        assert_eq!(default_directive(&opts), "debug");

        opts.verbose = 3;
        assert_eq!(default_directive(&opts), "trace");

        opts.quiet = true;
        assert_eq!(default_directive(&opts), "error");
    }
}

//! Common functionality.

use byte_unit::{Byte, UnitType};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::level_filters::LevelFilter;

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
///
/// Silently does nothing where `/proc` is not available.
pub fn trace_rss_now() {
    let rss = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    if let Ok(rss) = rss {
        tracing::debug!(
            "RSS now: {:.2}",
            Byte::from_u64(rss).get_appropriate_unit(UnitType::Binary)
        );
    }
}

/// Convert the `clap-verbosity-flag` level into a `tracing` level filter.
pub fn level_filter(verbose: &Verbosity<InfoLevel>) -> LevelFilter {
    match verbose.log_level() {
        Some(level) => match level {
            log::Level::Error => LevelFilter::ERROR,
            log::Level::Warn => LevelFilter::WARN,
            log::Level::Info => LevelFilter::INFO,
            log::Level::Debug => LevelFilter::DEBUG,
            log::Level::Trace => LevelFilter::TRACE,
        },
        None => LevelFilter::OFF,
    }
}

/// Return the version of the `gcgr-vcfmerge` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod test {
    use clap_verbosity_flag::Verbosity;
    use pretty_assertions::assert_eq;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn trace_rss_now_smoke() {
        super::trace_rss_now();
    }

    #[rstest::rstest]
    #[case(0, 0, LevelFilter::INFO)]
    #[case(1, 0, LevelFilter::DEBUG)]
    #[case(2, 0, LevelFilter::TRACE)]
    #[case(0, 1, LevelFilter::WARN)]
    #[case(0, 2, LevelFilter::ERROR)]
    #[case(0, 3, LevelFilter::OFF)]
    fn level_filter(#[case] verbose: u8, #[case] quiet: u8, #[case] expected: LevelFilter) {
        let verbosity = Verbosity::<clap_verbosity_flag::InfoLevel>::new(verbose, quiet);
        assert_eq!(expected, super::level_filter(&verbosity));
    }

    #[test]
    fn worker_version_in_tests() {
        assert_eq!("x.y.z", super::worker_version());
    }
}

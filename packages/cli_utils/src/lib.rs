#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal plumbing for the `verba` binary.
//!
//! [`BatchProgress`] shows how far a batch run has got and which report
//! finished last; [`init_logger`] routes `log` output through the same
//! [`MultiProgress`] so log lines never tear the bar.

pub mod progress;

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

pub use indicatif::MultiProgress;
pub use progress::{NullProgress, ProgressCallback, null_progress};

/// Batch progress bar: `[done/total] last finished report`.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// Adds a bar for a batch of reports to `multi`.
    ///
    /// The bar spins while `dir` is being listed and switches to a counted
    /// bar once [`ProgressCallback::set_total()`] is called.
    #[must_use]
    pub fn new(multi: &MultiProgress, dir: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} listing {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(dir.to_owned());
        Arc::new(Self { bar })
    }
}

impl ProgressCallback for BatchProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "[{pos}/{len}] {bar:30.green/dim} {elapsed_precise} {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message(String::new());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Maps the number of `-v` flags to a default log level.
#[must_use]
pub const fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger behind `indicatif-log-bridge` and returns the
/// [`MultiProgress`] every progress bar must join.
///
/// `verbose` sets the default level (see [`verbosity_level`]); a `RUST_LOG`
/// filter, when set, refines it per module.
#[must_use]
pub fn init_logger(verbose: u8) -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(verbosity_level(verbose));
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    }
    let logger = builder.build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    multi
}

//! Progress bar display for bundle builds

use indicatif::{ProgressBar, ProgressStyle};

/// Progress over the bundles of a build
pub struct BuildProgress {
    bundle_pb: ProgressBar,
}

impl BuildProgress {
    /// Create a progress bar for `total_bundles` bundles
    ///
    /// Nothing is drawn when stderr is not a terminal.
    pub fn new(total_bundles: u64) -> Self {
        if !console::Term::stderr().is_term() {
            return Self::hidden();
        }

        let bundle_style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bundle_pb = ProgressBar::new(total_bundles);
        bundle_pb.set_style(bundle_style);
        Self { bundle_pb }
    }

    pub fn hidden() -> Self {
        Self {
            bundle_pb: ProgressBar::hidden(),
        }
    }

    /// Show the bundle being built
    pub fn update_bundle(&self, bundle_name: &str, step: &str) {
        self.bundle_pb.set_message(format!("{step} {bundle_name}"));
    }

    pub fn inc_bundle(&self) {
        self.bundle_pb.inc(1);
    }

    pub fn finish(&self) {
        self.bundle_pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.bundle_pb.abandon();
    }
}

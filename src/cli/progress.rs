//! CLI-specific progress handling for butterfly-profile
//!
//! Provides a spinner counting encoded ways for the command-line interface.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a spinner for CLI display; the total number of ways is unknown up front
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} ways ({per_sec}) {msg}")
            .expect("Failed to create progress style"),
    );
    pb
}

/// Progress manager for encoding runs
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(message: &str) -> Self {
        let pb = create_progress_bar();

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    pub fn advance(&self, ways: u64) {
        self.pb.inc(ways);
    }

    pub fn finish(&self, message: &str) {
        self.pb.finish_with_message(message.to_string());
    }
}

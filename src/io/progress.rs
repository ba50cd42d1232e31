//! Token progress tracking with per-shard bars and a batch total

use crate::io::configuration::{MAX_INDIVIDUAL_PROGRESS_BARS, PROGRESS_BAR_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Coordinates progress display for token batches
///
/// A run split into shards gets one bar per shard (up to a limit) and a
/// batch bar counting every token; a single shard gets a single bar.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    shard_bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static SHARD_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Tokens: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            shard_bars: Vec::new(),
        }
    }

    /// Create bars for shards of the given sizes
    pub fn initialize(&mut self, shard_sizes: &[usize], label: &str) {
        let total: usize = shard_sizes.iter().sum();

        if shard_sizes.len() > 1 {
            let batch_bar = ProgressBar::new(total as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for (index, &size) in shard_sizes
            .iter()
            .take(MAX_INDIVIDUAL_PROGRESS_BARS)
            .enumerate()
        {
            let bar = ProgressBar::new(size as u64);
            bar.set_style(SHARD_STYLE.clone());
            if shard_sizes.len() > 1 {
                bar.set_prefix(format!("{label} #{index}"));
            } else {
                bar.set_prefix(label.to_string());
            }
            self.shard_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Record one finished token of a shard
    pub fn advance(&self, shard: usize) {
        if let Some(bar) = self.shard_bars.get(shard) {
            bar.inc(1);
        }
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }
    }

    /// Show the token currently being processed by a shard
    pub fn set_current(&self, shard: usize, token_id: usize) {
        if let Some(bar) = self.shard_bars.get(shard) {
            bar.set_message(format!("token {token_id}"));
        }
    }

    /// Mark a shard as done
    pub fn complete_shard(&self, shard: usize) {
        if let Some(bar) = self.shard_bars.get(shard) {
            bar.finish_with_message("✓");
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All tokens processed");
        }
        let _ = self.multi_progress.clear();
    }

    /// Number of individual shard bars shown
    pub fn visible_shards(&self) -> usize {
        self.shard_bars.len()
    }

    /// Whether a batch bar is shown
    pub const fn has_batch_bar(&self) -> bool {
        self.batch_bar.is_some()
    }
}

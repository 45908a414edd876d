// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for summarization runs
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub files_scanned: usize,
    pub units_total: usize,
    pub units_succeeded: usize,
    pub units_failed: usize,
    pub units_cached: usize,
    pub total_bytes_processed: u64,
    pub duration_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        (self.units_succeeded + self.units_failed) as f64 / self.duration_secs as f64
    }

    pub fn bytes_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.total_bytes_processed as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.units_succeeded + self.units_failed;
        if total == 0 {
            return 0.0;
        }
        (self.units_succeeded as f64 / total as f64) * 100.0
    }

    pub fn cache_hit_rate(&self) -> f64 {
        if self.units_succeeded == 0 {
            return 0.0;
        }
        (self.units_cached as f64 / self.units_succeeded as f64) * 100.0
    }
}

/// Shared across workers; all counters are atomic.
pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    units_total: usize,
    units_succeeded: AtomicUsize,
    units_failed: AtomicUsize,
    units_cached: AtomicUsize,
    bytes_processed: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_units: usize) -> Self {
        Self::with_options(total_units, true, true)
    }

    pub fn hidden(total_units: usize) -> Self {
        Self::with_options(total_units, false, false)
    }

    pub fn with_options(total_units: usize, visible: bool, colored: bool) -> Self {
        let multi_progress = if visible {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let main_bar = create_progress_bar(&multi_progress, total_units as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            units_total: total_units,
            units_succeeded: AtomicUsize::new(0),
            units_failed: AtomicUsize::new(0),
            units_cached: AtomicUsize::new(0),
            bytes_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_succeeded(&self, bytes: u64, cached: bool) {
        self.units_succeeded.fetch_add(1, Ordering::SeqCst);
        if cached {
            self.units_cached.fetch_add(1, Ordering::SeqCst);
        }
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.units_failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Summarization complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            files_scanned: 0,
            units_total: self.units_total,
            units_succeeded: self.units_succeeded.load(Ordering::SeqCst),
            units_failed: self.units_failed.load(Ordering::SeqCst),
            units_cached: self.units_cached.load(Ordering::SeqCst),
            total_bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let cached = self.units_cached.load(Ordering::SeqCst);
        let failed = self.units_failed.load(Ordering::SeqCst);

        self.detail_bar
            .set_message(format!("Cached: {} | Failed: {}", cached, failed));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}"
    };
    let chars = if colored { "█▓▒░" } else { "=>-" };

    match ProgressStyle::default_bar().template(template) {
        Ok(style) => bar.set_style(style.progress_chars(chars)),
        Err(e) => tracing::debug!("Falling back to default progress style: {}", e),
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}

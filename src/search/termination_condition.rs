use crate::search::SearchStatistics;
use memory_stats::memory_stats;
use std::time::{Duration, Instant};
use tracing::info;

const LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Wall-clock budget for one solve call, checked once per loop iteration
/// against a monotonic clock. Doubles as the progress reporter: long
/// searches log their counters, elapsed time, and physical memory every
/// few seconds, which is best-effort and silent below info level.
#[derive(Debug)]
pub struct TerminationCondition {
    time_limit: Duration,
    start_time: Instant,
    last_log_time: Instant,
    peak_memory_usage_mb: Option<usize>,
}

impl TerminationCondition {
    pub fn new(time_limit: Duration) -> Self {
        let now = Instant::now();
        Self {
            time_limit,
            start_time: now,
            last_log_time: now,
            peak_memory_usage_mb: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn timed_out(&self) -> bool {
        self.start_time.elapsed() > self.time_limit
    }

    pub fn log_if_needed(&mut self, statistics: &SearchStatistics) {
        if self.last_log_time.elapsed() > LOG_INTERVAL {
            self.last_log_time = Instant::now();
            self.log(statistics);
        }
    }

    pub fn log(&mut self, statistics: &SearchStatistics) {
        let memory_usage = memory_stats().map(|usage| usage.physical_mem / 1024 / 1024);
        self.peak_memory_usage_mb = self.peak_memory_usage_mb.max(memory_usage);
        info!(
            expanded = statistics.expanded,
            generated = statistics.generated,
            reopened = statistics.reopened,
            memory_usage_mb = memory_usage,
            time_elapsed = self.elapsed().as_secs_f64(),
        );
    }

    pub fn finalise(&mut self, statistics: &SearchStatistics) {
        info!(
            expanded = statistics.expanded,
            generated = statistics.generated,
            reopened = statistics.reopened,
            peak_recorded_memory_usage_mb = self.peak_memory_usage_mb,
            total_time_used = self.elapsed().as_secs_f64(),
        );
    }
}

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lapse_span::{TimeSpan, TimeUnit};

use super::ticker::Ticker;
use crate::config;
use crate::error::TimingError;

/// Read-only view of a timer's running flag that can be sent to other
/// threads.
#[derive(Debug, Clone)]
pub struct RunningWatch(Arc<AtomicBool>);

impl RunningWatch {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A start/stop stopwatch accumulating statistics over its intervals.
///
/// Only the running flag is safe to observe from other threads (see
/// [`running_watch`](Self::running_watch)); everything else belongs to the
/// thread driving `start`/`stop`.
///
/// Accessors account for an interval in progress by reading the ticker,
/// without changing any state.
#[derive(Debug)]
pub struct Timer {
    ticker: Arc<dyn Ticker>,
    running: Arc<AtomicBool>,

    /// Tick at which the current interval began. Meaningless while stopped.
    start_time: i64,

    sum_time: i64,
    max_time: i64,
    /// Shortest completed interval; `None` until one completes.
    min_time: Option<i64>,

    /// Started intervals, including one in progress.
    number_of_intervals: u64,
    last_interval_length: i64,
}

impl Timer {
    /// Creates a timer on the process default ticker.
    ///
    /// Fails if the configured default ticker is unknown or unsupported.
    pub fn new() -> Result<Self, TimingError> {
        Ok(Self::with_ticker(config::default_ticker()?))
    }

    pub fn with_ticker(ticker: Arc<dyn Ticker>) -> Self {
        Self {
            ticker,
            running: Arc::new(AtomicBool::new(false)),
            start_time: 0,
            sum_time: 0,
            max_time: 0,
            min_time: None,
            number_of_intervals: 0,
            last_interval_length: 0,
        }
    }

    pub fn ticker(&self) -> &Arc<dyn Ticker> {
        &self.ticker
    }

    /// Unit of every span this timer reports.
    pub fn unit(&self) -> TimeUnit {
        self.ticker.unit()
    }

    // ── transitions ───────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<(), TimingError> {
        let now = self.ticker.read();
        self.start_at(now)
    }

    pub(crate) fn start_at(&mut self, now: i64) -> Result<(), TimingError> {
        if self.is_running() {
            return Err(TimingError::IllegalState("timer already running"));
        }
        self.number_of_intervals += 1;
        self.start_time = now;
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), TimingError> {
        let now = self.ticker.read();
        self.stop_at(now)
    }

    pub(crate) fn stop_at(&mut self, now: i64) -> Result<(), TimingError> {
        if !self.is_running() {
            return Err(TimingError::IllegalState("timer not running"));
        }
        let length = now.saturating_sub(self.start_time);
        self.last_interval_length = length;
        self.sum_time = self.sum_time.saturating_add(length);
        self.max_time = self.max_time.max(length);
        self.min_time = Some(self.min_time.map_or(length, |min| min.min(length)));
        self.running.store(false, Ordering::Release);
        Ok(())
    }

    /// Stops the timer if it is running; does nothing otherwise.
    pub fn stop_if_running(&mut self) {
        if self.is_running() {
            let now = self.ticker.read();
            let _ = self.stop_at(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn running_watch(&self) -> RunningWatch {
        RunningWatch(Arc::clone(&self.running))
    }

    // ── ticks as of `now` ─────────────────────────────────────────────────

    fn current_ticks(&self, now: i64) -> i64 {
        if self.is_running() {
            now.saturating_sub(self.start_time)
        } else {
            0
        }
    }

    /// Reads the ticker only if an interval is in progress.
    pub(crate) fn now_if_running(&self) -> i64 {
        if self.is_running() { self.ticker.read() } else { 0 }
    }

    pub(crate) fn completed_sum_ticks(&self) -> i64 {
        self.sum_time
    }

    pub(crate) fn completed_last_interval_ticks(&self) -> i64 {
        self.last_interval_length
    }

    pub(crate) fn sum_ticks(&self, now: i64) -> i64 {
        self.sum_time.saturating_add(self.current_ticks(now))
    }

    pub(crate) fn max_ticks(&self, now: i64) -> i64 {
        self.max_time.max(self.current_ticks(now))
    }

    pub(crate) fn last_interval_ticks(&self, now: i64) -> i64 {
        if self.is_running() {
            self.current_ticks(now)
        } else {
            self.last_interval_length
        }
    }

    fn span(&self, ticks: i64) -> TimeSpan {
        TimeSpan::of(ticks, self.unit())
    }

    // ── statistics ────────────────────────────────────────────────────────

    /// Total time of all intervals, including one in progress.
    pub fn sum_time(&self) -> TimeSpan {
        self.span(self.sum_ticks(self.now_if_running()))
    }

    /// Longest interval, including one in progress.
    pub fn max_time(&self) -> TimeSpan {
        self.span(self.max_ticks(self.now_if_running()))
    }

    /// Shortest completed interval, or empty if none completed yet.
    pub fn min_time(&self) -> TimeSpan {
        self.span(self.min_time.unwrap_or(0))
    }

    /// Mean interval length, or empty before the first start.
    pub fn avg_time(&self) -> TimeSpan {
        if self.number_of_intervals == 0 {
            return TimeSpan::empty();
        }
        let sum = self.sum_ticks(self.now_if_running());
        self.span(sum / self.number_of_intervals as i64)
    }

    /// Length of the interval in progress, or of the last completed one.
    pub fn length_of_last_interval(&self) -> TimeSpan {
        self.span(self.last_interval_ticks(self.now_if_running()))
    }

    /// Number of started intervals. Does not read the ticker.
    pub fn number_of_intervals(&self) -> u64 {
        self.number_of_intervals
    }

    /// `"<sum> (max: <max>, count: <n>)"`.
    pub fn pretty_format(&self) -> String {
        let now = self.now_if_running();
        format!(
            "{} (max: {}, count: {})",
            self.span(self.sum_ticks(now)),
            self.span(self.max_ticks(now)),
            self.number_of_intervals
        )
    }
}

impl fmt::Display for Timer {
    /// The accumulated sum.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.sum_time(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTicker;

    fn manual() -> (Arc<ManualTicker>, Timer) {
        let ticker = Arc::new(ManualTicker::new(TimeUnit::Milliseconds));
        let timer = Timer::with_ticker(ticker.clone());
        (ticker, timer)
    }

    fn ms(n: i64) -> TimeSpan {
        TimeSpan::of_millis(n)
    }

    // ── fresh timer ───────────────────────────────────────────────────────

    #[test]
    fn fresh_timer_is_empty() {
        let (_, timer) = manual();
        assert_eq!(timer.number_of_intervals(), 0);
        assert_eq!(timer.sum_time(), TimeSpan::empty());
        assert_eq!(timer.max_time(), TimeSpan::empty());
        assert_eq!(timer.min_time(), TimeSpan::empty());
        assert_eq!(timer.avg_time(), TimeSpan::empty());
        assert!(!timer.is_running());
    }

    #[test]
    fn stop_before_start_is_illegal() {
        let (_, mut timer) = manual();
        assert!(matches!(timer.stop(), Err(TimingError::IllegalState(_))));
    }

    #[test]
    fn double_start_is_illegal() {
        let (_, mut timer) = manual();
        timer.start().unwrap();
        assert!(matches!(timer.start(), Err(TimingError::IllegalState(_))));
        assert_eq!(timer.number_of_intervals(), 1);
    }

    #[test]
    fn stop_if_running_is_lenient() {
        let (ticker, mut timer) = manual();
        timer.stop_if_running();
        assert_eq!(timer.number_of_intervals(), 0);

        timer.start().unwrap();
        ticker.advance(4);
        timer.stop_if_running();
        assert!(!timer.is_running());
        assert_eq!(timer.sum_time(), ms(4));
    }

    // ── statistics ────────────────────────────────────────────────────────

    #[test]
    fn aggregates_completed_intervals() {
        let (ticker, mut timer) = manual();
        for len in [10, 30, 20] {
            timer.start().unwrap();
            ticker.advance(len);
            timer.stop().unwrap();
            ticker.advance(100);
        }
        assert_eq!(timer.number_of_intervals(), 3);
        assert_eq!(timer.sum_time(), ms(60));
        assert_eq!(timer.max_time(), ms(30));
        assert_eq!(timer.min_time(), ms(10));
        assert_eq!(timer.avg_time(), ms(20));
        assert_eq!(timer.length_of_last_interval(), ms(20));
    }

    #[test]
    fn running_interval_is_extrapolated() {
        let (ticker, mut timer) = manual();
        timer.start().unwrap();
        ticker.advance(5);
        timer.stop().unwrap();

        timer.start().unwrap();
        ticker.advance(40);
        assert!(timer.is_running());
        assert_eq!(timer.sum_time(), ms(45));
        assert_eq!(timer.max_time(), ms(40));
        assert_eq!(timer.length_of_last_interval(), ms(40));
        assert_eq!(timer.avg_time(), TimeSpan::of_micros(22_000));
        // Only completed intervals count towards the minimum.
        assert_eq!(timer.min_time(), ms(5));
        assert_eq!(timer.number_of_intervals(), 2);

        ticker.advance(10);
        assert_eq!(timer.sum_time(), ms(55));
        assert!(timer.is_running());
    }

    #[test]
    fn min_time_empty_until_first_stop() {
        let (ticker, mut timer) = manual();
        timer.start().unwrap();
        ticker.advance(9);
        assert_eq!(timer.min_time(), TimeSpan::empty());
    }

    #[test]
    fn spans_use_ticker_unit() {
        let (_, timer) = manual();
        assert_eq!(timer.unit(), TimeUnit::Milliseconds);
        assert_eq!(timer.sum_time().unit(), TimeUnit::Milliseconds);
    }

    #[test]
    fn pretty_format_lists_sum_max_count() {
        let (ticker, mut timer) = manual();
        timer.start().unwrap();
        ticker.advance(7);
        timer.stop().unwrap();
        let text = timer.pretty_format();
        assert!(text.contains("count: 1"), "{text}");
    }

    // ── running flag ──────────────────────────────────────────────────────

    #[test]
    fn running_watch_observed_from_other_thread() {
        let (_, mut timer) = manual();
        let watch = timer.running_watch();
        timer.start().unwrap();
        let seen = std::thread::spawn(move || watch.is_running()).join().unwrap();
        assert!(seen);
        timer.stop().unwrap();
        assert!(!timer.running_watch().is_running());
    }
}

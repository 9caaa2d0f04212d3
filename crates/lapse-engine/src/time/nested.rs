use std::fmt;
use std::sync::Arc;

use lapse_span::{TimeSpan, TimeUnit};

use super::ticker::Ticker;
use super::timer::{RunningWatch, Timer};
use crate::config;
use crate::error::TimingError;

/// Where a [`NestedTimer`] currently is in its start/stop cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NestedPhase {
    /// Neither timer runs.
    Idle,
    /// The total timer runs, the inner one does not.
    OuterOnly,
    /// Both the total and the inner timer run.
    BothRunning,
}

/// An outer interval in progress and the inner timer that belongs to it.
#[derive(Debug)]
enum Interval {
    Idle,
    Open { inner: Timer },
}

/// A pair of timers splitting elapsed time into an inner and an outer share.
///
/// The total timer measures whole outer intervals. Within each of them, a
/// fresh inner timer can be started and stopped any number of times; whatever
/// part of the interval is not covered by the inner timer is outer time.
/// Inner statistics are kept per outer interval (the sum of the inner
/// timer's intervals), so `max` and `avg` refer to outer intervals.
///
/// Like [`Timer`], only [`is_running`](Self::is_running) may be observed
/// from other threads.
#[derive(Debug)]
pub struct NestedTimer {
    total: Timer,
    interval: Interval,

    inner_sum_time: i64,
    inner_max_time: i64,
    outer_max_time: i64,
    last_inner_interval_length: i64,
    last_outer_interval_length: i64,
}

/// Tick-level view of the open interval as of one ticker read.
struct Open {
    inner: i64,
    total: i64,
}

impl NestedTimer {
    /// Creates a nested timer on the process default ticker.
    pub fn new() -> Result<Self, TimingError> {
        Ok(Self::with_ticker(config::default_ticker()?))
    }

    pub fn with_ticker(ticker: Arc<dyn Ticker>) -> Self {
        Self {
            total: Timer::with_ticker(ticker),
            interval: Interval::Idle,
            inner_sum_time: 0,
            inner_max_time: 0,
            outer_max_time: 0,
            last_inner_interval_length: 0,
            last_outer_interval_length: 0,
        }
    }

    pub fn phase(&self) -> NestedPhase {
        match &self.interval {
            Interval::Idle => NestedPhase::Idle,
            Interval::Open { inner } if inner.is_running() => NestedPhase::BothRunning,
            Interval::Open { .. } => NestedPhase::OuterOnly,
        }
    }

    fn expect_phase(&self, expected: NestedPhase, msg: &'static str) -> Result<(), TimingError> {
        if self.phase() == expected {
            Ok(())
        } else {
            Err(TimingError::IllegalState(msg))
        }
    }

    fn fresh_inner(&self) -> Timer {
        Timer::with_ticker(Arc::clone(self.total.ticker()))
    }

    // ── transitions ───────────────────────────────────────────────────────

    /// Starts an outer interval with the inner timer stopped.
    pub fn start_outer(&mut self) -> Result<(), TimingError> {
        self.expect_phase(NestedPhase::Idle, "nested timer already running")?;
        self.total.start()?;
        self.interval = Interval::Open { inner: self.fresh_inner() };
        Ok(())
    }

    /// Starts an outer interval and its inner timer at the same tick.
    pub fn start_both(&mut self) -> Result<(), TimingError> {
        self.expect_phase(NestedPhase::Idle, "nested timer already running")?;
        let now = self.total.ticker().read();
        let mut inner = self.fresh_inner();
        self.total.start_at(now)?;
        inner.start_at(now)?;
        self.interval = Interval::Open { inner };
        Ok(())
    }

    /// The inner timer of the open outer interval.
    ///
    /// It may be started and stopped freely until the outer interval ends.
    pub fn current_inner_timer(&mut self) -> Result<&mut Timer, TimingError> {
        match &mut self.interval {
            Interval::Open { inner } => Ok(inner),
            Interval::Idle => Err(TimingError::IllegalState("nested timer not running")),
        }
    }

    /// Ends the outer interval. The inner timer must be stopped.
    pub fn stop_outer(&mut self) -> Result<(), TimingError> {
        self.expect_phase(NestedPhase::OuterOnly, "stop_outer requires a stopped inner timer")?;
        let now = self.total.ticker().read();
        self.total.stop_at(now)?;
        self.close_interval();
        Ok(())
    }

    /// Stops the inner timer and ends the outer interval at the same tick.
    pub fn stop_both(&mut self) -> Result<(), TimingError> {
        self.expect_phase(NestedPhase::BothRunning, "stop_both requires a running inner timer")?;
        let now = self.total.ticker().read();
        if let Interval::Open { inner } = &mut self.interval {
            inner.stop_at(now)?;
        }
        self.total.stop_at(now)?;
        self.close_interval();
        Ok(())
    }

    fn close_interval(&mut self) {
        let Interval::Open { inner } = std::mem::replace(&mut self.interval, Interval::Idle) else {
            return;
        };
        let inner_ticks = inner.completed_sum_ticks();
        let outer_ticks = self
            .total
            .completed_last_interval_ticks()
            .saturating_sub(inner_ticks);

        self.inner_sum_time = self.inner_sum_time.saturating_add(inner_ticks);
        self.inner_max_time = self.inner_max_time.max(inner_ticks);
        self.outer_max_time = self.outer_max_time.max(outer_ticks);
        self.last_inner_interval_length = inner_ticks;
        self.last_outer_interval_length = outer_ticks;
    }

    pub fn is_running(&self) -> bool {
        self.total.is_running()
    }

    pub fn running_watch(&self) -> RunningWatch {
        self.total.running_watch()
    }

    pub fn unit(&self) -> TimeUnit {
        self.total.unit()
    }

    // ── statistics ────────────────────────────────────────────────────────

    /// Reads the ticker once and measures the open interval, if any.
    fn open(&self) -> Option<Open> {
        let Interval::Open { inner } = &self.interval else {
            return None;
        };
        let now = self.total.ticker().read();
        Some(Open {
            inner: inner.sum_ticks(now),
            total: self.total.last_interval_ticks(now),
        })
    }

    fn span(&self, ticks: i64) -> TimeSpan {
        TimeSpan::of(ticks, self.unit())
    }

    fn avg(&self, sum: i64) -> TimeSpan {
        match self.number_of_intervals() {
            0 => TimeSpan::empty(),
            n => self.span(sum / n as i64),
        }
    }

    fn inner_sum_ticks(&self, open: Option<&Open>) -> i64 {
        self.inner_sum_time.saturating_add(open.map_or(0, |o| o.inner))
    }

    /// Completed intervals plus the open one, measured at the same tick as
    /// the inner share.
    fn total_sum_ticks(&self, open: Option<&Open>) -> i64 {
        self.total
            .completed_sum_ticks()
            .saturating_add(open.map_or(0, |o| o.total))
    }

    /// Number of outer intervals, including an open one.
    pub fn number_of_intervals(&self) -> u64 {
        self.total.number_of_intervals()
    }

    pub fn inner_sum_time(&self) -> TimeSpan {
        self.span(self.inner_sum_ticks(self.open().as_ref()))
    }

    /// Largest inner share of a single outer interval.
    pub fn inner_max_time(&self) -> TimeSpan {
        let open = self.open().map_or(0, |o| o.inner);
        self.span(self.inner_max_time.max(open))
    }

    /// Mean inner share per outer interval.
    pub fn inner_avg_time(&self) -> TimeSpan {
        self.avg(self.inner_sum_ticks(self.open().as_ref()))
    }

    pub fn outer_sum_time(&self) -> TimeSpan {
        let open = self.open();
        let total = self.total_sum_ticks(open.as_ref());
        self.span(total.saturating_sub(self.inner_sum_ticks(open.as_ref())))
    }

    pub fn outer_max_time(&self) -> TimeSpan {
        let open = self.open().map_or(0, |o| o.total.saturating_sub(o.inner));
        self.span(self.outer_max_time.max(open))
    }

    pub fn outer_avg_time(&self) -> TimeSpan {
        let open = self.open();
        let total = self.total_sum_ticks(open.as_ref());
        self.avg(total.saturating_sub(self.inner_sum_ticks(open.as_ref())))
    }

    pub fn total_sum_time(&self) -> TimeSpan {
        self.span(self.total_sum_ticks(self.open().as_ref()))
    }

    pub fn total_max_time(&self) -> TimeSpan {
        self.total.max_time()
    }

    pub fn total_avg_time(&self) -> TimeSpan {
        self.avg(self.total_sum_ticks(self.open().as_ref()))
    }

    pub fn length_of_last_inner_interval(&self) -> TimeSpan {
        self.span(self.open().map_or(self.last_inner_interval_length, |o| o.inner))
    }

    pub fn length_of_last_outer_interval(&self) -> TimeSpan {
        let ticks = self
            .open()
            .map_or(self.last_outer_interval_length, |o| o.total.saturating_sub(o.inner));
        self.span(ticks)
    }

    pub fn length_of_last_total_interval(&self) -> TimeSpan {
        self.total.length_of_last_interval()
    }

    /// Total, inner and outer sums with their maxima and the interval count.
    pub fn pretty_format(&self) -> String {
        let open = self.open();
        let inner = self.inner_sum_ticks(open.as_ref());
        let total = self.total_sum_ticks(open.as_ref());
        format!(
            "{} (max: {}, count: {}; inner: {}, max: {}; outer: {}, max: {})",
            self.span(total),
            self.total_max_time(),
            self.number_of_intervals(),
            self.span(inner),
            self.inner_max_time(),
            self.span(total.saturating_sub(inner)),
            self.outer_max_time(),
        )
    }
}

impl fmt::Display for NestedTimer {
    /// The accumulated total.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.total_sum_time(), f)
    }
}

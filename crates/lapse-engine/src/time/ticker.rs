use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

use lapse_span::TimeUnit;
use state::InitCell;

use super::cpu;
use crate::error::TimingError;

/// A monotonic source of opaque tick counts.
///
/// Ticks are only meaningful relative to other ticks of the same ticker and
/// are expressed in [`unit`](Ticker::unit).
pub trait Ticker: Send + Sync + fmt::Debug {
    /// Current reading.
    fn read(&self) -> i64;

    /// Granularity of [`read`](Ticker::read).
    fn unit(&self) -> TimeUnit;
}

/// Selector for the built-in tickers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TickerKind {
    #[default]
    WalltimeMillis,
    WalltimeNanos,
    ThreadCputime,
    ProcessCputime,
    None,
}

impl TickerKind {
    pub const ALL: [TickerKind; 5] = [
        TickerKind::WalltimeMillis,
        TickerKind::WalltimeNanos,
        TickerKind::ThreadCputime,
        TickerKind::ProcessCputime,
        TickerKind::None,
    ];

    pub const fn selector(self) -> &'static str {
        match self {
            TickerKind::WalltimeMillis => "WALLTIME_MILLIS",
            TickerKind::WalltimeNanos => "WALLTIME_NANOS",
            TickerKind::ThreadCputime => "THREAD_CPUTIME",
            TickerKind::ProcessCputime => "PROCESS_CPUTIME",
            TickerKind::None => "NONE",
        }
    }
}

impl FromStr for TickerKind {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TickerKind::ALL
            .into_iter()
            .find(|kind| kind.selector().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TimingError::Config(format!("unknown ticker {s:?}")))
    }
}

impl fmt::Display for TickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

// ── built-in tickers ──────────────────────────────────────────────────────

/// Always reads zero.
#[derive(Debug, Default)]
pub struct NullTicker;

impl Ticker for NullTicker {
    fn read(&self) -> i64 {
        0
    }

    fn unit(&self) -> TimeUnit {
        TimeUnit::Nanoseconds
    }
}

static ANCHOR: InitCell<Instant> = InitCell::new();

fn since_anchor() -> std::time::Duration {
    ANCHOR.get_or_init(Instant::now).elapsed()
}

/// Monotonic wall time in milliseconds since the first wall-time read.
#[derive(Debug, Default)]
pub struct WalltimeMillis;

impl Ticker for WalltimeMillis {
    fn read(&self) -> i64 {
        i64::try_from(since_anchor().as_millis()).unwrap_or(i64::MAX)
    }

    fn unit(&self) -> TimeUnit {
        TimeUnit::Milliseconds
    }
}

/// Monotonic wall time in nanoseconds since the first wall-time read.
#[derive(Debug, Default)]
pub struct WalltimeNanos;

impl Ticker for WalltimeNanos {
    fn read(&self) -> i64 {
        i64::try_from(since_anchor().as_nanos()).unwrap_or(i64::MAX)
    }

    fn unit(&self) -> TimeUnit {
        TimeUnit::Nanoseconds
    }
}

/// CPU time consumed by the calling thread, in nanoseconds.
#[derive(Debug)]
pub struct ThreadCpuTime(());

impl ThreadCpuTime {
    /// Probes the platform with one read; fails if thread CPU time is not
    /// available.
    pub fn new() -> Result<Self, TimingError> {
        cpu::thread_cputime()
            .map(|_| Self(()))
            .map_err(|reason| TimingError::Unsupported { ticker: TickerKind::ThreadCputime, reason })
    }
}

impl Ticker for ThreadCpuTime {
    fn read(&self) -> i64 {
        cpu::thread_cputime().unwrap_or(0)
    }

    fn unit(&self) -> TimeUnit {
        TimeUnit::Nanoseconds
    }
}

/// CPU time consumed by all threads of the process, in nanoseconds.
#[derive(Debug)]
pub struct ProcessCpuTime(());

impl ProcessCpuTime {
    /// Probes the platform with one read; fails if process CPU time is not
    /// available.
    pub fn new() -> Result<Self, TimingError> {
        cpu::process_cputime()
            .map(|_| Self(()))
            .map_err(|reason| TimingError::Unsupported { ticker: TickerKind::ProcessCputime, reason })
    }
}

impl Ticker for ProcessCpuTime {
    fn read(&self) -> i64 {
        cpu::process_cputime().unwrap_or(0)
    }

    fn unit(&self) -> TimeUnit {
        TimeUnit::Nanoseconds
    }
}

/// A ticker that only moves when told to.
///
/// Useful for deterministic tests and simulations.
#[derive(Debug)]
pub struct ManualTicker {
    now: AtomicI64,
    unit: TimeUnit,
}

impl ManualTicker {
    pub fn new(unit: TimeUnit) -> Self {
        Self { now: AtomicI64::new(0), unit }
    }

    pub fn advance(&self, ticks: i64) {
        self.now.fetch_add(ticks, Ordering::Relaxed);
    }

    pub fn set(&self, ticks: i64) {
        self.now.store(ticks, Ordering::Relaxed);
    }
}

impl Ticker for ManualTicker {
    fn read(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }

    fn unit(&self) -> TimeUnit {
        self.unit
    }
}

// ── shared instances ──────────────────────────────────────────────────────

type SharedTicker = Result<Arc<dyn Ticker>, TimingError>;

/// One slot per `TickerKind`, in `TickerKind::ALL` order. Each slot is
/// constructed on first request and never changes afterwards, including a
/// failed construction.
static SHARED: [InitCell<SharedTicker>; 5] = [const { InitCell::new() }; 5];

fn construct(kind: TickerKind) -> SharedTicker {
    let ticker: Arc<dyn Ticker> = match kind {
        TickerKind::WalltimeMillis => Arc::new(WalltimeMillis),
        TickerKind::WalltimeNanos => Arc::new(WalltimeNanos),
        TickerKind::ThreadCputime => Arc::new(ThreadCpuTime::new()?),
        TickerKind::ProcessCputime => Arc::new(ProcessCpuTime::new()?),
        TickerKind::None => Arc::new(NullTicker),
    };
    log::debug!("constructed {kind} ticker ({})", ticker.unit());
    Ok(ticker)
}

/// The process-wide instance of the ticker selected by `kind`.
pub fn ticker_for(kind: TickerKind) -> Result<Arc<dyn Ticker>, TimingError> {
    SHARED[kind as usize]
        .get_or_init(|| {
            construct(kind).inspect_err(|e| log::warn!("{e}"))
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── selectors ─────────────────────────────────────────────────────────

    #[test]
    fn selectors_round_trip() {
        for kind in TickerKind::ALL {
            assert_eq!(kind.selector().parse::<TickerKind>(), Ok(kind));
        }
        assert_eq!("walltime_nanos".parse::<TickerKind>(), Ok(TickerKind::WalltimeNanos));
    }

    #[test]
    fn unknown_selector_is_config_error() {
        assert!(matches!("SUNDIAL".parse::<TickerKind>(), Err(TimingError::Config(_))));
    }

    #[test]
    fn default_kind_is_walltime_millis() {
        assert_eq!(TickerKind::default(), TickerKind::WalltimeMillis);
    }

    // ── readings ──────────────────────────────────────────────────────────

    #[test]
    fn null_ticker_reads_zero() {
        let t = ticker_for(TickerKind::None).unwrap();
        assert_eq!(t.read(), 0);
        assert_eq!(t.read(), 0);
    }

    #[test]
    fn walltime_is_monotonic() {
        for kind in [TickerKind::WalltimeMillis, TickerKind::WalltimeNanos] {
            let t = ticker_for(kind).unwrap();
            let a = t.read();
            let b = t.read();
            assert!(b >= a);
        }
    }

    #[test]
    fn units_match_kind() {
        assert_eq!(ticker_for(TickerKind::WalltimeMillis).unwrap().unit(), TimeUnit::Milliseconds);
        assert_eq!(ticker_for(TickerKind::WalltimeNanos).unwrap().unit(), TimeUnit::Nanoseconds);
    }

    #[test]
    fn shared_instance_is_reused() {
        let a = ticker_for(TickerKind::WalltimeNanos).unwrap();
        let b = ticker_for(TickerKind::WalltimeNanos).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn cpu_time_available_on_linux() {
        let t = ticker_for(TickerKind::ThreadCputime).unwrap();
        let a = t.read();
        let mut x = 0u64;
        for i in 0..100_000u64 {
            x = x.wrapping_mul(31).wrapping_add(i);
        }
        std::hint::black_box(x);
        assert!(t.read() >= a);
        assert!(ticker_for(TickerKind::ProcessCputime).is_ok());
    }

    #[test]
    fn manual_ticker_moves_on_demand() {
        let t = ManualTicker::new(TimeUnit::Microseconds);
        assert_eq!(t.read(), 0);
        t.advance(15);
        assert_eq!(t.read(), 15);
        t.set(3);
        assert_eq!(t.read(), 3);
        assert_eq!(t.unit(), TimeUnit::Microseconds);
    }
}

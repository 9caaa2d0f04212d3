use lapse_engine::config::{self, TimingConfig, init_timing};
use lapse_engine::time::{NestedTimer, TickerKind, Timer, ticker_for};
use lapse_engine::TimingError;

fn configure() {
    init_timing(TimingConfig {
        ticker: Some("SUNDIAL".into()),
        span_format: None,
    });
}

#[test]
fn default_timers_fail_with_config_error() {
    configure();
    assert!(matches!(Timer::new(), Err(TimingError::Config(_))));
    assert!(matches!(NestedTimer::new(), Err(TimingError::Config(_))));
    assert!(matches!(config::check_config(), Err(TimingError::Config(_))));
}

#[test]
fn explicit_ticker_still_usable() {
    configure();
    let mut timer = Timer::with_ticker(ticker_for(TickerKind::WalltimeNanos).unwrap());
    timer.start().unwrap();
    timer.stop().unwrap();
    assert_eq!(timer.number_of_intervals(), 1);
}

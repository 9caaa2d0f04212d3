//! `lapse-probe [SPAN...]`
//!
//! Parses each argument as a time span and prints it in every format, then
//! measures a short nested workload with the configured default ticker.
//!
//! Set `LAPSE_TICKER` / `LAPSE_SPAN_FORMAT` to try other tickers and formats.

use std::time::Duration;

use anyhow::{Context, Result};
use lapse_engine::config::{self, TimingConfig, init_timing};
use lapse_engine::logging::{LoggingConfig, init_logging};
use lapse_engine::time::NestedTimer;
use lapse_span::{TimeSpan, TimeUnit};

const ROUNDS: u32 = 4;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    init_timing(TimingConfig::default());
    config::check_config().context("invalid timing configuration")?;

    let spans = std::env::args()
        .skip(1)
        .map(|arg| {
            let span = arg
                .parse::<TimeSpan>()
                .with_context(|| format!("cannot parse {arg:?} as a time span"))?;
            Ok((arg, span))
        })
        .collect::<Result<Vec<_>>>()?;

    for (arg, span) in &spans {
        println!(
            "{arg:>16}  {:<14} {:<12} {}",
            span.format_simple(),
            span.format_as(TimeUnit::Seconds),
            span.format_human_readable_large(),
        );
    }
    if spans.len() > 1 {
        let total = TimeSpan::sum_all(spans.iter().map(|(_, span)| *span))
            .context("sum of spans overflows")?;
        println!("{:>16}  {total}", "total");
    }

    println!();
    println!("{}", measure_workload()?.pretty_format());
    Ok(())
}

/// Alternates busy work (outer) with short sleeps (inner).
fn measure_workload() -> Result<NestedTimer> {
    let mut timer = NestedTimer::new().context("cannot create timer on default ticker")?;
    log::debug!("measuring in {}", timer.unit());

    for round in 0..ROUNDS {
        timer.start_outer()?;
        std::hint::black_box(spin(200_000 * u64::from(round + 1)));

        let inner = timer.current_inner_timer()?;
        inner.start()?;
        std::thread::sleep(Duration::from_millis(5 * u64::from(round + 1)));
        inner.stop()?;

        timer.stop_outer()?;
    }
    Ok(timer)
}

fn spin(iterations: u64) -> u64 {
    (0..iterations).fold(0u64, |acc, i| acc.wrapping_mul(31).wrapping_add(i))
}

//! Config loading, stack assembly, and the run/simulate commands.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use pour_core::util::tick_period_ms;
use pour_core::{FlowMeter, PourMonitor, PulseBridge, RunSummary, runner};
use pour_hardware::SimulatedTap;
use pour_traits::{Clock, MonotonicClock, Presenter};
use pour_ui::ConsolePresenter;

use crate::cli::Cli;
use crate::store::{TomlStore, load_counters, save_counters};

/// Lifecycle events as JSON lines on stdout, for machine consumers.
struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn show_large_pour(&mut self, volume: f64, lifetime_total: f64, pours: u64) {
        println!(
            "{}",
            serde_json::json!({
                "event": "large_pour",
                "volume": volume,
                "lifetime_total": lifetime_total,
                "pours_before": pours,
            })
        );
    }
    fn show_small_pour(&mut self, volume: f64) {
        println!(
            "{}",
            serde_json::json!({ "event": "small_pour", "volume": volume })
        );
    }
    fn show_progress(&mut self, volume: f64, rate: f64) {
        println!(
            "{}",
            serde_json::json!({ "event": "progress", "volume": volume, "rate": rate })
        );
    }
    fn show_idle(&mut self, lifetime_total: f64, pours: u64) {
        println!(
            "{}",
            serde_json::json!({
                "event": "idle",
                "lifetime_total": lifetime_total,
                "pours": pours,
            })
        );
    }
}

/// Read, overlay, and validate the configuration. A missing file falls back
/// to defaults so a bare checkout still runs; a malformed file does not.
pub fn load_config(path: &Path) -> eyre::Result<pour_config::Config> {
    let mut cfg = if path.exists() {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("read config {}", path.display()))?;
        pour_config::load_toml(&text).map_err(|e| {
            eyre::Report::new(pour_core::PourError::Config(format!(
                "parse config {}: {e}",
                path.display()
            )))
        })?
    } else {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        pour_config::Config::default()
    };
    cfg.apply_env_overrides()?;
    cfg.validate()?;
    Ok(cfg)
}

fn make_presenter(json: bool, cfg: &pour_config::Config) -> Box<dyn Presenter> {
    if json {
        Box::new(JsonPresenter)
    } else {
        Box::new(ConsolePresenter::new(
            cfg.display.beverage.clone(),
            cfg.display.target_pour_size,
            cfg.meter.units.into(),
        ))
    }
}

struct Stack {
    meter: Arc<FlowMeter>,
    bridge: PulseBridge,
    monitor: PourMonitor,
    store: TomlStore,
}

fn assemble(cli: &Cli, cfg: &pour_config::Config) -> eyre::Result<Stack> {
    let store = TomlStore::open(&cli.state)?;
    let meter = Arc::new(FlowMeter::new((&cfg.meter).into()).map_err(eyre::Report::new)?);
    let (lifetime_pulses, pours) = load_counters(&store);
    meter.restore_totals(lifetime_pulses, pours);
    if lifetime_pulses > 0 || pours > 0 {
        tracing::info!(lifetime_pulses, pours, "restored counters from store");
    }

    let bridge = PulseBridge::spawn(meter.clone(), 1024);
    let monitor = PourMonitor::builder()
        .with_meter(meter.clone())
        .with_presenter(make_presenter(cli.json, cfg))
        .with_pour((&cfg.pour).into())
        .with_report((&cfg.report).into())
        .build()?;

    Ok(Stack {
        meter,
        bridge,
        monitor,
        store,
    })
}

fn print_summary(json: bool, summary: &RunSummary, meter: &FlowMeter) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "summary",
                "ticks": summary.ticks,
                "large_pours": summary.large_pours,
                "small_pours": summary.small_pours,
                "lifetime_total": meter.lifetime_total(),
                "pours": meter.completed_pours(),
            })
        );
    } else {
        println!(
            "Served {} pours this session ({} discarded); lifetime total {}",
            summary.large_pours,
            summary.small_pours,
            pour_ui::format_total(meter.lifetime_total(), meter.unit_system()),
        );
    }
}

/// `pour run`: attach the pulse source and monitor until interrupted.
pub fn cmd_run(
    cli: &Cli,
    cfg: &pour_config::Config,
    gpio_pin: Option<u8>,
    paused: bool,
) -> eyre::Result<()> {
    let mut stack = assemble(cli, cfg)?;
    if paused {
        stack.meter.set_enabled(false);
        tracing::info!("measurement starts paused");
    }

    // Pulse source: real sensor when built for hardware, otherwise the
    // configured simulation script plays once while the monitor runs.
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let _source = pour_hardware::GpioPulseSource::open(
        gpio_pin.unwrap_or(cfg.hardware.gpio_pin),
        cfg.hardware.bounce_ms,
        stack.bridge.handle(),
    )
    .map_err(|e| {
        eyre::Report::new(pour_core::PourError::Hardware(format!(
            "attach flow sensor: {e}"
        )))
    })?;
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let _source = {
        let _ = gpio_pin;
        tracing::info!("built without the hardware feature; running the simulation script");
        SimulatedTap::pour(
            stack.bridge.handle(),
            MonotonicClock::new(),
            cfg.simulation.pulse_count,
            cfg.simulation.pulse_gap_ms,
        )
    };

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    })
    .wrap_err("install ctrl-c handler")?;

    let tick_ms = tick_period_ms(cfg.report.progress_interval_ms, cfg.report.idle_interval_ms);
    let summary = runner::run(&mut stack.monitor, &MonotonicClock::new(), tick_ms, &stop);

    save_counters(&mut stack.store, &stack.meter)?;
    print_summary(cli.json, &summary, &stack.meter);
    Ok(())
}

/// `pour simulate`: one scripted pour through the full stack, exiting once
/// the lifecycle has classified it.
pub fn cmd_simulate(
    cli: &Cli,
    cfg: &pour_config::Config,
    pulses: Option<u32>,
    gap_ms: Option<i64>,
) -> eyre::Result<()> {
    let mut stack = assemble(cli, cfg)?;

    let pulses = pulses.unwrap_or(cfg.simulation.pulse_count).max(1);
    let gap_ms = gap_ms.unwrap_or(cfg.simulation.pulse_gap_ms).max(1);
    tracing::info!(pulses, gap_ms, "starting simulated pour");

    let tap = SimulatedTap::pour(stack.bridge.handle(), MonotonicClock::new(), pulses, gap_ms);

    // Enough for the script, the slower closing threshold, and slack.
    let deadline_ms = i64::from(pulses) * gap_ms
        + cfg.pour.large_pour_inactivity_ms.max(cfg.pour.small_pour_inactivity_ms)
        + 5_000;
    let tick = Duration::from_millis(tick_period_ms(
        cfg.report.progress_interval_ms,
        cfg.report.idle_interval_ms,
    ));

    let clock = MonotonicClock::new();
    let epoch = clock.now();
    let mut summary = RunSummary::default();
    let closed = loop {
        let now_ms = clock.ms_since(epoch);
        let event = stack.monitor.tick(now_ms);
        summary.ticks += 1;
        match &event {
            pour_core::TickEvent::LargePour { .. } => summary.large_pours += 1,
            pour_core::TickEvent::SmallPour { .. } => summary.small_pours += 1,
            _ => {}
        }
        if event.closes_pour() {
            break true;
        }
        if now_ms > deadline_ms {
            break false;
        }
        clock.sleep(tick);
    };
    tap.wait();

    save_counters(&mut stack.store, &stack.meter)?;
    if !closed {
        eyre::bail!("simulated pour was not classified within {deadline_ms} ms");
    }
    print_summary(cli.json, &summary, &stack.meter);
    Ok(())
}

//! corridor: headless run of a three-intersection signal corridor.
//!
//! Runs the simulation either as a batch (`run` as fast as possible) or in
//! wall-clock time on the background ticker (`--realtime`), injects the
//! incidents given on the command line at their ticks, and prints a status
//! table every `--report-every` simulated seconds.
//!
//! ```text
//! corridor --ticks 180 --seed 7 --incident B:N:accident@40 --clear-at 120
//! RUST_LOG=debug corridor --config demos/corridor/corridor.toml --realtime
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use ts_core::{Approach, ArbitrationPolicy, SimConfig, Tick};
use ts_incident::IncidentRequest;
use ts_signal::IntersectionSnapshot;
use ts_sim::{SimBuilder, SimObserver, SimSnapshot, Simulation, Ticker};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "corridor")]
#[command(about = "Traffic-signal corridor simulation with incident injection")]
struct Cli {
    /// Simulated seconds to run
    #[arg(long, default_value = "180")]
    ticks: u64,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with SimConfig overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Incident to raise, as `id:approach:kind@tick` (repeatable)
    #[arg(long = "incident", value_parser = parse_scheduled_incident)]
    incidents: Vec<ScheduledIncident>,

    /// Clear every active incident at this tick
    #[arg(long)]
    clear_at: Option<u64>,

    /// Alternate directions under contention instead of letting EW keep the
    /// green it was served last
    #[arg(long)]
    alternate: bool,

    /// Drive the simulation in wall-clock time on the background ticker
    #[arg(long)]
    realtime: bool,

    /// Wall-clock milliseconds per tick in realtime mode (overrides config)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print a status table every N simulated seconds
    #[arg(long, default_value = "30")]
    report_every: u64,
}

/// An incident request and the tick at which to raise it (0 if omitted).
#[derive(Clone, Debug)]
struct ScheduledIncident {
    at:      u64,
    request: IncidentRequest,
}

fn parse_scheduled_incident(s: &str) -> Result<ScheduledIncident, String> {
    let (request, at) = match s.rsplit_once('@') {
        Some((request, at)) => {
            let at = at
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("bad tick {at:?}: {e}"))?;
            (request, at)
        }
        None => (s, 0),
    };
    let request = request.parse::<IncidentRequest>().map_err(|e| e.to_string())?;
    Ok(ScheduledIncident { at, request })
}

// ── Scripted commands ─────────────────────────────────────────────────────────

enum Action {
    Raise(IncidentRequest),
    ClearAll,
}

/// Commands keyed by the tick at which they apply, in order.
struct Script {
    pending: Vec<(u64, Action)>,
}

impl Script {
    fn from_cli(cli: &Cli) -> Self {
        let mut pending: Vec<(u64, Action)> = cli
            .incidents
            .iter()
            .map(|s| (s.at, Action::Raise(s.request.clone())))
            .collect();
        if let Some(at) = cli.clear_at {
            pending.push((at, Action::ClearAll));
        }
        // Stable: same-tick commands keep command-line order, clears last.
        pending.sort_by_key(|(at, _)| *at);
        Self { pending }
    }

    /// Apply every command due at or before `now`.
    fn apply_due(&mut self, sim: &Simulation, now: Tick) {
        let split = self.pending.partition_point(|(at, _)| *at <= now.0);
        for (_, action) in self.pending.drain(..split) {
            match action {
                Action::Raise(request) => match sim.submit(&request) {
                    Ok(id) => info!("{now}: raised {id}"),
                    Err(e) => warn!("{now}: incident {}:{} rejected: {e}", request.intersection, request.approach),
                },
                Action::ClearAll => {
                    let n = sim.clear_incidents();
                    info!("{now}: cleared {n} incident(s)");
                }
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ── Reporting observer ────────────────────────────────────────────────────────

struct Reporter {
    every:       u64,
    transitions: usize,
    peak_queue:  u32,
    last:        Option<SimSnapshot>,
}

impl Reporter {
    fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            transitions: 0,
            peak_queue: 0,
            last: None,
        }
    }

    fn print_table(snap: &SimSnapshot) {
        let secs = snap.clock_secs;
        println!(
            "── {:02}:{:02}  congestion {}  incidents {} ──",
            secs / 60,
            secs % 60,
            snap.congestion_summary(),
            snap.active_incident_count
        );
        println!(
            "{:<6} {:<10} {:>4} {:>4} {:>4} {:>4}  {:<8} {:<10}",
            "Int", "Phase", "N", "S", "E", "W", "Blocked", "Status"
        );
        for s in snap.intersections.values() {
            println!(
                "{:<6} {:<10} {:>4} {:>4} {:>4} {:>4}  {:<8} {:<10}",
                s.id.as_str(),
                s.phase.to_string(),
                s.vehicle_counts[Approach::N],
                s.vehicle_counts[Approach::S],
                s.vehicle_counts[Approach::E],
                s.vehicle_counts[Approach::W],
                blocked_list(s),
                s.status.to_string(),
            );
        }
        println!();
    }
}

fn blocked_list(s: &IntersectionSnapshot) -> String {
    let blocked: String = s
        .blocked
        .iter()
        .filter(|&(_, &b)| b)
        .map(|(a, _)| a.to_string())
        .collect();
    if blocked.is_empty() { "-".into() } else { blocked }
}

impl SimObserver for Reporter {
    fn on_tick_end(&mut self, _tick: Tick, transitions: usize) {
        self.transitions += transitions;
    }

    fn on_snapshot(&mut self, snapshot: &SimSnapshot) {
        let peak = snapshot
            .intersections
            .values()
            .flat_map(|s| s.vehicle_counts.values().copied())
            .max()
            .unwrap_or(0);
        self.peak_queue = self.peak_queue.max(peak);
        if snapshot.clock_secs % self.every == 0 {
            Self::print_table(snapshot);
        }
        self.last = Some(snapshot.clone());
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!("run ended at {final_tick}");
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn run_batch(sim: &Simulation, script: &mut Script, ticks: u64, reporter: &mut Reporter) {
    sim.start();
    script.apply_due(sim, sim.current_tick());
    for _ in 0..ticks {
        if sim.tick_with(reporter).is_none() {
            break;
        }
        script.apply_due(sim, sim.current_tick());
    }
    if let Some(next) = sim.next_phase_change() {
        info!("next phase change was due at {next}");
    }
    sim.stop();
    reporter.on_sim_end(sim.current_tick());
}

fn run_realtime(sim: Arc<Simulation>, script: &mut Script, ticks: u64, reporter: Reporter) -> Result<Reporter> {
    let poll = (sim.config().tick_period() / 4).max(Duration::from_millis(1));
    let mut ticker = Ticker::new(Arc::clone(&sim));
    ticker.start(reporter)?;
    script.apply_due(&sim, sim.current_tick());

    let mut seen = sim.current_tick();
    while seen.0 < ticks {
        thread::sleep(poll);
        let now = sim.current_tick();
        if now != seen {
            seen = now;
            if !script.is_empty() {
                script.apply_due(&sim, now);
            }
        }
    }
    ticker
        .stop()
        .context("ticker thread ended without returning its observer")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(ms) = cli.tick_ms {
        config.tick_period_ms = ms;
    }
    let mut builder = SimBuilder::new(config);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    if cli.alternate {
        builder = builder.arbitration(ArbitrationPolicy::Alternate);
    }
    let sim = Arc::new(builder.build()?);
    let mut script = Script::from_cli(&cli);

    println!("=== corridor: traffic-signal twin ===");
    println!(
        "Intersections: {}  |  Ticks: {}  |  Seed: {}  |  Mode: {}",
        sim.intersection_ids().len(),
        cli.ticks,
        sim.config().seed,
        if cli.realtime { "realtime" } else { "batch" }
    );
    println!();

    let started = Instant::now();
    let reporter = if cli.realtime {
        run_realtime(Arc::clone(&sim), &mut script, cli.ticks, Reporter::new(cli.report_every))?
    } else {
        let mut reporter = Reporter::new(cli.report_every);
        run_batch(&sim, &mut script, cli.ticks, &mut reporter);
        reporter
    };
    let elapsed = started.elapsed();

    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "Simulated {} s  |  phase timer firings: {}  |  peak queue: {}",
        sim.current_tick().0,
        reporter.transitions,
        reporter.peak_queue
    );
    if let Some(last) = &reporter.last {
        println!("Final congestion: {}", last.congestion_summary());
    }

    for incident in sim.incidents() {
        println!("  still active: {} {}", incident.id, incident.description);
    }
    Ok(())
}

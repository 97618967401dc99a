//! skirmish: headless runner for combat scenarios.
//!
//! Usage:
//!   skirmish [SCENARIO] [--ticks N] [--stream] [--realtime]
//!
//! SCENARIO is a path to a scenario JSON file or the name of a built-in
//! scenario (`duel`, `line_battle`). Defaults to `line_battle`.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use skirmish_core::constants::TICK_RATE;
use skirmish_core::events::CombatEvent;
use skirmish_sim::scenario::Scenario;
use skirmish_sim::CombatEngine;

/// Nominal duration of one tick when pacing to wall-clock time.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

struct Options {
    scenario: String,
    ticks: Option<u64>,
    stream: bool,
    realtime: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    let options = parse_args(&args)?;

    let scenario = load_scenario(&options.scenario)?;
    let mut engine = CombatEngine::from_scenario(&scenario)
        .with_context(|| format!("failed to set up scenario {}", scenario.name))?;

    let ticks = options.ticks.unwrap_or(scenario.ticks);
    let mut totals = Totals::default();
    let mut snapshot = engine.snapshot();
    let mut next_tick_time = Instant::now();

    for _ in 0..ticks {
        snapshot = engine.tick();
        totals.record(&snapshot.events);
        if options.stream {
            println!("{}", serde_json::to_string(&snapshot)?);
        }
        if options.realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else {
                next_tick_time = now;
            }
        }
    }

    let alive = snapshot.combatants.iter().filter(|c| c.alive).count();
    tracing::info!(
        scenario = %scenario.name,
        ticks,
        elapsed_secs = snapshot.time.elapsed_secs,
        fired = totals.fired,
        hits = totals.hits,
        dodges = totals.dodges,
        kills = totals.kills,
        alive,
        pool_misuse = snapshot.pools.misuse_count,
        "run complete"
    );

    if !options.stream {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        scenario: "line_battle".to_string(),
        ticks: None,
        stream: false,
        realtime: false,
    };
    let mut positional = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = iter.next().context("--ticks needs a value")?;
                options.ticks = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid tick count: {value}"))?,
                );
            }
            "--stream" => options.stream = true,
            "--realtime" => options.realtime = true,
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            other => {
                if positional.replace(other.to_string()).is_some() {
                    bail!("only one scenario may be given");
                }
            }
        }
    }
    if let Some(scenario) = positional {
        options.scenario = scenario;
    }
    Ok(options)
}

/// A path that exists is loaded as JSON; anything else names a built-in.
fn load_scenario(name: &str) -> Result<Scenario> {
    if Path::new(name).is_file() {
        Scenario::from_path(name).with_context(|| format!("failed to load {name}"))
    } else {
        Scenario::builtin(name).map_err(Into::into)
    }
}

#[derive(Default)]
struct Totals {
    fired: u64,
    hits: u64,
    dodges: u64,
    kills: u64,
}

impl Totals {
    fn record(&mut self, events: &[CombatEvent]) {
        for event in events {
            match event {
                CombatEvent::Fired { projectiles, .. } => self.fired += u64::from(*projectiles),
                CombatEvent::Damaged { .. } => self.hits += 1,
                CombatEvent::Dodged { .. } => self.dodges += 1,
                CombatEvent::Killed { .. } => self.kills += 1,
                _ => {}
            }
        }
    }
}

fn print_usage() {
    eprintln!(
        "skirmish: run a combat scenario headless and print the final snapshot\n\
         \n\
         Usage: skirmish [SCENARIO] [options]\n\
         \n\
           SCENARIO     scenario JSON file or built-in name (duel, line_battle)\n\
         \n\
         Options:\n\
         \n\
           --ticks <N>  override the scenario's tick count\n\
           --stream     print every snapshot as one JSON line\n\
           --realtime   pace ticks to wall-clock time\n\
         \n\
         Set RUST_LOG=skirmish_sim=debug for per-tick targeting and firing logs.\n"
    );
}

//! sim-runner: headless runner for the workforce simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --years 10 --db run.db
//!   sim-runner --seed 12345 --years 20 --monte-carlo 200
//!   sim-runner --import snap.json --years 5 --export snap2.json
//!   sim-runner --ipc-mode            (JSON-lines worker on stdin/stdout)

use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use talentsim_core::{
    config::SimConfig,
    dispatch::Worker,
    engine::SimEngine,
    monte_carlo::{self, McProgress, MonteCarloConfig},
    snapshot::Snapshot,
    store::SimStore,
    types::{RunId, Seed},
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let years = parse_arg(&args, "--years", 10u32);
    let monte_carlo_runs = parse_arg(&args, "--monte-carlo", 0usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = parse_str(&args, "--db").unwrap_or(":memory:");

    let mut config = match parse_str(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args
        .windows(2)
        .find(|w| w[0] == "--seed")
        .and_then(|w| w[1].parse::<Seed>().ok())
    {
        config.seed = seed;
    }
    if args.iter().any(|a| a == "--stochastic") {
        config.stochastic = true;
    }

    if !ipc_mode {
        println!("talentsim — sim-runner");
        println!("  seed:        {}", config.seed);
        println!("  years:       {years}");
        println!("  stochastic:  {}", config.stochastic);
        println!("  db:          {db}");
        println!();
    }

    if monte_carlo_runs > 0 {
        return run_monte_carlo(&config, monte_carlo_runs, years);
    }

    let engine = match parse_str(&args, "--import") {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read {path}"))?;
            let imported = Snapshot::import(&json)?;
            if !imported.checksum_valid {
                eprintln!("warning: snapshot checksum does not match its contents");
            }
            SimEngine::restore(config.clone(), &imported.snapshot)?
        }
        None => SimEngine::new(config.clone())?,
    };

    let store = SimStore::open(db)?;
    store.migrate()?;
    let run_id: RunId = format!("run-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, config.seed, config.stochastic, env!("CARGO_PKG_VERSION"))?;

    let engine = if ipc_mode {
        run_ipc_loop(engine)?
    } else {
        let mut engine = engine;
        engine.simulate_years(years);
        engine
    };

    store.append_history(&run_id, &engine.history())?;

    if let Some(path) = parse_str(&args, "--export") {
        let snapshot = engine.export_snapshot()?;
        std::fs::write(path, snapshot.to_json()?)
            .with_context(|| format!("Cannot write {path}"))?;
        store.save_snapshot(&run_id, &snapshot)?;
        log::info!("snapshot written to {path}");
    }

    if !ipc_mode {
        print_summary(&engine, &store, &run_id)?;
    }
    Ok(())
}

fn run_ipc_loop(engine: SimEngine) -> Result<SimEngine> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut worker = Worker::new(engine);

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if line.trim() == "quit" {
            break;
        }
        let mut write_failed = None;
        worker.handle_json(&line, &mut |response| {
            let written = serde_json::to_string(&response)
                .map_err(io::Error::from)
                .and_then(|json| writeln!(stdout, "{json}"));
            if let Err(e) = written {
                write_failed.get_or_insert(e);
            }
        });
        if let Some(e) = write_failed {
            return Err(e.into());
        }
        stdout.flush()?;
    }
    Ok(worker.into_engine())
}

fn run_monte_carlo(config: &SimConfig, iterations: usize, years: u32) -> Result<()> {
    let mc = MonteCarloConfig {
        iterations,
        years,
        base_seed: config.seed,
        progress_every: (iterations / 10).max(1),
    };
    let report = |p: McProgress| eprintln!("  {}/{} runs", p.completed, p.total);
    let result = monte_carlo::run(config, &mc, Some(&report))?;
    let s = &result.summary;

    println!("=== MONTE CARLO ({} runs × {} years) ===", iterations, years);
    println!("  mean:   {:.2}", s.mean);
    println!("  std:    {:.2}", s.std);
    println!("  min:    {:.2}", s.min);
    println!("  p5:     {:.2}", s.p5);
    println!("  p25:    {:.2}", s.p25);
    println!("  median: {:.2}", s.p50);
    println!("  p75:    {:.2}", s.p75);
    println!("  p95:    {:.2}", s.p95);
    println!("  max:    {:.2}", s.max);
    Ok(())
}

fn print_summary(engine: &SimEngine, store: &SimStore, run_id: &str) -> Result<()> {
    let summary = engine.summary();
    let stored_years = store.score_series(run_id)?.len();
    let state = engine.state();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:       {run_id}");
    println!("  years run:    {}", summary.years);
    println!("  final year:   {} ({})", state.year, state.calendar_year);
    println!("  population:   {}", state.total_population);
    println!("  total score:  {:.2}", state.total_score);
    println!("  avg / min / max: {:.2} / {:.2} / {:.2}", summary.average, summary.min, summary.max);
    println!("  growth:       {:+.2}", summary.growth);
    println!("  succession:   {:.1}", state.succession_score);
    println!("  achievement:  {:.1}%", engine.achievement_rate());
    println!("  stored years: {stored_years}");

    println!();
    println!("=== CAPABILITY (raw | deviation) ===");
    for (axis, raw) in state.capability.iter() {
        println!("  {:<24} {:>6.2} | {:>5.1}", axis.key(), raw, state.standardized.get(axis));
    }

    let rec = engine.recommend();
    println!();
    println!("=== ADVISOR ({:?} confidence) ===", rec.confidence);
    println!(
        "  university {:.0} | industry {:.0} | government {:.0} | research {:.0}",
        rec.allocation.university, rec.allocation.industry, rec.allocation.government, rec.allocation.research
    );
    for line in &rec.rationale {
        println!("  - {line}");
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn parse_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

//! Example: 30-day food-waste digestion
//!
//! Loads the preset document, selects a substrate, integrates the ADM1 +
//! metal network over 30 days and writes the trajectory to CSV.
//!
//! ```bash
//! RUST_LOG=info cargo run --example food_waste -- [preset] [days]
//! ```
//!
//! The preset document is read from `config/substrate_presets.json` when it
//! exists, otherwise the copy built into the library is used.

use adm1_rs::{
    output::{CsvConfig, CsvExporter, Exporter},
    parameters::{ParameterStore, DEFAULT_PRESET_PATH},
    physics::StateVariable,
    solver::{solve_with_timeout, BdfSolver, Scenario, SolverConfiguration, TimeSpan, DEFAULT_TIMEOUT},
};

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let preset = args.next().unwrap_or_else(|| "food_waste".to_string());
    let days: f64 = match args.next() {
        Some(text) => text.parse()?,
        None => 30.0,
    };

    println!("═══════════════════════════════════════════════════════");
    println!("  Anaerobic digestion - {} over {} days", preset, days);
    println!("═══════════════════════════════════════════════════════\n");

    // ====== Presets ======

    let mut store = ParameterStore::new(DEFAULT_PRESET_PATH);
    if !store.load_presets() {
        store = ParameterStore::builtin();
    }
    println!("Presets: {:?}", store.list_preset_names());

    if !store.select_preset(&preset) {
        return Err(format!("unknown preset '{}'", preset).into());
    }
    for (key, value) in store.active_parameters() {
        println!("  {:<10} = {}", key, value);
    }

    let model = store
        .active_model()
        .ok_or_else(|| format!("preset '{}' does not build a valid model", preset))?;

    // ====== Solve ======

    let scenario = Scenario::from_model(model, TimeSpan::from_zero(days));
    let config = SolverConfiguration::default();

    let start = Instant::now();
    let result = solve_with_timeout(BdfSolver::new(), scenario, config, DEFAULT_TIMEOUT)
        .into_result()
        .ok_or("simulation timed out")?;
    let elapsed = start.elapsed();

    if !result.success {
        return Err(format!("simulation failed: {}", result.message).into());
    }

    println!("\nSolved in {:.2?}", elapsed);
    println!("  steps      : {}", result.n_steps);
    println!("  rhs evals  : {}", result.nfev);
    println!("  Jacobians  : {}", result.njev);
    println!("  LU         : {}", result.nlu);

    // ====== Summary ======

    let first = result.state_at(0).ok_or("empty result")?;
    let last = result.final_state().ok_or("empty result")?;
    println!("\n{:<10} {:<8} {:>12} {:>12}", "variable", "unit", "t = 0", format!("t = {}", days));
    for variable in [
        StateVariable::SSu,
        StateVariable::SAa,
        StateVariable::SAc,
        StateVariable::SH2,
        StateVariable::XSu,
        StateVariable::XAc,
        StateVariable::SFe2,
        StateVariable::SFeEdta,
        StateVariable::XFeS,
    ] {
        let index = variable.index();
        println!(
            "{:<10} {:<8} {:>12.6} {:>12.6}",
            variable.name(),
            variable.unit(),
            first[index],
            last[index]
        );
    }

    // ====== Export ======

    let path = std::env::temp_dir().join(format!("{}_{}d.csv", preset, days));
    CsvExporter::new(CsvConfig::default().with_metadata()).export(&result, &[], Some(301), &path)?;
    println!("\nTrajectory written to {}", path.display());

    Ok(())
}

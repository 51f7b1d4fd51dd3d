//! End-to-end tests: presets → ADM1 model → BDF solve → export

use adm1_rs::models::{Adm1Model, KineticParameters};
use adm1_rs::output::export::{CsvExporter, Exporter};
use adm1_rs::parameters::{ParameterStore, PresetError};
use adm1_rs::physics::{PhysicalModel, StateVariable, StateVector, STATE_DIMENSION};
use adm1_rs::solver::{
    solve_with_timeout, BdfSolver, Scenario, Solver, SolverConfiguration, TimeSpan, DEFAULT_TIMEOUT,
};
use approx::assert_relative_eq;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

mod common;
use common::init_logging;

fn food_waste() -> Adm1Model {
    ParameterStore::builtin().build_model("food_waste").unwrap()
}

// ====== Digester runs ======

#[test]
fn test_food_waste_thirty_days() {
    init_logging();
    let scenario = Scenario::from_model(food_waste(), TimeSpan::from_zero(30.0));
    let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());

    assert!(result.success, "{}", result.message);
    assert!(result.len() > 1);
    assert_eq!(result.shape(), (STATE_DIMENSION, result.len()));
    assert_eq!(result.time_points[0], 0.0);
    assert_eq!(result.final_time(), Some(30.0));
    assert!(result.states.iter().all(|value| value.is_finite()));
    assert!(result.nfev > 0 && result.njev > 0);

    // Sugars are consumed, their degraders grow
    let sugar = result.series("S_su").unwrap();
    let degraders = result.series("X_su").unwrap();
    assert!(sugar.last().unwrap() < &sugar[0]);
    assert!(degraders.last().unwrap() > &degraders[0]);

    // Iron ends up complexed or precipitated
    let last = result.final_state().unwrap();
    assert!(last[StateVariable::XFeS.index()] > 0.0);
    assert!(last[StateVariable::SFeEdta.index()] > 0.0);
}

#[test]
fn test_degenerate_span_returns_initial_column() {
    let model = food_waste();
    let initial = model.setup_initial_state();
    let scenario = Scenario::from_model(model, TimeSpan::new(0.0, 0.0));

    let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());

    assert!(result.success);
    assert_eq!(result.time_points, vec![0.0]);
    assert_eq!(result.shape(), (STATE_DIMENSION, 1));
    assert_eq!(result.final_state().unwrap(), initial);
}

#[test]
fn test_empty_c4_pool_stays_finite() {
    let mut state = StateVector::default();
    state[StateVariable::SVa] = 0.0;
    state[StateVariable::SBu] = 0.0;
    let model = Adm1Model::default().with_initial_state(state);

    let dydt = model.compute_physics(0.0, model.initial_state().as_vector());
    assert!(dydt.iter().all(|value| value.is_finite()));

    let scenario = Scenario::from_model(model, TimeSpan::from_zero(5.0));
    let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());

    assert!(result.success, "{}", result.message);
    assert!(result.states.iter().all(|value| value.is_finite()));
    let valerate = result.series("S_va").unwrap();
    assert!(valerate.iter().all(|value| value.abs() < 1e-6));
}

#[test]
fn test_metal_mass_is_conserved() {
    // Fe2 + FeEDTA + FeS changes only through complexation and precipitation,
    // which move iron between those three pools
    let scenario = Scenario::from_model(Adm1Model::default(), TimeSpan::from_zero(10.0));
    let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());
    assert!(result.success, "{}", result.message);

    let iron: Vec<f64> = (0..result.len())
        .map(|j| {
            let state = result.state_at(j).unwrap();
            state[StateVariable::SFe2.index()]
                + state[StateVariable::SFeEdta.index()]
                + state[StateVariable::XFeS.index()]
        })
        .collect();
    for total in &iron {
        assert_relative_eq!(*total, iron[0], max_relative = 1e-5);
    }
}

#[test]
fn test_higher_ammonia_slows_acetate_uptake() {
    let model = Adm1Model::default();
    let mut low = StateVector::default();
    low[StateVariable::SIn] = 0.01;
    let mut high = low.clone();
    high[StateVariable::SIn] = 0.2;

    let uptake = |state: &StateVector| -model.compute_physics(0.0, state.as_vector())[StateVariable::SAc.index()];
    assert!(uptake(&high) < uptake(&low));
    assert!(uptake(&high) > 0.0);
}

#[test]
fn test_hydrogen_inhibits_fatty_acid_uptake() {
    let model = Adm1Model::default();
    let mut lean = StateVector::default();
    lean[StateVariable::SH2] = 0.0;
    let mut rich = lean.clone();
    rich[StateVariable::SH2] = 1e-4;

    let rates_lean = model.process_rates(lean.as_slice());
    let rates_rich = model.process_rates(rich.as_slice());
    assert!(rates_rich.lcfa < rates_lean.lcfa);
    assert!(rates_rich.c4 < rates_lean.c4);
    assert!(rates_rich.propionate < rates_lean.propionate);
    assert_eq!(rates_rich.sugar, rates_lean.sugar);
}

#[test]
fn test_every_preset_solves_with_full_shape() {
    let store = ParameterStore::builtin();
    let config = SolverConfiguration::default();
    let solver = BdfSolver::new();

    let finals: Vec<_> = store
        .list_preset_names()
        .into_iter()
        .map(|name| {
            let model = store.build_model(name).unwrap();
            let result = solver.solve(&Scenario::from_model(model, TimeSpan::from_zero(2.0)), &config);
            assert!(result.success, "{}: {}", name, result.message);
            assert_eq!(result.model.name(), name);

            assert_eq!(result.shape(), (STATE_DIMENSION, result.len()), "{}", name);
            assert!(result.len() > 1, "{}", name);
            assert!(
                result.time_points.windows(2).all(|w| w[1] > w[0]),
                "{}: time points not strictly increasing",
                name
            );
            assert_eq!(result.time_points.first(), Some(&0.0), "{}", name);
            assert_eq!(result.final_time(), Some(2.0), "{}", name);
            assert!(result.states.iter().all(|value| value.is_finite()), "{}", name);

            result.final_state().unwrap()
        })
        .collect();

    assert_eq!(finals.len(), 2);
    assert_ne!(finals[0], finals[1]);
}

#[test]
fn test_bounded_solve_completes() {
    let scenario = Scenario::from_model(food_waste(), TimeSpan::from_zero(1.0));
    let outcome = solve_with_timeout(BdfSolver::new(), scenario, SolverConfiguration::default(), DEFAULT_TIMEOUT);

    let result = outcome.into_result().expect("one simulated day finishes well within a minute");
    assert!(result.success);
}

// ====== Presets ======

#[test]
fn test_preset_file_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "pilot": {{
                "description": "pilot digester",
                "kinetic_parameters": {{"k_m_ac": 12.5, "KI_nh3": 0.003, "note": "from lab"}},
                "initial_conditions": {{"S_ac": 1.1}}
            }},
            "control": {{}}
        }}"#
    )
    .unwrap();

    let mut store = ParameterStore::new(file.path());
    assert!(store.load_presets());
    assert_eq!(store.list_preset_names(), vec!["pilot", "control"]);

    assert!(store.select_preset("pilot"));
    let persisted = store.active_parameters();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted["k_m_ac"].as_f64(), Some(12.5));
    assert_eq!(persisted["KI_nh3"].as_f64(), Some(0.003));

    let model = store.active_model().unwrap();
    assert_eq!(model.parameters().k_m_ac, 12.5);
    assert_eq!(model.parameters().ki_nh3, 0.003);
    assert_eq!(model.parameters().k_m_su, KineticParameters::default().k_m_su);
    assert_eq!(model.initial_state()[StateVariable::SAc], 1.1);
    assert_eq!(model.description(), Some("pilot digester"));

    // Defaults are untouched by the preset
    assert_eq!(KineticParameters::default().k_m_ac, 8.0);
}

#[test]
fn test_unknown_selection_is_rejected() {
    let mut store = ParameterStore::builtin();
    assert!(store.select_preset("sewage_sludge"));

    assert!(!store.select_preset("brewery_waste"));
    assert_eq!(store.active_preset_name(), Some("sewage_sludge"));
    assert_eq!(
        store.try_select("brewery_waste"),
        Err(PresetError::UnknownPreset("brewery_waste".to_string()))
    );
}

#[test]
fn test_missing_source_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ParameterStore::new(dir.path().join("absent.json"));

    assert!(!store.load_presets());
    assert!(store.is_empty());
    assert!(store.active_parameters().is_empty());
    assert!(store.active_model().is_none());
}

// ====== Export ======

#[test]
fn test_export_simulation_to_csv() {
    let scenario = Scenario::from_model(food_waste(), TimeSpan::from_zero(1.0));
    let result = BdfSolver::new().solve(&scenario, &SolverConfiguration::default());
    assert!(result.success);

    let file = NamedTempFile::new().unwrap();
    CsvExporter::default()
        .export(&result, &["S_su", "X_FeS"], Some(5), file.path())
        .unwrap();

    let content = fs::read_to_string(file.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "time,S_su,X_FeS");
    assert_eq!(lines.len(), 6);
    assert!(lines[1].starts_with("0.000000,8.000000,"));
    assert!(lines[5].starts_with("1.000000,"));
}

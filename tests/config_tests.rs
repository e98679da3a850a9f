#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use microbe::simulation::error::ConfigError;
use microbe::simulation::game::Game;
use microbe::simulation::kinds::{AgentKind, CellKind, Difficulty, NutrientKind};
use microbe::simulation::params::Params;
use std::fs;
use std::path::Path;

fn create_test_params() -> Params {
    Params {
        seed: Some(99),
        difficulty: Difficulty::Hard,
        box_width: 640.0,
        box_height: 480.0,
        max_children: 3,
        ..Params::default()
    }
}

#[test]
fn test_save_and_load() {
    let params = create_test_params();
    let save_path = "test_params_roundtrip.json";

    params
        .save_to_file(save_path)
        .expect("Failed to save params");
    let loaded = Params::load_from_file(save_path).expect("Failed to load params");

    assert_eq!(loaded.seed, Some(99));
    assert_eq!(loaded.difficulty, Difficulty::Hard);
    assert_eq!(loaded.box_width, 640.0);
    assert_eq!(loaded.max_children, 3);
    assert_eq!(loaded.cell_kinds.len(), params.cell_kinds.len());

    fs::remove_file(save_path).ok();
}

#[test]
fn test_save_creates_valid_json() {
    let save_path = "test_params_valid.json";
    create_test_params()
        .save_to_file(save_path)
        .expect("Failed to save");

    let json_content = fs::read_to_string(save_path).expect("Failed to read save file");
    let parsed: serde_json::Value = serde_json::from_str(&json_content).expect("Invalid JSON");

    assert!(parsed.get("cell_kinds").is_some());
    assert!(parsed.get("nutrient_kinds").is_some());
    assert!(parsed.get("agent_kinds").is_some());
    assert!(parsed.get("communication_range").is_some());

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_nonexistent_file() {
    let result = Params::load_from_file("nonexistent_params.json");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_kind_keys_parse_case_insensitively() {
    assert_eq!("Coccus".parse::<CellKind>().unwrap(), CellKind::Coccus);
    assert_eq!(" LIPID ".parse::<NutrientKind>().unwrap(), NutrientKind::Lipid);
    assert_eq!("antibody".parse::<AgentKind>().unwrap(), AgentKind::Antibody);
    assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);

    let err = "amoeba".parse::<CellKind>().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::UnknownKind { category: "cell", ref key } if key == "amoeba"
    ));
}

#[test]
fn test_partial_json_config() {
    let json = r#"{
        "seed": 5,
        "max_agents": 4,
        "agent_kinds": [
            { "kind": "Neutrophil", "behavior": "Hunter", "speed": 1.0, "max_speed": 2.0,
              "radius": 10.0, "lifespan": 100.0, "damage": 1.0, "max_targets": 1 },
            { "kind": "Macrophage", "behavior": "Engulfer", "speed": 1.0, "max_speed": 1.5,
              "radius": 20.0, "lifespan": null, "damage": 2.0, "max_targets": 2 },
            { "kind": "Antibody", "behavior": "Tagger", "speed": 2.0, "max_speed": 2.0,
              "radius": 6.0, "lifespan": 50.0, "damage": 0.0, "max_targets": 1,
              "tag_duration": 120.0 }
        ]
    }"#;
    let params = Params::from_json_str(json).unwrap();

    assert_eq!(params.seed, Some(5));
    assert_eq!(params.max_agents, 4);
    assert_eq!(params.box_width, 800.0);
    let macrophage = params.agent_kind(AgentKind::Macrophage).unwrap();
    assert!(macrophage.lifespan.is_none());
    assert_eq!(macrophage.max_targets, 2);
}

#[test]
fn test_invalid_config_fails_before_any_tick() {
    let params = Params {
        nutrient_spawn_probability: 1.5,
        ..create_test_params()
    };
    assert!(matches!(Game::new(params), Err(ConfigError::Invalid(_))));

    for (ratio, retention) in [(0.0, 0.7), (0.5, 0.0), (1.5, 0.7)] {
        let params = Params {
            split_ratio: ratio,
            split_retention: retention,
            ..create_test_params()
        };
        assert!(matches!(Game::new(params), Err(ConfigError::Invalid(_))));
    }

    let mut params = create_test_params();
    params.cell_kinds.retain(|c| c.kind != CellKind::Spirillum);
    assert!(matches!(
        Game::new(params),
        Err(ConfigError::MissingKind { category: "cell", .. })
    ));
}

#[test]
fn test_difficulty_scales_agent_speed() {
    let easy = Params {
        difficulty: Difficulty::Easy,
        ..create_test_params()
    };
    let hard = create_test_params();
    let cfg = easy.agent_kind(AgentKind::Neutrophil).unwrap().clone();

    let pos = ndarray::Array1::from_vec(vec![100.0, 100.0]);
    let dir = ndarray::Array1::from_vec(vec![1.0, 0.0]);
    let slow = microbe::simulation::agent::Agent::new(&cfg, pos.clone(), dir.clone(), &easy);
    let fast = microbe::simulation::agent::Agent::new(&cfg, pos, dir, &hard);

    assert!(slow.speed_cap < fast.speed_cap);
    assert!((fast.speed_cap - 2.5 * 1.25).abs() < 1e-5);
    assert!(slow.speed_floor <= slow.speed_cap);
}

#[test]
fn test_bad_config_file_is_an_error() {
    let path = "test_params_unknown_kind.json";
    fs::write(path, r#"{ "cell_kinds": [ { "kind": "Coccusx" } ] }"#).expect("Failed to write");

    let result = Params::load_or_default(Some(Path::new(path)));
    assert!(matches!(result, Err(ConfigError::Parse(_))));

    let result = Params::load_or_default(Some(Path::new("nonexistent_params.json")));
    assert!(matches!(result, Err(ConfigError::Io(_))));

    fs::remove_file(path).ok();
}

#[test]
fn test_defaults_used_only_without_config() {
    let params = Params::load_or_default(None).unwrap();
    assert_eq!(params.box_width, Params::default().box_width);
}

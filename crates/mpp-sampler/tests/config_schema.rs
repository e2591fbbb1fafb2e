use mpp_sampler::config::RunConfig;
use mpp_sampler::energy::CombinePolicy;

#[test]
fn minimal_yaml_fills_defaults() {
    let config = RunConfig::from_yaml("sweeps: 10\n").unwrap();
    assert_eq!(config.sweeps, 10);
    assert_eq!(config.burn_in, 0);
    assert_eq!(config.thinning, 1);
    assert_eq!(config.chains, 1);
    assert_eq!(config.temperature, 1.0);
    assert_eq!(config.move_counts.births, 1);
    assert!(!config.diagnostics);
}

#[test]
fn nested_sections_override_defaults() {
    let text = "\
sweeps: 50
burn_in: 5
chains: 3
temperature: 0.25
move_counts:
  births: 2
  shifts: 4
proposal:
  birth_radius: 2.5
seed_policy:
  master_seed: 1234
  label: replicate-a
diagnostics: true
";
    let config = RunConfig::from_yaml(text).unwrap();
    assert_eq!(config.chains, 3);
    assert_eq!(config.move_counts.births, 2);
    assert_eq!(config.move_counts.shifts, 4);
    assert_eq!(config.move_counts.deaths, 1);
    assert_eq!(config.proposal.birth_radius, 2.5);
    assert_eq!(config.seed_policy.master_seed, 1234);
    assert_eq!(config.seed_policy.label.as_deref(), Some("replicate-a"));
    assert!(config.diagnostics);
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = RunConfig::from_yaml("sweeps: [not a number\n").unwrap_err();
    assert_eq!(err.info().code, "config-parse");
}

#[test]
fn serde_roundtrip_preserves_the_config() {
    let config = RunConfig {
        sweeps: 64,
        burn_in: 8,
        ..RunConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let restored: RunConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);
}

#[test]
fn combine_policy_uses_kebab_case_tags() {
    let policy: CombinePolicy = serde_json::from_str("\"sum\"").unwrap();
    assert_eq!(policy, CombinePolicy::Sum);
    let policy: CombinePolicy = serde_json::from_str("\"product\"").unwrap();
    assert_eq!(policy, CombinePolicy::Product);
}

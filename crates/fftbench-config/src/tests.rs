//! Tests for file configuration.

use std::io::Write;

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        domain = "complex"
        precision = "single"
        placement = "out_of_place"
        direction = "forward_only"
        timing = "user"
        effort = "estimate"
        report = "show_all"
        loops = 3
        threads = 0
        min_size = 64
        max_size = "4k"
        seed = 42
        wisdom_dir = "/tmp/wisdom"
        csv_output = "out.csv"
    "#;

    let file = BenchFileConfig::from_toml_str(toml).unwrap();
    assert_eq!(file.domain, Some(SignalDomain::Complex));
    assert_eq!(file.placement, Some(Placement::OutOfPlace));
    assert_eq!(file.min_size, Some(SizeSetting::Count(64)));
    assert_eq!(file.max_size, Some(SizeSetting::Expr("4k".to_string())));
    assert_eq!(file.csv_output, Some(PathBuf::from("out.csv")));

    let config = file.apply_to(TestConfiguration::default()).unwrap();
    assert_eq!(config.precision(), Precision::Single);
    assert_eq!(config.direction(), Direction::ForwardOnly);
    assert_eq!(config.timing(), TimingMode::User);
    assert_eq!(config.effort(), PlanEffort::Estimate);
    assert_eq!(config.report_mode(), ReportMode::ShowAll);
    assert_eq!(config.threads(), ThreadCount::Auto);
    assert_eq!(config.loops(), 3);
    assert_eq!(config.min_size(), 64);
    assert_eq!(config.max_size(), 4096);
    assert_eq!(config.seed(), Some(42));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        domain: real
        placement: in_place
        threads: 4
        min_size: 2
        max_size: 16
    "#;

    let file = BenchFileConfig::from_yaml_str(yaml).unwrap();
    let config = file.apply_to(TestConfiguration::default()).unwrap();
    assert_eq!(config.domain(), SignalDomain::Real);
    assert_eq!(config.threads(), ThreadCount::Count(4));
    assert_eq!((config.min_size(), config.max_size()), (2, 16));
}

#[test]
fn test_empty_file_keeps_defaults() {
    let file = BenchFileConfig::from_toml_str("").unwrap();
    assert_eq!(file, BenchFileConfig::default());
    let config = file.apply_to(TestConfiguration::default()).unwrap();
    assert_eq!(config, TestConfiguration::default());
}

#[test]
fn test_unknown_fields_rejected() {
    assert!(matches!(
        BenchFileConfig::from_toml_str("lops = 3"),
        Err(ConfigError::Toml(_))
    ));
    assert!(BenchFileConfig::from_toml_str(r#"domain = "quaternion""#).is_err());
}

#[test]
fn test_bad_size_expression() {
    let file = BenchFileConfig::new().with_size_bounds(
        SizeSetting::Count(32),
        SizeSetting::Expr("lots".to_string()),
    );
    assert!(matches!(
        file.apply_to(TestConfiguration::default()),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_non_power_of_two_left_to_validation() {
    let file = BenchFileConfig::new()
        .with_size_bounds(SizeSetting::Count(100), SizeSetting::Count(128));
    let config = file.apply_to(TestConfiguration::default()).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();

    let yaml_path = dir.path().join("bench.yaml");
    let mut f = std::fs::File::create(&yaml_path).unwrap();
    writeln!(f, "loops: 7").unwrap();
    assert_eq!(BenchFileConfig::load(&yaml_path).unwrap().loops, Some(7));

    let toml_path = dir.path().join("bench.toml");
    std::fs::write(&toml_path, "loops = 9\n").unwrap();
    assert_eq!(BenchFileConfig::load(&toml_path).unwrap().loops, Some(9));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(BenchFileConfig::load(&path), Err(ConfigError::Io(_))));
    assert_eq!(
        BenchFileConfig::load_or_default(&path).unwrap(),
        BenchFileConfig::default()
    );
}

#[test]
fn test_malformed_file_is_not_defaulted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "loops = [").unwrap();
    assert!(BenchFileConfig::load_or_default(&path).is_err());
}

#[test]
fn test_seed_builder() {
    let file = BenchFileConfig::new().with_seed(9);
    let config = file.apply_to(TestConfiguration::new()).unwrap();
    assert_eq!(config.seed(), Some(9));
}

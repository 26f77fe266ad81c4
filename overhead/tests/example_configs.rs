use overhead_lib::{catalog::CatalogSource, config::Config, location::LocationSource};
use std::{collections::HashSet, fs, path::Path};

const CONFIG_FILES: &[&str] = &["dtc.toml", "horizon.toml", "offline.toml"];

#[test]
fn example_config_file_list_matches_expected() {
    let cfg_files: HashSet<String> = fs::read_dir("../configs")
        .unwrap()
        .map(|d| d.unwrap().file_name().into_string().unwrap())
        .collect();
    let expected: HashSet<String> = CONFIG_FILES.iter().map(|f| f.to_string()).collect();
    assert_eq!(cfg_files, expected, "Example configs directory is missing an expected config file or contains a new config file that should be tested");
}

#[test]
fn example_config_files_parse() {
    let dir = Path::new("../configs");
    for cfg_file in CONFIG_FILES {
        let p = dir.join(cfg_file);
        let cfg = Config::load(&p).unwrap_or_else(|e| panic!("{}: {e}", p.display()));
        cfg.to_tracker_config().unwrap();
    }
}

#[test]
fn horizon_config_tracks_everything() {
    let cfg = Config::load("../configs/horizon.toml").unwrap();
    let tc = cfg.to_tracker_config().unwrap();
    assert!(tc.name_filter.is_empty());
    assert_eq!(tc.sampler.min_elevation.as_degrees(), 0.0);
    assert!(matches!(tc.location_source, LocationSource::Fixed(_)));
}

#[test]
fn offline_config_reads_the_fixture() {
    let cfg = Config::load("../configs/offline.toml").unwrap();
    let tc = cfg.to_tracker_config().unwrap();
    match tc.catalog_source {
        CatalogSource::File(p) => assert!(Path::new("..").join(p).exists()),
        other => panic!("unexpected catalog source {other}"),
    }
}

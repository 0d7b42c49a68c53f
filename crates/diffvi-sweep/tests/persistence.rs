//! Final estimates land on disk as one `.npy` file per combination.

use std::fs;

use diffvi_sweep::{run_config, EnvironmentSource, NpyDirSink, ScheduleRange, SweepConfig, NPY_MAGIC};

#[test]
fn saved_sweep_writes_one_file_per_combination() {
    let dir = tempfile::tempdir().unwrap();
    let config = SweepConfig {
        max_iters: 50,
        step_sizes: ScheduleRange {
            minimum: 0.01,
            maximum: 0.1,
            count: 2,
        },
        dvi: None,
        mdvi: None,
        rvi: Some(0),
        environments: vec![EnvironmentSource::Mrp1, EnvironmentSource::Mrp2],
        save_final_estimates: true,
        results_dir: dir.path().join("results"),
        ..SweepConfig::default()
    };
    let mut sink = NpyDirSink::create(&config.results_dir).unwrap();
    let report = run_config::<f32>(&config, Some(&mut sink)).unwrap();
    assert_eq!(report.combinations.len(), 4);

    let mut files: Vec<_> = fs::read_dir(&config.results_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    assert_eq!(files.len(), 4);

    for combination in &report.combinations {
        let location = combination.artifact.as_ref().unwrap();
        assert!(location.ends_with(&format!("-{}.npy", combination.index)));
        let bytes = fs::read(location).unwrap();
        assert_eq!(&bytes[..6], NPY_MAGIC);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        let header = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(header.contains("'descr': '<f4'"));
        let states = if combination.environment.starts_with("mrp1") { 2 } else { 3 };
        assert!(header.contains(&format!("'shape': ({states},)")));
        assert_eq!(bytes.len(), 10 + header_len + 4 * states);
    }
}

fn flag_only_config(results_dir: std::path::PathBuf) -> SweepConfig {
    SweepConfig {
        max_iters: 20,
        step_sizes: ScheduleRange {
            minimum: 0.1,
            maximum: 0.1,
            count: 1,
        },
        dvi: None,
        mdvi: None,
        rvi: Some(0),
        environments: vec![EnvironmentSource::Mrp1, EnvironmentSource::Mdp1],
        save_final_estimates: true,
        results_dir,
        ..SweepConfig::default()
    }
}

#[test]
fn save_flag_alone_writes_into_results_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = flag_only_config(dir.path().join("nested").join("results"));
    let report = run_config::<f64>(&config, None).unwrap();
    assert_eq!(report.combinations.len(), 2);

    for combination in &report.combinations {
        let location = combination.artifact.as_ref().unwrap();
        let bytes = fs::read(location).unwrap();
        assert_eq!(&bytes[..6], NPY_MAGIC);
        assert!(std::path::Path::new(location).starts_with(&config.results_dir));
    }
    assert_eq!(fs::read_dir(&config.results_dir).unwrap().count(), 2);
}

#[test]
fn failed_check_leaves_no_results_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = SweepConfig {
        rvi: Some(5),
        ..flag_only_config(dir.path().join("results"))
    };
    assert!(run_config::<f32>(&config, None).is_err());
    assert!(!config.results_dir.exists());
}

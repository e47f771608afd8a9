//! Integration tests for the config module.
//!
//! Covers the full load pipeline (file -> overrides -> interpolation) and the
//! typed extraction of a ConversionJob from each supported file format.

use slurm_convert::config::loader::{load_config_from_file, prepare_config};
use slurm_convert::{ConfigError, ConversionJob};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONVERT_YAML: &str = r#"
bignlp_path: /opt/bignlp
container: nvcr.io/nvidia/bignlp:22.02-py3
container_mounts: null
training_run: gpt3_126m
conversion:
  run:
    name: convert_${training_run}
    nemo_file_name: megatron_gpt.nemo
    output_path: ${bignlp_path}/results/${training_run}
  model:
    checkpoint_folder: ${bignlp_path}/results/${training_run}/checkpoints
    checkpoint_name: latest-parallel
    tensor_model_parallel_size: 2
  slurm:
    partition: batch
    account: null
    time_limit: "4:00:00"
    nodes: 1
    exclusive: true
    mem: 0
    overcommit: true
    ntasks_per_node: ${conversion.model.tensor_model_parallel_size}
    gpus_per_task: 1
    dependency: singleton
    job_name: bignlp:${conversion.run.name}
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_yaml_pipeline_resolves_references() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "convert.yaml", CONVERT_YAML);

    let cfg = prepare_config(&path, &[] as &[&str]).unwrap();
    let job = ConversionJob::from_config(&cfg).unwrap();

    assert_eq!(job.run.name, "convert_gpt3_126m");
    assert_eq!(job.run.output_path, PathBuf::from("/opt/bignlp/results/gpt3_126m"));
    assert_eq!(
        job.model.checkpoint_folder,
        PathBuf::from("/opt/bignlp/results/gpt3_126m/checkpoints")
    );
    assert_eq!(job.slurm.ntasks_per_node, 2);
    assert_eq!(job.slurm.job_name, "bignlp:convert_gpt3_126m");
    assert!(job.container_mounts.is_empty());
    // Absolute output_path replaces bignlp_path when joined
    assert_eq!(
        job.log_dir(),
        PathBuf::from("/opt/bignlp/results/gpt3_126m/convert_gpt3_126m")
    );
}

#[test]
fn test_overrides_are_applied_before_interpolation() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "convert.yaml", CONVERT_YAML);

    let cfg = prepare_config(
        &path,
        &[
            "training_run=gpt3_5b",
            "conversion.model.tensor_model_parallel_size=8",
            "container_mounts=[/lustre,/scratch]",
        ],
    )
    .unwrap();
    let job = ConversionJob::from_config(&cfg).unwrap();

    assert_eq!(job.run.name, "convert_gpt3_5b");
    assert_eq!(job.model.tensor_model_parallel_size, 8);
    assert_eq!(job.slurm.ntasks_per_node, 8);
    assert_eq!(job.container_mounts, vec!["/lustre", "/scratch"]);
}

#[test]
fn test_json_and_toml_configs_extract_the_same_job() {
    let dir = TempDir::new().unwrap();

    let json = r#"{
        "bignlp_path": "/opt/bignlp",
        "container": "img",
        "conversion": {
            "run": {"name": "c", "nemo_file_name": "m.nemo", "output_path": "results"},
            "model": {"checkpoint_folder": "/ck", "checkpoint_name": "*.ckpt",
                      "tensor_model_parallel_size": 1},
            "slurm": {"partition": "batch", "time_limit": "1:00:00", "nodes": 1,
                      "exclusive": false, "mem": "64G", "overcommit": false,
                      "ntasks_per_node": 1, "job_name": "bignlp:c"}
        }
    }"#;
    let toml = r#"
bignlp_path = "/opt/bignlp"
container = "img"

[conversion.run]
name = "c"
nemo_file_name = "m.nemo"
output_path = "results"

[conversion.model]
checkpoint_folder = "/ck"
checkpoint_name = "*.ckpt"
tensor_model_parallel_size = 1

[conversion.slurm]
partition = "batch"
time_limit = "1:00:00"
nodes = 1
exclusive = false
mem = "64G"
overcommit = false
ntasks_per_node = 1
job_name = "bignlp:c"
"#;

    let from_json = ConversionJob::from_config(
        &prepare_config(&write(&dir, "c.json", json), &[] as &[&str]).unwrap(),
    )
    .unwrap();
    let from_toml = ConversionJob::from_config(
        &prepare_config(&write(&dir, "c.toml", toml), &[] as &[&str]).unwrap(),
    )
    .unwrap();

    assert_eq!(from_json, from_toml);
    assert_eq!(from_json.slurm.mem, "64G");
    assert_eq!(from_json.slurm.gpus_per_task, None);
    assert_eq!(from_json.slurm.account, None);
    assert_eq!(from_json.slurm.dependency, None);
}

#[test]
fn test_missing_section_is_reported_by_path() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "partial.yaml", "bignlp_path: /opt/bignlp\ncontainer: img\n");

    let cfg = load_config_from_file(&path).unwrap();
    match ConversionJob::from_config(&cfg) {
        Err(ConfigError::MissingKey(key)) => assert_eq!(key, "conversion.run.name"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_dangling_reference_fails_only_when_read() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.yaml", "a: ${missing.key}\n");

    let cfg = prepare_config(&path, &[] as &[&str]).unwrap();
    assert!(matches!(cfg.require_str("a"), Err(ConfigError::Interpolation(_))));
}

#[test]
fn test_unrelated_unresolvable_section_is_ignored() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{}training:\n  env_home: ${{oc.env:HOME}}\n  data_dir: ${{training.missing}}/data\n",
        CONVERT_YAML
    );
    let path = write(&dir, "convert.yaml", &content);

    let cfg = prepare_config(&path, &[] as &[&str]).unwrap();
    let job = ConversionJob::from_config(&cfg).unwrap();
    assert_eq!(job.run.name, "convert_gpt3_126m");
    assert!(matches!(
        cfg.require_str("training.env_home"),
        Err(ConfigError::Interpolation(_))
    ));
}

#[test]
fn test_bad_override_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "convert.yaml", CONVERT_YAML);

    assert!(matches!(
        prepare_config(&path, &["not-an-override"]),
        Err(ConfigError::InvalidOverride(_))
    ));
    assert!(matches!(
        prepare_config(&path, &["bignlp_path.child=1"]),
        Err(ConfigError::InvalidOverride(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "convert.ini", "[x]\n");
    assert!(matches!(
        load_config_from_file(&path),
        Err(ConfigError::ValidationFailed(_))
    ));
}

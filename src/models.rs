//! Core data types for slurm_convert.
//!
//! A [`ConversionJob`] is the typed form of the configuration tree: every key the
//! submission needs, pulled out once so the rest of the crate never touches the
//! raw tree.

use crate::config::ConfigTree;
use crate::error::ConfigError;
use crate::orchestrator::mounts;
use std::path::PathBuf;

/// `conversion.run`: naming and output location of the converted model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: String,
    pub nemo_file_name: String,
    /// Relative to `bignlp_path` unless absolute.
    pub output_path: PathBuf,
}

/// `conversion.model`: where the distributed checkpoint lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub checkpoint_folder: PathBuf,
    /// Glob pattern, resolved against `checkpoint_folder`.
    pub checkpoint_name: String,
    pub tensor_model_parallel_size: u64,
}

/// `conversion.slurm`: scheduler resource requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurmSpec {
    pub partition: String,
    pub account: Option<String>,
    pub time_limit: String,
    pub nodes: u64,
    pub exclusive: bool,
    pub mem: String,
    pub overcommit: bool,
    pub ntasks_per_node: u64,
    pub gpus_per_task: Option<u64>,
    pub dependency: Option<String>,
    pub job_name: String,
}

/// Everything one conversion submission needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub bignlp_path: PathBuf,
    pub container: String,
    /// Extra self-mounts, already filtered down to non-empty strings.
    pub container_mounts: Vec<String>,
    pub run: RunSpec,
    pub model: ModelSpec,
    pub slurm: SlurmSpec,
}

impl ConversionJob {
    /// Extract the job from a configuration tree.
    ///
    /// # Errors
    /// * `ConfigError::MissingKey` naming the dotted path of the first absent required key
    /// * `ConfigError::InvalidType` when a key holds the wrong kind of value
    pub fn from_config(cfg: &ConfigTree) -> Result<Self, ConfigError> {
        let run = RunSpec {
            name: cfg.require_str("conversion.run.name")?,
            nemo_file_name: cfg.require_str("conversion.run.nemo_file_name")?,
            output_path: PathBuf::from(cfg.require_str("conversion.run.output_path")?),
        };

        let model = ModelSpec {
            checkpoint_folder: PathBuf::from(
                cfg.require_str("conversion.model.checkpoint_folder")?,
            ),
            checkpoint_name: cfg.require_str("conversion.model.checkpoint_name")?,
            tensor_model_parallel_size: cfg
                .require_u64("conversion.model.tensor_model_parallel_size")?,
        };

        let slurm = SlurmSpec {
            partition: cfg.require_str("conversion.slurm.partition")?,
            account: cfg.optional_str("conversion.slurm.account")?,
            time_limit: cfg.require_str("conversion.slurm.time_limit")?,
            nodes: cfg.require_u64("conversion.slurm.nodes")?,
            exclusive: cfg.require_bool("conversion.slurm.exclusive")?,
            mem: cfg.require_str("conversion.slurm.mem")?,
            overcommit: cfg.require_bool("conversion.slurm.overcommit")?,
            ntasks_per_node: cfg.require_u64("conversion.slurm.ntasks_per_node")?,
            gpus_per_task: cfg.optional_u64("conversion.slurm.gpus_per_task")?,
            dependency: cfg.optional_str("conversion.slurm.dependency")?,
            job_name: cfg.require_str("conversion.slurm.job_name")?,
        };

        Ok(ConversionJob {
            bignlp_path: PathBuf::from(cfg.require_str("bignlp_path")?),
            container: cfg.require_str("container")?,
            container_mounts: mounts::extract_container_mounts(cfg)?,
            run,
            model,
            slurm,
        })
    }

    /// Directory receiving the `.nemo` file and the job's stdout/stderr logs.
    pub fn log_dir(&self) -> PathBuf {
        self.bignlp_path.join(&self.run.output_path).join(&self.run.name)
    }

    /// Full path of the converted model file.
    pub fn nemo_file_path(&self) -> PathBuf {
        self.log_dir().join(&self.run.nemo_file_name)
    }
}

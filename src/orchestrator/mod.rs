//! Submission orchestration: configuration -> checkpoint -> batch script -> job id.
//!
//! A single linear pass with no retries. Each step either succeeds or aborts the
//! whole submission; the only side effect that can survive a failure is the
//! (idempotent) creation of the run's output directory.

pub mod checkpoint;
pub mod mounts;

pub use checkpoint::{checkpoint_search_path, resolve_checkpoint};
pub use mounts::{build_mounts_string, extract_container_mounts};

use crate::config::ConfigTree;
use crate::error::Result;
use crate::models::ConversionJob;
use crate::slurm::{create_slurm_file, BatchSubmitter, SlurmOptions};
use crate::system::ensure_dir_exists;
use std::path::{Path, PathBuf};

/// Conversion program run inside the container.
pub const CONVERT_CODE_PATH: &str =
    "/opt/bignlp/NeMo/examples/nlp/language_modeling/megatron_gpt_ckpt_to_nemo.py";

/// Directory under `bignlp_path` holding the generated script.
pub const SCRIPT_DIR: &str = "conversion_scripts";

/// Generated script file name. Overwritten on every submission.
pub const SCRIPT_NAME: &str = "convert_script.sh";

/// Well-known location of the generated batch script.
pub fn script_path(bignlp_path: &Path) -> PathBuf {
    bignlp_path.join(SCRIPT_DIR).join(SCRIPT_NAME)
}

/// `srun` flags: container image, mounts and per-job log files (`%j` is the job id).
pub fn srun_flags(job: &ConversionJob) -> String {
    let mounts = build_mounts_string(&job.bignlp_path, &job.container_mounts);
    let log_dir = job.log_dir();
    let name = &job.run.name;
    format!(
        "--no-container-mount-home \
         --container-image {} \
         --container-mounts {} \
         -o {}/{}-%j.log \
         -e {}/{}-%j.error ",
        job.container,
        mounts,
        log_dir.display(),
        name,
        log_dir.display(),
        name
    )
}

/// Command line of the checkpoint conversion program.
pub fn conversion_command(job: &ConversionJob, checkpoint_name: &str) -> String {
    format!(
        "python -u {} \
         --checkpoint_folder {} \
         --checkpoint_name {} \
         --nemo_file_path {} \
         --tensor_model_parallel_size {} ",
        CONVERT_CODE_PATH,
        job.model.checkpoint_folder.display(),
        checkpoint_name,
        job.nemo_file_path().display(),
        job.model.tensor_model_parallel_size
    )
}

/// Scheduler options for the job, with an optional dependency replacing the configured one.
pub fn slurm_options(job: &ConversionJob, flags: String, dependency: Option<&str>) -> SlurmOptions {
    SlurmOptions {
        job_name: job.slurm.job_name.clone(),
        flags,
        dependency: dependency
            .map(str::to_string)
            .or_else(|| job.slurm.dependency.clone()),
        time: job.slurm.time_limit.clone(),
        exclusive: job.slurm.exclusive,
        mem: job.slurm.mem.clone(),
        overcommit: job.slurm.overcommit,
        nodes: job.slurm.nodes,
        ntasks_per_node: job.slurm.ntasks_per_node,
        gpus_per_task: job.slurm.gpus_per_task,
        partition: job.slurm.partition.clone(),
        account: job.slurm.account.clone(),
    }
}

/// Resolve the checkpoint, prepare the output directory and write the batch script.
///
/// # Returns
/// Path of the written script
pub fn prepare_batch_script(job: &ConversionJob, dependency: Option<&str>) -> Result<PathBuf> {
    let checkpoint_name = resolve_checkpoint(
        &job.model.checkpoint_folder,
        &job.model.checkpoint_name,
        job.model.tensor_model_parallel_size,
    )?;

    ensure_dir_exists(&job.log_dir())?;

    let options = slurm_options(job, srun_flags(job), dependency);
    let command = conversion_command(job, &checkpoint_name);
    let path = script_path(&job.bignlp_path);
    create_slurm_file(&path, &command, &options)?;

    log::info!("[Submit] Batch script ready: {}", path.display());
    Ok(path)
}

/// Run one conversion submission end to end.
///
/// # Arguments
/// * `cfg` - Fully resolved configuration tree
/// * `dependency` - Overrides `conversion.slurm.dependency` when given (e.g. the
///   job id of a preceding training job)
/// * `submitter` - Scheduler front end, normally [`crate::slurm::SbatchSubmitter`]
///
/// # Returns
/// The job id exactly as the submitter printed it
pub fn run_conversion(
    cfg: &ConfigTree,
    dependency: Option<&str>,
    submitter: &dyn BatchSubmitter,
) -> Result<String> {
    let job = ConversionJob::from_config(cfg)?;
    log::info!(
        "[Submit] Preparing conversion '{}' (tp={}) from {}",
        job.run.name,
        job.model.tensor_model_parallel_size,
        job.model.checkpoint_folder.display()
    );

    let script = prepare_batch_script(&job, dependency)?;
    let job_id = submitter.submit(&script)?;

    log::info!(
        "[Submit] Submitted Conversion script with job id: {}",
        job_id.trim_end()
    );
    Ok(job_id)
}

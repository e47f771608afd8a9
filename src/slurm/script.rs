//! Batch script rendering.
//!
//! A batch script is a `#!/bin/bash` header, one `#SBATCH` directive per resource
//! request, and a single `srun` line wrapping the payload command in `sh -c`.
//! Optional requests (GPUs, dependency, account) produce no directive at all when
//! unset; SLURM's own defaults apply instead.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Dependency token meaning "only one job with this name may run at a time".
pub const SINGLETON_DEPENDENCY: &str = "singleton";

/// Resource and scheduling options for one batch script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlurmOptions {
    pub job_name: String,
    /// Extra `srun` flags, inserted verbatim before `--ntasks`.
    pub flags: String,
    /// Job id to wait for, or [`SINGLETON_DEPENDENCY`].
    pub dependency: Option<String>,
    pub time: String,
    pub exclusive: bool,
    pub mem: String,
    pub overcommit: bool,
    pub nodes: u64,
    pub ntasks_per_node: u64,
    pub gpus_per_task: Option<u64>,
    pub partition: String,
    pub account: Option<String>,
}

impl Default for SlurmOptions {
    fn default() -> Self {
        SlurmOptions {
            job_name: String::new(),
            flags: String::new(),
            dependency: None,
            time: "04:00:00".to_string(),
            exclusive: true,
            mem: "0".to_string(),
            overcommit: true,
            nodes: 1,
            ntasks_per_node: 1,
            gpus_per_task: Some(1),
            partition: "batch".to_string(),
            account: None,
        }
    }
}

/// Encode a dependency token as a `--dependency` value.
///
/// `singleton` passes through; anything else is treated as a job id and waited on
/// with `afterany`, so the new job starts whether or not that job succeeded.
/// Surrounding whitespace (e.g. the newline `sbatch --parsable` prints) is dropped.
pub fn encode_dependency(token: &str) -> String {
    let token = token.trim();
    if token == SINGLETON_DEPENDENCY {
        token.to_string()
    } else {
        format!("afterany:{}", token)
    }
}

/// Render the full batch script text.
pub fn render_slurm_script(convert_cmd: &str, opts: &SlurmOptions) -> String {
    let mut script = String::from("#!/bin/bash\n");

    // Writing into a String cannot fail
    let _ = writeln!(script, "#SBATCH --nodes={}", opts.nodes);
    let _ = writeln!(script, "#SBATCH --ntasks-per-node={}", opts.ntasks_per_node);
    if let Some(gpus) = opts.gpus_per_task {
        let _ = writeln!(script, "#SBATCH --gpus-per-task={}", gpus);
    }
    if let Some(dependency) = &opts.dependency {
        let _ = writeln!(script, "#SBATCH --dependency={}", encode_dependency(dependency));
    }
    let _ = writeln!(script, "#SBATCH -p {}", opts.partition);
    if let Some(account) = &opts.account {
        let _ = writeln!(script, "#SBATCH -A {}", account);
    }
    let _ = writeln!(script, "#SBATCH --job-name={}", opts.job_name);
    let _ = writeln!(script, "#SBATCH --mem={}", opts.mem);
    if opts.exclusive {
        script.push_str("#SBATCH --exclusive\n");
    }
    if opts.overcommit {
        script.push_str("#SBATCH --overcommit\n");
    }
    let _ = writeln!(script, "#SBATCH --time={}\n", opts.time);
    let _ = writeln!(
        script,
        "srun {} --ntasks={} sh -c \"{}\"\n",
        opts.flags, opts.ntasks_per_node, convert_cmd
    );
    script.push_str("set +x\n");

    script
}

/// Write the batch script to `path`, replacing any previous contents.
///
/// # Errors
/// Any I/O error from the write, typically a missing or read-only parent directory.
pub fn create_slurm_file(path: &Path, convert_cmd: &str, opts: &SlurmOptions) -> io::Result<()> {
    let script = render_slurm_script(convert_cmd, opts);
    fs::write(path, &script)?;
    log::debug!(
        "[Slurm] Wrote batch script ({} bytes) to {}",
        script.len(),
        path.display()
    );
    Ok(())
}

//! SLURM plumbing: batch script rendering and `sbatch` submission.

pub mod script;
pub mod submit;

pub use script::{
    create_slurm_file, encode_dependency, render_slurm_script, SlurmOptions, SINGLETON_DEPENDENCY,
};
pub use submit::{BatchSubmitter, SbatchSubmitter};

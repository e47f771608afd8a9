//! Checkpoint resolution.
//!
//! Sharded checkpoints keep one directory per tensor-parallel rank; the rank 0
//! shard is enough to name the checkpoint, so the search goes into `mp_rank_00`
//! whenever the model is split across more than one rank.

use crate::error::ConfigError;
use crate::system::glob::glob;
use std::path::{Path, PathBuf};

/// Rank-0 shard directory inside a tensor-parallel checkpoint folder.
pub const RANK_ZERO_DIR: &str = "mp_rank_00";

/// Path pattern searched for the checkpoint.
pub fn checkpoint_search_path(
    checkpoint_folder: &Path,
    checkpoint_name: &str,
    tensor_model_parallel_size: u64,
) -> PathBuf {
    if tensor_model_parallel_size > 1 {
        checkpoint_folder.join(RANK_ZERO_DIR).join(checkpoint_name)
    } else {
        checkpoint_folder.join(checkpoint_name)
    }
}

/// Resolve the checkpoint pattern to exactly one file and return its base name.
///
/// # Errors
/// * `ConfigError::NoCheckpoint` if nothing matches
/// * `ConfigError::AmbiguousCheckpoint` if more than one entry matches
pub fn resolve_checkpoint(
    checkpoint_folder: &Path,
    checkpoint_name: &str,
    tensor_model_parallel_size: u64,
) -> Result<String, ConfigError> {
    let search_path =
        checkpoint_search_path(checkpoint_folder, checkpoint_name, tensor_model_parallel_size);
    let pattern = search_path.display().to_string();
    log::debug!("[Checkpoint] Searching: {}", pattern);

    let matches = glob(&search_path);
    match matches.as_slice() {
        [] => {
            log::error!("[Checkpoint] No match for {}", pattern);
            Err(ConfigError::NoCheckpoint(pattern))
        }
        [single] => {
            let name = single
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| ConfigError::NoCheckpoint(pattern.clone()))?;
            log::info!("[Checkpoint] Resolved {} -> {}", checkpoint_name, name);
            Ok(name)
        }
        many => {
            log::error!("[Checkpoint] {} entries match {}", many.len(), pattern);
            Err(ConfigError::AmbiguousCheckpoint {
                pattern,
                count: many.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_search_path_single_rank() {
        assert_eq!(
            checkpoint_search_path(Path::new("/ckpts"), "*.ckpt", 1),
            PathBuf::from("/ckpts/*.ckpt")
        );
        assert_eq!(
            checkpoint_search_path(Path::new("/ckpts"), "*.ckpt", 0),
            PathBuf::from("/ckpts/*.ckpt")
        );
    }

    #[test]
    fn test_search_path_multi_rank() {
        assert_eq!(
            checkpoint_search_path(Path::new("/ckpts"), "*.ckpt", 2),
            PathBuf::from("/ckpts/mp_rank_00/*.ckpt")
        );
        assert_eq!(
            checkpoint_search_path(Path::new("/ckpts"), "*.ckpt", 8),
            PathBuf::from("/ckpts/mp_rank_00/*.ckpt")
        );
    }

    #[test]
    fn test_resolve_single_match_returns_basename() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("megatron_gpt--val_loss=2.1-last.ckpt"), b"").unwrap();
        fs::write(temp_dir.path().join("megatron_gpt--step=10.ckpt"), b"").unwrap();

        let name = resolve_checkpoint(temp_dir.path(), "*last.ckpt", 1).unwrap();
        assert_eq!(name, "megatron_gpt--val_loss=2.1-last.ckpt");
    }

    #[test]
    fn test_resolve_uses_rank_zero_dir() {
        let temp_dir = TempDir::new().unwrap();
        let rank0 = temp_dir.path().join(RANK_ZERO_DIR);
        fs::create_dir(&rank0).unwrap();
        fs::write(rank0.join("model-last.ckpt"), b"").unwrap();
        // A top-level file with the same pattern must not be seen
        fs::write(temp_dir.path().join("other-last.ckpt"), b"").unwrap();

        let name = resolve_checkpoint(temp_dir.path(), "*last.ckpt", 2).unwrap();
        assert_eq!(name, "model-last.ckpt");
    }

    #[test]
    fn test_resolve_no_match() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve_checkpoint(temp_dir.path(), "*.ckpt", 1).unwrap_err();
        assert!(matches!(err, ConfigError::NoCheckpoint(_)));
    }

    #[test]
    fn test_resolve_invalid_class_is_no_match() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("[z-a]-last.ckpt"), b"").unwrap();

        let err = resolve_checkpoint(temp_dir.path(), "[z-a]*last.ckpt", 1).unwrap_err();
        assert!(matches!(err, ConfigError::NoCheckpoint(_)));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.ckpt"), b"").unwrap();
        fs::write(temp_dir.path().join("b.ckpt"), b"").unwrap();

        match resolve_checkpoint(temp_dir.path(), "*.ckpt", 1) {
            Err(ConfigError::AmbiguousCheckpoint { count, .. }) => assert_eq!(count, 2),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

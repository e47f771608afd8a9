//! Container mount specification for `srun --container-mounts`.

use crate::config::ConfigTree;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;

/// Read `container_mounts`, keeping only non-empty string entries.
///
/// Null, non-string and empty entries are skipped without error. An absent or
/// null key means no extra mounts; any other non-list value is rejected.
pub fn extract_container_mounts(cfg: &ConfigTree) -> Result<Vec<String>, ConfigError> {
    match cfg.get("container_mounts")? {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mounts: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if mounts.len() != items.len() {
                log::debug!(
                    "[Mounts] Skipped {} non-string or empty container_mounts entries",
                    items.len() - mounts.len()
                );
            }
            Ok(mounts)
        }
        Some(_) => Err(ConfigError::invalid_type("container_mounts", "a list")),
    }
}

/// `<base>:<base>` followed by `,<m>:<m>` for every extra mount.
pub fn build_mounts_string(base_path: &Path, mounts: &[String]) -> String {
    let base = base_path.display();
    let mut out = format!("{}:{}", base, base);
    for mount in mounts {
        out.push_str(&format!(",{}:{}", mount, mount));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg(mounts: Value) -> ConfigTree {
        ConfigTree::new(json!({ "container_mounts": mounts })).unwrap()
    }

    #[test]
    fn test_mixed_entries_keep_only_strings() {
        let mounts = extract_container_mounts(&cfg(json!(["/data", null, 7]))).unwrap();
        assert_eq!(mounts, vec!["/data".to_string()]);
        assert_eq!(
            build_mounts_string(Path::new("/opt/bignlp"), &mounts),
            "/opt/bignlp:/opt/bignlp,/data:/data"
        );
    }

    #[test]
    fn test_empty_strings_skipped() {
        let mounts = extract_container_mounts(&cfg(json!(["", "/scratch", {"a": 1}]))).unwrap();
        assert_eq!(mounts, vec!["/scratch".to_string()]);
    }

    #[test]
    fn test_absent_or_null_means_base_only() {
        let none = ConfigTree::new(json!({})).unwrap();
        assert!(extract_container_mounts(&none).unwrap().is_empty());
        assert!(extract_container_mounts(&cfg(Value::Null)).unwrap().is_empty());
        assert_eq!(build_mounts_string(Path::new("/opt/bignlp"), &[]), "/opt/bignlp:/opt/bignlp");
    }

    #[test]
    fn test_non_list_rejected() {
        assert!(matches!(
            extract_container_mounts(&cfg(json!("/data"))),
            Err(ConfigError::InvalidType { .. })
        ));
        assert!(matches!(
            extract_container_mounts(&cfg(json!({"data": "/data"}))),
            Err(ConfigError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_multiple_mounts_keep_order() {
        let mounts = vec!["/data".to_string(), "/scratch".to_string()];
        assert_eq!(
            build_mounts_string(Path::new("/w"), &mounts),
            "/w:/w,/data:/data,/scratch:/scratch"
        );
    }
}

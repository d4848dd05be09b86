//! Desired-state manifest.
//!
//! ```toml
//! cib = "staging"
//! pad_utilization = false
//!
//! [[primitive]]
//! name = "web1"
//! class = "ocf"
//! provider = "heartbeat"
//! type = "IPaddr2"
//! parameters = { ip = "10.0.0.5" }
//! operations = { monitor = { interval = "10s" } }
//! ```

use anyhow::{Context, Result, bail};
use pcskit::{ArgOptions, PrimitiveSpec};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Ids the CIB schema accepts.
const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.:-]*$";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Shadow CIB every command runs against, unless a primitive names its own
    #[serde(default)]
    pub cib: Option<String>,

    /// pcs binary
    #[serde(default)]
    pub pcs: Option<String>,

    #[serde(default)]
    pub pad_utilization: bool,

    #[serde(default, rename = "primitive")]
    pub primitives: Vec<PrimitiveSpec>,
}

impl Manifest {
    /// Load a manifest, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let manifest: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        };

        manifest.validate()?;
        log::debug!(
            "loaded {} primitive(s) from {}",
            manifest.primitives.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Reject names `pcs` would refuse.
    pub fn validate(&self) -> Result<()> {
        let pattern = Regex::new(NAME_PATTERN)?;
        for spec in &self.primitives {
            if !pattern.is_match(&spec.name) {
                bail!("'{}' is not a valid resource id", spec.name);
            }
        }
        Ok(())
    }

    pub fn arg_options(&self) -> ArgOptions {
        ArgOptions {
            pad_utilization: self.pad_utilization,
        }
    }

    /// Declarations whose name is `target`, or all of them.
    pub fn select(&self, target: Option<&str>) -> Vec<PrimitiveSpec> {
        self.primitives
            .iter()
            .filter(|spec| target.is_none_or(|t| spec.name == t))
            .cloned()
            .collect()
    }
}

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join("pcsync"))
}

/// Manifest path: the one given on the command line, or the default.
pub fn manifest_path(arg: Option<&str>) -> Result<PathBuf> {
    match arg {
        Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).as_ref())),
        None => Ok(config_dir()?.join("primitives.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcskit::Ensure;
    use std::io::Write;

    fn write_manifest(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml() {
        let file = write_manifest(
            ".toml",
            r#"
cib = "staging"
pad_utilization = true

[[primitive]]
name = "web1"
class = "ocf"
provider = "heartbeat"
type = "IPaddr2"
parameters = { ip = "10.0.0.5" }
operations = { monitor = { interval = "10s" } }

[[primitive]]
name = "old1"
ensure = "absent"
"#,
        );

        let manifest = Manifest::load(file.path()).unwrap();

        assert_eq!(manifest.cib.as_deref(), Some("staging"));
        assert!(manifest.arg_options().pad_utilization);
        assert_eq!(manifest.primitives.len(), 2);
        assert_eq!(manifest.primitives[0].agent_type.as_deref(), Some("IPaddr2"));
        assert_eq!(manifest.primitives[1].ensure, Ensure::Absent);
    }

    #[test]
    fn test_load_json() {
        let file = write_manifest(
            ".json",
            r#"{"primitive": [{"name": "db1", "class": "ocf", "provider": "heartbeat",
                "type": "pgsql", "promotable": true}]}"#,
        );

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.primitives[0].promotable, Some(true));
        assert!(manifest.cib.is_none());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let file = write_manifest(".toml", "[[primitive]]\nname = \"1bad name\"\n");
        let err = Manifest::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("not a valid resource id"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write_manifest(".toml", "shadow = \"x\"\n");
        assert!(Manifest::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Manifest::load(Path::new("/nonexistent/primitives.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_select() {
        let manifest = Manifest {
            primitives: vec![PrimitiveSpec::new("web1"), PrimitiveSpec::new("db1")],
            ..Manifest::default()
        };
        assert_eq!(manifest.select(None).len(), 2);
        let only = manifest.select(Some("db1"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name, "db1");
        assert!(manifest.select(Some("ghost")).is_empty());
    }

    #[test]
    fn test_manifest_path() {
        let explicit = manifest_path(Some("/etc/pcsync/site.toml")).unwrap();
        assert_eq!(explicit, PathBuf::from("/etc/pcsync/site.toml"));

        let default = manifest_path(None).unwrap();
        assert!(default.ends_with("pcsync/primitives.toml"));
    }
}

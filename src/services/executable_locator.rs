use crate::models::Project;
use crate::utils::parse_version_string;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An installed runtime that ships a pmon executable.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SystemInstallation {
    pub version: String,
    pub install_dir: PathBuf,
}

/// Resolves the pmon executable for a runtime version.
pub struct ExecutableLocator {
    tool_name: String,
    installations: Vec<SystemInstallation>,
}

impl ExecutableLocator {
    pub fn new(tool_name: impl Into<String>, installations: Vec<SystemInstallation>) -> Self {
        Self {
            tool_name: tool_name.into(),
            installations,
        }
    }

    /// Builds the candidate set from the system installations in an inventory.
    pub fn from_inventory(tool_name: impl Into<String>, projects: &[Project]) -> Self {
        let installations = projects
            .iter()
            .filter(|p| p.is_system_installation)
            .filter_map(|p| {
                p.version.as_ref().map(|version| SystemInstallation {
                    version: version.clone(),
                    install_dir: p.install_dir.clone(),
                })
            })
            .collect();

        Self::new(tool_name, installations)
    }

    /// `<installDir>/bin/<tool>`, with `.exe` on Windows.
    pub fn executable_path(&self, install_dir: &Path) -> PathBuf {
        let file_name = if cfg!(windows) {
            format!("{}.exe", self.tool_name)
        } else {
            self.tool_name.clone()
        };
        install_dir.join("bin").join(file_name)
    }

    /// Candidates ordered newest first; equal versions keep inventory order.
    pub fn installations_newest_first(&self) -> Vec<SystemInstallation> {
        let mut sorted = self.installations.clone();
        sorted.sort_by(|a, b| {
            parse_version_string(&b.version).cmp(&parse_version_string(&a.version))
        });
        sorted
    }

    /// Exact version match when `version` is given, otherwise the newest
    /// installation whose executable actually exists.
    pub fn locate(&self, version: Option<&str>) -> Option<PathBuf> {
        match version {
            Some(version) => {
                let installation = self.installations.iter().find(|i| i.version == version)?;
                let path = self.executable_path(&installation.install_dir);
                if path.exists() {
                    Some(path)
                } else {
                    debug!(
                        "pmon for version {} missing at {}",
                        version,
                        path.display()
                    );
                    None
                }
            }
            None => self
                .installations_newest_first()
                .iter()
                .map(|i| self.executable_path(&i.install_dir))
                .find(|path| {
                    let exists = path.exists();
                    if !exists {
                        debug!("Skipping missing pmon at {}", path.display());
                    }
                    exists
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn install(root: &Path, version: &str, with_binary: bool) -> SystemInstallation {
        let dir = root.join(version);
        fs::create_dir_all(dir.join("bin")).unwrap();
        if with_binary {
            let name = if cfg!(windows) { "WCCILpmon.exe" } else { "WCCILpmon" };
            fs::write(dir.join("bin").join(name), b"").unwrap();
        }
        SystemInstallation {
            version: version.to_string(),
            install_dir: dir,
        }
    }

    #[test]
    fn exact_version_match() {
        let root = tempfile::tempdir().unwrap();
        let locator = ExecutableLocator::new(
            "WCCILpmon",
            vec![
                install(root.path(), "3.19", true),
                install(root.path(), "3.20", true),
            ],
        );

        let path = locator.locate(Some("3.19")).unwrap();
        assert!(path.starts_with(root.path().join("3.19")));
        // string equality, not numeric
        assert!(locator.locate(Some("3.19.0")).is_none());
        assert!(locator.locate(Some("4.0")).is_none());
    }

    #[test]
    fn exact_version_without_binary_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let locator =
            ExecutableLocator::new("WCCILpmon", vec![install(root.path(), "3.20", false)]);
        assert!(locator.locate(Some("3.20")).is_none());
    }

    #[test]
    fn newest_existing_installation_wins() {
        let root = tempfile::tempdir().unwrap();
        let locator = ExecutableLocator::new(
            "WCCILpmon",
            vec![
                install(root.path(), "3.9", true),
                install(root.path(), "3.10", true),
                install(root.path(), "3.21", false),
            ],
        );

        let path = locator.locate(None).unwrap();
        assert!(path.starts_with(root.path().join("3.10")));
    }

    #[test]
    fn nothing_installed() {
        let locator = ExecutableLocator::new("WCCILpmon", Vec::new());
        assert!(locator.locate(None).is_none());
    }

    #[test]
    fn inventory_only_contributes_system_installations() {
        let projects = vec![
            Project::system("3.20", "/opt/runtime/3.20"),
            Project::new("plant", "/srv/plant").with_version("3.20"),
        ];
        let locator = ExecutableLocator::from_inventory("WCCILpmon", &projects);
        let installs = locator.installations_newest_first();
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0].install_dir, PathBuf::from("/opt/runtime/3.20"));
    }

    #[test]
    fn sort_is_stable_for_equal_versions() {
        let locator = ExecutableLocator::new(
            "WCCILpmon",
            vec![
                SystemInstallation {
                    version: "3.20".into(),
                    install_dir: "/a".into(),
                },
                SystemInstallation {
                    version: "3.20.0".into(),
                    install_dir: "/b".into(),
                },
                SystemInstallation {
                    version: "3.21".into(),
                    install_dir: "/c".into(),
                },
            ],
        );
        let order: Vec<PathBuf> = locator
            .installations_newest_first()
            .into_iter()
            .map(|i| i.install_dir)
            .collect();
        assert_eq!(order, vec![PathBuf::from("/c"), "/a".into(), "/b".into()]);
    }
}

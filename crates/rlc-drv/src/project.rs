//! Project file loading.
//!
//! A Royal project is described by a whitespace-indented `key: value`
//! file, two spaces of indentation per nesting level:
//!
//! ```text
//! name: calculator
//! sourcePaths:
//!   src
//!   vendor/extra
//! dependencies:
//!   royal.io:
//!     version: 1.2
//!   mathkit:
//!     path: ../mathkit
//! ```
//!
//! Recognized top-level keys are `name`, `sourcePaths` (children are
//! path strings) and `dependencies` (children are dependency names with
//! optional `version` and `path` sub-keys). Dependency order is
//! preserved.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{DriverError, Result};

/// Default project file name looked up in the project root.
pub const PROJECT_FILE_NAME: &str = "project.royal";

/// A parsed project file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    /// Project name.
    pub name: String,
    /// Directories searched for `.rl` sources, relative to the root.
    pub source_paths: Vec<String>,
    /// Declared dependencies, in declaration order.
    pub dependencies: IndexMap<String, Dependency>,
}

/// One declared dependency.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub path: Option<String>,
}

/// Which nested block the loader is inside.
#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    SourcePaths,
    Dependencies,
}

impl Project {
    /// Load and parse the project file at `path`.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DriverError::Project(format!(
                "Project file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse project file content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut project = Project::default();
        let mut section = Section::None;
        let mut current_dependency: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let number = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let indent = raw.len() - raw.trim_start_matches(' ').len();
            if indent % 2 != 0 {
                return Err(DriverError::Project(format!(
                    "line {}: indentation must be in steps of two spaces",
                    number
                )));
            }
            let level = indent / 2;

            let (key, value) = match trimmed.split_once(':') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (trimmed, ""),
            };

            match level {
                0 => {
                    current_dependency = None;
                    match key {
                        "name" => {
                            if value.is_empty() {
                                return Err(DriverError::Project(format!(
                                    "line {}: missing value for 'name'",
                                    number
                                )));
                            }
                            project.name = value.to_string();
                            section = Section::None;
                        },
                        "sourcePaths" => section = Section::SourcePaths,
                        "dependencies" => section = Section::Dependencies,
                        other => {
                            return Err(DriverError::Project(format!(
                                "line {}: unknown key '{}'",
                                number, other
                            )));
                        },
                    }
                },
                1 => match section {
                    Section::SourcePaths => {
                        let path = trimmed.strip_suffix(':').unwrap_or(trimmed);
                        project.source_paths.push(path.to_string());
                    },
                    Section::Dependencies => {
                        if key.is_empty() {
                            return Err(DriverError::Project(format!(
                                "line {}: missing dependency name",
                                number
                            )));
                        }
                        current_dependency = Some(key.to_string());
                        project.dependencies.insert(
                            key.to_string(),
                            Dependency {
                                name: key.to_string(),
                                ..Dependency::default()
                            },
                        );
                    },
                    Section::None => {
                        return Err(DriverError::Project(format!(
                            "line {}: unexpected indented entry",
                            number
                        )));
                    },
                },
                2 => {
                    let dependency = current_dependency
                        .as_ref()
                        .and_then(|name| project.dependencies.get_mut(name));
                    match dependency {
                        Some(dependency) => match key {
                            "version" => dependency.version = Some(value.to_string()),
                            "path" => dependency.path = Some(value.to_string()),
                            other => {
                                return Err(DriverError::Project(format!(
                                    "line {}: unknown dependency key '{}'",
                                    number, other
                                )));
                            },
                        },
                        None => {
                            return Err(DriverError::Project(format!(
                                "line {}: unexpected indented entry",
                                number
                            )));
                        },
                    }
                },
                _ => {
                    return Err(DriverError::Project(format!(
                        "line {}: entry is nested too deeply",
                        number
                    )));
                },
            }
        }

        if project.name.is_empty() {
            return Err(DriverError::Project("missing 'name' key".to_string()));
        }
        if project.source_paths.is_empty() {
            // A bare project compiles from its root.
            project.source_paths.push(".".to_string());
        }

        Ok(project)
    }
}

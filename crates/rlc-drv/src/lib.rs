//! rlc-drv - Compiler driver for the Royal language.
//!
//! The driver owns one [`Session`] per invocation. A session loads the
//! project file, discovers `.rl` sources under the project's source
//! paths, and runs each file through the front-end pipeline:
//!
//! ```text
//! source text -> scan -> group -> parse -> module AST
//! ```
//!
//! After the parse phase the session runs the trivial existence checks
//! (import targets and include files), the only semantic analysis the
//! front-end performs. Compilation short-circuits after any phase in
//! which the reporter has errors; the binary prints the collected
//! faults to stderr, one per line, and exits non-zero.

pub mod error;
pub mod project;

pub use error::{DriverError, Result};
pub use project::{Dependency, Project, PROJECT_FILE_NAME};

use std::path::{Path, PathBuf};

use rlc_lex::{group, scan, TokenNode};
use rlc_par::{Module, Parser};
use rlc_util::{FxHashSet, Reporter};

/// Options for one compiler invocation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory the project file lives in; source paths are relative
    /// to it.
    pub project_root: PathBuf,
    /// Project file name inside the root.
    pub project_file: String,
    /// Report each phase on stderr.
    pub verbose: bool,
    /// Write `parsertrees/parsertree_<module>.json` dumps.
    pub dump_parse_trees: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            project_file: PROJECT_FILE_NAME.to_string(),
            verbose: false,
            dump_parse_trees: false,
        }
    }
}

/// State for one compiler invocation.
pub struct Session {
    config: Config,
    reporter: Reporter,
}

impl Session {
    /// Create a session.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            reporter: Reporter::new(),
        }
    }

    /// The fault collector for this session.
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Compile the project.
    ///
    /// Returns the parsed modules, or [`DriverError::CompilationFailed`]
    /// once any phase leaves faults on the reporter.
    pub fn compile(&mut self) -> Result<Vec<Module>> {
        let project_path = self.config.project_root.join(&self.config.project_file);
        let project = Project::load_from_path(&project_path)?;
        if self.config.verbose {
            eprintln!("Compiling project: {}", project.name);
        }

        let sources = self.collect_sources(&project)?;

        // Phase: scan, group and parse every source file.
        let mut modules = Vec::new();
        for path in &sources {
            if self.config.verbose {
                eprintln!("Parsing: {}", path.display());
            }

            let text = std::fs::read_to_string(path)?;
            let label = self.source_label(path);

            let lexemes = scan(&text);
            let tree = group(&label, lexemes, &self.reporter);

            let mut parser = Parser::new(&label, &self.reporter);
            let module = parser.parse_module(&tree);

            if self.config.dump_parse_trees {
                self.dump_parse_tree(&module, path, &tree)?;
            }

            modules.push(module);
        }
        if self.reporter.has_errors() {
            return Err(DriverError::CompilationFailed);
        }

        // Phase: trivial existence checks.
        if self.config.verbose {
            eprintln!("Checking imports and includes");
        }
        self.check_existence(&project, &modules);
        if self.reporter.has_errors() {
            return Err(DriverError::CompilationFailed);
        }

        Ok(modules)
    }

    /// All `.rl` files under the project's source paths, in sorted
    /// order for deterministic diagnostics.
    fn collect_sources(&self, project: &Project) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for dir in &project.source_paths {
            let base = self.config.project_root.join(dir);
            if !base.is_dir() {
                return Err(DriverError::Project(format!(
                    "Source path not found: {}",
                    base.display()
                )));
            }
            collect_sources_into(&base, &mut sources)?;
        }
        sources.sort();
        sources.dedup();
        Ok(sources)
    }

    /// The label a file's faults carry: its path relative to the
    /// project root where possible.
    fn source_label(&self, path: &Path) -> String {
        path.strip_prefix(&self.config.project_root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Import targets must name a compiled module or a declared
    /// dependency; include files must exist next to the including
    /// source.
    fn check_existence(&self, project: &Project, modules: &[Module]) {
        let mut known: FxHashSet<&str> = modules
            .iter()
            .filter(|module| !module.name.is_empty())
            .map(|module| module.name.as_str())
            .collect();
        known.extend(project.dependencies.keys().map(|name| name.as_str()));

        for module in modules {
            for import in &module.imports {
                if !known.contains(import.module.as_str()) {
                    self.reporter.error(
                        &module.source,
                        import.line,
                        format!("Cannot find module '{}'.", import.module),
                    );
                }
            }

            let source_dir = self
                .config
                .project_root
                .join(&module.source)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.config.project_root.clone());
            for include in &module.includes {
                if !source_dir.join(&include.path).is_file() {
                    self.reporter.error(
                        &module.source,
                        include.line,
                        format!("Cannot find include file '{}'.", include.path),
                    );
                }
            }
        }
    }

    /// Write the grouped token tree as JSON for debugging.
    fn dump_parse_tree(&self, module: &Module, path: &Path, tree: &TokenNode) -> Result<()> {
        let dir = self.config.project_root.join("parsertrees");
        std::fs::create_dir_all(&dir)?;

        let stem = if module.name.is_empty() {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            module.name.clone()
        };

        let dump = dir.join(format!("parsertree_{}.json", stem));
        std::fs::write(dump, serde_json::to_string_pretty(&token_tree_to_json(tree))?)?;
        Ok(())
    }
}

/// Recursively gather `.rl` files under `dir`.
fn collect_sources_into(dir: &Path, sources: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_sources_into(&path, sources)?;
        } else if path.extension().map(|ext| ext == "rl").unwrap_or(false) {
            sources.push(path);
        }
    }
    Ok(())
}

/// Convert a token tree to a JSON value for the parse-tree dump.
pub fn token_tree_to_json(node: &TokenNode) -> serde_json::Value {
    serde_json::json!({
        "statement": node
            .statement
            .iter()
            .map(|lexeme| serde_json::json!({ "text": lexeme.text, "line": lexeme.line }))
            .collect::<Vec<_>>(),
        "children": node.children.iter().map(token_tree_to_json).collect::<Vec<_>>(),
    })
}

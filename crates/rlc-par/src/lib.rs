//! rlc-par - Recursive-descent parser for the Royal language.
//!
//! The parser walks the grouped token tree produced by `rlc-lex` and
//! builds the typed AST defined in [`ast`]. Each statement parser is a
//! left-to-right walk over one node's lexemes; block-shaped constructs
//! recurse into the node's children.
//!
//! The [`Parser`] is the per-compilation context object: it owns the
//! pending-attribute buffer, the scope-exit handler registry and the
//! cached do-while body, and borrows the shared [`Reporter`]. Nothing in
//! this crate touches process-wide state, so compiling several modules
//! concurrently only requires one parser and reporter per module.
//!
//! Failure is signalled by returning `None` after registering a fault;
//! the module-level dispatcher continues with the next top-level
//! construct to surface as many diagnostics as possible in one pass.

pub mod ast;
pub mod classify;
pub mod expr;
pub mod flow;
pub mod items;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod edge_cases;

use rlc_lex::TokenNode;
use rlc_util::{FxHashMap, Reporter};

pub use ast::*;
pub use classify::{classify, ProductionKind};
pub use types::{Mutability, TypeEntry, TypeInfo, TypeKind};

/// The per-compilation parsing context.
pub struct Parser<'a> {
    /// Source label used for every fault this parser raises.
    source: String,
    /// Shared fault collector.
    reporter: &'a Reporter,
    /// Attributes buffered until the next declaration claims them.
    pending_attributes: Vec<Attribute>,
    /// Installed scope-exit handlers with reference counts, so nested
    /// constructs that install the same handler can coexist.
    handlers: FxHashMap<&'static str, u32>,
    /// A parsed `do` body waiting for its `while` statement.
    pending_do: Option<(Vec<ScopeItem>, u32)>,
}

impl<'a> Parser<'a> {
    /// Create a parser for one source file.
    pub fn new(source: impl Into<String>, reporter: &'a Reporter) -> Self {
        Self {
            source: source.into(),
            reporter,
            pending_attributes: Vec::new(),
            handlers: FxHashMap::default(),
            pending_do: None,
        }
    }

    /// Parse a whole module from the root of a grouped token tree.
    ///
    /// Always returns a module; parse failures are recorded on the
    /// reporter and the dispatcher moves on to the next construct.
    pub fn parse_module(&mut self, root: &TokenNode) -> Module {
        let mut module = Module {
            source: self.source.clone(),
            ..Module::default()
        };

        for node in &root.children {
            // Stray sentinels only appear for unbalanced input; the
            // grouper already reported those.
            if node.is_open_sentinel() || node.is_close_sentinel() {
                continue;
            }

            match classify(&node.statement) {
                ProductionKind::Module => self.parse_module_statement(node, &mut module),
                ProductionKind::Import => {
                    if let Some(import) = self.parse_import(node) {
                        module.imports.push(import);
                    }
                },
                ProductionKind::Include => {
                    if let Some(include) = self.parse_include(node) {
                        module.includes.push(include);
                    }
                },
                ProductionKind::Attribute => self.parse_attribute(node),
                ProductionKind::Alias => {
                    if let Some(alias) = self.parse_alias(node) {
                        module.aliases.push(alias);
                    }
                },
                ProductionKind::Enum => {
                    if let Some(decl) = self.parse_enum(node) {
                        module.enums.push(decl);
                    }
                },
                ProductionKind::Variable => {
                    if let Some(variable) = self.parse_variable(&node.statement, true) {
                        module.variables.push(variable);
                    }
                },
                ProductionKind::Function => {
                    if let Some(function) = self.parse_function(node, false) {
                        module.functions.push(function);
                    }
                },
                ProductionKind::Internal => {
                    if let Some(function) = self.parse_function(node, true) {
                        module.internal_functions.push(function);
                    }
                },
                ProductionKind::Struct
                | ProductionKind::Interface
                | ProductionKind::Template
                | ProductionKind::Traits
                | ProductionKind::This
                | ProductionKind::StaticThis
                | ProductionKind::StaticIf
                | ProductionKind::StaticElse => {
                    self.error(
                        node.line(),
                        format!(
                            "Unsupported declaration '{}'.",
                            node.first_text().unwrap_or_default()
                        ),
                    );
                },
                ProductionKind::Empty => {
                    if !node.children.is_empty() {
                        self.error(node.line(), "Invalid declaration.");
                    }
                },
                ProductionKind::Return
                | ProductionKind::If
                | ProductionKind::Else
                | ProductionKind::Switch
                | ProductionKind::For
                | ProductionKind::Foreach
                | ProductionKind::While
                | ProductionKind::Do
                | ProductionKind::Unknown => {
                    self.error(
                        node.line(),
                        format!(
                            "Invalid declaration '{}'.",
                            node.first_text().unwrap_or_default()
                        ),
                    );
                },
            }
        }

        module
    }

    /// Register an immediate fault.
    pub(crate) fn error(&mut self, line: u32, message: impl Into<String>) {
        self.reporter.error(&self.source, line, message);
    }

    /// Register a fault on the channel the caller selected: queued while
    /// probing a speculative production, immediate otherwise.
    pub(crate) fn report(&mut self, line: u32, message: impl Into<String>, speculative: bool) {
        if speculative {
            self.reporter.queue(&self.source, line, message);
        } else {
            self.reporter.error(&self.source, line, message);
        }
    }

    /// The shared reporter.
    pub(crate) fn reporter(&self) -> &Reporter {
        self.reporter
    }

    /// Take the buffered attributes for the declaration that claims them.
    pub(crate) fn take_attributes(&mut self) -> Vec<Attribute> {
        std::mem::take(&mut self.pending_attributes)
    }

    /// Buffer an attribute for the next declaration.
    pub(crate) fn push_attribute(&mut self, attribute: Attribute) {
        self.pending_attributes.push(attribute);
    }

    /// Install a scope-exit handler for the duration of a body parse.
    pub(crate) fn install_handler(&mut self, name: &'static str) {
        *self.handlers.entry(name).or_insert(0) += 1;
    }

    /// Remove one installation of a scope-exit handler.
    pub(crate) fn remove_handler(&mut self, name: &'static str) {
        if let Some(count) = self.handlers.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                self.handlers.remove(name);
            }
        }
    }

    /// Whether a scope-exit handler is currently installed.
    pub(crate) fn handler_installed(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Stash a parsed `do` body until the matching `while` consumes it.
    pub(crate) fn cache_do_body(&mut self, body: Vec<ScopeItem>, line: u32) {
        self.pending_do = Some((body, line));
    }

    /// Take the cached `do` body, if any.
    pub(crate) fn take_do_body(&mut self) -> Option<(Vec<ScopeItem>, u32)> {
        self.pending_do.take()
    }

    /// Swap out the cached `do` body around a nested scope so do-while
    /// pairs resolve at their own nesting level.
    pub(crate) fn swap_do_body(
        &mut self,
        saved: Option<(Vec<ScopeItem>, u32)>,
    ) -> Option<(Vec<ScopeItem>, u32)> {
        std::mem::replace(&mut self.pending_do, saved)
    }

    /// Validate a declared identifier, emitting an invalid-identifier
    /// fault naming the construct when it is malformed.
    pub(crate) fn check_identifier(&mut self, text: &str, line: u32, what: &str) -> bool {
        if classify::is_valid_identifier(text) {
            return true;
        }
        self.error(line, format!("Invalid {} identifier '{}'.", what, text));
        false
    }
}

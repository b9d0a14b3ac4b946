//! The token-tree grouper.
//!
//! Before real parsing begins, the flat lexeme list is folded into a
//! hierarchical [`TokenNode`] tree split on statement terminators and
//! brace-delimited blocks:
//!
//! - `;` closes the current statement into a child node of the open
//!   scope, terminator included.
//! - `{` closes the accumulating statement into a new node that *owns*
//!   the upcoming block: its first child is a singleton `{` sentinel, and
//!   the node becomes the open scope.
//! - `}` appends the matching `}` sentinel, closes the scope and hands
//!   back to the enclosing one.
//!
//! The tree is built with an explicit stack of open scopes, so nodes
//! need no parent back-pointers and ownership stays a strict tree.
//!
//! Two defensive rules round this out: a lone `"` lexeme toggles a
//! string-absorption mode that fuses everything up to the closing quote
//! into one preserved string lexeme, and an attribute statement
//! (`public:` or `@Name(args):`) is terminated by its trailing colon
//! rather than a semicolon.

use rlc_util::Reporter;

use crate::lexeme::Lexeme;

/// Keywords that form a bare attribute statement when followed by `:`.
const ATTRIBUTE_KEYWORDS: &[&str] = &[
    "public",
    "private",
    "protected",
    "package",
    "static",
    "immutable",
    "const",
    "mut",
];

/// A node of the grouped token tree.
///
/// Either the node holds one statement (its lexemes, `;`-terminated
/// except for attribute statements), or it heads a block: `statement`
/// holds the tokens before the `{` (possibly none, for a bare block) and
/// `children` starts with a `{` sentinel and ends with the matching `}`
/// sentinel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenNode {
    /// The flat lexemes of one statement or block header.
    pub statement: Vec<Lexeme>,
    /// Child nodes of a block, framed by `{` and `}` sentinels.
    pub children: Vec<TokenNode>,
}

impl TokenNode {
    /// A node holding one statement.
    pub fn statement(lexemes: Vec<Lexeme>) -> Self {
        Self {
            statement: lexemes,
            children: Vec::new(),
        }
    }

    /// A singleton `{` or `}` delimiter node.
    pub fn sentinel(lexeme: Lexeme) -> Self {
        Self {
            statement: vec![lexeme],
            children: Vec::new(),
        }
    }

    /// Text of the first lexeme, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.statement.first().map(|l| l.text.as_str())
    }

    /// Whether this node is a `{` block-opening sentinel.
    pub fn is_open_sentinel(&self) -> bool {
        self.statement.len() == 1 && self.statement[0].text == "{" && self.children.is_empty()
    }

    /// Whether this node is a `}` block-closing sentinel.
    pub fn is_close_sentinel(&self) -> bool {
        self.statement.len() == 1 && self.statement[0].text == "}" && self.children.is_empty()
    }

    /// Line of the node: the first statement lexeme's line, or the first
    /// child's line for a header-less block.
    pub fn line(&self) -> u32 {
        self.statement
            .first()
            .map(|l| l.line)
            .or_else(|| self.children.first().map(|c| c.line()))
            .unwrap_or(1)
    }

    /// The statement's lexeme texts, for classification and tests.
    pub fn texts(&self) -> Vec<&str> {
        self.statement.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Group `lexemes` into a token tree.
///
/// `source` labels any diagnostics; the only faults the grouper itself
/// raises are for a `}` with no open scope. Unclosed scopes are closed
/// silently at end of input and left for the parser to reject.
pub fn group(source: &str, lexemes: Vec<Lexeme>, reporter: &Reporter) -> TokenNode {
    // Stack of open scopes; index 0 is the root.
    let mut stack: Vec<TokenNode> = vec![TokenNode::default()];
    let mut statement: Vec<Lexeme> = Vec::new();
    let mut absorbing: Option<(Vec<String>, u32)> = None;

    let mut index = 0;
    while index < lexemes.len() {
        let lexeme = &lexemes[index];

        // String-absorption mode: a stray quote fuses everything up to
        // the closing quote into one preserved string lexeme.
        if let Some((mut parts, line)) = absorbing.take() {
            if lexeme.text == "\"" {
                let fused = format!("\"{}\"", parts.join(" "));
                statement.push(Lexeme::new(fused, line));
            } else {
                parts.push(lexeme.text.clone());
                absorbing = Some((parts, line));
            }
            index += 1;
            continue;
        }

        match lexeme.text.as_str() {
            ";" => {
                statement.push(lexeme.clone());
                let node = TokenNode::statement(std::mem::take(&mut statement));
                push_child(&mut stack, node);
            },
            "{" => {
                let mut owner = TokenNode::statement(std::mem::take(&mut statement));
                owner.children.push(TokenNode::sentinel(lexeme.clone()));
                stack.push(owner);
            },
            "}" => {
                if !statement.is_empty() {
                    let node = TokenNode::statement(std::mem::take(&mut statement));
                    push_child(&mut stack, node);
                }
                if stack.len() == 1 {
                    reporter.error(source, lexeme.line, "Unexpected '}' outside of any scope.");
                } else {
                    let mut owner = stack.pop().expect("scope stack underflow");
                    owner.children.push(TokenNode::sentinel(lexeme.clone()));
                    push_child(&mut stack, owner);
                }
            },
            "\"" => {
                absorbing = Some((Vec::new(), lexeme.line));
            },
            _ => {
                let next_is_colon = lexemes
                    .get(index + 1)
                    .map(|l| l.text == ":")
                    .unwrap_or(false);

                if next_is_colon && is_attribute_start(&statement, lexeme) {
                    statement.push(lexeme.clone());
                    statement.push(lexemes[index + 1].clone());
                    let node = TokenNode::statement(std::mem::take(&mut statement));
                    push_child(&mut stack, node);
                    index += 2;
                    continue;
                }

                statement.push(lexeme.clone());
            },
        }

        index += 1;
    }

    // An open absorption mode at end of input keeps what it collected.
    if let Some((parts, line)) = absorbing {
        statement.push(Lexeme::new(format!("\"{}\"", parts.join(" ")), line));
    }

    // Unterminated trailing statement: keep it so the parser can reject it.
    if !statement.is_empty() {
        let node = TokenNode::statement(statement);
        push_child(&mut stack, node);
    }

    // Unclosed scopes collapse into their parents at end of input.
    while stack.len() > 1 {
        let owner = stack.pop().expect("scope stack underflow");
        push_child(&mut stack, owner);
    }

    stack.pop().expect("scope stack underflow")
}

/// Append `node` to the children of the innermost open scope.
fn push_child(stack: &mut Vec<TokenNode>, node: TokenNode) {
    stack
        .last_mut()
        .expect("scope stack underflow")
        .children
        .push(node);
}

/// The attribute heuristic: the upcoming `:` terminates the statement
/// when the current lexeme is a bare attribute keyword at statement
/// start, or the statement accumulated so far began with `@`.
fn is_attribute_start(statement: &[Lexeme], current: &Lexeme) -> bool {
    if statement.is_empty() {
        return ATTRIBUTE_KEYWORDS.contains(&current.text.as_str())
            || current.text.starts_with('@');
    }
    statement[0].text.starts_with('@')
}

//! Declaration parsing - module, import, include, attribute, alias,
//! enum, variable and function statements.

use rlc_lex::{Lexeme, TokenNode};

use crate::ast::*;
use crate::classify::is_valid_qualified_identifier;
use crate::types::TypeInfo;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Strip the trailing `;` from a statement, faulting when absent.
    pub(crate) fn strip_terminator<'t>(
        &mut self,
        stmt: &'t [Lexeme],
        what: &str,
    ) -> Option<&'t [Lexeme]> {
        match stmt.last() {
            Some(last) if last.text == ";" => Some(&stmt[..stmt.len() - 1]),
            Some(last) => {
                self.error(last.line, format!("Missing ';' from {} statement.", what));
                None
            },
            None => None,
        }
    }

    /// `module <identifier>;` — at most one per file.
    pub fn parse_module_statement(&mut self, node: &TokenNode, module: &mut Module) {
        let line = node.line();
        let tokens = match self.strip_terminator(&node.statement, "module") {
            Some(tokens) => tokens,
            None => return,
        };

        if !module.name.is_empty() {
            self.error(line, "Only one module statement is allowed per module.");
            return;
        }
        if tokens.len() < 2 {
            self.error(line, "Missing module identifier from module statement.");
            return;
        }
        if tokens.len() > 2 {
            self.error(tokens[2].line, "Invalid module statement.");
            return;
        }

        let name = tokens[1].text.clone();
        if !is_valid_qualified_identifier(&name) {
            self.error(tokens[1].line, format!("Invalid module identifier '{}'.", name));
            return;
        }

        module.name = name;
        module.line = line;
        module.attributes = self.take_attributes();
    }

    /// `import <identifier> [: member, member …];`
    pub fn parse_import(&mut self, node: &TokenNode) -> Option<Import> {
        let line = node.line();
        let tokens = self.strip_terminator(&node.statement, "import")?;

        if tokens.len() < 2 {
            self.error(line, "Missing module identifier from import statement.");
            return None;
        }

        let module = tokens[1].text.clone();
        if !is_valid_qualified_identifier(&module) {
            self.error(tokens[1].line, format!("Invalid module identifier '{}'.", module));
            return None;
        }

        let mut members = Vec::new();
        if tokens.len() > 2 {
            if tokens[2].text != ":" {
                self.error(tokens[2].line, "Invalid import statement.");
                return None;
            }

            let mut expect_member = true;
            for token in &tokens[3..] {
                if expect_member {
                    if !self.check_identifier(&token.text, token.line, "member") {
                        return None;
                    }
                    members.push(token.text.clone());
                    expect_member = false;
                } else {
                    if token.text != "," {
                        self.error(token.line, "Invalid import statement.");
                        return None;
                    }
                    expect_member = true;
                }
            }
            if members.is_empty() || expect_member {
                self.error(line, "Missing member from import statement.");
                return None;
            }
        }

        Some(Import { module, members, line })
    }

    /// `include "<path>";` — the path must be a double-quoted string.
    pub fn parse_include(&mut self, node: &TokenNode) -> Option<Include> {
        let line = node.line();
        let tokens = self.strip_terminator(&node.statement, "include")?;

        if tokens.len() < 2 {
            self.error(line, "Missing path from include statement.");
            return None;
        }
        if tokens.len() > 2 {
            self.error(tokens[2].line, "Invalid include statement.");
            return None;
        }

        let quoted = &tokens[1];
        if !quoted.is_string() {
            self.error(quoted.line, "Include path must be a double-quoted string.");
            return None;
        }

        Some(Include {
            path: quoted.text[1..quoted.text.len() - 1].to_string(),
            line,
        })
    }

    /// A bare keyword attribute (`public:`) or a constructor-call
    /// attribute (`@Name(args):`), buffered for the next declaration.
    pub fn parse_attribute(&mut self, node: &TokenNode) {
        let stmt = &node.statement;
        let line = node.line();

        if stmt.last().map(|l| l.text != ":").unwrap_or(true) {
            self.error(line, "Missing ':' from attribute declaration.");
            return;
        }
        let tokens = &stmt[..stmt.len() - 1];

        if tokens.first().map(|l| l.text == "@").unwrap_or(false) {
            if tokens.len() < 2 {
                self.error(line, "Missing constructor from attribute declaration.");
                return;
            }
            if let Some(call) = self.parse_function_call(&tokens[1..], true, false) {
                self.push_attribute(Attribute::Constructor(call));
            }
            return;
        }

        match tokens {
            [keyword] => match AttributeKeyword::from_text(&keyword.text) {
                Some(keyword) => self.push_attribute(Attribute::Keyword(keyword)),
                None => {
                    self.error(line, format!("Unknown attribute '{}'.", keyword.text));
                },
            },
            _ => self.error(line, "Invalid attribute declaration."),
        }
    }

    /// `alias <name> [(params)] = <right-hand>;`
    ///
    /// The right-hand side is probed as an expression first; when that
    /// probe fails its faults stay queued and a type expression is
    /// tried. Only when both probes fail does the queue flush.
    pub fn parse_alias(&mut self, node: &TokenNode) -> Option<Alias> {
        let line = node.line();
        let tokens = self.strip_terminator(&node.statement, "alias")?;

        if tokens.len() < 2 {
            self.error(line, "Missing name from alias declaration.");
            return None;
        }
        let name = tokens[1].text.clone();
        if !self.check_identifier(&name, tokens[1].line, "alias") {
            return None;
        }

        let mut index = 2;
        let mut parameters = Vec::new();
        if tokens.get(index).map(|t| t.text == "(").unwrap_or(false) {
            let close = match find_group_end(tokens, index) {
                Some(close) => close,
                None => {
                    self.error(line, "Missing ')' from alias declaration.");
                    return None;
                },
            };
            parameters = self.parse_parameters(&tokens[index + 1..close])?;
            index = close + 1;
        }

        if tokens.get(index).map(|t| t.text != "=").unwrap_or(true) {
            self.error(line, "Missing '=' from alias declaration.");
            return None;
        }
        let right = &tokens[index + 1..];
        if right.is_empty() {
            self.error(line, "Missing right-hand side from alias declaration.");
            return None;
        }

        let target = if let Some(expression) = self.parse_expression(right, line, false, true) {
            self.reporter().clear_queued();
            AliasTarget::Expression(expression)
        } else if let Some(info) = self.parse_type(right, line, true) {
            self.reporter().clear_queued();
            AliasTarget::Type(info.named(name.clone()))
        } else {
            self.reporter().flush_queued();
            return None;
        };

        Some(Alias {
            name,
            parameters,
            target,
            attributes: self.take_attributes(),
            line,
        })
    }

    /// `var [type] name [= expr];`, or an enum member when
    /// `leading_var` is false.
    pub fn parse_variable(&mut self, stmt: &[Lexeme], leading_var: bool) -> Option<Variable> {
        let line = stmt.first().map(|l| l.line).unwrap_or(1);
        let tokens = self.strip_terminator(stmt, "variable")?;
        let tokens = if leading_var { &tokens[1..] } else { tokens };

        // Split on the first depth-0 `=`.
        let equals = find_at_depth(tokens, "=");
        let (left, right) = match equals {
            Some(position) => (&tokens[..position], Some(&tokens[position + 1..])),
            None => (tokens, None),
        };

        if left.is_empty() {
            self.error(line, "Missing name from variable declaration.");
            return None;
        }

        let name_token = left.last().expect("left side is non-empty");
        let name = name_token.text.clone();
        if !self.check_identifier(&name, name_token.line, "variable") {
            return None;
        }

        let ty = if left.len() > 1 {
            Some(self.parse_type(&left[..left.len() - 1], line, false)?.named(name.clone()))
        } else {
            None
        };

        let expression = match right {
            Some(tokens) => Some(self.parse_expression(tokens, line, false, false)?),
            None => None,
        };

        Some(Variable {
            name,
            ty,
            expression,
            attributes: self.take_attributes(),
            line,
        })
    }

    /// `enum name [: type] = expr;` or `enum name [: type] { member… }`.
    pub fn parse_enum(&mut self, node: &TokenNode) -> Option<EnumDecl> {
        let line = node.line();
        let block_form = !node.children.is_empty();

        let mut tokens: &[Lexeme] = &node.statement;
        if block_form {
            if tokens.last().map(|l| l.text == ";").unwrap_or(false) {
                self.error(line, "Invalid enum declaration.");
                return None;
            }
        } else {
            tokens = self.strip_terminator(tokens, "enum")?;
        }

        if tokens.len() < 2 {
            self.error(line, "Missing name from enum declaration.");
            return None;
        }
        let name = tokens[1].text.clone();
        if !self.check_identifier(&name, tokens[1].line, "enum") {
            return None;
        }

        let equals = find_at_depth(tokens, "=");
        let head_end = equals.unwrap_or(tokens.len());
        let base_type = if head_end > 2 {
            Some(self.parse_type(&tokens[2..head_end], line, false)?)
        } else {
            None
        };

        let value = match equals {
            Some(position) => {
                if block_form {
                    self.error(line, "Invalid enum declaration.");
                    return None;
                }
                Some(self.parse_expression(&tokens[position + 1..], line, false, false)?)
            },
            None => {
                if !block_form {
                    self.error(line, "Missing value from enum declaration.");
                    return None;
                }
                None
            },
        };

        let mut members = Vec::new();
        if block_form {
            for child in &node.children {
                if child.is_open_sentinel() || child.is_close_sentinel() {
                    continue;
                }
                if !child.children.is_empty() {
                    self.error(child.line(), "Invalid declaration in enum scope.");
                    continue;
                }
                if let Some(member) = self.parse_variable(&child.statement, false) {
                    members.push(member);
                }
            }
        }

        Some(EnumDecl {
            name,
            base_type,
            value,
            members,
            attributes: self.take_attributes(),
            line,
        })
    }

    /// `[internal] fn [returnType] name [(template)](params) [{…}|;]`.
    ///
    /// The return type defaults to `void`. An internal function is a
    /// forward declaration and must carry `;` instead of a body.
    pub fn parse_function(&mut self, node: &TokenNode, internal: bool) -> Option<Function> {
        let line = node.line();
        let stmt = &node.statement;
        let has_body = !node.children.is_empty();

        let mut start = 1;
        if internal {
            if stmt.get(1).map(|l| l.text != "fn").unwrap_or(true) {
                self.error(line, "Missing fn from internal function declaration.");
                return None;
            }
            start = 2;
        }

        let mut signature = &stmt[start..];
        let mut has_terminator = false;
        if signature.last().map(|l| l.text == ";").unwrap_or(false) {
            signature = &signature[..signature.len() - 1];
            has_terminator = true;
        }

        if internal {
            if has_body {
                self.error(line, "Internal functions cannot declare a body.");
                return None;
            }
            if !has_terminator {
                self.error(line, "Missing ';' from internal function declaration.");
                return None;
            }
        } else if !has_body {
            self.error(line, "Missing scope from function declaration.");
            return None;
        }

        // Head: everything before the first parameter list; the last
        // token is the name, the rest the return type spread.
        let open = match signature.iter().position(|l| l.text == "(") {
            Some(open) => open,
            None => {
                self.error(line, "Missing '(' from function declaration.");
                return None;
            },
        };
        if open == 0 {
            self.error(line, "Missing function identifier from declaration.");
            return None;
        }

        let name_token = &signature[open - 1];
        let name = name_token.text.clone();
        if !self.check_identifier(&name, name_token.line, "function") {
            return None;
        }

        let return_type = if open > 1 {
            self.parse_type(&signature[..open - 1], line, false)?
        } else {
            TypeInfo::void()
        };

        // One or two parameter lists.
        let mut groups: Vec<Vec<Parameter>> = Vec::new();
        let mut index = open;
        while signature.get(index).map(|l| l.text == "(").unwrap_or(false) {
            if groups.len() == 2 {
                self.error(line, "Too many parameter lists in function declaration.");
                return None;
            }
            let close = match find_group_end(signature, index) {
                Some(close) => close,
                None => {
                    self.error(line, "Missing ')' from function declaration.");
                    return None;
                },
            };
            groups.push(self.parse_parameters(&signature[index + 1..close])?);
            index = close + 1;
        }
        if index < signature.len() {
            self.error(
                signature[index].line,
                format!("Unexpected '{}' in function declaration.", signature[index].text),
            );
            return None;
        }

        let (template_parameters, parameters) = match groups.len() {
            1 => {
                let mut groups = groups;
                let parameters = self.require_parameter_types(groups.pop().expect("one group"))?;
                (Vec::new(), parameters)
            },
            2 => {
                let mut groups = groups;
                let parameters = self.require_parameter_types(groups.pop().expect("two groups"))?;
                (groups.pop().expect("template group"), parameters)
            },
            _ => {
                self.error(line, "Missing '(' from function declaration.");
                return None;
            },
        };

        let attributes = self.take_attributes();
        let body = if has_body {
            Some(self.parse_scope(node))
        } else {
            None
        };

        Some(Function {
            name,
            return_type,
            template_parameters,
            parameters,
            body,
            attributes,
            line,
        })
    }

    /// Parse a comma-separated parameter list interior. Single-token
    /// entries are allowed and produce untyped parameters; callers that
    /// require types run `require_parameter_types` over the result.
    pub fn parse_parameters(&mut self, tokens: &[Lexeme]) -> Option<Vec<Parameter>> {
        let mut parameters = Vec::new();

        for slice in split_at_depth(tokens, ",") {
            let slice = match slice {
                Some(slice) => slice,
                None => {
                    let line = tokens.first().map(|l| l.line).unwrap_or(1);
                    self.error(line, "Missing parameter from declaration.");
                    return None;
                },
            };

            let name_token = slice.last().expect("split slices are non-empty");
            let name = name_token.text.clone();
            if !self.check_identifier(&name, name_token.line, "parameter") {
                return None;
            }

            let ty = if slice.len() > 1 {
                Some(
                    self.parse_type(&slice[..slice.len() - 1], name_token.line, false)?
                        .named(name.clone()),
                )
            } else {
                None
            };

            parameters.push(Parameter {
                ty,
                name,
                line: name_token.line,
            });
        }

        Some(parameters)
    }

    /// Reject untyped parameters in a value parameter list.
    fn require_parameter_types(&mut self, parameters: Vec<Parameter>) -> Option<Vec<Parameter>> {
        for parameter in &parameters {
            if parameter.ty.is_none() {
                self.error(
                    parameter.line,
                    format!("Missing type from parameter '{}'.", parameter.name),
                );
                return None;
            }
        }
        Some(parameters)
    }
}

/// Index of the first depth-0 occurrence of `needle`, tracking paren and
/// bracket depth.
pub(crate) fn find_at_depth(tokens: &[Lexeme], needle: &str) -> Option<usize> {
    let mut paren = 0i32;
    let mut bracket = 0i32;
    for (index, token) in tokens.iter().enumerate() {
        match token.text.as_str() {
            "(" => paren += 1,
            ")" => paren -= 1,
            "[" => bracket += 1,
            "]" => bracket -= 1,
            text if text == needle && paren == 0 && bracket == 0 => return Some(index),
            _ => {},
        }
    }
    None
}

/// Index of the `)` matching the `(` at `open_index`.
pub(crate) fn find_group_end(tokens: &[Lexeme], open_index: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (index, token) in tokens.iter().enumerate().skip(open_index) {
        match token.text.as_str() {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            },
            _ => {},
        }
    }
    None
}

/// Split `tokens` on depth-0 occurrences of `separator`. An empty piece
/// between separators yields `None` so callers can fault on it; an
/// entirely empty input yields no pieces.
pub(crate) fn split_at_depth<'t>(
    tokens: &'t [Lexeme],
    separator: &str,
) -> Vec<Option<&'t [Lexeme]>> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut paren = 0i32;
    let mut bracket = 0i32;
    for (index, token) in tokens.iter().enumerate() {
        match token.text.as_str() {
            "(" => paren += 1,
            ")" => paren -= 1,
            "[" => bracket += 1,
            "]" => bracket -= 1,
            text if text == separator && paren == 0 && bracket == 0 => {
                if index == start {
                    pieces.push(None);
                } else {
                    pieces.push(Some(&tokens[start..index]));
                }
                start = index + 1;
            },
            _ => {},
        }
    }
    if start == tokens.len() {
        pieces.push(None);
    } else {
        pieces.push(Some(&tokens[start..]));
    }
    pieces
}

//! Control-flow parsing - if/else, switch/case, for, foreach, while and
//! do-while.
//!
//! Conditions are parsed with the expression core forced into boolean
//! mode. Every loop body (and every switch arm) is parsed with the
//! appropriate scope-exit handlers installed, which is what makes
//! `break` and `continue` legal inside and illegal outside.

use rlc_lex::{Lexeme, TokenNode};

use crate::ast::*;
use crate::classify::is_valid_qualified_identifier;
use crate::items::split_at_depth;
use crate::stmt::{split_range, terminated};
use crate::Parser;

impl<'a> Parser<'a> {
    /// `if <expr> { body }` with the expression forced boolean.
    pub fn parse_if(&mut self, node: &TokenNode) -> Option<IfBlock> {
        let line = node.line();
        if node.children.is_empty() {
            self.error(line, "Missing scope from if statement.");
            return None;
        }
        if node.statement.len() < 2 {
            self.error(line, "Missing expression from if statement.");
            return None;
        }

        let condition = self.parse_expression(&node.statement[1..], line, true, false)?;
        let body = self.parse_scope(node);

        Some(IfBlock { condition, body, line })
    }

    /// `else { body }`, or `else if …` recursing into the if parser.
    pub fn parse_else(&mut self, node: &TokenNode) -> Option<ElseBlock> {
        let line = node.line();
        let stmt = &node.statement;

        if stmt.len() == 1 {
            if node.children.is_empty() {
                self.error(line, "Missing scope from else statement.");
                return None;
            }
            let body = self.parse_scope(node);
            return Some(ElseBlock {
                if_branch: None,
                body,
                line,
            });
        }

        if stmt[1].text == "if" {
            let nested = TokenNode {
                statement: stmt[1..].to_vec(),
                children: node.children.clone(),
            };
            let if_block = self.parse_if(&nested)?;
            return Some(ElseBlock {
                if_branch: Some(Box::new(if_block)),
                body: Vec::new(),
                line,
            });
        }

        self.error(line, "Invalid else statement.");
        None
    }

    /// `switch <expr> { <arms…> }` — each arm statement is followed by
    /// its own scoped body with a break handler installed; `default`
    /// and `final` are each allowed at most once.
    pub fn parse_switch(&mut self, node: &TokenNode) -> Option<SwitchBlock> {
        let line = node.line();
        if node.children.is_empty() {
            self.error(line, "Missing scope from switch statement.");
            return None;
        }
        if node.statement.len() < 2 {
            self.error(line, "Missing expression from switch statement.");
            return None;
        }

        let expression = self.parse_expression(&node.statement[1..], line, true, false)?;

        let arms: Vec<&TokenNode> = node
            .children
            .iter()
            .filter(|child| !child.is_open_sentinel() && !child.is_close_sentinel())
            .collect();

        let mut cases = Vec::new();
        let mut default_body: Option<Vec<ScopeItem>> = None;
        let mut final_body: Option<Vec<ScopeItem>> = None;

        let mut index = 0;
        while index < arms.len() {
            let arm = arms[index];
            let arm_line = arm.line();

            match arm.first_text() {
                Some("case") => {
                    let Some((values, is_range)) = self.parse_case_values(arm) else {
                        index += skip_width(&arms, index);
                        continue;
                    };
                    let Some(body) = self.parse_arm_body(&arms, index, "case") else {
                        index += 1;
                        continue;
                    };
                    cases.push(CaseArm {
                        values,
                        is_range,
                        body,
                        line: arm_line,
                    });
                    index += 2;
                },
                Some("default") => {
                    if default_body.is_some() {
                        self.error(arm_line, "Only one default declaration is allowed per switch.");
                        index += skip_width(&arms, index);
                        continue;
                    }
                    let Some(body) = self.parse_arm_body(&arms, index, "default") else {
                        index += 1;
                        continue;
                    };
                    default_body = Some(body);
                    index += 2;
                },
                Some("final") => {
                    if final_body.is_some() {
                        self.error(arm_line, "Only one final declaration is allowed per switch.");
                        index += skip_width(&arms, index);
                        continue;
                    }
                    let Some(body) = self.parse_arm_body(&arms, index, "final") else {
                        index += 1;
                        continue;
                    };
                    final_body = Some(body);
                    index += 2;
                },
                other => {
                    self.error(
                        arm_line,
                        format!(
                            "Invalid declaration '{}' in switch scope.",
                            other.unwrap_or_default()
                        ),
                    );
                    index += 1;
                },
            }
        }

        Some(SwitchBlock {
            expression,
            cases,
            default_body,
            final_body,
            line,
        })
    }

    /// Values of one `case` statement: a comma-separated literal list,
    /// or an `a .. b` range.
    fn parse_case_values(&mut self, arm: &TokenNode) -> Option<(Vec<String>, bool)> {
        let line = arm.line();
        let stmt = &arm.statement;
        if stmt.last().map(|l| l.text != ";").unwrap_or(true) {
            self.error(line, "Missing ';' from case declaration.");
            return None;
        }
        let tokens = &stmt[1..stmt.len() - 1];
        if tokens.is_empty() {
            self.error(line, "Missing value from case declaration.");
            return None;
        }

        if let Some((low, high)) = split_range(tokens) {
            return Some((vec![low, high], true));
        }

        let mut values = Vec::new();
        for piece in split_at_depth(tokens, ",") {
            match piece {
                Some([value]) => values.push(value.text.clone()),
                Some(piece) => {
                    self.error(piece[0].line, "Invalid value in case declaration.");
                    return None;
                },
                None => {
                    self.error(line, "Missing value from case declaration.");
                    return None;
                },
            }
        }
        Some((values, false))
    }

    /// The scoped body following a switch arm statement, parsed with a
    /// break handler installed.
    fn parse_arm_body(
        &mut self,
        arms: &[&TokenNode],
        index: usize,
        what: &str,
    ) -> Option<Vec<ScopeItem>> {
        let body_node = arms.get(index + 1);
        let is_block = body_node
            .map(|node| node.statement.is_empty() && !node.children.is_empty())
            .unwrap_or(false);
        if !is_block {
            self.error(
                arms[index].line(),
                format!("Missing scope from {} declaration.", what),
            );
            return None;
        }
        Some(self.parse_guarded_scope(body_node.expect("checked above"), &["break"]))
    }

    /// `for init, cond, post { body }` — the initializer parses as a
    /// variable, the condition as a boolean expression, the post part
    /// as an assignment expression.
    pub fn parse_for(&mut self, node: &TokenNode) -> Option<ForLoop> {
        let line = node.line();
        if node.children.is_empty() {
            self.error(line, "Missing scope from for statement.");
            return None;
        }

        let header = &node.statement[1..];
        let pieces = split_at_depth(header, ",");
        if pieces.len() != 3 || pieces.iter().any(|piece| piece.is_none()) {
            self.error(
                line,
                "For loop requires an initializer, a condition and a post expression.",
            );
            return None;
        }

        let init_tokens = pieces[0].expect("checked above");
        let leading_var = init_tokens.first().map(|l| l.text == "var").unwrap_or(false);
        let initializer = self.parse_variable(&terminated(init_tokens), leading_var)?;

        let condition =
            self.parse_expression(pieces[1].expect("checked above"), line, true, false)?;

        let post = self.parse_assignment(&terminated(pieces[2].expect("checked above")), false)?;

        let body = self.parse_guarded_scope(node, &["break", "continue"]);

        Some(ForLoop {
            initializer,
            condition,
            post,
            body,
            line,
        })
    }

    /// `foreach index [, index2], range-or-collection { body }`.
    pub fn parse_foreach(&mut self, node: &TokenNode) -> Option<ForeachLoop> {
        let line = node.line();
        if node.children.is_empty() {
            self.error(line, "Missing scope from foreach statement.");
            return None;
        }

        let header = &node.statement[1..];
        let pieces = split_at_depth(header, ",");
        if !(2..=3).contains(&pieces.len()) || pieces.iter().any(|piece| piece.is_none()) {
            self.error(line, "Foreach requires an index and a range or collection.");
            return None;
        }

        let index = self.parse_foreach_index(pieces[0].expect("checked above"))?;
        let second_index = if pieces.len() == 3 {
            Some(self.parse_foreach_index(pieces[1].expect("checked above"))?)
        } else {
            None
        };

        let source_tokens = pieces[pieces.len() - 1].expect("checked above");
        let source = if let Some((low, high)) = split_range(source_tokens) {
            ForeachSource::Range { low, high }
        } else if let [collection] = source_tokens {
            if !is_valid_qualified_identifier(&collection.text) {
                self.error(
                    collection.line,
                    format!("Invalid collection identifier '{}'.", collection.text),
                );
                return None;
            }
            ForeachSource::Collection(collection.text.clone())
        } else {
            self.error(line, "Invalid range from foreach statement.");
            return None;
        };

        let body = self.parse_guarded_scope(node, &["break", "continue"]);

        Some(ForeachLoop {
            index,
            second_index,
            source,
            body,
            line,
        })
    }

    /// One foreach index name.
    fn parse_foreach_index(&mut self, tokens: &[Lexeme]) -> Option<String> {
        match tokens {
            [index] => {
                if self.check_identifier(&index.text, index.line, "index") {
                    Some(index.text.clone())
                } else {
                    None
                }
            },
            _ => {
                let line = tokens.first().map(|l| l.line).unwrap_or(1);
                self.error(line, "Invalid index from foreach statement.");
                None
            },
        }
    }

    /// `while cond { body }`, or the `while cond;` completion of a
    /// pending do-while.
    pub fn parse_while(&mut self, node: &TokenNode) -> Option<WhileLoop> {
        let line = node.line();
        let stmt = &node.statement;

        if node.children.is_empty() {
            // `while <cond>;` closes the do body cached at this level.
            let tokens = match stmt.last() {
                Some(last) if last.text == ";" => &stmt[..stmt.len() - 1],
                _ => {
                    self.error(line, "Missing scope from while statement.");
                    return None;
                },
            };
            let cached = match self.take_do_body() {
                Some(cached) => cached,
                None => {
                    self.error(line, "Missing do declaration from while statement.");
                    return None;
                },
            };
            if tokens.len() < 2 {
                self.error(line, "Missing expression from while statement.");
                return None;
            }
            let condition = self.parse_expression(&tokens[1..], line, true, false)?;
            return Some(WhileLoop {
                condition,
                body: cached.0,
                is_do: true,
                line,
            });
        }

        if stmt.len() < 2 {
            self.error(line, "Missing expression from while statement.");
            return None;
        }
        let condition = self.parse_expression(&stmt[1..], line, true, false)?;
        let body = self.parse_guarded_scope(node, &["break", "continue"]);

        Some(WhileLoop {
            condition,
            body,
            is_do: false,
            line,
        })
    }

    /// `do { body }` — the body is parsed immediately and cached until
    /// the next `while` statement at the same level consumes it.
    pub fn parse_do(&mut self, node: &TokenNode) {
        let line = node.line();
        if node.children.is_empty() {
            self.error(line, "Missing scope from do statement.");
            return;
        }
        if node.statement.len() > 1 {
            self.error(line, "Invalid do statement.");
            return;
        }

        // A previous do at this level never found its while.
        if let Some((_, previous)) = self.take_do_body() {
            self.error(previous, "Missing while statement from do-while declaration.");
        }

        let body = self.parse_guarded_scope(node, &["break", "continue"]);
        self.cache_do_body(body, line);
    }
}

/// How many arm slots a rejected arm occupies: the statement itself
/// plus its body block when one follows.
fn skip_width(arms: &[&TokenNode], index: usize) -> usize {
    let followed_by_block = arms
        .get(index + 1)
        .map(|node| node.statement.is_empty() && !node.children.is_empty())
        .unwrap_or(false);
    if followed_by_block {
        2
    } else {
        1
    }
}

//! Scope parsing.
//!
//! A scope is a token node whose children are framed by `{`/`}`
//! sentinels. Each inner statement is classified and dispatched; the
//! fall-through order is fixed: a statement that begins `identifier (`
//! is probed as a function call first, then as an assignment
//! expression, and only when both probes fail does the speculative
//! fault queue flush (or a generic invalid-declaration fault fire).
//!
//! Scope-exit keywords (`break`, `continue`, `end`) are legal only when
//! a surrounding construct installed the matching handler; loop and
//! switch parsers install them around their body parse.

use rlc_lex::{Lexeme, TokenNode};

use crate::ast::*;
use crate::classify::{classify, ProductionKind};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parse the body of a scope node into scope items.
    ///
    /// The cached do-while body is swapped out around the walk so
    /// do/while pairs resolve at their own nesting level; a `do` still
    /// unconsumed when the scope closes is a fault.
    pub fn parse_scope(&mut self, node: &TokenNode) -> Vec<ScopeItem> {
        let saved = self.swap_do_body(None);
        let mut items = Vec::new();

        for child in &node.children {
            if child.is_open_sentinel() || child.is_close_sentinel() {
                continue;
            }
            if let Some(item) = self.parse_scope_item(child) {
                items.push(item);
            }
        }

        if let Some((_, line)) = self.take_do_body() {
            self.error(line, "Missing while statement from do-while declaration.");
        }
        self.swap_do_body(saved);

        items
    }

    /// Parse a scope with the given exit handlers installed around it.
    pub(crate) fn parse_guarded_scope(
        &mut self,
        node: &TokenNode,
        handlers: &[&'static str],
    ) -> Vec<ScopeItem> {
        for &handler in handlers {
            self.install_handler(handler);
        }
        let items = self.parse_scope(node);
        for &handler in handlers {
            self.remove_handler(handler);
        }
        items
    }

    /// Dispatch one scope child by its production tag.
    fn parse_scope_item(&mut self, child: &TokenNode) -> Option<ScopeItem> {
        match classify(&child.statement) {
            ProductionKind::Return => self.parse_return(child).map(ScopeItem::Return),
            ProductionKind::Variable => {
                self.parse_variable(&child.statement, true).map(ScopeItem::Variable)
            },
            ProductionKind::If => self.parse_if(child).map(ScopeItem::If),
            ProductionKind::Else => self.parse_else(child).map(ScopeItem::Else),
            ProductionKind::Switch => self.parse_switch(child).map(ScopeItem::Switch),
            ProductionKind::For => self.parse_for(child).map(ScopeItem::For),
            ProductionKind::Foreach => self.parse_foreach(child).map(ScopeItem::Foreach),
            ProductionKind::While => self.parse_while(child).map(ScopeItem::While),
            ProductionKind::Do => {
                self.parse_do(child);
                None
            },
            ProductionKind::Empty => {
                if child.children.is_empty() {
                    None
                } else {
                    Some(ScopeItem::Scope(self.parse_scope(child)))
                }
            },
            _ => self.parse_fallthrough(child),
        }
    }

    /// `return [expr];` — the item itself carries the return scope
    /// state.
    fn parse_return(&mut self, node: &TokenNode) -> Option<Return> {
        let line = node.line();
        let tokens = self.strip_terminator(&node.statement, "return")?;

        let expression = if tokens.len() > 1 {
            Some(self.parse_expression(&tokens[1..], line, false, false)?)
        } else {
            None
        };

        Some(Return { expression, line })
    }

    /// The default branch: scope-exit keywords under their handlers,
    /// then a speculative function-call probe, then an assignment probe.
    fn parse_fallthrough(&mut self, child: &TokenNode) -> Option<ScopeItem> {
        let stmt = &child.statement;
        let line = child.line();
        let first = child.first_text().unwrap_or_default().to_string();

        if !child.children.is_empty() {
            self.error(line, format!("Invalid declaration '{}'.", first));
            return None;
        }

        // `break;` / `continue;` / `end;` are legal only under an
        // installed handler.
        if let Some(exit) = ScopeExit::from_text(&first) {
            if !self.handler_installed(exit.handler_name()) {
                self.error(line, format!("'{}' is not allowed in this scope.", first));
                return None;
            }
            if stmt.len() != 2 || stmt[1].text != ";" {
                self.error(line, format!("Invalid '{}' statement.", first));
                return None;
            }
            return Some(ScopeItem::Exit { exit, line });
        }

        // Function call first when the statement begins `identifier (`.
        let call_shape = stmt.len() >= 2
            && stmt[1].text == "("
            && first
                .chars()
                .next()
                .map(|c| c.is_alphabetic() || c == '_')
                .unwrap_or(false);
        if call_shape {
            if let Some(call) = self.parse_function_call(stmt, false, true) {
                self.reporter().clear_queued();
                return Some(ScopeItem::Call(call));
            }
        }

        if let Some(assignment) = self.parse_assignment(stmt, true) {
            self.reporter().clear_queued();
            return Some(ScopeItem::Assignment(assignment));
        }

        // Both probes failed: surface what they queued, or a generic
        // fault when neither got far enough to say anything.
        if !self.reporter().flush_queued() {
            self.error(line, format!("Invalid declaration '{}'.", first));
        }
        None
    }

    /// `left op right;` with `op` one of the assignment operators, or
    /// the unary `left++;` / `left--;` forms.
    pub fn parse_assignment(
        &mut self,
        stmt: &[Lexeme],
        speculative: bool,
    ) -> Option<AssignmentExpression> {
        let line = stmt.first().map(|l| l.line).unwrap_or(1);

        let tokens = match stmt.last() {
            Some(last) if last.text == ";" => &stmt[..stmt.len() - 1],
            _ => {
                self.report(line, "Missing ';' from assignment expression.", speculative);
                return None;
            },
        };

        let operator_index = find_assignment_operator(tokens);
        let (operator_index, operator) = match operator_index {
            Some(index) => (
                index,
                AssignOperator::from_text(&tokens[index].text).expect("operator was matched"),
            ),
            None => {
                self.report(line, "Missing assignment operator from expression.", speculative);
                return None;
            },
        };

        let left = &tokens[..operator_index];
        let right = &tokens[operator_index + 1..];

        if left.is_empty() {
            self.report(line, "Missing left-hand side from assignment expression.", speculative);
            return None;
        }

        let right_hand_expression = if operator.is_unary() {
            if !right.is_empty() {
                self.report(
                    right[0].line,
                    format!("Unexpected expression after '{}'.", tokens[operator_index].text),
                    speculative,
                );
                return None;
            }
            None
        } else {
            if right.is_empty() {
                self.report(line, "Missing right-hand side from assignment expression.", speculative);
                return None;
            }
            Some(self.parse_expression(right, line, false, speculative)?)
        };

        Some(AssignmentExpression {
            left_hand: left.to_vec(),
            operator,
            right_hand: right.to_vec(),
            right_hand_expression,
            line,
        })
    }

}

/// Index of the first depth-0 assignment operator in `tokens`.
fn find_assignment_operator(tokens: &[Lexeme]) -> Option<usize> {
    let mut paren = 0i32;
    let mut bracket = 0i32;
    for (index, token) in tokens.iter().enumerate() {
        match token.text.as_str() {
            "(" => paren += 1,
            ")" => paren -= 1,
            "[" => bracket += 1,
            "]" => bracket -= 1,
            text if paren == 0 && bracket == 0 && AssignOperator::from_text(text).is_some() => {
                return Some(index);
            },
            _ => {},
        }
    }
    None
}

/// Recognize `low .. high` from either the spaced three-token form or a
/// single glued `low..high` token.
pub(crate) fn split_range(tokens: &[Lexeme]) -> Option<(String, String)> {
    if tokens.len() == 3 && tokens[1].text == ".." {
        return Some((tokens[0].text.clone(), tokens[2].text.clone()));
    }
    if tokens.len() == 1 {
        let text = &tokens[0].text;
        if let Some((low, high)) = text.split_once("..") {
            if !low.is_empty() && !high.is_empty() && !high.contains("..") {
                return Some((low.to_string(), high.to_string()));
            }
        }
    }
    None
}

/// Clone a token run and append a `;` terminator, so sub-parsers that
/// expect a full statement can run on loop-header fragments.
pub(crate) fn terminated(tokens: &[Lexeme]) -> Vec<Lexeme> {
    let mut out = tokens.to_vec();
    let line = out.last().map(|l| l.line).unwrap_or(1);
    out.push(Lexeme::new(";", line));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlc_lex::{group, scan};
    use rlc_util::Reporter;

    /// Parse a function body and return its items plus any faults.
    fn parse_body(body: &str) -> (Vec<ScopeItem>, Vec<String>) {
        let source = format!("fn harness() {{ {} }}", body);
        let reporter = Reporter::new();
        let tree = group("test.rl", scan(&source), &reporter);
        let mut parser = Parser::new("test.rl", &reporter);
        let module = parser.parse_module(&tree);
        let messages = reporter.faults().into_iter().map(|f| f.message).collect();
        let items = module
            .functions
            .into_iter()
            .next()
            .and_then(|f| f.body)
            .unwrap_or_default();
        (items, messages)
    }

    fn parse_body_clean(body: &str) -> Vec<ScopeItem> {
        let (items, messages) = parse_body(body);
        assert!(messages.is_empty(), "unexpected faults: {:?}", messages);
        items
    }

    #[test]
    fn test_call_statement() {
        let items = parse_body_clean("writeln(\"Hello\");");
        assert_eq!(items.len(), 1);
        match &items[0] {
            ScopeItem::Call(call) => {
                assert_eq!(call.identifier, "writeln");
                assert_eq!(call.arguments[0].raw, "\"Hello\"");
            },
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_statement() {
        let items = parse_body_clean("x = 1 + 2;");
        match &items[0] {
            ScopeItem::Assignment(assignment) => {
                assert_eq!(assignment.operator, AssignOperator::Assign);
                assert_eq!(assignment.left_hand[0].text, "x");
                assert!(assignment.right_hand_expression.is_some());
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_assignment_operators() {
        for (source, operator) in [
            ("x += 1;", AssignOperator::AddAssign),
            ("x -= 1;", AssignOperator::SubAssign),
            ("x *= 2;", AssignOperator::MulAssign),
            ("x /= 2;", AssignOperator::DivAssign),
            ("x %= 2;", AssignOperator::ModAssign),
            ("x ^= 2;", AssignOperator::XorAssign),
            ("x := 2;", AssignOperator::ColonAssign),
            ("x ~= \"s\";", AssignOperator::ConcatAssign),
            ("x |= 2;", AssignOperator::OrAssign),
            ("x @= 2;", AssignOperator::AtAssign),
        ] {
            let items = parse_body_clean(source);
            match &items[0] {
                ScopeItem::Assignment(assignment) => assert_eq!(assignment.operator, operator),
                other => panic!("expected assignment for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_unary_increment() {
        let items = parse_body_clean("i++;");
        match &items[0] {
            ScopeItem::Assignment(assignment) => {
                assert_eq!(assignment.operator, AssignOperator::Increment);
                assert!(assignment.right_hand.is_empty());
                assert!(assignment.right_hand_expression.is_none());
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_increment_rejects_operand() {
        let (items, messages) = parse_body("i ++ 2;");
        assert!(items.is_empty());
        assert_eq!(messages, vec!["Unexpected expression after '++'."]);
    }

    #[test]
    fn test_return_with_expression() {
        let items = parse_body_clean("return a + b;");
        match &items[0] {
            ScopeItem::Return(ret) => assert!(ret.expression.is_some()),
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return() {
        let items = parse_body_clean("return;");
        match &items[0] {
            ScopeItem::Return(ret) => assert!(ret.expression.is_none()),
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_in_scope() {
        let items = parse_body_clean("var int x = 1;");
        assert!(matches!(items[0], ScopeItem::Variable(_)));
    }

    #[test]
    fn test_nested_bare_scope() {
        let items = parse_body_clean("{ x = 1; }");
        match &items[0] {
            ScopeItem::Scope(inner) => assert_eq!(inner.len(), 1),
            other => panic!("expected nested scope, got {:?}", other),
        }
    }

    #[test]
    fn test_chained_call_statement() {
        let items = parse_body_clean("a.b().c(1,2).d();");
        match &items[0] {
            ScopeItem::Call(call) => {
                assert_eq!(call.identifier, "a");
                let chain: Vec<&str> =
                    call.chain.iter().map(|c| c.identifier.as_str()).collect();
                assert_eq!(chain, vec!["b", "c", "d"]);
            },
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_break_outside_loop_rejected() {
        let (items, messages) = parse_body("break;");
        assert!(items.is_empty());
        assert_eq!(messages, vec!["'break' is not allowed in this scope."]);
    }

    #[test]
    fn test_continue_outside_loop_rejected() {
        let (_, messages) = parse_body("continue;");
        assert_eq!(messages, vec!["'continue' is not allowed in this scope."]);
    }

    #[test]
    fn test_break_inside_while() {
        let items = parse_body_clean("while x == 1 { break; }");
        match &items[0] {
            ScopeItem::While(while_loop) => {
                assert!(matches!(
                    while_loop.body[0],
                    ScopeItem::Exit { exit: ScopeExit::Break, .. }
                ));
            },
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_declaration_fault() {
        let (items, messages) = parse_body("5;");
        assert!(items.is_empty());
        assert_eq!(messages, vec!["Missing assignment operator from expression."]);
    }

    #[test]
    fn test_call_probe_faults_surface_on_failure() {
        // Looks like a call, fails inside the argument list, and there
        // is no assignment operator to fall back to.
        let (items, messages) = parse_body("go(1,,2);");
        assert!(items.is_empty());
        assert!(messages.contains(&"Missing argument from function call.".to_string()));
    }

    #[test]
    fn test_split_range_forms() {
        let spaced = scan("0 .. 10");
        assert_eq!(split_range(&spaced), Some(("0".to_string(), "10".to_string())));

        let glued = scan("0..10");
        assert_eq!(split_range(&glued), Some(("0".to_string(), "10".to_string())));

        let not_range = scan("items");
        assert_eq!(split_range(&not_range), None);
    }
}

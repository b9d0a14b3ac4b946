//! The expression core.
//!
//! A right-hand expression arrives as a flat lexeme run. Three shapes
//! are recognized:
//!
//! 1. `[` opens an **array literal**, plain or associative (a `:` before
//!    the first `,` marks the associative form).
//! 2. An identifier immediately followed by `(` opens a **function
//!    call**; the whole call (template list, argument list, dot-joined
//!    chain) is captured as one expression token.
//! 3. Everything else is an atom.
//!
//! The expression is classified as *mathematical* or *boolean* from the
//! operators actually present (callers such as `if` force boolean), the
//! bracket balance is validated, and the token stream is fed through a
//! shunting-yard pass keyed on the operator mode. The resulting RPN is
//! discarded; the pass exists to confirm well-formedness and to emit one
//! "illegal symbol" fault per operator that belongs to the opposite
//! mode.

use rlc_lex::lexeme::is_symbol_char;
use rlc_lex::Lexeme;

use crate::ast::{ArrayLiteral, CallArgument, Expression, ExpressionToken, FunctionCall, MathExpression};
use crate::classify::is_valid_qualified_identifier;
use crate::Parser;

/// Operators that put an expression in boolean mode.
fn is_boolean_operator(text: &str) -> bool {
    matches!(text, "||" | "&&" | ">" | ">=" | "<=" | "<" | "!=" | "!" | "!!" | "==")
}

/// Operator associativity for the shunting-yard pass.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// Precedence and associativity of `text` under the given operator mode;
/// `None` when the operator is not legal in that mode. Higher precedence
/// binds tighter. The concatenation operator `~` is legal in both modes.
fn operator_info(text: &str, mathematical: bool) -> Option<(u8, Assoc)> {
    if mathematical {
        match text {
            "+" | "-" => Some((1, Assoc::Left)),
            "*" | "/" | "%" => Some((2, Assoc::Left)),
            "^" | "<<" | ">>" | "|" | "~" | "&" | "^^" => Some((3, Assoc::Right)),
            _ => None,
        }
    } else {
        match text {
            "||" => Some((1, Assoc::Right)),
            "&&" => Some((2, Assoc::Right)),
            "~" => Some((3, Assoc::Left)),
            ">" | ">=" | "<=" | "<" | "!=" | "!" | "!!" | "==" => Some((4, Assoc::Right)),
            _ => None,
        }
    }
}

/// Whether the lexeme at `index` opens a function call: a word
/// immediately followed by `(`.
fn is_call_start(tokens: &[Lexeme], index: usize) -> bool {
    let starts_word = tokens[index]
        .text
        .chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false);
    starts_word
        && tokens
            .get(index + 1)
            .map(|next| next.text == "(")
            .unwrap_or(false)
}

/// End index (exclusive) of the call starting at `start`: its
/// parenthesized groups plus any `.`-joined chain segments. Unbalanced
/// groups run to the end of the tokens; the call parser reports them.
fn call_extent(tokens: &[Lexeme], start: usize) -> usize {
    let mut index = start + 1;
    loop {
        // Absorb one parenthesized group.
        let mut depth = 0i32;
        while index < tokens.len() {
            match tokens[index].text.as_str() {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth == 0 {
                        index += 1;
                        break;
                    }
                },
                _ => {},
            }
            index += 1;
        }
        if index >= tokens.len() {
            return tokens.len();
        }

        match tokens[index].text.as_str() {
            // A second group: template arguments followed by value
            // arguments.
            "(" => continue,
            // A chained call: `.name(` continues the capture.
            "." => {
                if tokens.get(index + 2).map(|t| t.text == "(").unwrap_or(false) {
                    index += 2;
                    continue;
                }
                return index;
            },
            _ => return index,
        }
    }
}

/// Join a lexeme slice back into one raw parameter string.
fn join_raw(tokens: &[Lexeme]) -> String {
    tokens
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

impl<'a> Parser<'a> {
    /// Validate and structure a right-hand expression.
    ///
    /// `line` anchors faults when the token run is empty; a trailing `;`
    /// is tolerated and dropped. `force_boolean` pins the operator mode
    /// regardless of the operators present.
    pub fn parse_expression(
        &mut self,
        tokens: &[Lexeme],
        line: u32,
        force_boolean: bool,
        speculative: bool,
    ) -> Option<Expression> {
        let mut tokens = tokens;
        if tokens.last().map(|l| l.text == ";").unwrap_or(false) {
            tokens = &tokens[..tokens.len() - 1];
        }
        if tokens.is_empty() {
            self.report(line, "Missing expression.", speculative);
            return None;
        }
        let line = tokens[0].line;

        if tokens[0].text == "[" {
            return self
                .parse_array_literal(tokens, speculative)
                .map(Expression::Array);
        }

        let is_mathematical =
            !force_boolean && !tokens.iter().any(|t| is_boolean_operator(&t.text));

        // Walk the tokens, capturing call sub-sequences and validating
        // the parenthesis balance of what remains.
        let mut items: Vec<ExpressionToken> = Vec::new();
        let mut depth = 0i32;
        let mut index = 0;
        while index < tokens.len() {
            if is_call_start(tokens, index) {
                let end = call_extent(tokens, index);
                let call = self.parse_function_call(&tokens[index..end], true, speculative)?;
                items.push(ExpressionToken::Call(call));
                index = end;
                continue;
            }

            let token = &tokens[index];
            match token.text.as_str() {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth < 0 {
                        self.report(token.line, "Missing '(' from expression.", speculative);
                        return None;
                    }
                },
                _ => {},
            }
            items.push(ExpressionToken::Atom(token.clone()));
            index += 1;
        }
        if depth > 0 {
            self.report(line, "Missing ')' from expression.", speculative);
            return None;
        }

        if !self.validate_operators(&items, is_mathematical, speculative) {
            return None;
        }

        Some(Expression::Math(MathExpression {
            is_mathematical,
            tokens: items,
            line,
        }))
    }

    /// Parse an array or associative-array literal starting at `[`.
    ///
    /// Entries split on depth-0 commas. A `:` seen before the first
    /// comma marks the literal associative; every associative entry must
    /// then be exactly `key : value`.
    pub fn parse_array_literal(
        &mut self,
        tokens: &[Lexeme],
        speculative: bool,
    ) -> Option<ArrayLiteral> {
        let line = tokens[0].line;
        debug_assert_eq!(tokens[0].text, "[");

        let mut entries: Vec<Vec<Lexeme>> = Vec::new();
        let mut current: Vec<Lexeme> = Vec::new();
        let mut is_associative = false;
        let mut seen_comma = false;
        let mut bracket = 1i32;
        let mut paren = 0i32;
        let mut index = 1;
        let mut closed_at = None;

        while index < tokens.len() {
            let token = &tokens[index];
            match token.text.as_str() {
                "[" => {
                    bracket += 1;
                    current.push(token.clone());
                },
                "]" => {
                    bracket -= 1;
                    if bracket == 0 {
                        closed_at = Some(index);
                        break;
                    }
                    current.push(token.clone());
                },
                "(" => {
                    paren += 1;
                    current.push(token.clone());
                },
                ")" => {
                    paren -= 1;
                    current.push(token.clone());
                },
                "," if bracket == 1 && paren == 0 => {
                    if current.is_empty() {
                        self.report(token.line, "Missing value from array literal.", speculative);
                        return None;
                    }
                    entries.push(std::mem::take(&mut current));
                    seen_comma = true;
                },
                ":" if bracket == 1 && paren == 0 => {
                    if !seen_comma {
                        is_associative = true;
                    }
                    current.push(token.clone());
                },
                _ => current.push(token.clone()),
            }
            index += 1;
        }

        let closed_at = match closed_at {
            Some(position) => position,
            None => {
                self.report(line, "Missing ']' from array literal.", speculative);
                return None;
            },
        };
        if !current.is_empty() {
            entries.push(current);
        }

        // Only a statement terminator may follow the literal.
        if let Some(extra) = tokens.get(closed_at + 1) {
            if extra.text != ";" {
                self.report(
                    extra.line,
                    format!("Unexpected '{}' after array literal.", extra.text),
                    speculative,
                );
                return None;
            }
        }

        let mut values: Vec<Vec<String>> = Vec::new();
        for entry in &entries {
            if is_associative {
                // Exactly `key : value`.
                if entry.len() != 3 || entry[1].text != ":" {
                    self.report(
                        entry[0].line,
                        "Associative array entries must be a key and a value.",
                        speculative,
                    );
                    return None;
                }
                values.push(vec![entry[0].text.clone(), entry[2].text.clone()]);
            } else {
                values.push(entry.iter().map(|l| l.text.clone()).collect());
            }
        }

        Some(ArrayLiteral {
            is_associative,
            values,
            line,
        })
    }

    /// Parse a function call: `name[(template)](args)` plus any chain of
    /// `.name(args)` continuations, which hang flat off the root call.
    ///
    /// A dotted head such as `a.b(…)` splits into a degenerate root call
    /// `a` with the remainder chained. With `relaxed_end` the trailing
    /// `;` requirement is lifted (calls nested inside expressions).
    pub fn parse_function_call(
        &mut self,
        tokens: &[Lexeme],
        relaxed_end: bool,
        speculative: bool,
    ) -> Option<FunctionCall> {
        let line = tokens[0].line;

        let mut tokens = tokens;
        let mut had_terminator = false;
        if tokens.last().map(|l| l.text == ";").unwrap_or(false) {
            tokens = &tokens[..tokens.len() - 1];
            had_terminator = true;
        }

        let identifier = tokens[0].text.clone();
        if !is_valid_qualified_identifier(&identifier) {
            self.report(
                line,
                format!("Invalid function identifier '{}'.", identifier),
                speculative,
            );
            return None;
        }

        if !tokens.get(1).map(|t| t.text == "(").unwrap_or(false) {
            self.report(line, "Missing '(' from function call.", speculative);
            return None;
        }

        // Collect the parenthesized groups: one (value arguments) or two
        // (template arguments, then value arguments).
        let mut groups: Vec<Vec<CallArgument>> = Vec::new();
        let mut index = 1;
        while tokens.get(index).map(|t| t.text == "(").unwrap_or(false) {
            if groups.len() == 2 {
                self.report(line, "Too many parameter lists in function call.", speculative);
                return None;
            }
            let (arguments, next) = self.parse_call_group(tokens, index, speculative)?;
            groups.push(arguments);
            index = next;
        }

        // A dotted head becomes a degenerate root plus chained segments;
        // the last segment owns the parsed groups.
        let mut calls: Vec<FunctionCall> = identifier
            .split('.')
            .map(|segment| FunctionCall {
                identifier: segment.to_string(),
                template_arguments: Vec::new(),
                arguments: Vec::new(),
                chain: Vec::new(),
                line,
            })
            .collect();
        {
            let last = calls.last_mut().expect("identifier has one segment");
            match groups.len() {
                1 => last.arguments = groups.pop().expect("one group"),
                2 => {
                    last.arguments = groups.pop().expect("two groups");
                    last.template_arguments = groups
                        .pop()
                        .expect("template group")
                        .into_iter()
                        .map(|argument| argument.raw)
                        .collect();
                },
                _ => unreachable!("at least one group was required above"),
            }
        }

        // A `.` directly after the close paren closes this call and
        // parses the remainder as the next chained call.
        if tokens.get(index).map(|t| t.text == ".").unwrap_or(false) {
            let rest = &tokens[index + 1..];
            if rest.is_empty() {
                self.report(line, "Missing function call after '.'.", speculative);
                return None;
            }
            let mut continuation = self.parse_function_call(rest, true, speculative)?;
            let tail = std::mem::take(&mut continuation.chain);
            calls.push(continuation);
            calls.extend(tail);
            index = tokens.len();
        }

        if index < tokens.len() {
            self.report(
                tokens[index].line,
                format!("Unexpected '{}' after function call.", tokens[index].text),
                speculative,
            );
            return None;
        }

        if !relaxed_end && !had_terminator {
            self.report(line, "Missing ';' from function call.", speculative);
            return None;
        }

        let mut root = calls.remove(0);
        root.chain = calls;
        Some(root)
    }

    /// Split one parenthesized argument group into call arguments.
    /// Returns the arguments and the index just past the closing `)`.
    fn parse_call_group(
        &mut self,
        tokens: &[Lexeme],
        open_index: usize,
        speculative: bool,
    ) -> Option<(Vec<CallArgument>, usize)> {
        let line = tokens[open_index].line;
        let mut slices: Vec<Vec<Lexeme>> = Vec::new();
        let mut current: Vec<Lexeme> = Vec::new();
        let mut paren = 1i32;
        let mut bracket = 0i32;
        let mut index = open_index + 1;

        let close_index = loop {
            let token = match tokens.get(index) {
                Some(token) => token,
                None => {
                    self.report(line, "Missing ')' from function call.", speculative);
                    return None;
                },
            };
            match token.text.as_str() {
                "(" => {
                    paren += 1;
                    current.push(token.clone());
                },
                ")" => {
                    paren -= 1;
                    if paren == 0 {
                        break index;
                    }
                    current.push(token.clone());
                },
                "[" => {
                    bracket += 1;
                    current.push(token.clone());
                },
                "]" => {
                    bracket -= 1;
                    current.push(token.clone());
                },
                "," if paren == 1 && bracket == 0 => {
                    if current.is_empty() {
                        self.report(token.line, "Missing argument from function call.", speculative);
                        return None;
                    }
                    slices.push(std::mem::take(&mut current));
                },
                _ => current.push(token.clone()),
            }
            index += 1;
        };

        if !current.is_empty() {
            slices.push(current);
        } else if !slices.is_empty() {
            self.report(line, "Missing argument from function call.", speculative);
            return None;
        }

        let mut arguments = Vec::new();
        for slice in &slices {
            let argument_line = slice[0].line;
            let raw = join_raw(slice);
            let array = if slice[0].text == "[" {
                Some(self.parse_array_literal(slice, speculative)?)
            } else {
                None
            };
            arguments.push(CallArgument {
                raw,
                array,
                line: argument_line,
            });
        }

        Some((arguments, close_index + 1))
    }

    /// The shunting-yard validation pass. Calls collapse to synthetic
    /// operands; the produced RPN is discarded. Returns false when any
    /// fault was raised.
    fn validate_operators(
        &mut self,
        items: &[ExpressionToken],
        mathematical: bool,
        speculative: bool,
    ) -> bool {
        let mut ok = true;
        let mut stack: Vec<String> = Vec::new();

        for item in items {
            let atom = match item {
                // Each captured call behaves as a single operand.
                ExpressionToken::Call(_) => continue,
                ExpressionToken::Atom(lexeme) => lexeme,
            };
            let text = atom.text.as_str();

            match text {
                "(" => stack.push("(".to_string()),
                ")" => {
                    // Balance was validated by the caller; unwind the
                    // group.
                    while let Some(top) = stack.pop() {
                        if top == "(" {
                            break;
                        }
                    }
                },
                _ if text.starts_with(is_symbol_char) => {
                    match operator_info(text, mathematical) {
                        Some((precedence, assoc)) => {
                            while let Some(top) = stack.last() {
                                if top == "(" {
                                    break;
                                }
                                let (top_precedence, _) = operator_info(top, mathematical)
                                    .expect("only legal operators are stacked");
                                let pop = top_precedence > precedence
                                    || (top_precedence == precedence && assoc == Assoc::Left);
                                if !pop {
                                    break;
                                }
                                stack.pop();
                            }
                            stack.push(text.to_string());
                        },
                        None => {
                            self.report(
                                atom.line,
                                format!("Illegal symbol '{}' found in expression.", text),
                                speculative,
                            );
                            ok = false;
                        },
                    }
                },
                // Identifiers and literals are operands.
                _ => {},
            }
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlc_lex::scan;
    use rlc_util::Reporter;

    fn parse_expr(source: &str, force_boolean: bool) -> (Option<Expression>, Vec<String>) {
        let reporter = Reporter::new();
        let mut parser = Parser::new("test.rl", &reporter);
        let tokens = scan(source);
        let expression = parser.parse_expression(&tokens, 1, force_boolean, false);
        let messages = reporter.faults().into_iter().map(|f| f.message).collect();
        (expression, messages)
    }

    fn parse_call(source: &str) -> (Option<FunctionCall>, Vec<String>) {
        let reporter = Reporter::new();
        let mut parser = Parser::new("test.rl", &reporter);
        let tokens = scan(source);
        let call = parser.parse_function_call(&tokens, false, false);
        let messages = reporter.faults().into_iter().map(|f| f.message).collect();
        (call, messages)
    }

    #[test]
    fn test_mathematical_expression() {
        let (expression, messages) = parse_expr("1 + 2 * 3;", false);
        assert!(messages.is_empty(), "{:?}", messages);
        let math = expression.unwrap().as_math().unwrap().clone();
        assert!(math.is_mathematical);
        assert_eq!(math.tokens.len(), 5);
    }

    #[test]
    fn test_boolean_expression_inferred() {
        let (expression, messages) = parse_expr("a == b || c < d;", false);
        assert!(messages.is_empty(), "{:?}", messages);
        assert!(!expression.unwrap().as_math().unwrap().is_mathematical);
    }

    #[test]
    fn test_default_mode_is_mathematical() {
        let (expression, messages) = parse_expr("x;", false);
        assert!(messages.is_empty(), "{:?}", messages);
        assert!(expression.unwrap().as_math().unwrap().is_mathematical);
    }

    #[test]
    fn test_tilde_legal_in_both_modes() {
        let (expression, messages) = parse_expr("a ~ b;", false);
        assert!(messages.is_empty(), "{:?}", messages);
        assert!(expression.unwrap().as_math().unwrap().is_mathematical);

        let (expression, messages) = parse_expr("a ~ b;", true);
        assert!(messages.is_empty(), "{:?}", messages);
        assert!(expression.is_some());
    }

    #[test]
    fn test_forced_boolean_rejects_math_operator() {
        let (expression, messages) = parse_expr("x + y;", true);
        assert!(expression.is_none());
        assert_eq!(messages, vec!["Illegal symbol '+' found in expression."]);
    }

    #[test]
    fn test_one_fault_per_opposite_mode_operator() {
        let (_, messages) = parse_expr("x + y - z;", true);
        assert_eq!(
            messages,
            vec![
                "Illegal symbol '+' found in expression.",
                "Illegal symbol '-' found in expression."
            ]
        );
    }

    #[test]
    fn test_mixed_modes_flag_math_operators() {
        // A boolean operator puts the whole expression in boolean mode,
        // so the '+' is the illegal one.
        let (_, messages) = parse_expr("a + b > c;", false);
        assert_eq!(messages, vec!["Illegal symbol '+' found in expression."]);
    }

    #[test]
    fn test_missing_close_paren() {
        let (expression, messages) = parse_expr("( 1 + 2;", false);
        assert!(expression.is_none());
        assert_eq!(messages, vec!["Missing ')' from expression."]);
    }

    #[test]
    fn test_missing_open_paren() {
        let (expression, messages) = parse_expr("1 + 2 );", false);
        assert!(expression.is_none());
        assert_eq!(messages, vec!["Missing '(' from expression."]);
    }

    #[test]
    fn test_parenthesized_expression() {
        let (expression, messages) = parse_expr("( 1 + 2 ) * 3;", false);
        assert!(messages.is_empty(), "{:?}", messages);
        assert!(expression.is_some());
    }

    #[test]
    fn test_empty_expression() {
        let (expression, messages) = parse_expr(";", false);
        assert!(expression.is_none());
        assert_eq!(messages, vec!["Missing expression."]);
    }

    #[test]
    fn test_plain_array_literal() {
        let (expression, messages) = parse_expr("[1, 2, 3];", false);
        assert!(messages.is_empty(), "{:?}", messages);
        let literal = expression.unwrap().as_array().unwrap().clone();
        assert!(!literal.is_associative);
        assert_eq!(literal.values, vec![vec!["1"], vec!["2"], vec!["3"]]);
    }

    #[test]
    fn test_associative_array_literal() {
        let (expression, messages) = parse_expr("[\"a\": 1, \"b\": 2];", false);
        assert!(messages.is_empty(), "{:?}", messages);
        let literal = expression.unwrap().as_array().unwrap().clone();
        assert!(literal.is_associative);
        assert_eq!(literal.values.len(), 2);
        assert_eq!(literal.values[0], vec!["\"a\"", "1"]);
        assert_eq!(literal.values[1], vec!["\"b\"", "2"]);
    }

    #[test]
    fn test_empty_array_literal() {
        let (expression, messages) = parse_expr("[];", false);
        assert!(messages.is_empty(), "{:?}", messages);
        let literal = expression.unwrap().as_array().unwrap().clone();
        assert!(!literal.is_associative);
        assert!(literal.values.is_empty());
    }

    #[test]
    fn test_unterminated_array_literal() {
        let (expression, messages) = parse_expr("[1, 2;", false);
        assert!(expression.is_none());
        assert_eq!(messages, vec!["Missing ']' from array literal."]);
    }

    #[test]
    fn test_malformed_associative_entry() {
        let (expression, messages) = parse_expr("[\"a\": 1, \"b\"];", false);
        assert!(expression.is_none());
        assert_eq!(messages, vec!["Associative array entries must be a key and a value."]);
    }

    #[test]
    fn test_simple_call() {
        let (call, messages) = parse_call("writeln(\"Hello\");");
        assert!(messages.is_empty(), "{:?}", messages);
        let call = call.unwrap();
        assert_eq!(call.identifier, "writeln");
        assert_eq!(call.arguments.len(), 1);
        assert_eq!(call.arguments[0].raw, "\"Hello\"");
        assert!(call.chain.is_empty());
    }

    #[test]
    fn test_call_without_arguments() {
        let (call, messages) = parse_call("go();");
        assert!(messages.is_empty(), "{:?}", messages);
        assert!(call.unwrap().arguments.is_empty());
    }

    #[test]
    fn test_template_call() {
        let (call, messages) = parse_call("max(int)(a, b);");
        assert!(messages.is_empty(), "{:?}", messages);
        let call = call.unwrap();
        assert_eq!(call.template_arguments, vec!["int"]);
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn test_three_parameter_lists_rejected() {
        let (call, messages) = parse_call("f(a)(b)(c);");
        assert!(call.is_none());
        assert_eq!(messages, vec!["Too many parameter lists in function call."]);
    }

    #[test]
    fn test_array_literal_argument() {
        let (call, messages) = parse_call("sum([1, 2, 3]);");
        assert!(messages.is_empty(), "{:?}", messages);
        let call = call.unwrap();
        assert_eq!(call.arguments.len(), 1);
        let array = call.arguments[0].array.as_ref().unwrap();
        assert_eq!(array.values.len(), 3);
    }

    #[test]
    fn test_chained_call() {
        let (call, messages) = parse_call("a.b().c(1,2).d();");
        assert!(messages.is_empty(), "{:?}", messages);
        let call = call.unwrap();
        // The dotted head degenerates to `a` with the rest chained.
        assert_eq!(call.identifier, "a");
        assert!(call.arguments.is_empty());
        let chain: Vec<&str> = call.chain.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(chain, vec!["b", "c", "d"]);
        assert_eq!(call.chain[1].arguments.len(), 2);
        assert_eq!(call.chain[1].arguments[0].raw, "1");
        assert_eq!(call.chain[1].arguments[1].raw, "2");
    }

    #[test]
    fn test_missing_semicolon_at_statement_level() {
        let (call, messages) = parse_call("go()");
        assert!(call.is_none());
        assert_eq!(messages, vec!["Missing ';' from function call."]);
    }

    #[test]
    fn test_missing_close_paren_in_call() {
        let (call, messages) = parse_call("go(1;");
        assert!(call.is_none());
        assert_eq!(messages, vec!["Missing ')' from function call."]);
    }

    #[test]
    fn test_invalid_call_identifier() {
        let (call, messages) = parse_call("2go();");
        assert!(call.is_none());
        assert_eq!(messages, vec!["Invalid function identifier '2go'."]);
    }

    #[test]
    fn test_missing_argument() {
        let (call, messages) = parse_call("f(a,,b);");
        assert!(call.is_none());
        assert_eq!(messages, vec!["Missing argument from function call."]);
    }

    #[test]
    fn test_call_inside_expression() {
        let (expression, messages) = parse_expr("add(1, 2) + 3;", false);
        assert!(messages.is_empty(), "{:?}", messages);
        let math = expression.unwrap().as_math().unwrap().clone();
        assert_eq!(math.tokens.len(), 3);
        assert!(matches!(math.tokens[0], ExpressionToken::Call(_)));
    }

    #[test]
    fn test_failed_inner_call_fails_expression() {
        let (expression, messages) = parse_expr("f(a,,b) + 1;", false);
        assert!(expression.is_none());
        assert!(!messages.is_empty());
    }

    #[test]
    fn test_speculative_faults_stay_queued() {
        let reporter = Reporter::new();
        let mut parser = Parser::new("test.rl", &reporter);
        let tokens = scan("go(1;");
        assert!(parser.parse_function_call(&tokens, false, true).is_none());
        assert!(!reporter.has_errors());
        assert!(reporter.has_queued());
    }
}

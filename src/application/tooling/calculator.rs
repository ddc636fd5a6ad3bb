//! Safe arithmetic evaluator behind the `calculator` tool.
//!
//! The grammar is a whitelist: numeric literals, unary negation, `+ - * / %`,
//! power (`**`), floor division (`//`) and parentheses. Everything else
//! (names, calls, subscripts, comparisons) is rejected as unsafe before
//! evaluation. Novel constructs fail closed because the lexer only emits
//! whitelisted tokens.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("unsafe expression: {0}")]
    Unsafe(String),
    #[error("invalid expression: {0}")]
    Syntax(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate a restricted arithmetic expression. Pure and deterministic.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, cursor: 0 };
    let value = parser.expr()?;
    if parser.cursor != parser.tokens.len() {
        return Err(EvalError::Syntax("unexpected trailing input".into()));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    FloorDiv,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::Syntax(format!("bad numeric literal '{literal}'")))?;
                tokens.push(Token::Number(value));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Power);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::FloorDiv);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                return Err(EvalError::Unsafe(format!("name '{name}' is not allowed")));
            }
            other => {
                return Err(EvalError::Unsafe(format!(
                    "character '{other}' is not allowed"
                )));
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent evaluator. `**` is right-associative and binds tighter
/// than unary minus on its left operand, so `-2**2 == -4` while
/// `2**-1 == 0.5`.
struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.cursor += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.cursor += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.cursor += 1;
                    value *= self.unary()?;
                }
                Token::Slash => {
                    self.cursor += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value /= divisor;
                }
                Token::FloorDiv => {
                    self.cursor += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value = (value / divisor).floor();
                }
                Token::Percent => {
                    self.cursor += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    // Floor modulo: the sign follows the divisor.
                    value -= divisor * (value / divisor).floor();
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.peek() == Some(Token::Minus) {
            self.cursor += 1;
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Power) {
            self.cursor += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, EvalError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EvalError::Syntax("missing closing parenthesis".into())),
                }
            }
            Some(other) => Err(EvalError::Syntax(format!("unexpected token {other:?}"))),
            None => Err(EvalError::Syntax("unexpected end of expression".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expression: &str) -> f64 {
        evaluate(expression).expect("expression evaluates")
    }

    #[test]
    fn basic_arithmetic_and_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("10 / 4"), 2.5);
        assert_eq!(eval("2 + 3 - 4"), 1.0);
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(eval("2 ** 3 ** 2"), 512.0);
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        assert_eq!(eval("-2 ** 2"), -4.0);
        assert_eq!(eval("(-2) ** 2"), 4.0);
        assert_eq!(eval("2 ** -1"), 0.5);
    }

    #[test]
    fn floor_division_and_modulo_follow_floor_semantics() {
        assert_eq!(eval("7 // 2"), 3.0);
        assert_eq!(eval("-7 // 2"), -4.0);
        assert_eq!(eval("7 % 3"), 1.0);
        assert_eq!(eval("-7 % 3"), 2.0);
        assert_eq!(eval("7 % -3"), -2.0);
    }

    #[test]
    fn unary_negation_nests() {
        assert_eq!(eval("--3"), 3.0);
        assert_eq!(eval("-(1 + 2)"), -3.0);
    }

    #[test]
    fn names_and_calls_are_unsafe() {
        for expression in [
            "max(1, 2)",
            "a + 1",
            "__import__('os')",
            "1 + foo",
            "pi",
        ] {
            assert!(
                matches!(evaluate(expression), Err(EvalError::Unsafe(_))),
                "{expression} should be rejected as unsafe"
            );
        }
    }

    #[test]
    fn foreign_punctuation_is_unsafe() {
        for expression in ["1 < 2", "x[0]", "(1).real", "1; 2", "\"hi\"", "1 = 1"] {
            assert!(
                matches!(evaluate(expression), Err(EvalError::Unsafe(_))),
                "{expression} should be rejected as unsafe"
            );
        }
    }

    #[test]
    fn malformed_expressions_are_syntax_errors() {
        assert!(matches!(evaluate("1 +"), Err(EvalError::Syntax(_))));
        assert!(matches!(evaluate("(1 + 2"), Err(EvalError::Syntax(_))));
        assert!(matches!(evaluate("1.2.3"), Err(EvalError::Syntax(_))));
        assert!(matches!(evaluate(""), Err(EvalError::Syntax(_))));
        assert!(matches!(evaluate("1 2"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1 // 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1 % 0"), Err(EvalError::DivisionByZero));
    }
}

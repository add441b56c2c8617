//! Tokenizer and recursive-descent parser for formula expressions.
//!
//! Grammar:
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := '-' factor | '+' factor | number | reference | '(' expr ')'
//! ```
//! A reference is either `{{NAME}}` or a bare identifier.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected character `{ch}` at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("placeholder opened at {pos} is never closed")]
    UnclosedPlaceholder { pos: usize },
    #[error("unexpected token at {pos}")]
    UnexpectedToken { pos: usize },
    #[error("formula ends unexpectedly")]
    UnexpectedEnd,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// A reference exactly as written: `{{NAME}}` or `NAME`.
    Ref(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Evaluates the tree, asking `lookup` for the numeric value of every reference.
    /// Division by zero yields 0.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> f64) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Ref(name) => lookup(name),
            Expr::Neg(inner) => -inner.eval(lookup),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(lookup);
                let r = rhs.eval(lookup);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div if r == 0.0 => 0.0,
                    BinaryOp::Div => l / r,
                }
            }
        }
    }

    /// Collects the references in evaluation order, as written.
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ref(name) => out.push(name),
            Expr::Neg(inner) => inner.collect_refs(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_refs(out);
                rhs.collect_refs(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ref(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, FormulaError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push((i, Token::Plus));
                i += 1;
            }
            '-' => {
                tokens.push((i, Token::Minus));
                i += 1;
            }
            '*' => {
                tokens.push((i, Token::Star));
                i += 1;
            }
            '/' => {
                tokens.push((i, Token::Slash));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            '{' if chars.get(i + 1) == Some(&'{') => {
                let start = i;
                let mut j = i + 2;
                while j + 1 < chars.len() && !(chars[j] == '}' && chars[j + 1] == '}') {
                    j += 1;
                }
                if j + 1 >= chars.len() {
                    return Err(FormulaError::UnclosedPlaceholder { pos: start });
                }
                let inner: String = chars[i + 2..j].iter().collect();
                if inner.trim().is_empty() {
                    return Err(FormulaError::UnexpectedToken { pos: start });
                }
                tokens.push((start, Token::Ref(format!("{{{{{}}}}}", inner.trim()))));
                i = j + 2;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::UnexpectedToken { pos: start })?;
                tokens.push((start, Token::Number(value)));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push((start, Token::Ref(chars[start..i].iter().collect())));
            }
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos: i }),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn factor(&mut self) -> Result<Expr, FormulaError> {
        match self.next() {
            Some((_, Token::Minus)) => Ok(Expr::Neg(Box::new(self.factor()?))),
            Some((_, Token::Plus)) => self.factor(),
            Some((_, Token::Number(n))) => Ok(Expr::Number(n)),
            Some((_, Token::Ref(name))) => Ok(Expr::Ref(name)),
            Some((_, Token::LParen)) => {
                let inner = self.expr()?;
                match self.next() {
                    Some((_, Token::RParen)) => Ok(inner),
                    Some((pos, _)) => Err(FormulaError::UnexpectedToken { pos }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((pos, _)) => Err(FormulaError::UnexpectedToken { pos }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

/// Parses a formula into an expression tree.
pub fn parse(src: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    match parser.tokens.get(parser.pos) {
        Some((pos, _)) => Err(FormulaError::UnexpectedToken { pos: *pos }),
        None => Ok(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> f64 {
        parse(src).unwrap().eval(&|_| 0.0)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("12 / 3 / 2"), 2.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("-2 * -3"), 6.0);
        assert_eq!(eval("5 - -2"), 7.0);
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(eval("7 / 0"), 0.0);
        assert_eq!(eval("7 / (3 - 3) + 1"), 1.0);
    }

    #[test]
    fn references_keep_their_spelling() {
        let expr = parse("{{ PRICE }} * QTY + {{TAX_RATE}}").unwrap();
        let mut refs = Vec::new();
        expr.collect_refs(&mut refs);
        assert_eq!(refs, ["{{PRICE}}", "QTY", "{{TAX_RATE}}"]);
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert_eq!(parse("   "), Err(FormulaError::Empty));
        assert_eq!(parse("2 +"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse("(2 + 3"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse("2 3"), Err(FormulaError::UnexpectedToken { pos: 2 }));
        assert_eq!(
            parse("{{A} + 1"),
            Err(FormulaError::UnclosedPlaceholder { pos: 0 })
        );
        assert_eq!(
            parse("2 % 3"),
            Err(FormulaError::UnexpectedChar { ch: '%', pos: 2 })
        );
        assert!(parse("1.2.3").is_err());
    }

    #[test]
    fn cyrillic_identifiers_are_references() {
        let expr = parse("ВАГА * 2").unwrap();
        assert_eq!(expr.eval(&|name| if name == "ВАГА" { 4.5 } else { 0.0 }), 9.0);
    }
}

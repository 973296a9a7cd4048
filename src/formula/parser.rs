//! Tokenizer and recursive-descent parser for single-variable formulas.
//!
//! Precedence, lowest first:
//!
//! ```text
//! expr   := term (("+" | "-") term)*
//! term   := factor (("*" | "/" | "//" | "%") factor)*
//! factor := ("+" | "-") factor | power
//! power  := atom ("**" factor)?
//! atom   := number | "x" | name "(" expr ("," expr)* ")" | "(" expr ")"
//! ```

use crate::formula::ast::{BinaryOp, Expr, Function, UnaryOp};
use crate::formula::errors::FormulaError;
use std::fmt;

/// Deepest accepted nesting of unary operators, powers, parentheses and calls.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Ident(name) => write!(f, "name '{}'", name),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::DoubleStar => write!(f, "'**'"),
            Token::Slash => write!(f, "'/'"),
            Token::DoubleSlash => write!(f, "'//'"),
            Token::Percent => write!(f, "'%'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let mut end = pos;
            let mut prev = '\0';
            while let Some(&(i, d)) = chars.peek() {
                let exponent_sign = (d == '+' || d == '-') && (prev == 'e' || prev == 'E');
                if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                    end = i + d.len_utf8();
                    prev = d;
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &input[pos..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber {
                    text: text.to_string(),
                    pos,
                })?;
            tokens.push((Token::Number(value), pos));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut end = pos;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push((Token::Ident(input[pos..end].to_string()), pos));
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, n)| n);
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if next == Some('*') => {
                chars.next();
                Token::DoubleStar
            }
            '*' => Token::Star,
            '/' if next == Some('/') => {
                chars.next();
                Token::DoubleSlash
            }
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos }),
        };
        tokens.push((token, pos));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        match self.advance() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, pos)) => Err(FormulaError::UnexpectedToken {
                found: token.to_string(),
                pos,
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
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
            lhs = binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn factor(&mut self) -> Result<Expr, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep {
                limit: MAX_DEPTH,
                pos: self.tokens.get(self.pos).map_or(0, |(_, pos)| *pos),
            });
        }
        self.depth += 1;
        let result = self.unary();
        self.depth -= 1;
        result
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        let op = match self.peek() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.power(),
        };
        self.pos += 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(self.factor()?),
        })
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.atom()?;
        if self.eat(&Token::DoubleStar) {
            let exponent = self.factor()?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Some((Token::Number(value), _)) => Ok(Expr::Literal(value)),
            Some((Token::LParen, _)) => {
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some((Token::Ident(name), _)) => {
                if !self.eat(&Token::LParen) {
                    return if name == "x" {
                        Ok(Expr::Variable)
                    } else {
                        Err(FormulaError::UnknownVariable { name })
                    };
                }
                let func = Function::from_name(&name)
                    .ok_or_else(|| FormulaError::UnknownFunction { name: name.clone() })?;
                let args = self.arguments()?;
                func.check_arity(&name, args.len())?;
                Ok(Expr::Call { func, args })
            }
            Some((token, pos)) => Err(FormulaError::UnexpectedToken {
                found: token.to_string(),
                pos,
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::RParen)?;
            return Ok(args);
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Parse a complete formula.
pub fn parse(input: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;

    match parser.advance() {
        None => Ok(expr),
        Some((token, pos)) => Err(FormulaError::UnexpectedToken {
            found: token.to_string(),
            pos,
        }),
    }
}

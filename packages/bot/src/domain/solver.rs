//! Sandboxed arithmetic solver for quiz problems.
//!
//! Quiz text comes from untrusted chat messages, so expressions are handled by a
//! dedicated tokenizer and recursive-descent parser that only knows integer
//! literals, `+ - * /`, unary signs, parentheses and the `?` placeholder.
//!
//! Intermediate values are exact rationals; the final value is truncated toward
//! zero. This keeps `7/2*2` at `7` instead of the `6` that per-step integer
//! division would produce.

use super::error::SolveError;

/// The reserved token standing for the unknown value.
pub const PLACEHOLDER: char = '?';

/// Lowest placeholder value tried when searching (inclusive).
pub const SEARCH_MIN: i64 = -2000;

/// Highest placeholder value tried when searching (inclusive).
pub const SEARCH_MAX: i64 = 1999;

const MAX_DEPTH: usize = 64;

/// Solve an equation such as `3+4=?` or `?*3=12`.
///
/// * placeholder on the right: the left side is evaluated
/// * placeholder on the left only: values from [`SEARCH_MIN`] to [`SEARCH_MAX`] are
///   written into every `?` in ascending order and the first one matching the right
///   side wins. A `?` next to digits becomes part of the literal (`1?=15` gives `5`)
/// * no placeholder: the left side is evaluated
pub fn solve(expression: &str) -> Result<i64, SolveError> {
    let normalized = normalize(expression);
    let (left, right) = normalized
        .split_once('=')
        .ok_or(SolveError::MissingEquals)?;

    if right.contains(PLACEHOLDER) || !left.contains(PLACEHOLDER) {
        return Expr::parse(left)?.evaluate();
    }

    let target = Expr::parse(right)?.evaluate()?;

    // 置換は文字列で行う。`1?` のように数字と隣接した `?` は桁の一部になる
    let mut last_error = None;
    for candidate in SEARCH_MIN..=SEARCH_MAX {
        let substituted = left.replace(PLACEHOLDER, &candidate.to_string());
        match Expr::parse(&substituted).and_then(|lhs| lhs.evaluate()) {
            Ok(value) if value == target => return Ok(candidate),
            Ok(_) => last_error = Some(SolveError::NoSolution),
            Err(e) => {
                if last_error.is_none() {
                    last_error = Some(e);
                }
            }
        }
    }
    Err(last_error.unwrap_or(SolveError::NoSolution))
}

/// Whether a quiz problem is a plain equation that can be solved directly.
///
/// Sequence puzzles like `1 2 3 = ?` contain `=` but no operator; they are left
/// to the quiz bot's hint instead of being fed to the arithmetic evaluator.
pub fn looks_solvable_directly(problem: &str) -> bool {
    let problem = problem.trim();
    if !problem.contains('=') {
        return false;
    }
    if problem.contains(['+', '-', '*', '/']) {
        return true;
    }

    let separated = problem.replace('-', " ");
    !separated
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == PLACEHOLDER || c == '=')
}

fn normalize(expression: &str) -> String {
    expression
        .trim()
        .chars()
        .map(|c| match c {
            'x' | 'X' | '×' => '*',
            '÷' => '/',
            '−' => '-',
            other => other,
        })
        .collect()
}

// ========================================
// Rational arithmetic
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ratio {
    num: i128,
    /// always positive
    den: i128,
}

impl Ratio {
    fn integer(value: i128) -> Self {
        Self { num: value, den: 1 }
    }

    fn new(num: i128, den: i128) -> Result<Self, SolveError> {
        if den == 0 {
            return Err(SolveError::DivisionByZero);
        }
        let (num, den) = if den < 0 {
            (
                num.checked_neg().ok_or(SolveError::Overflow)?,
                den.checked_neg().ok_or(SolveError::Overflow)?,
            )
        } else {
            (num, den)
        };
        // den > 0, so the gcd is at least 1 and never exceeds den
        let divisor = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        Ok(Self {
            num: num / divisor,
            den: den / divisor,
        })
    }

    fn add(self, other: Self) -> Result<Self, SolveError> {
        let left = checked_mul(self.num, other.den)?;
        let right = checked_mul(other.num, self.den)?;
        let num = left.checked_add(right).ok_or(SolveError::Overflow)?;
        Self::new(num, checked_mul(self.den, other.den)?)
    }

    fn sub(self, other: Self) -> Result<Self, SolveError> {
        self.add(other.neg()?)
    }

    fn mul(self, other: Self) -> Result<Self, SolveError> {
        Self::new(
            checked_mul(self.num, other.num)?,
            checked_mul(self.den, other.den)?,
        )
    }

    fn div(self, other: Self) -> Result<Self, SolveError> {
        if other.num == 0 {
            return Err(SolveError::DivisionByZero);
        }
        Self::new(
            checked_mul(self.num, other.den)?,
            checked_mul(self.den, other.num)?,
        )
    }

    fn neg(self) -> Result<Self, SolveError> {
        Ok(Self {
            num: self.num.checked_neg().ok_or(SolveError::Overflow)?,
            den: self.den,
        })
    }

    fn truncate(self) -> Result<i64, SolveError> {
        i64::try_from(self.num / self.den).map_err(|_| SolveError::Overflow)
    }
}

fn checked_mul(a: i128, b: i128) -> Result<i128, SolveError> {
    a.checked_mul(b).ok_or(SolveError::Overflow)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

// ========================================
// Tokenizer
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(i128),
    Placeholder,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, SolveError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut value: i128 = 0;
                while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i128::from(digit)))
                        .ok_or(SolveError::Overflow)?;
                    chars.next();
                }
                tokens.push(Token::Number(value));
            }
            _ => {
                let token = match c {
                    PLACEHOLDER => Token::Placeholder,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => return Err(SolveError::UnexpectedChar(other)),
                };
                tokens.push(token);
                chars.next();
            }
        }
    }

    Ok(tokens)
}

// ========================================
// Parser / evaluator
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Number(i128),
    Placeholder,
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn parse(input: &str) -> Result<Self, SolveError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
        };
        let expr = parser.expr(0)?;
        if parser.pos != tokens.len() {
            return Err(SolveError::Malformed);
        }
        Ok(expr)
    }

    fn evaluate(&self) -> Result<i64, SolveError> {
        self.eval_ratio()?.truncate()
    }

    fn eval_ratio(&self) -> Result<Ratio, SolveError> {
        match self {
            Expr::Number(value) => Ok(Ratio::integer(*value)),
            // 探索では値を書き込んでから解析するので、残っている `?` は解けない
            Expr::Placeholder => Err(SolveError::UnboundPlaceholder),
            Expr::Neg(inner) => inner.eval_ratio()?.neg(),
            Expr::Binary(op, lhs, rhs) => {
                let lhs = lhs.eval_ratio()?;
                let rhs = rhs.eval_ratio()?;
                match op {
                    BinaryOp::Add => lhs.add(rhs),
                    BinaryOp::Sub => lhs.sub(rhs),
                    BinaryOp::Mul => lhs.mul(rhs),
                    BinaryOp::Div => lhs.div(rhs),
                }
            }
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self, depth: usize) -> Result<Expr, SolveError> {
        let mut lhs = self.term(depth)?;
        while let Some(op) = self.peek().and_then(additive) {
            self.advance();
            let rhs = self.term(depth)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self, depth: usize) -> Result<Expr, SolveError> {
        let mut lhs = self.unary(depth)?;
        while let Some(op) = self.peek().and_then(multiplicative) {
            self.advance();
            let rhs = self.unary(depth)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // unary := ('+' | '-') unary | primary
    fn unary(&mut self, depth: usize) -> Result<Expr, SolveError> {
        if depth > MAX_DEPTH {
            return Err(SolveError::Malformed);
        }
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.unary(depth + 1)?)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.unary(depth + 1)
            }
            _ => self.primary(depth),
        }
    }

    // primary := number | '?' | '(' expr ')'
    fn primary(&mut self, depth: usize) -> Result<Expr, SolveError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Placeholder) => Ok(Expr::Placeholder),
            Some(Token::LParen) => {
                let inner = self.expr(depth + 1)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(SolveError::Malformed),
                }
            }
            _ => Err(SolveError::Malformed),
        }
    }
}

fn additive(token: Token) -> Option<BinaryOp> {
    match token {
        Token::Plus => Some(BinaryOp::Add),
        Token::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

fn multiplicative(token: Token) -> Option<BinaryOp> {
    match token {
        Token::Star => Some(BinaryOp::Mul),
        Token::Slash => Some(BinaryOp::Div),
        _ => None,
    }
}

use crate::formula::errors::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    /// The element's current value, `x`
    Variable,
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Function,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Sqrt,
    Exp,
    Ln,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
    Pow,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Function::Abs,
            "sqrt" => Function::Sqrt,
            "exp" => Function::Exp,
            "ln" | "log" => Function::Ln,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "min" => Function::Min,
            "max" => Function::Max,
            "pow" => Function::Pow,
            _ => return None,
        })
    }

    /// Accepted argument count, as (min, max).
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Function::Min | Function::Max => (1, None),
            Function::Pow => (2, Some(2)),
            _ => (1, Some(1)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Round => "round",
            Function::Min => "min",
            Function::Max => "max",
            Function::Pow => "pow",
        }
    }

    /// `Ok` when `found` arguments are accepted; `name` is how the call was spelled.
    pub fn check_arity(self, name: &str, found: usize) -> Result<(), FormulaError> {
        let (min, max) = self.arity();
        if found >= min && max.map_or(true, |max| found <= max) {
            return Ok(());
        }
        let expected = match max {
            Some(max) if max == min => min.to_string(),
            Some(max) => format!("{}..={}", min, max),
            None => format!("at least {}", min),
        };
        Err(FormulaError::Arity {
            name: name.to_string(),
            expected,
            found,
        })
    }

    /// `None` when the argument count does not fit the function.
    fn apply(self, args: &[f64]) -> Option<f64> {
        let value = match (self, args) {
            (Function::Abs, [a]) => a.abs(),
            (Function::Sqrt, [a]) => a.sqrt(),
            (Function::Exp, [a]) => a.exp(),
            (Function::Ln, [a]) => a.ln(),
            (Function::Floor, [a]) => a.floor(),
            (Function::Ceil, [a]) => a.ceil(),
            (Function::Round, [a]) => a.round(),
            (Function::Min, [_, ..]) => args.iter().copied().fold(f64::INFINITY, f64::min),
            (Function::Max, [_, ..]) => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            (Function::Pow, [a, b]) => a.powf(*b),
            _ => return None,
        };
        Some(value)
    }
}

impl Expr {
    /// Evaluate with `x` bound to the given value.
    pub fn eval(&self, x: f64) -> Result<f64, FormulaError> {
        let value = match self {
            Expr::Literal(value) => *value,
            Expr::Variable => x,
            Expr::Unary { op, operand } => {
                let v = operand.eval(x)?;
                match op {
                    UnaryOp::Plus => v,
                    UnaryOp::Neg => -v,
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let (a, b) = (lhs.eval(x)?, rhs.eval(x)?);
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::FloorDiv => (a / b).floor(),
                    // Sign follows the divisor
                    BinaryOp::Rem => a - b * (a / b).floor(),
                    BinaryOp::Pow => a.powf(b),
                }
            }
            Expr::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(x))
                    .collect::<Result<Vec<_>, _>>()?;
                func.check_arity(func.name(), values.len())?;
                func.apply(&values).unwrap_or(f64::NAN)
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite { x })
        }
    }
}

use std::fmt;
use std::str::FromStr;

/// Rounding applied when turning a tuned floating point value into an
/// integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Rounding {
    /// Half away from zero
    #[default]
    Round,
    Ceil,
    Floor,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Round => value.round(),
            Rounding::Ceil => value.ceil(),
            Rounding::Floor => value.floor(),
        }
    }

    /// Round and convert, or `None` if the result is not a finite `i64`.
    pub fn to_integer(self, value: f64) -> Option<i64> {
        let rounded = self.apply(value);
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        let in_range = rounded >= i64::MIN as f64 && rounded < i64::MAX as f64;
        (rounded.is_finite() && in_range).then_some(rounded as i64)
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rounding::Round => write!(f, "round"),
            Rounding::Ceil => write!(f, "ceil"),
            Rounding::Floor => write!(f, "floor"),
        }
    }
}

impl FromStr for Rounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round" => Ok(Rounding::Round),
            "ceil" => Ok(Rounding::Ceil),
            "floor" => Ok(Rounding::Floor),
            other => Err(format!("unknown rounding function '{}'", other)),
        }
    }
}

use serde::Deserialize;
use std::fmt;

/// Shape of the value stored in one initializer slot, derived from the
/// declared type token that precedes the variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// `S(mg, eg)` style two-argument constructor
    Paired,
    /// `V(value)` style wrapper, or a bare symbol
    Wrapped,
    /// Bare integer literal, or a bare symbol
    Plain,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Paired => write!(f, "paired"),
            ValueShape::Wrapped => write!(f, "wrapped"),
            ValueShape::Plain => write!(f, "plain"),
        }
    }
}

/// How implicit enum entry values are computed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EnumNumbering {
    /// Count the entries before the name; explicit `= n` only counts for the
    /// named entry itself.
    #[default]
    Ordinal,
    /// C-family numbering: an unassigned entry is the previous value plus one.
    AutoIncrement,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct TunerConfig {
    pub sources: SourceSettings,
    pub types: TypeSettings,
    pub enums: EnumSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["h".to_string(), "cpp".to_string()],
            recursive: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct TypeSettings {
    pub paired: Vec<String>,
    pub wrapped: Vec<String>,
    pub plain: Vec<String>,
    pub paired_constructors: Vec<String>,
    pub wrapped_constructors: Vec<String>,
}

impl Default for TypeSettings {
    fn default() -> Self {
        Self {
            paired: vec!["Score".to_string()],
            wrapped: vec!["Value".to_string()],
            plain: vec!["int".to_string()],
            paired_constructors: vec!["S".to_string(), "make_score".to_string()],
            wrapped_constructors: vec!["V".to_string(), "Value".to_string()],
        }
    }
}

impl TypeSettings {
    /// Classify a declared type token.
    pub fn shape_of(&self, declared: &str) -> Option<ValueShape> {
        let contains = |list: &[String]| list.iter().any(|t| t == declared);
        if contains(&self.paired) {
            Some(ValueShape::Paired)
        } else if contains(&self.wrapped) {
            Some(ValueShape::Wrapped)
        } else if contains(&self.plain) {
            Some(ValueShape::Plain)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct EnumSettings {
    pub numbering: EnumNumbering,
}

impl TunerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.sources.extensions.is_empty() {
            issues.push(ValidationIssue::Empty {
                field: "sources.extensions",
            });
        }
        for ext in &self.sources.extensions {
            let malformed = ext.is_empty()
                || ext.starts_with('.')
                || ext.contains(|c: char| c == '/' || c == '\\');
            if malformed {
                issues.push(ValidationIssue::InvalidExtension { value: ext.clone() });
            }
        }

        let types = &self.types;
        let lists: [(&'static str, &[String]); 5] = [
            ("types.paired", &types.paired),
            ("types.wrapped", &types.wrapped),
            ("types.plain", &types.plain),
            ("types.paired_constructors", &types.paired_constructors),
            ("types.wrapped_constructors", &types.wrapped_constructors),
        ];
        for (field, names) in lists {
            for name in names {
                if !is_identifier(name) {
                    issues.push(ValidationIssue::InvalidIdentifier {
                        field,
                        value: name.clone(),
                    });
                }
            }
        }
        if types.paired_constructors.is_empty() {
            issues.push(ValidationIssue::Empty {
                field: "types.paired_constructors",
            });
        }
        if types.wrapped_constructors.is_empty() {
            issues.push(ValidationIssue::Empty {
                field: "types.wrapped_constructors",
            });
        }

        let shapes = [&types.paired, &types.wrapped, &types.plain];
        for (i, a) in shapes.iter().enumerate() {
            for b in shapes.iter().skip(i + 1) {
                for name in a.iter().filter(|name| b.contains(*name)) {
                    issues.push(ValidationIssue::AmbiguousType { name: name.clone() });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Empty { field: &'static str },
    InvalidExtension { value: String },
    InvalidIdentifier { field: &'static str, value: String },
    AmbiguousType { name: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::Empty { field } => write!(f, "{} must not be empty", field),
            ValidationIssue::InvalidExtension { value } => {
                write!(f, "invalid source extension '{}' (expected e.g. \"cpp\")", value)
            }
            ValidationIssue::InvalidIdentifier { field, value } => {
                write!(f, "{} entry '{}' is not an identifier", field, value)
            }
            ValidationIssue::AmbiguousType { name } => {
                write!(f, "type '{}' is listed under more than one shape", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TunerConfig::default().validate().is_ok());
    }

    #[test]
    fn shape_of_default_types() {
        let types = TypeSettings::default();
        assert_eq!(types.shape_of("Score"), Some(ValueShape::Paired));
        assert_eq!(types.shape_of("Value"), Some(ValueShape::Wrapped));
        assert_eq!(types.shape_of("int"), Some(ValueShape::Plain));
        assert_eq!(types.shape_of("Depth"), None);
    }

    #[test]
    fn collects_every_issue() {
        let mut config = TunerConfig::default();
        config.sources.extensions = vec![".cpp".to_string()];
        config.types.wrapped.push("int".to_string());
        config.types.paired_constructors.clear();

        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 3);
        assert!(err
            .issues
            .contains(&ValidationIssue::AmbiguousType { name: "int".into() }));
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("make_score"));
        assert!(is_identifier("_S"));
        assert!(!is_identifier("2S"));
        assert!(!is_identifier("S("));
        assert!(!is_identifier(""));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::names::normalize_variable_name;

/// Which substitution policy a variable is subject to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Row-level access-control variable: absent grants, present-but-empty denies.
    Permission,
    /// User-facing filter parameter: absent passes through, empty degrades to a null check.
    Query,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Permission => write!(f, "PERMISSION"),
            VariableKind::Query => write!(f, "QUERY"),
        }
    }
}

impl std::str::FromStr for VariableKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERMISSION" => Ok(VariableKind::Permission),
            "QUERY" => Ok(VariableKind::Query),
            _ => Err(format!("Invalid variable kind: {s}")),
        }
    }
}

/// Value type of a variable; selects the ordering used for min/max reduction
/// and the literal form of substituted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Text; ordered lexicographically, substituted as quoted strings.
    String,
    /// Numbers; ordered numerically, substituted as bare numeric literals.
    Numeric,
    /// Dates in a sortable textual form; ordered lexicographically.
    Date,
    /// Unclassified; no total order, substituted as quoted strings.
    Other,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "STRING"),
            ValueType::Numeric => write!(f, "NUMERIC"),
            ValueType::Date => write!(f, "DATE"),
            ValueType::Other => write!(f, "OTHER"),
        }
    }
}

impl std::str::FromStr for ValueType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STRING" => Ok(ValueType::String),
            "NUMERIC" => Ok(ValueType::Numeric),
            "DATE" => Ok(ValueType::Date),
            "OTHER" => Ok(ValueType::Other),
            _ => Err(format!("Invalid value type: {s}")),
        }
    }
}

/// A named placeholder bound to zero or more values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptVariable {
    /// Variable name, with or without quoting / placeholder sigils.
    pub name: String,
    /// Policy classification.
    pub kind: VariableKind,
    /// Value type.
    pub value_type: ValueType,
    /// Bound values in binding order. Empty means "no bound values".
    #[serde(default)]
    pub values: Vec<String>,
}

impl ScriptVariable {
    /// Create a variable with the given binding.
    pub fn new<I, S>(name: &str, kind: VariableKind, value_type: ValueType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            kind,
            value_type,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for a permission variable.
    pub fn permission<I, S>(name: &str, value_type: ValueType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, VariableKind::Permission, value_type, values)
    }

    /// Shorthand for a query variable.
    pub fn query<I, S>(name: &str, value_type: ValueType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, VariableKind::Query, value_type, values)
    }

    /// Normalized name used for identifier matching.
    pub fn normalized_name(&self) -> String {
        normalize_variable_name(&self.name)
    }

    /// Copy of this variable bound to `value` only.
    pub fn with_single_value(&self, value: &str) -> Self {
        Self {
            values: vec![value.to_string()],
            ..self.clone()
        }
    }
}

/// Mapping from an original script fragment to its rewritten SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplacementPair {
    /// Fragment text as it appears in the source script.
    pub original_fragment: String,
    /// SQL to substitute for it.
    pub rewritten_fragment: String,
}

impl ReplacementPair {
    /// Create a pair.
    pub fn new(original_fragment: &str, rewritten_fragment: impl Into<String>) -> Self {
        Self {
            original_fragment: original_fragment.to_string(),
            rewritten_fragment: rewritten_fragment.into(),
        }
    }

    /// Returns `true` when the fragment is left untouched.
    pub fn is_identity(&self) -> bool {
        self.original_fragment == self.rewritten_fragment
    }
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// Informational note.
    Info,
    /// The rewrite succeeded but degraded the fragment.
    Warning,
}

/// Condition observed while resolving a fragment, reported in-band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Variable the diagnostic is about.
    pub variable: String,
    /// Human-readable message.
    pub message: String,
}

/// Outcome of resolving one placeholder-bearing expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Fragment replacement for the caller to stitch back.
    pub replacement: ReplacementPair,
    /// Conditions the caller may surface or suppress.
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Resolution without diagnostics.
    pub fn clean(replacement: ReplacementPair) -> Self {
        Self {
            replacement,
            diagnostics: Vec::new(),
        }
    }
}

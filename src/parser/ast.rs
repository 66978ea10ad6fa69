use std::fmt;

/// An ordered sequence of literal text and variable expansions. Represents a
/// whole template, or the nested content of a modifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expression(Vec<ExpressionItem>);

impl Expression {
    pub fn new(items: Vec<ExpressionItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[ExpressionItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The variable names referenced by this expression, in order of
    /// appearance, including those inside nested modifier content.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        for item in &self.0 {
            let ExpressionItem::Expansion(expansion) = item else {
                continue;
            };
            names.push(expansion.identifier.as_str());
            for modifier in &expansion.modifiers {
                match modifier {
                    Modifier::EmptyValue { content, .. }
                    | Modifier::UnsetValue { content, .. } => {
                        content.collect_identifiers(names)
                    }
                    Modifier::Required { message, .. } => message.collect_identifiers(names),
                    Modifier::Substring { .. } => (),
                }
            }
        }
    }
}

impl From<Vec<ExpressionItem>> for Expression {
    fn from(items: Vec<ExpressionItem>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a Expression {
    type Item = &'a ExpressionItem;
    type IntoIter = std::slice::Iter<'a, ExpressionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionItem {
    Text(String),
    Expansion(VariableExpansion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableExpansion {
    pub identifier: String,
    pub modifiers: Vec<Modifier>,
}

impl VariableExpansion {
    pub fn new(identifier: String, modifiers: Vec<Modifier>) -> Self {
        Self {
            identifier,
            modifiers,
        }
    }
}

/// An operator attached to an expansion, altering how the variable's value is
/// resolved. Each variant carries the owning identifier for self-description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// `${IDENT:-content}`: substitute `content` when the variable is unset
    /// or set to the empty string.
    EmptyValue {
        identifier: String,
        content: Expression,
    },
    /// `${IDENT-content}`: substitute `content` only when the variable is
    /// unset.
    UnsetValue {
        identifier: String,
        content: Expression,
    },
    /// `${IDENT:offset}` or `${IDENT:offset:length}`: extract a substring of
    /// the variable's value. Negative values count from the end.
    Substring {
        identifier: String,
        offset: i64,
        length: Option<i64>,
    },
    /// `${IDENT?message}`: the variable is required; `message` is the
    /// diagnostic content when it is missing.
    Required {
        identifier: String,
        message: Expression,
    },
}

impl Modifier {
    /// A terminal modifier consumes everything up to the closing brace, so no
    /// further modifier can follow it in the chain.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Substring { .. })
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.0 {
            item.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExpressionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Expansion(expansion) => expansion.fmt(f),
        }
    }
}

impl fmt::Display for VariableExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}", self.identifier)?;
        for modifier in &self.modifiers {
            modifier.fmt(f)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { content, .. } => write!(f, ":-{content}"),
            Self::UnsetValue { content, .. } => write!(f, "-{content}"),
            Self::Substring {
                offset,
                length: Some(length),
                ..
            } => write!(f, ":{offset}:{length}"),
            Self::Substring { offset, .. } => write!(f, ":{offset}"),
            Self::Required { message, .. } => write!(f, "?{message}"),
        }
    }
}

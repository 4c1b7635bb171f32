use std::fmt::Display;

use sqlx::{QueryBuilder, Sqlite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    Different,
}

impl Operator {
    fn sql(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::Different => "<>",
        }
    }
}

/// A value a predicate compares a field against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Integer(i64),
    Text(String),
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Text(value) => write!(f, "{value:?}"),
        }
    }
}

/// A filter over the rows of one entity kind. Field names come from the
/// column constants in [`crate::models::fields`]; values are always bound as
/// query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare {
        field: &'static str,
        op: Operator,
        value: Scalar,
    },
    /// A comparison with no value: `Equal` matches rows where the field is
    /// missing (NULL or empty), `Different` matches rows where it is present.
    Exists { field: &'static str, op: Operator },
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// `None` means "match everything" and is only produced for a missing id.
    pub fn with_id(id: Option<i64>, field: &'static str, op: Operator) -> Option<Self> {
        id.map(|id| Predicate::Compare {
            field,
            op,
            value: Scalar::Integer(id),
        })
    }

    pub fn with_value(value: Option<&str>, field: &'static str, op: Operator) -> Self {
        match value {
            Some(value) if !value.is_empty() => Predicate::Compare {
                field,
                op,
                value: Scalar::from(value),
            },
            _ => Predicate::Exists { field, op },
        }
    }

    pub fn equal(field: &'static str, value: impl Into<Scalar>) -> Self {
        Predicate::Compare {
            field,
            op: Operator::Equal,
            value: value.into(),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub(crate) fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Predicate::Compare { field, op, value } => {
                qb.push(*field).push(" ").push(op.sql()).push(" ");
                match value {
                    Scalar::Integer(value) => qb.push_bind(*value),
                    Scalar::Text(value) => qb.push_bind(value.clone()),
                };
            }
            Predicate::Exists { field, op } => {
                match op {
                    Operator::Equal => qb
                        .push("(")
                        .push(*field)
                        .push(" IS NULL OR ")
                        .push(*field)
                        .push(" = '')"),
                    Operator::Different => qb
                        .push("(")
                        .push(*field)
                        .push(" IS NOT NULL AND ")
                        .push(*field)
                        .push(" <> '')"),
                };
            }
            Predicate::And(left, right) => {
                qb.push("(");
                left.push_sql(qb);
                qb.push(") AND (");
                right.push_sql(qb);
                qb.push(")");
            }
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Compare { field, op, value } => write!(f, "{field} {} {value}", op.sql()),
            Predicate::Exists { field, op } => write!(f, "{field} {}", op.sql()),
            Predicate::And(left, right) => write!(f, "({left}) AND ({right})"),
        }
    }
}

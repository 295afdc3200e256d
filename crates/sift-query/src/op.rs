//! Comparison operators understood in SQL fragments.
//!
//! The [`Op`] enum is the closed set of operators a fragment may use. Operator
//! text is parsed with [`Op::parse`]; anything outside the table is rejected
//! with [`QueryError::UnsupportedOperator`].

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::QueryError;

/// Comparison operator for a compiled clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`: loose equality, strict identity against `NULL`.
    Eq,
    /// `<>` / `!=`: negation of `Eq`.
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `IS`: strict identity.
    Is,
    /// `IS NOT`: strict non-identity.
    IsNot,
    /// `LIKE`: case-insensitive SQL pattern match.
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `LIKE BINARY`: case-sensitive SQL pattern match.
    LikeBinary,
    /// `NOT LIKE BINARY`
    NotLikeBinary,
    /// `AGAINST` from `MATCH (...) AGAINST (...)`, evaluated as `LIKE`.
    Against,
    /// `IN`: membership in a list.
    In,
    /// `NOT IN`
    NotIn,
}

impl Op {
    /// Parses operator text as it appears in a fragment.
    ///
    /// Whitespace runs are collapsed and case is ignored, so `"not  like"`
    /// parses as [`Op::NotLike`].
    pub fn parse(text: &str) -> Result<Op, QueryError> {
        let normalized = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        let op = match normalized.as_str() {
            "=" => Op::Eq,
            "<>" | "!=" => Op::Ne,
            "<" => Op::Lt,
            ">" => Op::Gt,
            "<=" => Op::Lte,
            ">=" => Op::Gte,
            "IS" => Op::Is,
            "IS NOT" => Op::IsNot,
            "LIKE" => Op::Like,
            "NOT LIKE" => Op::NotLike,
            "LIKE BINARY" => Op::LikeBinary,
            "NOT LIKE BINARY" => Op::NotLikeBinary,
            "AGAINST" => Op::Against,
            "IN" => Op::In,
            "NOT IN" => Op::NotIn,
            _ => return Err(QueryError::UnsupportedOperator(text.trim().to_string())),
        };
        Ok(op)
    }

    /// Returns `true` for the pattern operators, which need a compiled pattern.
    pub fn is_pattern_op(self) -> bool {
        matches!(
            self,
            Op::Like | Op::NotLike | Op::LikeBinary | Op::NotLikeBinary | Op::Against
        )
    }

    /// Returns `true` if pattern matching ignores case.
    pub fn is_case_insensitive(self) -> bool {
        matches!(self, Op::Like | Op::NotLike | Op::Against)
    }

    /// Returns `true` for operators defined as the negation of another one.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Op::Ne | Op::IsNot | Op::NotLike | Op::NotLikeBinary | Op::NotIn
        )
    }

    /// Returns the positive form of a negated operator.
    ///
    /// - `Ne` -> `Eq`
    /// - `IsNot` -> `Is`
    /// - `NotLike` -> `Like`, `NotLikeBinary` -> `LikeBinary`
    /// - `NotIn` -> `In`
    /// - Others unchanged
    pub fn positive(self) -> Op {
        match self {
            Op::Ne => Op::Eq,
            Op::IsNot => Op::Is,
            Op::NotLike => Op::Like,
            Op::NotLikeBinary => Op::LikeBinary,
            Op::NotIn => Op::In,
            Op::Against => Op::Like,
            other => other,
        }
    }

    /// Evaluates an ordering operator given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false, // Not an ordering-based operator
        }
    }

    /// Returns the fragment spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Lte => "<=",
            Op::Gte => ">=",
            Op::Is => "IS",
            Op::IsNot => "IS NOT",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::LikeBinary => "LIKE BINARY",
            Op::NotLikeBinary => "NOT LIKE BINARY",
            Op::Against => "AGAINST",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
        }
    }
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::parse(s)
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_operator_table() {
        assert_eq!(Op::parse("=").unwrap(), Op::Eq);
        assert_eq!(Op::parse("<>").unwrap(), Op::Ne);
        assert_eq!(Op::parse("!=").unwrap(), Op::Ne);
        assert_eq!(Op::parse("<=").unwrap(), Op::Lte);
        assert_eq!(Op::parse("IS NOT").unwrap(), Op::IsNot);
        assert_eq!(Op::parse("NOT LIKE BINARY").unwrap(), Op::NotLikeBinary);
        assert_eq!(Op::parse("AGAINST").unwrap(), Op::Against);
        assert_eq!(Op::parse("NOT IN").unwrap(), Op::NotIn);
    }

    #[test]
    fn parse_normalizes_case_and_spacing() {
        assert_eq!(Op::parse("not  like").unwrap(), Op::NotLike);
        assert_eq!(Op::parse(" like binary ").unwrap(), Op::LikeBinary);
        assert_eq!("is".parse::<Op>().unwrap(), Op::Is);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = Op::parse("REGEXP").unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperator(ref op) if op == "REGEXP"));
        assert_eq!(err.to_string(), "SQL operation 'REGEXP' not supported");
        assert!(Op::parse("").is_err());
    }

    #[test]
    fn negation_pairs() {
        for op in [Op::Ne, Op::IsNot, Op::NotLike, Op::NotLikeBinary, Op::NotIn] {
            assert!(op.is_negated());
            assert!(!op.positive().is_negated());
        }
        assert_eq!(Op::Against.positive(), Op::Like);
        assert_eq!(Op::Gt.positive(), Op::Gt);
    }

    #[test]
    fn pattern_ops_and_case() {
        assert!(Op::Like.is_pattern_op());
        assert!(Op::Against.is_pattern_op());
        assert!(!Op::In.is_pattern_op());
        assert!(Op::Like.is_case_insensitive());
        assert!(Op::Against.is_case_insensitive());
        assert!(!Op::LikeBinary.is_case_insensitive());
    }

    #[test]
    fn op_eval_ordering() {
        assert!(Op::Gt.eval_ordering(Ordering::Greater));
        assert!(!Op::Gt.eval_ordering(Ordering::Equal));
        assert!(Op::Gte.eval_ordering(Ordering::Equal));
        assert!(!Op::Gte.eval_ordering(Ordering::Less));
        assert!(Op::Lt.eval_ordering(Ordering::Less));
        assert!(Op::Lte.eval_ordering(Ordering::Equal));
        assert!(!Op::Lte.eval_ordering(Ordering::Greater));
        assert!(!Op::Eq.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn op_display_round_trips() {
        for op in [Op::Eq, Op::Ne, Op::IsNot, Op::LikeBinary, Op::NotIn, Op::Against] {
            assert_eq!(Op::parse(&op.to_string()).unwrap(), op);
        }
    }
}

//! Predicate trees.
//!
//! Queries keep an AND-chain of [`Predicate`]s. A predicate is a clause leaf
//! or a boolean combination of predicates, which is enough to express
//! everything the filter surface needs: `OR` runs inside a fragment,
//! `where_any`, and the inversions used by `exclude`.

use crate::clause::Clause;
use crate::record::Record;

/// A boolean combination of clauses.
///
/// Empty combinations follow the usual identities: `And([])` is true and
/// `Or([])` is false.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// A single compiled clause.
    Leaf(Clause),
    /// All children must match.
    And(Vec<Predicate>),
    /// At least one child must match.
    Or(Vec<Predicate>),
    /// The child must not match.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Wraps a predicate in `Not`, unwrapping a double negation.
    pub fn negate(self) -> Predicate {
        match self {
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// Builds an `And`, collapsing the single-child case.
    pub fn all(mut children: Vec<Predicate>) -> Predicate {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Predicate::And(children)
        }
    }

    /// Builds an `Or`, collapsing the single-child case.
    pub fn any(mut children: Vec<Predicate>) -> Predicate {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Predicate::Or(children)
        }
    }

    /// Tests a record against this predicate.
    pub fn evaluate<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::Leaf(clause) => clause.matches(record.field(clause.field()).as_ref()),
            Predicate::And(children) => children.iter().all(|p| p.evaluate(record)),
            Predicate::Or(children) => children.iter().any(|p| p.evaluate(record)),
            Predicate::Not(inner) => !inner.evaluate(record),
        }
    }

    /// Number of clause leaves in this tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Predicate::Leaf(_) => 1,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::leaf_count).sum()
            }
            Predicate::Not(inner) => inner.leaf_count(),
        }
    }
}

impl From<Clause> for Predicate {
    fn from(clause: Clause) -> Self {
        Predicate::Leaf(clause)
    }
}

//! Quadrature rule reduction.
//!
//! [`caratheodory_pruning`] compresses an over-resolved positive rule to
//! at most as many points as there are moments to preserve.

mod pruning;

pub use pruning::{PrunedQuadrature, PruningError, caratheodory_pruning};

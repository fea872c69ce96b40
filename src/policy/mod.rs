//! Authorization predicate modules.

pub mod predicates;

pub use predicates::Actor;

//! Pure, driver-agnostic query compilation: name encoding, predicate
//! compilation, and logical-to-physical type mapping.

pub mod name_encoder;
pub mod predicate;
pub mod statement;
pub mod type_mapper;

pub use predicate::{compile as compile_predicate, CompiledPredicate, Predicate, PredicateInput};
pub use statement::{qualified, quote_ident, Statement};

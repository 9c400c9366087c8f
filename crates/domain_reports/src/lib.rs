//! Reports Domain - DRE
//!
//! The DRE (Demonstracao do Resultado do Exercicio) is the
//! profit-and-loss view: settled payments and classified bank movements
//! inside a period, summed by their chart account's DRE group and line,
//! with the account's sign deciding whether the amount adds to or
//! subtracts from the result.

pub mod dre;

pub use dre::{ClassifiedAmount, DreAggregator, DreClassification, DreGroup, DreLine, DreStatement};

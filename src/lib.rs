//! Campus Nav - natural-language routing over a campus point catalog

pub mod catalog;
pub mod command;
pub mod core;
pub mod instruction;
pub mod llm;
pub mod resolve;
pub mod routing;

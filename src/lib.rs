//! Chronlang: a language for describing the phonological history of
//! natural and constructed languages.
//!
//! A source text declares a language family, an inventory of phonological
//! traits and phonemes, a lexicon, and a time-tagged sequence of sound
//! changes. [`compile_module`] turns such a text into a [`Module`];
//! [`Module::snapshot`] then produces the lexicon of any descendant
//! language at any point in time, with every applicable sound law folded
//! over each word.

pub mod ast;
pub mod change;
pub mod compiler;
pub mod diag;
pub mod errors;
mod import;
pub mod language;
pub mod lexer;
pub mod matcher;
pub mod module;
pub mod parse;
pub mod phonology;
pub mod resolver;
pub mod snapshot;
pub mod tag;
pub mod word;

pub use compiler::compile_module;
pub use module::Module;
pub use resolver::{FileSystemResolver, MockResolver, Resolve};
pub use snapshot::Snapshot;

/// Indented, line-oriented rendering of a parsed program.
pub mod tree;

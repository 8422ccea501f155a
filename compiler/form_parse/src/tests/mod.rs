//! Parser tests.
//!
//! - `expr`: precedence, literals, paths, calls, interpolation
//! - `instr`: action strings

mod expr;
mod instr;

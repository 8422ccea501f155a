//! Grammar productions, split by rule-string kind.

mod expr;
mod instr;

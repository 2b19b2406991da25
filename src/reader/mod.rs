/*!
The reader: source text to terms.

A two-stage pipeline:
- The [lexer](crate::reader::lexer) breaks text into tokens --- names, variables, numbers, strings, punctuation, and the `.` terminator --- independently of any operator table.
- The [parser](crate::reader::parser) assembles tokens into terms by precedence climbing over the *current* operator table.

The split matters: tokenization is fixed, but parsing consults a mutable table, so an `op/3` directive executed between two terms changes how the second reads.
The parser therefore works term-by-term, and [consulting](crate::builder) executes each directive before asking for the next term.

[extract_op_directives](crate::reader::parser::extract_op_directives) pre-scans source for the operator directives it will need, covering files which use an operator their own imports provide.
*/

pub mod lexer;
pub mod parser;

pub use parser::{extract_op_directives, Parser, ReadTerm};

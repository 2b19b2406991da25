/*!
The term universe, and the things built from it.

- [Terms](crate::structures::term) are the values of the interpreter: atoms, numbers, variables, compound terms, and lists.
- [Clauses](crate::structures::clause) pair a head term with a body term, and are the things a program is made of.

Terms are immutable and shared by reference.
Sub-terms of a compound or list belong to every term which holds them, and a term lives as long as its longest-lived holder.
As a consequence, copying a clause for resolution copies only the spine of the term to refresh variables, sharing every variable-free sub-term with the original.
*/

pub mod clause;
pub mod order;
pub mod term;

pub use clause::Clause;
pub use term::{Compound, List, RTerm, Term, Unquoted, Variable};

/*!
Substitutions and unification.

A [substitution](Bindings) maps variable ids to terms.
During a single branch of resolution the map only grows; backtracking is handled by cloning the map at each choice point, so the state before the choice is untouched by anything which happens after it.

[Unification](unify) extends a substitution so two terms become equal, or reports that no extension does.
The occurs check is off by default, matching the usual performance expectations, and may be requested per call --- `unify_with_occurs_check/2` always checks, regardless of the global configuration.
*/

mod bindings;
pub use bindings::{Bindings, ListView, Tail};

mod unify;
pub use unify::{occurs_in, unify};

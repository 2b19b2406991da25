/*!
Databases consulted before and during a query.

- [The clause database](crate::db::clause)
  + A collection of clauses grouped by [predicate indicator](PredicateIndicator), each group carrying its property flags and a first-argument index. \
    From an external perspective there are two important kinds of predicate:
    * Static predicates, whose clauses come from consulted source and which `assert`/`retract` may not touch.
    * Dynamic predicates, declared by `dynamic/1` or created by assertion, open to mutation at any time.
- [The operator table](crate::db::operators)
  + Priorities and fixities consulted by the reader, mutable through `op/3`.
- [Module records](crate::db::modules)
  + Exported indicators and operator sets per module name, with `user` as the default module.
*/

pub mod clause;
pub mod modules;
pub mod operators;

mod keys;
pub use keys::{FirstArgKey, PredicateIndicator};

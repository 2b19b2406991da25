/*!
The context --- to which programs are added and within which queries take place, etc.

A context owns every piece of interpreter state: the configuration, the clause database, the operator table, module records, the built-in registry, the variable id counter, and the source of randomness.

Queries are lazy: [query](Context::query) hands back an iterator, and the search for the next solution runs only when the iterator is pulled.
While such an iterator is live it holds the context, and built-ins reached during the search may still consult and mutate the databases --- `assert/1` during a query is ordinary Prolog.
The mutable pieces therefore sit behind [RefCell]s, with the discipline that no borrow is held across a solution yield.

# Example

```rust
# use otter_pl::{config::Config, context::Context};
let mut ctx = Context::from_config(Config::default());

ctx.consult_str("parent(tom, bob). parent(bob, ann). grandparent(X, Z) :- parent(X, Y), parent(Y, Z).").unwrap();

assert!(ctx.has_solution("grandparent(tom, ann).").unwrap());
assert!(!ctx.has_solution("grandparent(ann, tom).").unwrap());
```
*/

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;

use crate::builtins::Registry;
use crate::config::Config;
use crate::db::clause::ClauseDB;
use crate::db::modules::Modules;
use crate::db::operators::OperatorTable;
use crate::generic::MinimalPCG32;
use crate::structures::{Clause, RTerm, Term, Variable};

mod counters;
pub use counters::Counters;

mod query;
pub use query::SolutionIter;

/// The context.
pub struct Context {
    /// The configuration of a context.
    pub config: Config,

    /// Counters related to a context/query.
    pub counters: RefCell<Counters>,

    /// The clause database.
    pub clause_db: RefCell<ClauseDB>,

    /// The operator table the reader consults.
    pub operators: RefCell<OperatorTable>,

    /// Module records.
    pub modules: RefCell<Modules>,

    /// The built-in registry, fixed at construction.
    pub builtins: Registry,

    /// The source of rng, backing the `random` built-ins.
    pub rng: RefCell<MinimalPCG32>,

    /// Monotonic source of variable ids.
    var_counter: Cell<u64>,
}

impl Context {
    /// Creates a context from some given configuration.
    pub fn from_config(config: Config) -> Self {
        let rng = MinimalPCG32::from_seed(config.rng_seed.value.to_le_bytes());
        Context {
            config,

            counters: RefCell::new(Counters::default()),

            clause_db: RefCell::new(ClauseDB::default()),
            operators: RefCell::new(OperatorTable::default()),
            modules: RefCell::new(Modules::default()),

            builtins: Registry::with_core(),

            rng: RefCell::new(rng),

            var_counter: Cell::new(0),
        }
    }

    /// A fresh variable id.
    ///
    /// Ids are unique for the lifetime of the context, so a renamed clause can never capture a caller's variable.
    pub fn fresh_var_id(&self) -> u64 {
        let id = self.var_counter.get();
        self.var_counter.set(id + 1);
        id
    }

    /// A fresh variable term with the given display name.
    pub fn fresh_var(&self, name: &str) -> RTerm {
        Rc::new(Term::Var(Variable {
            id: self.fresh_var_id(),
            name: Rc::from(name),
        }))
    }

    /// A copy of the clause with fresh variables drawn from the context's counter.
    pub fn rename_clause(&self, clause: &Clause) -> Clause {
        let mut fresh = || self.fresh_var_id();
        clause.rename(&mut fresh)
    }

    /// A copy of the term with fresh variables, for `copy_term/2`, `assert/1` and `findall/3` instances.
    pub fn rename_term(&self, term: &RTerm) -> RTerm {
        let mut seen = std::collections::HashMap::default();
        let mut fresh = || self.fresh_var_id();
        crate::structures::clause::rename_term(term, &mut seen, &mut fresh)
            .unwrap_or_else(|| term.clone())
    }
}

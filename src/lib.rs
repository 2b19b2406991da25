/*!
A Prolog interpreter built around a lazily backtracking resolution engine.

otter_pl parses standard Prolog source into terms, stores clauses in an indexed database, and resolves goals by SLD resolution with backtracking, cut, exceptions, and depth limiting.

otter_pl is developed to help researchers, developers, or anyone curious, to investigate logic programming engines, whether as a novice or through implementing novel ideas.

# Orientation

The library is designed around the core structure of a [context].

Clauses may be added by [consulting](crate::context::Context::consult_str) Prolog source or [programmatically](crate::context::Context::add_clause).

Internally, and at a high-level, a query is viewed in terms of the manipulation of, and relationships between, a handful of structures:
- A program is stored in a clause database, indexed by predicate indicator and the shape of the first argument.
- Bindings made during resolution are stored in a substitution, cloned at choice points so backtracking observes exact pre-choice-point state.
- Alternatives are reified as a lazy sequence of solutions; pulling the next solution resumes the most recent live choice point.

Useful starting points, then, may be:
- The [resolver](crate::procedures::solve) to inspect the dynamics of a query.
- The [database module](crate::db) to inspect the data consulted before a query.
- The [structures] to familiarise yourself with the term universe (atoms, numbers, variables, compounds, lists).
- The [configuration](crate::config) to see what is adjustable.

# Examples

+ Consult a couple of clauses and enumerate solutions.

```rust
# use otter_pl::{config::Config, context::Context, reports::Value};
let mut ctx = Context::from_config(Config::default());

ctx.consult_str("edge(a, b). edge(b, c). path(X, Y) :- edge(X, Y).").unwrap();

let solutions = ctx.query("path(a, Where).").unwrap().collect::<Result<Vec<_>, _>>().unwrap();
assert_eq!(solutions.len(), 1);
assert_eq!(solutions[0].get("Where"), Some(&Value::Atom("b".to_string())));
```

+ A single solution, or a yes/no answer.

```rust
# use otter_pl::{config::Config, context::Context};
let mut ctx = Context::from_config(Config::default());
ctx.consult_str("likes(alice, prolog).").unwrap();

assert!(ctx.has_solution("likes(alice, prolog).").unwrap());
assert!(ctx.query_once("likes(alice, rust).").unwrap().is_none());
```

# Guiding principles

## Modularity

  + An interpreter is built of many interconnected parts, but where possible (and reasonable) interaction between parts happens through documented access points. For example:
    - Clauses are stored in a [clause database](db::clause) and read through snapshots taken at call time, so database mutation during a query never disturbs a running call.
    - The algorithm for resolving goals is factored into a collection of [procedures].
    - Native predicates plug into the resolver through a narrow [registry](builtins), and may themselves yield many solutions.
    - Use of external crates is limited to crates which help support modularity, such as [log](https://docs.rs/log/latest/log/) and [rand](https://docs.rs/rand/latest/rand/), or which cover a concern the library should not reimplement, such as [num_bigint] for arbitrary-precision integers.

## Simple efficiency

The interpreter is efficient in most operations, and known inefficiencies are often noted.
Compromises are made for the sake of simplicity: substitutions are cloned at choice points rather than trailed, and the first-argument index is rebuilt lazily after mutation.
Both choices keep backtracking easy to reason about, and both are isolated behind the relevant structures should a revision be worthwhile.

# Logs

To help diagnose issues (somewhat) detailed calls to [log!](log) are made, and a variety of targets are defined in order to help narrow output to relevant parts of the library.
As logging is only built on request, and further can be requested by level, logs are verbose.

The targets are listed in [misc::log].

For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
- Logs related to [the resolver](crate::procedures::solve) can be filtered with `RUST_LOG=solve …` or,
- Logs of consult-time directive handling can be found with `RUST_LOG=builder=info …`
*/

#![allow(clippy::collapsible_else_if)]
#![allow(clippy::single_match)]

pub mod builder;
pub mod procedures;

pub mod config;
pub mod context;
pub mod structures;
pub mod types;

pub mod generic;

pub mod reports;

pub mod db;

pub mod builtins;
pub mod misc;
pub mod reader;
pub mod unification;

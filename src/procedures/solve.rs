/*!
Resolves goals against the program in a context.

# Overview

[solve_goals](crate::context::Context::solve_goals) casts SLD resolution with backtracking as a lazy sequence of substitutions.

A list of goals is solved left-to-right: each solution of the first goal seeds a solver for the rest, and exhausting the rest backtracks into the first.
A single goal is solved by case analysis after dereferencing:

- `true` succeeds once, `fail` and `false` yield nothing.
- A conjunction flattens into a goal list.
- A disjunction tries its left disjunct then its right, unless the left is `Cond -> Then`, in which case the disjunction commits to the first solution of `Cond` and solves only the matching branch.
- `\+ Goal` succeeds exactly when `Goal` has no solution, discarding any bindings the attempt made.
- `!` succeeds once and cuts (see below).
- A goal matching a [built-in](crate::builtins) dispatches to it.
- Anything else resolves against the [clause database](crate::db::clause): for each candidate clause, in order, the clause is renamed apart, its head unified with the goal, and its body solved under the extended substitution.

Roughly, one clause frame is as diagrammed:

```none
            +-----------------+ none left, or cut observed
   +------->| next candidate  |----------------------------> (frame exhausted)
   |        +-----------------+
   |                 |
   |                 | rename apart, unify head
   |                 ⌄
   |        +-----------------+
   +--------| solve body      |----+----> yield substitution, repeat on pull
  body      +-----------------+
  exhausted
```

# Cut

Cut is a control effect, not a goal which merely succeeds: executing `!` must discard the untried clauses of the enclosing predicate call and the unexplored alternatives of every goal to its left in the clause body.

Here the effect is carried by a [Barrier]: a flag created when a predicate-call frame opens and shared with every solver the frame spawns.
`!` succeeds once and raises the flag.
Conjunctions and disjunctions consult the flag before backtracking into an earlier goal or a later disjunct, and the clause frame consults it before trying another candidate clause.
Goals which open their own frame --- `call/N`, `\+/1`, `once/1`, `catch/3`, the condition of an if-then-else --- hand their sub-solver a fresh barrier, so a cut inside is local.

# Exceptions and depth

A thrown term travels through the solution sequence as an [Err] item, bypassing ordinary failure; `catch/3` consumes matching items, and anything unconsumed surfaces from the query API.
Each clause frame also deepens a per-query counter, and passing the configured limit raises `resource_error(recursion_depth_exceeded)` as an ordinary Prolog exception rather than exhausting the host stack.
*/

use std::cell::Cell;
use std::rc::Rc;

use crate::context::Context;
use crate::db::{FirstArgKey, PredicateIndicator};
use crate::misc::log::targets;
use crate::structures::{RTerm, Term};
use crate::types::err::{self, Interrupt};
use crate::unification::{unify, Bindings};

/// A lazy sequence of solutions: substitutions, or an interrupt in flight.
pub type Solutions<'a> = Box<dyn Iterator<Item = Result<Bindings, Interrupt>> + 'a>;

/// The cut barrier of a predicate-call frame.
///
/// Cloning shares the flag: every solver below a frame consults the same cell.
#[derive(Clone, Debug, Default)]
pub struct Barrier(Rc<Cell<bool>>);

impl Barrier {
    /// A fresh, uncut barrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag: alternatives guarded by this barrier are abandoned.
    pub fn cut(&self) {
        self.0.set(true);
    }

    /// True once a cut guarded by this barrier has executed.
    pub fn is_cut(&self) -> bool {
        self.0.get()
    }
}

/// An empty solution sequence: failure.
pub fn answer_none<'a>() -> Solutions<'a> {
    Box::new(std::iter::empty())
}

/// A single solution.
pub fn answer_once<'a>(bindings: Bindings) -> Solutions<'a> {
    Box::new(std::iter::once(Ok(bindings)))
}

/// A raised interrupt.
pub fn answer_err<'a>(interrupt: Interrupt) -> Solutions<'a> {
    Box::new(std::iter::once(Err(interrupt)))
}

/// Flattens a (possibly nested) conjunction into a goal list, dereferencing along the left spine.
pub fn flatten_conjunction(goal: &RTerm, bindings: &Bindings, into: &mut Vec<RTerm>) {
    let goal = bindings.deref(goal);
    match goal.as_ref() {
        Term::Compound(compound)
            if compound.functor.as_ref() == "," && compound.args.len() == 2 =>
        {
            flatten_conjunction(&compound.args[0], bindings, into);
            flatten_conjunction(&compound.args[1], bindings, into);
        }
        _ => into.push(goal),
    }
}

impl Context {
    /// Solves a list of goals in order, threading substitutions, under the given barrier.
    pub fn solve_goals<'a>(
        &'a self,
        mut goals: Vec<RTerm>,
        bindings: Bindings,
        depth: usize,
        barrier: &Barrier,
    ) -> Solutions<'a> {
        match goals.len() {
            0 => answer_once(bindings),
            1 => {
                let goal = goals.pop().expect("length checked");
                self.solve_goal(&goal, bindings, depth, barrier)
            }
            _ => {
                let first_goal = goals.remove(0);
                let first = self.solve_goal(&first_goal, bindings, depth, barrier);
                Box::new(Conjunction {
                    ctx: self,
                    rest: goals,
                    first,
                    current: None,
                    depth,
                    barrier: barrier.clone(),
                    done: false,
                })
            }
        }
    }

    /// Solves a single goal under the given barrier.
    pub fn solve_goal<'a>(
        &'a self,
        goal: &RTerm,
        bindings: Bindings,
        depth: usize,
        barrier: &Barrier,
    ) -> Solutions<'a> {
        let goal = bindings.deref(goal);
        log::trace!(target: targets::SOLVE, "goal: {goal}");

        match goal.as_ref() {
            Term::Var(_) => answer_err(err::instantiation_error("call/1")),

            Term::Int(_) | Term::Float(_) => {
                answer_err(err::type_error("callable", goal.clone(), "call/1"))
            }

            Term::Atom(name) => match name.as_ref() {
                "true" => answer_once(bindings),

                "fail" | "false" => answer_none(),

                "!" => Box::new(CutOnce {
                    bindings: Some(bindings),
                    barrier: barrier.clone(),
                }),

                _ => self.dispatch(goal.clone(), bindings, depth),
            },

            Term::Compound(compound) => {
                match (compound.functor.as_ref(), compound.args.len()) {
                    (",", 2) => {
                        let mut goals = Vec::default();
                        flatten_conjunction(&goal, &bindings, &mut goals);
                        self.solve_goals(goals, bindings, depth, barrier)
                    }

                    (";", 2) => {
                        let left = bindings.deref(&compound.args[0]);
                        let right = compound.args[1].clone();

                        // `Cond -> Then ; Else` is a committed choice, not a disjunction over `->`.
                        match left.as_ref() {
                            Term::Compound(inner)
                                if inner.functor.as_ref() == "->" && inner.args.len() == 2 =>
                            {
                                Box::new(IfThenElse {
                                    ctx: self,
                                    cond: inner.args[0].clone(),
                                    then_goal: inner.args[1].clone(),
                                    else_goal: Some(right),
                                    bindings,
                                    depth,
                                    barrier: barrier.clone(),
                                    state: None,
                                    done: false,
                                })
                            }

                            _ => {
                                let first = self.solve_goal(&left, bindings.clone(), depth, barrier);
                                Box::new(Disjunction {
                                    ctx: self,
                                    right_goal: Some(right),
                                    bindings,
                                    depth,
                                    barrier: barrier.clone(),
                                    current: first,
                                    done: false,
                                })
                            }
                        }
                    }

                    ("->", 2) => Box::new(IfThenElse {
                        ctx: self,
                        cond: compound.args[0].clone(),
                        then_goal: compound.args[1].clone(),
                        else_goal: None,
                        bindings,
                        depth,
                        barrier: barrier.clone(),
                        state: None,
                        done: false,
                    }),

                    ("\\+", 1) => self.solve_negation(compound.args[0].clone(), bindings, depth),

                    _ => self.dispatch(goal.clone(), bindings, depth),
                }
            }

            Term::List(_) => {
                if goal.is_nil() {
                    self.dispatch(goal.clone(), bindings, depth)
                } else {
                    answer_err(err::type_error("callable", goal.clone(), "call/1"))
                }
            }
        }
    }

    /// Solves a goal under a fresh barrier, as `call/1` does: a cut inside is local to the goal.
    pub fn call_goal<'a>(&'a self, goal: &RTerm, bindings: Bindings, depth: usize) -> Solutions<'a> {
        let barrier = Barrier::new();
        self.solve_goal(goal, bindings, depth, &barrier)
    }

    /// Negation as failure: succeeds with the original substitution exactly when the goal has no solution.
    pub fn solve_negation<'a>(
        &'a self,
        goal: RTerm,
        bindings: Bindings,
        depth: usize,
    ) -> Solutions<'a> {
        let mut done = false;
        let mut original = Some(bindings);

        Box::new(std::iter::from_fn(move || {
            if done {
                return None;
            }
            done = true;

            let bindings = original.take().expect("first pull");
            let mut attempt = self.call_goal(&goal, bindings.clone(), depth);
            match attempt.next() {
                Some(Ok(_)) => None,
                Some(Err(interrupt)) => Some(Err(interrupt)),
                None => Some(Ok(bindings)),
            }
        }))
    }

    /// Dispatches a callable goal: to a built-in when registered, otherwise to the clause database.
    fn dispatch<'a>(&'a self, goal: RTerm, bindings: Bindings, depth: usize) -> Solutions<'a> {
        let indicator = match PredicateIndicator::of(&goal) {
            Some(indicator) => indicator,
            None => return answer_err(err::type_error("callable", goal, "call/1")),
        };

        if let Some(builtin) = self.builtins.get(&indicator) {
            log::trace!(target: targets::BUILTIN, "dispatch: {indicator}");

            let args = match goal.as_ref() {
                Term::Compound(compound) => compound
                    .args
                    .iter()
                    .map(|arg| bindings.deref(arg))
                    .collect(),
                _ => Vec::default(),
            };

            return (builtin.run)(
                self,
                crate::builtins::BuiltinCall {
                    args,
                    bindings,
                    depth,
                },
            );
        }

        self.solve_clauses(indicator, goal, bindings, depth)
    }

    /// Resolves a goal against the clauses of its predicate.
    fn solve_clauses<'a>(
        &'a self,
        indicator: PredicateIndicator,
        goal: RTerm,
        bindings: Bindings,
        depth: usize,
    ) -> Solutions<'a> {
        let depth = depth + 1;
        if depth > self.config.depth_limit.value {
            log::info!(target: targets::SOLVE, "depth limit hit at {indicator}");
            return answer_err(err::resource_error("recursion_depth_exceeded", "solve/2"));
        }

        {
            let mut counters = self.counters.borrow_mut();
            counters.reductions += 1;
            counters.deepest_frame = counters.deepest_frame.max(depth);
        }

        let key = match goal.as_ref() {
            Term::Compound(compound) => FirstArgKey::of(bindings.deref(&compound.args[0]).as_ref()),
            _ => None,
        };

        // Snapshot the candidates: mutation during the call must not disturb this call.
        let candidates = {
            let mut db = self.clause_db.borrow_mut();
            match db.candidates(&indicator, key.as_ref()) {
                Some(clauses) => clauses,
                None => {
                    return answer_err(err::existence_error(
                        &indicator.name,
                        indicator.arity,
                        "call/1",
                    ))
                }
            }
        };

        Box::new(ClauseCalls {
            ctx: self,
            goal,
            candidates: candidates.into_iter(),
            bindings,
            depth,
            frame_barrier: Barrier::new(),
            body: None,
        })
    }
}

// Solution iterators
// --------------------------------------------------

/// `!`: one solution, raising the barrier's flag as it is taken.
struct CutOnce {
    bindings: Option<Bindings>,
    barrier: Barrier,
}

impl Iterator for CutOnce {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        self.bindings.take().map(|bindings| {
            self.barrier.cut();
            Ok(bindings)
        })
    }
}

/// A conjunction: solutions of the first goal seed solvers for the rest.
struct Conjunction<'a> {
    ctx: &'a Context,
    rest: Vec<RTerm>,
    first: Solutions<'a>,
    current: Option<Solutions<'a>>,
    depth: usize,
    barrier: Barrier,
    done: bool,
}

impl<'a> Iterator for Conjunction<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Some(current) = &mut self.current {
                match current.next() {
                    Some(Ok(bindings)) => return Some(Ok(bindings)),
                    Some(Err(interrupt)) => {
                        self.done = true;
                        return Some(Err(interrupt));
                    }
                    None => {
                        self.current = None;
                        // A cut in the continuation seals off backtracking into the first goal.
                        if self.barrier.is_cut() {
                            self.done = true;
                            return None;
                        }
                    }
                }
            }

            match self.first.next() {
                Some(Ok(bindings)) => {
                    self.current = Some(self.ctx.solve_goals(
                        self.rest.clone(),
                        bindings,
                        self.depth,
                        &self.barrier,
                    ));
                }
                Some(Err(interrupt)) => {
                    self.done = true;
                    return Some(Err(interrupt));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

/// A disjunction: the left disjunct, then --- barring a cut --- the right from the original substitution.
struct Disjunction<'a> {
    ctx: &'a Context,
    right_goal: Option<RTerm>,
    bindings: Bindings,
    depth: usize,
    barrier: Barrier,
    current: Solutions<'a>,
    done: bool,
}

impl<'a> Iterator for Disjunction<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.current.next() {
                Some(Ok(bindings)) => return Some(Ok(bindings)),
                Some(Err(interrupt)) => {
                    self.done = true;
                    return Some(Err(interrupt));
                }
                None => match self.right_goal.take() {
                    Some(right) if !self.barrier.is_cut() => {
                        self.current = self.ctx.solve_goal(
                            &right,
                            self.bindings.clone(),
                            self.depth,
                            &self.barrier,
                        );
                    }
                    _ => {
                        self.done = true;
                        return None;
                    }
                },
            }
        }
    }
}

/// If-then-else: commit to the first solution of the condition, then solve the matching branch.
///
/// The condition runs under a fresh barrier, so a cut inside it is local; the branches share the caller's barrier.
struct IfThenElse<'a> {
    ctx: &'a Context,
    cond: RTerm,
    then_goal: RTerm,
    else_goal: Option<RTerm>,
    bindings: Bindings,
    depth: usize,
    barrier: Barrier,
    state: Option<Solutions<'a>>,
    done: bool,
}

impl<'a> Iterator for IfThenElse<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.state.is_none() {
            let mut condition = self
                .ctx
                .call_goal(&self.cond, self.bindings.clone(), self.depth);

            match condition.next() {
                Some(Ok(cond_bindings)) => {
                    self.state = Some(self.ctx.solve_goal(
                        &self.then_goal,
                        cond_bindings,
                        self.depth,
                        &self.barrier,
                    ));
                }
                Some(Err(interrupt)) => {
                    self.done = true;
                    return Some(Err(interrupt));
                }
                None => match self.else_goal.take() {
                    Some(else_goal) => {
                        self.state = Some(self.ctx.solve_goal(
                            &else_goal,
                            self.bindings.clone(),
                            self.depth,
                            &self.barrier,
                        ));
                    }
                    None => {
                        self.done = true;
                        return None;
                    }
                },
            }
        }

        match self.state.as_mut().expect("state set above").next() {
            Some(Ok(bindings)) => Some(Ok(bindings)),
            Some(Err(interrupt)) => {
                self.done = true;
                Some(Err(interrupt))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// A predicate-call frame: candidate clauses tried in order, bodies solved under the frame's barrier.
struct ClauseCalls<'a> {
    ctx: &'a Context,
    goal: RTerm,
    candidates: std::vec::IntoIter<Rc<crate::structures::Clause>>,
    bindings: Bindings,
    depth: usize,
    frame_barrier: Barrier,
    body: Option<Solutions<'a>>,
}

impl<'a> Iterator for ClauseCalls<'a> {
    type Item = Result<Bindings, Interrupt>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(body) = &mut self.body {
                match body.next() {
                    Some(item) => return Some(item),
                    None => {
                        self.body = None;
                        if self.frame_barrier.is_cut() {
                            return None;
                        }
                    }
                }
            }

            let clause = self.candidates.next()?;
            let renamed = self.ctx.rename_clause(&clause);

            let mut trial = self.bindings.clone();
            let occurs = self.ctx.config.occurs_check.value;
            if unify(&self.goal, &renamed.head, &mut trial, occurs) {
                self.body = Some(self.ctx.solve_goal(
                    &renamed.body,
                    trial,
                    self.depth,
                    &self.frame_barrier,
                ));
            }
        }
    }
}

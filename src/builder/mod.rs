/*!
Consulting: reads Prolog source into the context.

The consult loop works term-by-term: parse one term, act on it, parse the next.
Directives act as they are met --- an `op/3` or `use_module/1` changes how the very next term parses --- and clauses land in the database in source order.

Three term shapes receive special handling:
- `:- Directive.` executes at consult time. `if/1`, `else/0`, `endif/0` drive conditional compilation; `initialization/1` queues its goal; anything else simply runs as a goal, with a throw aborting the consult and plain failure logged as a warning.
- `Head --> Body.` is a DCG rule, [translated](crate::builder::dcg) into an ordinary clause with two threaded list arguments.
- `?- Query.` runs as a goal, like a plain directive.

Conditional compilation keeps a per-consult stack of `if` blocks.
Inside an excluded branch clauses are skipped and directives are not executed, with the exception of the conditional directives themselves, which still push and pop so nesting stays balanced.
An `else` without `if`, a second `else` in one block, or an `if` left open at the end of the source each raise a structured error scoped to this consult.

After the source ends, queued initialization goals run in the order collected.
A throw from one aborts the consult; clauses already loaded remain.
*/

pub mod dcg;

use std::path::Path;

use crate::context::Context;
use crate::db::PredicateIndicator;
use crate::misc::log::targets;
use crate::reader::{extract_op_directives, Parser};
use crate::structures::{Clause, RTerm, Term};
use crate::types::err::{self, ErrorKind, Interrupt, ParseError};
use crate::unification::Bindings;

/// One block of `:- if(...)` conditional compilation.
struct CondFrame {
    /// Whether this block's current branch includes terms.
    active: bool,

    /// Whether any branch of this block has been taken.
    taken: bool,

    /// Whether `else` has been seen.
    else_seen: bool,

    /// Whether the enclosing blocks include this one at all.
    parent_active: bool,
}

#[derive(Default)]
struct CondStack {
    frames: Vec<CondFrame>,
}

impl CondStack {
    /// True when no enclosing block excludes the current term.
    fn active(&self) -> bool {
        self.frames.iter().all(|frame| frame.active)
    }

    fn push(&mut self, condition_holds: bool) {
        let parent_active = self.active();
        self.frames.push(CondFrame {
            active: parent_active && condition_holds,
            taken: condition_holds,
            else_seen: false,
            parent_active,
        });
    }

    fn flip(&mut self) -> Result<(), Interrupt> {
        match self.frames.last_mut() {
            None => Err(err::syntax_error("unexpected_else", "consult/1")),
            Some(frame) => {
                if frame.else_seen {
                    return Err(err::syntax_error("duplicate_else", "consult/1"));
                }
                frame.else_seen = true;
                frame.active = frame.parent_active && !frame.taken;
                frame.taken = true;
                Ok(())
            }
        }
    }

    fn pop(&mut self) -> Result<(), Interrupt> {
        match self.frames.pop() {
            None => Err(err::syntax_error("unexpected_endif", "consult/1")),
            Some(_) => Ok(()),
        }
    }
}

impl Context {
    /// Consults Prolog source text.
    pub fn consult_str(&mut self, source: &str) -> Result<(), ErrorKind> {
        self.consult_source(source)
    }

    /// Consults the file at `path`.
    ///
    /// Exactly this file: there is no library search.
    pub fn consult_path(&mut self, path: impl AsRef<Path>) -> Result<(), ErrorKind> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|_| ParseError::NoFile(path.display().to_string()))?;
        self.consult_source(&source)
    }

    /// Adds a clause programmatically, as consulted source would.
    pub fn add_clause(&mut self, head: RTerm, body: RTerm) -> Result<(), ErrorKind> {
        let indicator = match PredicateIndicator::of(&head) {
            Some(indicator) => indicator,
            None => {
                let ball = err::type_error("callable", head, "consult/1");
                return Err(interrupt_to_error(ball));
            }
        };
        self.clause_db
            .borrow_mut()
            .add_clause(indicator, Clause { head, body }, false);
        Ok(())
    }

    fn consult_source(&self, source: &str) -> Result<(), ErrorKind> {
        // Apply pre-scanned operator directives, so terms may use an operator
        // their own imports provide before the import itself has executed.
        let directive_ops = extract_op_directives(source);
        {
            let mut table = self.operators.borrow_mut();
            for (priority, spec, name) in &directive_ops {
                table.insert(*priority, *spec, name);
            }
        }

        let fresh = || self.fresh_var_id();
        let mut parser = Parser::new(
            source,
            &self.operators,
            &fresh,
            self.config.double_quotes.value,
        )?;

        let mut conditions = CondStack::default();
        let mut init_queue: Vec<RTerm> = Vec::default();

        while let Some(read) = parser.next_term()? {
            log::trace!(target: crate::misc::log::targets::READER, "read: {}", read.term);
            self.consult_term(read.term, &mut conditions, &mut init_queue)?;
        }

        if !conditions.frames.is_empty() {
            let ball = err::syntax_error("unterminated_conditional", "consult/1");
            return Err(interrupt_to_error(ball));
        }

        for goal in init_queue {
            log::debug!(target: targets::BUILDER, "initialization: {goal}");
            match self.run_consult_goal(&goal)? {
                true => {}
                false => {
                    log::warn!(target: targets::BUILDER, "initialization goal failed: {goal}");
                }
            }
        }

        Ok(())
    }

    /// Acts on one consulted term.
    fn consult_term(
        &self,
        term: RTerm,
        conditions: &mut CondStack,
        init_queue: &mut Vec<RTerm>,
    ) -> Result<(), ErrorKind> {
        match term.as_ref() {
            Term::Compound(compound)
                if compound.functor.as_ref() == ":-" && compound.args.len() == 1 =>
            {
                self.consult_directive(&compound.args[0], conditions, init_queue)
            }

            Term::Compound(compound)
                if compound.functor.as_ref() == "?-" && compound.args.len() == 1 =>
            {
                if conditions.active() {
                    self.run_consult_goal(&compound.args[0])?;
                }
                Ok(())
            }

            Term::Compound(compound)
                if compound.functor.as_ref() == ":-" && compound.args.len() == 2 =>
            {
                if conditions.active() {
                    self.store_clause(compound.args[0].clone(), compound.args[1].clone())?;
                }
                Ok(())
            }

            Term::Compound(compound)
                if compound.functor.as_ref() == "-->" && compound.args.len() == 2 =>
            {
                if conditions.active() {
                    let (head, body) =
                        match dcg::translate_rule(self, &compound.args[0], &compound.args[1]) {
                            Ok(parts) => parts,
                            Err(interrupt) => return Err(interrupt_to_error(interrupt)),
                        };
                    self.store_clause(head, body)?;
                }
                Ok(())
            }

            Term::Atom(_) | Term::Compound(_) => {
                if conditions.active() {
                    self.store_clause(term, Term::truth())?;
                }
                Ok(())
            }

            _ => {
                let ball = err::type_error("callable", term, "consult/1");
                Err(interrupt_to_error(ball))
            }
        }
    }

    fn store_clause(&self, head: RTerm, body: RTerm) -> Result<(), ErrorKind> {
        let indicator = match head.as_ref() {
            Term::Atom(_) | Term::Compound(_) => {
                PredicateIndicator::of(&head).expect("atoms and compounds have indicators")
            }
            _ => {
                let ball = err::type_error("callable", head, "consult/1");
                return Err(interrupt_to_error(ball));
            }
        };

        log::debug!(target: targets::BUILDER, "clause for {indicator}");
        self.counters.borrow_mut().clauses_consulted += 1;
        self.clause_db
            .borrow_mut()
            .add_clause(indicator, Clause { head, body }, false);
        Ok(())
    }

    fn consult_directive(
        &self,
        goal: &RTerm,
        conditions: &mut CondStack,
        init_queue: &mut Vec<RTerm>,
    ) -> Result<(), ErrorKind> {
        // The conditional directives run even inside an excluded branch, to keep nesting balanced.
        match goal.as_ref() {
            Term::Atom(name) if name.as_ref() == "else" => {
                return conditions.flip().map_err(interrupt_to_error);
            }
            Term::Atom(name) if name.as_ref() == "endif" => {
                return conditions.pop().map_err(interrupt_to_error);
            }
            Term::Compound(compound)
                if compound.functor.as_ref() == "if" && compound.args.len() == 1 =>
            {
                let holds = match conditions.active() {
                    // The condition of an excluded block is not evaluated.
                    false => false,
                    true => self.run_consult_goal(&compound.args[0])?,
                };
                conditions.push(holds);
                return Ok(());
            }
            _ => {}
        }

        if !conditions.active() {
            return Ok(());
        }

        match goal.as_ref() {
            Term::Compound(compound)
                if compound.functor.as_ref() == "initialization" && compound.args.len() == 1 =>
            {
                let queued = &compound.args[0];
                match queued.as_ref() {
                    Term::Var(_) => {
                        return Err(interrupt_to_error(err::instantiation_error(
                            "initialization/1",
                        )))
                    }
                    _ if !queued.is_callable() => {
                        return Err(interrupt_to_error(err::type_error(
                            "callable",
                            queued.clone(),
                            "initialization/1",
                        )))
                    }
                    _ => init_queue.push(queued.clone()),
                }
                Ok(())
            }

            _ => {
                log::debug!(target: targets::BUILDER, "directive: {goal}");
                match self.run_consult_goal(goal)? {
                    true => Ok(()),
                    false => {
                        log::warn!(target: targets::BUILDER, "directive failed: {goal}");
                        Ok(())
                    }
                }
            }
        }
    }

    /// Runs a consult-time goal to its first solution.
    fn run_consult_goal(&self, goal: &RTerm) -> Result<bool, ErrorKind> {
        let mut solutions = self.call_goal(goal, Bindings::default(), 0);
        match solutions.next() {
            Some(Ok(_)) => Ok(true),
            None => Ok(false),
            Some(Err(interrupt)) => Err(interrupt_to_error(interrupt)),
        }
    }
}

fn interrupt_to_error(interrupt: Interrupt) -> ErrorKind {
    interrupt.into()
}

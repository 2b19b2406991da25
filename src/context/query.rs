/*!
The query surface of a context.

A query is text: parsed against the current operator table, solved lazily, and answered as maps from the query's own variable names to [structural values](crate::reports).

- [query](Context::query) hands back the full lazy sequence.
- [query_once](Context::query_once) takes the first solution, if any.
- [query_n](Context::query_n) collects up to a bound.
- [has_solution](Context::has_solution) asks only whether one exists.

Variables whose written name begins with `_` are omitted from solution maps.
An uncaught throw surfaces as [ErrorKind::Uncaught] from whichever call pulled it.
*/

use crate::context::Context;
use crate::misc::log::targets;
use crate::procedures::Solutions;
use crate::reports::{solution_of, Solution};
use crate::structures::{RTerm, Term};
use crate::types::err::{ErrorKind, ParseError};
use crate::unification::Bindings;

/// The lazy sequence of a query's solutions, rendered for the caller.
pub struct SolutionIter<'a> {
    solutions: Solutions<'a>,

    /// The query's named variables, already filtered of `_`-prefixed names.
    named: Vec<(String, RTerm)>,

    done: bool,
}

impl<'a> Iterator for SolutionIter<'a> {
    type Item = Result<Solution, ErrorKind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.solutions.next() {
            Some(Ok(bindings)) => Some(Ok(solution_of(&self.named, &bindings))),
            Some(Err(interrupt)) => {
                self.done = true;
                Some(Err(interrupt.into()))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl Context {
    /// Parses a query and produces its solutions lazily.
    ///
    /// The text is one `.`-terminated goal; a leading `?-` is accepted and stripped.
    pub fn query(&mut self, text: &str) -> Result<SolutionIter<'_>, ErrorKind> {
        self.counters.borrow_mut().queries += 1;

        let ctx: &Context = &*self;

        let (goal, named) = {
            let fresh = || ctx.fresh_var_id();
            let mut parser = crate::reader::Parser::new(
                text,
                &ctx.operators,
                &fresh,
                ctx.config.double_quotes.value,
            )?;

            let read = match parser.next_term()? {
                Some(read) => read,
                None => return Err(ParseError::UnexpectedEof.into()),
            };

            let goal = match read.term.as_ref() {
                Term::Compound(compound)
                    if compound.functor.as_ref() == "?-" && compound.args.len() == 1 =>
                {
                    compound.args[0].clone()
                }
                _ => read.term.clone(),
            };

            let named = read
                .vars
                .into_iter()
                .filter(|(name, _)| !name.starts_with('_'))
                .collect();

            (goal, named)
        };

        log::debug!(target: targets::SOLVE, "query: {goal}");

        let solutions = ctx.call_goal(&goal, Bindings::default(), 0);
        Ok(SolutionIter {
            solutions,
            named,
            done: false,
        })
    }

    /// The first solution of a query, or [None] on failure.
    pub fn query_once(&mut self, text: &str) -> Result<Option<Solution>, ErrorKind> {
        let mut solutions = self.query(text)?;
        match solutions.next() {
            None => Ok(None),
            Some(Ok(solution)) => Ok(Some(solution)),
            Some(Err(error)) => Err(error),
        }
    }

    /// Up to `bound` solutions of a query, in order.
    pub fn query_n(&mut self, text: &str, bound: usize) -> Result<Vec<Solution>, ErrorKind> {
        let mut collected = Vec::default();
        let mut solutions = self.query(text)?;
        while collected.len() < bound {
            match solutions.next() {
                None => break,
                Some(Ok(solution)) => collected.push(solution),
                Some(Err(error)) => return Err(error),
            }
        }
        Ok(collected)
    }

    /// True when the query has at least one solution.
    pub fn has_solution(&mut self, text: &str) -> Result<bool, ErrorKind> {
        Ok(self.query_once(text)?.is_some())
    }
}

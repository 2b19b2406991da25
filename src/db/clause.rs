/*!
The clause database.

Clauses are grouped by [predicate indicator](PredicateIndicator).
Each group holds its clauses in insertion order (adjusted by `asserta`/`assertz`), its property flags, and a first-argument index.

The index maps the outer shape of a clause's first argument to the positions of the clauses with that shape, with a separate bucket for clauses whose first argument is a variable.
A lookup for a goal with a known first-argument shape returns the shape bucket merged with the variable bucket, in clause order, so the index never hides a clause which could match.
The index is dropped on mutation and rebuilt on the next lookup.

Reads for resolution are snapshots: the candidate list is cloned out of the database at call time, so `assert`/`retract` during a call never disturbs the call ([logical update view](https://www.swi-prolog.org/pldoc/man?section=update)).
*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::db::{FirstArgKey, PredicateIndicator};
use crate::misc::log::targets;
use crate::structures::{Clause, Term};

/// Property flags and clauses of a single predicate.
#[derive(Debug, Default)]
pub struct PredicateRecord {
    /// The clauses, in the order resolution tries them.
    clauses: Vec<Rc<Clause>>,

    /// Set by `dynamic/1` or by assertion; sticky once set.
    pub dynamic: bool,

    /// Set by `multifile/1`.
    pub multifile: bool,

    /// Set by `discontiguous/1`.
    pub discontiguous: bool,

    /// The first-argument index, dropped on mutation.
    index: Option<FirstArgIndex>,
}

/// Positions of clauses by first-argument shape.
#[derive(Debug, Default)]
struct FirstArgIndex {
    buckets: HashMap<FirstArgKey, Vec<usize>>,

    /// Clauses whose first argument is a variable match any shape.
    any: Vec<usize>,
}

impl PredicateRecord {
    /// The clauses, in order.
    pub fn clauses(&self) -> &[Rc<Clause>] {
        &self.clauses
    }

    /// The key of a clause: the shape of the first argument of its head.
    fn clause_key(clause: &Clause) -> Option<FirstArgKey> {
        match clause.head.as_ref() {
            Term::Compound(compound) => FirstArgKey::of(&compound.args[0]),
            _ => None,
        }
    }

    fn build_index(&mut self) {
        let mut index = FirstArgIndex::default();
        for (position, clause) in self.clauses.iter().enumerate() {
            match Self::clause_key(clause) {
                Some(key) => index.buckets.entry(key).or_default().push(position),
                None => index.any.push(position),
            }
        }
        self.index = Some(index);
    }

    /// The clauses a goal with the given first-argument shape could match, in clause order.
    ///
    /// [None] asks for every clause, as does arity zero.
    pub fn candidates(&mut self, key: Option<&FirstArgKey>) -> Vec<Rc<Clause>> {
        let key = match key {
            Some(key) => key,
            None => return self.clauses.clone(),
        };

        if self.index.is_none() {
            self.build_index();
        }
        let index = self.index.as_ref().expect("index built above");

        let empty = Vec::default();
        let bucket = index.buckets.get(key).unwrap_or(&empty);

        // Merge the shape bucket with the variable bucket, preserving clause order.
        let mut positions = Vec::with_capacity(bucket.len() + index.any.len());
        let (mut b, mut a) = (0, 0);
        while b < bucket.len() || a < index.any.len() {
            match (bucket.get(b), index.any.get(a)) {
                (Some(&x), Some(&y)) => {
                    if x < y {
                        positions.push(x);
                        b += 1;
                    } else {
                        positions.push(y);
                        a += 1;
                    }
                }
                (Some(&x), None) => {
                    positions.push(x);
                    b += 1;
                }
                (None, Some(&y)) => {
                    positions.push(y);
                    a += 1;
                }
                (None, None) => break,
            }
        }

        positions
            .into_iter()
            .map(|position| self.clauses[position].clone())
            .collect()
    }
}

/// The clause database.
#[derive(Debug, Default)]
pub struct ClauseDB {
    predicates: HashMap<PredicateIndicator, PredicateRecord>,
}

impl ClauseDB {
    /// Appends (or, with `front`, prepends) a clause for the given indicator.
    ///
    /// No permission check: consult-time loading and runtime assertion share this method, with the
    /// static-procedure check made by the caller against [is_dynamic](Self::is_dynamic) and the built-in registry.
    pub fn add_clause(&mut self, indicator: PredicateIndicator, clause: Clause, front: bool) {
        log::debug!(target: targets::CLAUSE_DB, "add {}: {}", indicator, clause);

        let record = self.predicates.entry(indicator).or_default();
        match front {
            true => record.clauses.insert(0, Rc::new(clause)),
            false => record.clauses.push(Rc::new(clause)),
        }
        record.index = None;
    }

    /// Removes the clause identified by pointer, returning whether it was present.
    pub fn remove_clause(&mut self, indicator: &PredicateIndicator, clause: &Rc<Clause>) -> bool {
        match self.predicates.get_mut(indicator) {
            Some(record) => {
                let before = record.clauses.len();
                record.clauses.retain(|held| !Rc::ptr_eq(held, clause));
                match record.clauses.len() < before {
                    true => {
                        record.index = None;
                        true
                    }
                    false => false,
                }
            }
            None => false,
        }
    }

    /// Removes every clause of the indicator, keeping the record and its flags.
    pub fn abolish(&mut self, indicator: &PredicateIndicator) {
        if let Some(record) = self.predicates.get_mut(indicator) {
            record.clauses.clear();
            record.index = None;
        }
    }

    /// The record of an indicator, if any clauses or declarations exist for it.
    pub fn record(&self, indicator: &PredicateIndicator) -> Option<&PredicateRecord> {
        self.predicates.get(indicator)
    }

    /// Candidate clauses for a goal, snapshotted out of the database.
    pub fn candidates(
        &mut self,
        indicator: &PredicateIndicator,
        key: Option<&FirstArgKey>,
    ) -> Option<Vec<Rc<Clause>>> {
        self.predicates
            .get_mut(indicator)
            .map(|record| record.candidates(key))
    }

    /// True when the indicator has a record at all.
    pub fn known(&self, indicator: &PredicateIndicator) -> bool {
        self.predicates.contains_key(indicator)
    }

    /// True when the indicator is declared (or became) dynamic.
    pub fn is_dynamic(&self, indicator: &PredicateIndicator) -> bool {
        self.predicates
            .get(indicator)
            .is_some_and(|record| record.dynamic)
    }

    /// Marks the indicator dynamic, creating an empty record when required.
    ///
    /// The flag is sticky: nothing clears it.
    pub fn set_dynamic(&mut self, indicator: PredicateIndicator) {
        self.predicates.entry(indicator).or_default().dynamic = true;
    }

    /// Marks the indicator multifile.
    pub fn set_multifile(&mut self, indicator: PredicateIndicator) {
        self.predicates.entry(indicator).or_default().multifile = true;
    }

    /// Marks the indicator discontiguous.
    pub fn set_discontiguous(&mut self, indicator: PredicateIndicator) {
        self.predicates.entry(indicator).or_default().discontiguous = true;
    }

    /// An iterator over every known indicator.
    pub fn indicators(&self) -> impl Iterator<Item = &PredicateIndicator> {
        self.predicates.keys()
    }
}

#[cfg(test)]
mod clause_db_tests {
    use super::*;
    use crate::structures::Term;

    fn fact(functor: &str, arg: crate::structures::RTerm) -> Clause {
        Clause::fact(Term::compound(functor, vec![arg]))
    }

    #[test]
    fn clause_order_is_kept() {
        let mut db = ClauseDB::default();
        let pi = PredicateIndicator::new("p", 1);

        db.add_clause(pi.clone(), fact("p", Term::atom("first")), false);
        db.add_clause(pi.clone(), fact("p", Term::atom("second")), false);
        db.add_clause(pi.clone(), fact("p", Term::atom("zeroth")), true);

        let all = db.candidates(&pi, None).expect("record exists");
        let names: Vec<_> = all
            .iter()
            .map(|clause| match clause.head.as_ref() {
                Term::Compound(c) => c.args[0].atom_name().unwrap().to_string(),
                _ => panic!("head shape"),
            })
            .collect();
        assert_eq!(names, ["zeroth", "first", "second"]);
    }

    #[test]
    fn index_filters_but_never_hides_variable_heads() {
        let mut db = ClauseDB::default();
        let pi = PredicateIndicator::new("p", 1);

        db.add_clause(pi.clone(), fact("p", Term::atom("a")), false);
        db.add_clause(
            pi.clone(),
            fact(
                "p",
                std::rc::Rc::new(Term::Var(crate::structures::Variable {
                    id: 1,
                    name: std::rc::Rc::from("X"),
                })),
            ),
            false,
        );
        db.add_clause(pi.clone(), fact("p", Term::atom("b")), false);

        let key = FirstArgKey::Atom(std::rc::Rc::from("b"));
        let filtered = db.candidates(&pi, Some(&key)).expect("record exists");

        // The variable-headed clause stays, in order, between the shape misses.
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn dynamic_is_sticky() {
        let mut db = ClauseDB::default();
        let pi = PredicateIndicator::new("d", 0);

        db.set_dynamic(pi.clone());
        assert!(db.is_dynamic(&pi));
        db.add_clause(pi.clone(), Clause::fact(Term::atom("d")), false);
        assert!(db.is_dynamic(&pi));
    }
}

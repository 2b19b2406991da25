/*!
Module records.

A module record tracks exported predicate indicators and the operators a module carries.
The default module is `user`, and every consulted clause lands there: module records exist so imports are visible to `use_module/1` and so the operators of known library modules reach the reader before the library itself would execute.

Library file discovery is a boundary of the interpreter: importing a module records the import and applies its operators, and nothing is read from the file system.
*/

use std::collections::HashMap;

use crate::db::operators::OpSpec;
use crate::db::PredicateIndicator;

/// A module: its exports and its operators.
#[derive(Debug, Default)]
pub struct Module {
    /// Exported predicate indicators.
    pub exports: Vec<PredicateIndicator>,

    /// Operators the module declares, as (priority, spec, name) triples.
    pub operators: Vec<(u16, OpSpec, String)>,
}

/// The module records of a context.
#[derive(Debug)]
pub struct Modules {
    records: HashMap<String, Module>,
}

impl Default for Modules {
    fn default() -> Self {
        let mut records = HashMap::default();
        records.insert("user".to_string(), Module::default());
        Modules { records }
    }
}

impl Modules {
    /// The record of a module, if present.
    pub fn get(&self, name: &str) -> Option<&Module> {
        self.records.get(name)
    }

    /// The record of a module, created on first touch.
    pub fn entry(&mut self, name: &str) -> &mut Module {
        self.records.entry(name.to_string()).or_default()
    }

    /// True when the module has been imported or created.
    pub fn imported(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Records an import, merging the operator set the library is known to declare.
    pub fn import(&mut self, name: &str) -> &Module {
        if !self.records.contains_key(name) {
            let mut module = Module::default();
            module.operators = library_operators(name);
            self.records.insert(name.to_string(), module);
        }
        &self.records[name]
    }
}

/// The operator sets of library modules the interpreter knows about.
///
/// These cover parsing of sources which use an imported operator before the import itself could run.
/// The predicates of these libraries are not supplied here.
pub fn library_operators(name: &str) -> Vec<(u16, OpSpec, String)> {
    match name {
        "clpz" | "clpfd" => vec![
            (700, OpSpec::XFX, "#=".to_string()),
            (700, OpSpec::XFX, "#\\=".to_string()),
            (700, OpSpec::XFX, "#<".to_string()),
            (700, OpSpec::XFX, "#>".to_string()),
            (700, OpSpec::XFX, "#=<".to_string()),
            (700, OpSpec::XFX, "#>=".to_string()),
            (700, OpSpec::XFX, "in".to_string()),
            (700, OpSpec::XFX, "ins".to_string()),
            (450, OpSpec::XFX, "..".to_string()),
        ],
        _ => Vec::default(),
    }
}

#[cfg(test)]
mod module_tests {
    use super::*;

    #[test]
    fn user_module_exists_from_the_start() {
        let modules = Modules::default();
        assert!(modules.imported("user"));
    }

    #[test]
    fn importing_a_known_library_carries_its_operators() {
        let mut modules = Modules::default();
        let clpz = modules.import("clpz");

        assert!(clpz
            .operators
            .iter()
            .any(|(_, spec, name)| name == "#=" && *spec == OpSpec::XFX));
    }
}

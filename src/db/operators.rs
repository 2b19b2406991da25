/*!
The operator table.

An operator is a (name, class) pair mapped to a priority and an associativity specifier.
The class --- prefix, infix, or postfix --- follows from the specifier, and a name may carry one operator of each class at once (`-` is both infix and prefix, for example).

Priorities run 1 to 1200, with *higher* values binding *looser*: `a , b :- c` reads as `(a , b) :- c` because `:-` at 1200 sits above `,` at 1000.
In a specifier, `f` marks the position of the functor, `x` an argument of strictly lower priority, and `y` an argument of equal or lower priority.
So `xfy` is right-associative, `yfx` left-associative, and `xfx` non-associative.

The table is mutable through `op/3`: a directive takes effect for every term read after it, and a priority of 0 removes the named operator of the given class.
*/

use std::collections::HashMap;
use std::rc::Rc;

/// An associativity specifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpSpec {
    FX,
    FY,
    XF,
    YF,
    XFX,
    XFY,
    YFX,
}

/// The general class of an operator: where its arguments sit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OpClass {
    Prefix,
    Infix,
    Postfix,
}

impl OpSpec {
    /// The class the specifier belongs to.
    pub fn class(self) -> OpClass {
        match self {
            OpSpec::FX | OpSpec::FY => OpClass::Prefix,
            OpSpec::XFX | OpSpec::XFY | OpSpec::YFX => OpClass::Infix,
            OpSpec::XF | OpSpec::YF => OpClass::Postfix,
        }
    }

    /// Reads a specifier from its atom name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fx" => Some(OpSpec::FX),
            "fy" => Some(OpSpec::FY),
            "xf" => Some(OpSpec::XF),
            "yf" => Some(OpSpec::YF),
            "xfx" => Some(OpSpec::XFX),
            "xfy" => Some(OpSpec::XFY),
            "yfx" => Some(OpSpec::YFX),
            _ => None,
        }
    }

    /// The atom name of the specifier.
    pub fn name(self) -> &'static str {
        match self {
            OpSpec::FX => "fx",
            OpSpec::FY => "fy",
            OpSpec::XF => "xf",
            OpSpec::YF => "yf",
            OpSpec::XFX => "xfx",
            OpSpec::XFY => "xfy",
            OpSpec::YFX => "yfx",
        }
    }
}

/// A priority and specifier, the value of a table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operator {
    pub priority: u16,
    pub spec: OpSpec,
}

/// The operator table.
#[derive(Clone, Debug)]
pub struct OperatorTable {
    entries: HashMap<(Rc<str>, OpClass), Operator>,
}

impl OperatorTable {
    /// An empty table.
    pub fn empty() -> Self {
        OperatorTable {
            entries: HashMap::default(),
        }
    }

    /// Inserts an operator, replacing any operator of the same name and class.
    ///
    /// Priority 0 removes instead.
    pub fn insert(&mut self, priority: u16, spec: OpSpec, name: impl AsRef<str>) {
        let key = (Rc::from(name.as_ref()), spec.class());
        match priority {
            0 => {
                self.entries.remove(&key);
            }
            _ => {
                self.entries.insert(key, Operator { priority, spec });
            }
        }
    }

    /// The entry for a name in a class, if any.
    pub fn lookup(&self, name: &str, class: OpClass) -> Option<Operator> {
        self.entries.get(&(Rc::from(name), class)).copied()
    }

    /// The prefix operator of a name, if any.
    pub fn prefix(&self, name: &str) -> Option<Operator> {
        self.lookup(name, OpClass::Prefix)
    }

    /// The infix operator of a name, if any.
    pub fn infix(&self, name: &str) -> Option<Operator> {
        self.lookup(name, OpClass::Infix)
    }

    /// The postfix operator of a name, if any.
    pub fn postfix(&self, name: &str) -> Option<Operator> {
        self.lookup(name, OpClass::Postfix)
    }

    /// True when the name carries an operator of any class.
    pub fn is_operator(&self, name: &str) -> bool {
        self.prefix(name).is_some() || self.infix(name).is_some() || self.postfix(name).is_some()
    }

    /// An iterator over (priority, spec, name) triples, for `current_op/3`.
    pub fn iter(&self) -> impl Iterator<Item = (u16, OpSpec, &str)> {
        self.entries
            .iter()
            .map(|((name, _), op)| (op.priority, op.spec, name.as_ref()))
    }
}

impl Default for OperatorTable {
    /// The core table: the ISO operators plus the directive prefixes.
    fn default() -> Self {
        let mut table = OperatorTable::empty();

        for (priority, spec, names) in [
            (1200, OpSpec::XFX, vec![":-", "-->"]),
            (1200, OpSpec::FX, vec![":-", "?-"]),
            (
                1150,
                OpSpec::FX,
                vec!["dynamic", "discontiguous", "initialization", "multifile"],
            ),
            (1100, OpSpec::XFY, vec![";", "|"]),
            (1050, OpSpec::XFY, vec!["->", "*->"]),
            (1000, OpSpec::XFY, vec![","]),
            (900, OpSpec::FY, vec!["\\+"]),
            (
                700,
                OpSpec::XFX,
                vec![
                    "=", "\\=", "==", "\\==", "@<", "@>", "@=<", "@>=", "=..", "is", "=:=", "=\\=",
                    "<", ">", "=<", ">=",
                ],
            ),
            (500, OpSpec::YFX, vec!["+", "-", "/\\", "\\/", "xor"]),
            (400, OpSpec::YFX, vec!["*", "/", "//", "mod", "rem", "div", "<<", ">>"]),
            (200, OpSpec::XFX, vec!["**"]),
            (200, OpSpec::XFY, vec!["^"]),
            (200, OpSpec::FY, vec!["-", "+", "\\"]),
            (100, OpSpec::YFX, vec!["."]),
            (1, OpSpec::FX, vec!["$"]),
        ] {
            for name in names {
                table.insert(priority, spec, name);
            }
        }

        table
    }
}

#[cfg(test)]
mod operator_tests {
    use super::*;

    #[test]
    fn classes_are_independent() {
        let table = OperatorTable::default();

        let prefix_minus = table.prefix("-").expect("prefix -");
        let infix_minus = table.infix("-").expect("infix -");

        assert_eq!(prefix_minus.priority, 200);
        assert_eq!(infix_minus.priority, 500);
    }

    #[test]
    fn priority_zero_removes() {
        let mut table = OperatorTable::default();
        assert!(table.infix("+").is_some());

        table.insert(0, OpSpec::YFX, "+");
        assert!(table.infix("+").is_none());
        assert!(table.prefix("+").is_some());
    }

    #[test]
    fn user_operators_take_effect() {
        let mut table = OperatorTable::default();
        assert!(table.infix("===").is_none());

        table.insert(700, OpSpec::XFX, "===");
        let op = table.infix("===").expect("inserted");
        assert_eq!((op.priority, op.spec), (700, OpSpec::XFX));
    }
}

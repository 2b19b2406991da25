/*!
Configuration of a context.

All configuration for a context is contained within the context.
Options are fixed at construction and read throughout a query; none require mid-query revision.
*/

mod config_option;
pub use config_option::ConfigOption;

/// How double-quoted strings read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DoubleQuotes {
    /// As lists of character codes (the default).
    Codes,

    /// As lists of one-character atoms.
    Chars,
}

/// The primary configuration structure.
#[derive(Clone)]
pub struct Config {
    /// The permitted depth of predicate-call frames before a query is abandoned with a resource error.
    ///
    /// Each frame of the resolver occupies a sliver of host stack while a solution is pulled, so the maximum is set well inside the default host stack.
    pub depth_limit: ConfigOption<usize>,

    /// Whether unification checks that a variable does not occur in the term it binds to.
    ///
    /// `unify_with_occurs_check/2` checks regardless.
    pub occurs_check: ConfigOption<bool>,

    /// How double-quoted strings read.
    pub double_quotes: ConfigOption<DoubleQuotes>,

    /// The seed for the context's random source.
    pub rng_seed: ConfigOption<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            depth_limit: ConfigOption {
                name: "depth_limit",
                min: 16,
                max: 1 << 14,
                value: 4096,
            },

            occurs_check: ConfigOption {
                name: "occurs_check",
                min: false,
                max: true,
                value: false,
            },

            double_quotes: ConfigOption {
                name: "double_quotes",
                min: DoubleQuotes::Codes,
                max: DoubleQuotes::Chars,
                value: if cfg!(feature = "chars") {
                    DoubleQuotes::Chars
                } else {
                    DoubleQuotes::Codes
                },
            },

            rng_seed: ConfigOption {
                name: "seed",
                min: u64::MIN,
                max: u64::MAX,
                value: 0,
            },
        }
    }
}

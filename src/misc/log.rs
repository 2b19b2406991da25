/*!
Miscellaneous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information for extending the library and/or fixing issues.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [the resolver](crate::procedures::solve).
    pub const SOLVE: &str = "solve";

    /// Logs related to [the reader](crate::reader).
    pub const READER: &str = "reader";

    /// Logs related to [the clause database](crate::db::clause).
    pub const CLAUSE_DB: &str = "clause_db";

    /// Logs related to [consulting](crate::builder): directives, conditional compilation, initialization.
    pub const BUILDER: &str = "builder";

    /// Logs related to [built-in](crate::builtins) dispatch.
    pub const BUILTIN: &str = "builtin";
}

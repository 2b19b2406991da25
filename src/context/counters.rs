/// Counts for various things which count, roughly.
#[derive(Debug, Default)]
pub struct Counters {
    /// A count of every predicate-call frame entered.
    pub reductions: usize,

    /// The deepest predicate-call frame seen.
    pub deepest_frame: usize,

    /// A count of clauses loaded by consulting.
    pub clauses_consulted: usize,

    /// A count of top-level queries started.
    pub queries: usize,
}

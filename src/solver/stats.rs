//! Solve statistics: propagation passes, technique firings, and search depth.

use std::collections::BTreeMap;

use prettytable::{Cell as TableCell, Row, Table};

/// Counters accumulated over one solve, including every search branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// How many propagation passes have run.
    pub passes: u64,
    /// How many times each named technique fired.
    pub techniques: BTreeMap<&'static str, u64>,
    /// The pass count when search first engaged, if it did.
    pub first_passes: Option<u64>,
    /// How many search-tree entries were explored.
    pub plies: u64,
}

impl SolveStats {
    pub fn record(&mut self, name: &'static str) {
        *self.techniques.entry(name).or_default() += 1;
    }

    pub fn count(&self, name: &str) -> u64 {
        self.techniques.get(name).copied().unwrap_or(0)
    }

    pub fn used(&self, name: &str) -> bool {
        self.count(name) > 0
    }
}

/// Renders the technique counters as a table, busiest first.
pub fn render_stats_table(stats: &SolveStats) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        TableCell::new("Technique"),
        TableCell::new("Firings"),
    ]));

    let mut sorted: Vec<(&&str, &u64)> = stats.techniques.iter().collect();
    sorted.sort_by_key(|(name, count)| (std::cmp::Reverse(**count), **name));

    for (name, count) in sorted {
        table.add_row(Row::new(vec![
            TableCell::new(name),
            TableCell::new(&count.to_string()),
        ]));
    }

    table.to_string()
}

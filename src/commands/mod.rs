pub mod check;
pub mod split;

use crate::chapters::DEFAULT_PREFIX;
use crate::cli::RangeSource;
use crate::table::RangeTable;
use anyhow::{Context, Result};

/// Load the range table named on the command line
pub fn load_table(source: &RangeSource) -> Result<RangeTable> {
    match (&source.ranges, &source.table) {
        (Some(ranges), _) => RangeTable::from_inline(ranges).context("Failed to parse --ranges"),
        (None, Some(path)) => RangeTable::load(path)
            .with_context(|| format!("Failed to load range table: {}", path.display())),
        (None, None) => anyhow::bail!("No chapter ranges specified"),
    }
}

/// The command-line prefix wins over the table's
pub fn pick_prefix(cli_prefix: Option<String>, table: &RangeTable) -> String {
    cli_prefix
        .or_else(|| table.prefix.clone())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

//! Tangle file loading
//!
//! Reads the plain-text tangle format into a [`TangleStore`]:
//!
//! ```text
//! 2          <- number of non-genesis transactions
//! 1 1 10     <- left parent, right parent, timestamp of transaction #2
//! 1 2 20     <- ... of transaction #3
//! ```

use anyhow::{bail, Context, Result};
use ledgerstats_tangle::{NodeId, TangleStore};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse tangle text into a fully loaded store.
pub fn parse_tangle(contents: &str) -> Result<TangleStore> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = match lines.next() {
        Some(first) => first,
        None => bail!("File is empty"),
    };

    let transactions: i64 = header
        .parse()
        .with_context(|| format!("Line {}: invalid transaction count {:?}", header_line, header))?;

    let mut store = TangleStore::for_transactions(transactions)
        .with_context(|| format!("Line {}: cannot size tangle", header_line))?;

    let mut node = NodeId::FIRST_TRANSACTION.index() as i64;
    for (line_no, line) in lines {
        let (left, right, timestamp) =
            parse_record(line).with_context(|| format!("Line {}: malformed record", line_no))?;

        store
            .add_edge(node, left, right, timestamp)
            .with_context(|| format!("Line {}: cannot add transaction {}", line_no, node))?;
        node += 1;
    }

    let loaded = node - NodeId::FIRST_TRANSACTION.index() as i64;
    if loaded != transactions {
        debug!(declared = transactions, loaded, "record count differs from header");
    }

    Ok(store)
}

/// Read and parse a tangle file.
pub fn load_tangle_file(path: &Path) -> Result<TangleStore> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tangle file: {}", path.display()))?;

    let store = parse_tangle(&contents)
        .with_context(|| format!("Failed to load tangle file: {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = store.total_nodes(),
        edges = store.total_edges(),
        "loaded tangle"
    );
    Ok(store)
}

/// Load a tangle file without computing statistics
pub fn validate_tangle_file(path: &Path) -> Result<()> {
    println!("Validating tangle: {}", path.display());

    let store = load_tangle_file(path)?;

    println!("Tangle loaded");
    println!("   Nodes: {}", store.total_nodes());
    println!("   Transactions: {}", store.records().count());
    println!("   Edges: {}", store.total_edges());

    Ok(())
}

fn parse_record(line: &str) -> Result<(i64, i64, u64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        bail!("expected 3 fields, found {}", fields.len());
    }

    let left = fields[0]
        .parse()
        .with_context(|| format!("invalid left parent {:?}", fields[0]))?;
    let right = fields[1]
        .parse()
        .with_context(|| format!("invalid right parent {:?}", fields[1]))?;
    let timestamp = fields[2]
        .parse()
        .with_context(|| format!("invalid timestamp {:?}", fields[2]))?;

    Ok((left, right, timestamp))
}

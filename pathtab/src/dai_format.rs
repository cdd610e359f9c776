//! Text output in the factor graph format of the downstream inference
//! engine.

use std::io::Write;

use itertools::Itertools;

use crate::factors::FactorAssembler;
use crate::{Factor, PathwayGraph, Result};

/// One line per node, `<prefix><id>\t<entity>\t<subtype>`, in identifier
/// order.
pub fn write_node_map<W: Write>(graph: &PathwayGraph, to: &mut W, prefix: &str) -> Result<()> {
    for (id, node) in graph.nodes().enumerate() {
        writeln!(to, "{prefix}{id}\t{}\t{}", node.entity, node.subtype)?;
    }
    Ok(())
}

/// Factor count, then for every factor a blank line, the variable count,
/// the variable ids, their dimensions and the table entries.
pub fn write_factor_section<W: Write>(factors: &[Factor], to: &mut W) -> Result<()> {
    writeln!(to, "{}", factors.len())?;
    for factor in factors {
        writeln!(to)?;
        writeln!(to, "{}", factor.vars.len())?;
        writeln!(to, "{}", factor.vars.iter().map(|v| v.label).join(" "))?;
        writeln!(to, "{}", factor.vars.iter().map(|v| v.dim).join(" "))?;
        writeln!(to, "{}", factor.values.len())?;
        for (i, value) in factor.values.iter().enumerate() {
            writeln!(to, "{i}\t{value:.6}")?;
        }
    }
    Ok(())
}

impl PathwayGraph {
    pub fn write_node_map<W: Write>(&self, to: &mut W, prefix: &str) -> Result<()> {
        write_node_map(self, to, prefix)
    }

    /// Assemble the factors and write them. Nothing is written if assembly
    /// fails.
    pub fn write_factor_graph<W: Write>(&self, to: &mut W) -> Result<()> {
        let factors = FactorAssembler::new(self).factors()?;
        write_factor_section(&factors, to)
    }

    pub fn to_fg_string(&self) -> Result<String> {
        let mut out = Vec::new();
        self.write_factor_graph(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

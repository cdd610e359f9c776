use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use itertools::Itertools;
use ndarray::{ArrayD, IxDyn, ShapeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::{EdgeType, Node, Parents, PathwayGraph, Var};
use crate::{PathwayError, Result, VARIABLE_DIMENSION};

/// One EM step: required incoming edge types for each child subtype whose
/// factors share parameters.
pub type EmStep = IndexMap<String, BTreeSet<EdgeType>>;
pub type EmSteps = Vec<EmStep>;
/// Variables of each grouped factor (child first, then one parent per
/// required edge type), by factor index.
pub type FactorOrientations = BTreeMap<usize, Vec<Var>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    // child is first, sorted parents come next
    pub vars: Vec<Var>,
    pub values: Vec<f64>,
}

impl Factor {
    /// `None` for a factor without variables.
    pub fn child(&self) -> Option<Var> {
        self.vars.first().copied()
    }

    pub fn parents(&self) -> &[Var] {
        self.vars.split_first().map(|(_, parents)| parents).unwrap_or_default()
    }

    /// Table with one axis per parent, in order, followed by the child axis.
    pub fn table(&self) -> std::result::Result<ArrayD<f64>, ShapeError> {
        let shape = self
            .parents()
            .iter()
            .chain(self.vars.first())
            .map(|v| v.dim)
            .collect_vec();
        ArrayD::from_shape_vec(IxDyn(&shape), self.values.clone())
    }
}

/// Configuration given to the external parameter estimation constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationConfig {
    pub method: String,
    pub total_dim: usize,
    pub target_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedParameters {
    pub orientations: FactorOrientations,
    pub estimation: EstimationConfig,
    pub multiplicity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaximizationStep {
    /// Index of the EM step this was built from.
    pub step: usize,
    pub shared: Vec<SharedParameters>,
}

/// Non-fatal findings of factor assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    UnmatchedSpec {
        step: usize,
        subtype: String,
        edge_types: BTreeSet<EdgeType>,
    },
    EmptyStep {
        step: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnmatchedSpec {
                step,
                subtype,
                edge_types,
            } => write!(
                f,
                "em_step {step}: did not find any variables of sub-type '{subtype}' with incoming edges matching: {}",
                edge_types.iter().join(", ")
            ),
            Diagnostic::EmptyStep { step } => {
                write!(f, "em_step number {step} had no matching nodes in the pathway")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSet {
    pub factors: Vec<Factor>,
    pub msteps: Vec<MaximizationStep>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
struct SpecGroup {
    orientations: FactorOrientations,
    total_dim: usize,
}

/// Builds the factors of a finished pathway graph and sorts them into
/// parameter sharing groups.
pub struct FactorAssembler<'a> {
    graph: &'a PathwayGraph,
}

impl<'a> FactorAssembler<'a> {
    pub fn new(graph: &'a PathwayGraph) -> Self {
        Self { graph }
    }

    /// Factors of every node with parents, in node order.
    pub fn factors(&self) -> Result<Vec<Factor>> {
        Ok(self.construct(&[])?.factors)
    }

    pub fn construct(&self, em_steps: &[EmStep]) -> Result<FactorSet> {
        let mut groups = em_steps
            .iter()
            .map(|specs| vec![SpecGroup::default(); specs.len()])
            .collect_vec();
        let mut factors = Vec::new();
        for (child_id, child, parents) in self.graph.children() {
            let (factor, edge_types) = self.build_factor(child_id, child, parents)?;
            let factor_id = factors.len();
            for (specs, step_groups) in em_steps.iter().zip(groups.iter_mut()) {
                for ((subtype, required), group) in specs.iter().zip(step_groups.iter_mut()) {
                    if let Some(o) = orientation(child, &factor, &edge_types, subtype, required) {
                        group.orientations.insert(factor_id, o);
                        group.total_dim = factor.values.len();
                    }
                }
            }
            factors.push(factor);
        }
        debug!(factors = factors.len(), "factors built");

        let mut msteps = Vec::new();
        let mut diagnostics = Vec::new();
        for (step, (specs, step_groups)) in em_steps.iter().zip(groups).enumerate() {
            let mut shared = Vec::new();
            for ((subtype, required), group) in specs.iter().zip(step_groups) {
                if group.orientations.is_empty() {
                    let diag = Diagnostic::UnmatchedSpec {
                        step,
                        subtype: subtype.clone(),
                        edge_types: required.clone(),
                    };
                    warn!("{diag}");
                    diagnostics.push(diag);
                    continue;
                }
                shared.push(SharedParameters {
                    orientations: group.orientations,
                    estimation: EstimationConfig {
                        method: self.graph.config().estimation_method().to_owned(),
                        total_dim: group.total_dim,
                        target_dim: VARIABLE_DIMENSION,
                    },
                    multiplicity: 1,
                });
            }
            if shared.is_empty() {
                let diag = Diagnostic::EmptyStep { step };
                warn!("{diag}");
                diagnostics.push(diag);
            } else {
                msteps.push(MaximizationStep { step, shared });
            }
        }
        Ok(FactorSet {
            factors,
            msteps,
            diagnostics,
        })
    }

    fn build_factor(
        &self,
        child_id: usize,
        child: &Node,
        parents: &Parents,
    ) -> Result<(Factor, Vec<EdgeType>)> {
        let mut vars = Vec::with_capacity(parents.len() + 1);
        vars.push(Var::new(child_id));
        let mut edge_types = Vec::with_capacity(parents.len());
        // Parents iterate in node order.
        for (parent, edge_type) in parents {
            let parent_id = self.graph.node_id(parent).ok_or_else(|| {
                PathwayError::InternalConsistency(format!(
                    "parent {parent} of {child} is not a registered node"
                ))
            })?;
            vars.push(Var::new(parent_id));
            edge_types.push(edge_type.clone());
        }
        let total_dim = u32::try_from(vars.len())
            .ok()
            .and_then(|n| VARIABLE_DIMENSION.checked_pow(n))
            .ok_or_else(|| {
                PathwayError::InternalConsistency(format!(
                    "factor of {child} has too many parents ({})",
                    parents.len()
                ))
            })?;
        let entity_type = self.graph.entity_type(&child.entity).unwrap_or_default();
        let values = self
            .graph
            .generators()
            .lookup(entity_type, &child.subtype)
            .generate_values(&edge_types);
        if values.len() != total_dim {
            return Err(PathwayError::InternalConsistency(format!(
                "factor of {child}: expected {total_dim} table values, got {}",
                values.len()
            )));
        }
        Ok((Factor { vars, values }, edge_types))
    }
}

/// Variables of `factor` ordered for the parameter sharing spec
/// (`subtype`, `required`), if the factor matches it.
fn orientation(
    child: &Node,
    factor: &Factor,
    edge_types: &[EdgeType],
    subtype: &str,
    required: &BTreeSet<EdgeType>,
) -> Option<Vec<Var>> {
    let edge_set: BTreeSet<&EdgeType> = edge_types.iter().collect();
    if child.subtype != subtype
        || edge_set.len() != edge_types.len()
        || !edge_set.iter().copied().eq(required.iter())
    {
        return None;
    }
    let mut o = Vec::with_capacity(required.len() + 1);
    o.push(factor.child()?);
    for edge_type in required {
        let pos = edge_types.iter().position(|e| e == edge_type)?;
        o.push(*factor.parents().get(pos)?);
    }
    Some(o)
}

impl PathwayGraph {
    /// Assemble factors and parameter sharing groups for `em_steps`.
    pub fn construct_factors(&self, em_steps: &[EmStep]) -> Result<FactorSet> {
        FactorAssembler::new(self).construct(em_steps)
    }
}

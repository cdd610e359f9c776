//! Synthesis of conditional probability tables from incoming edge
//! polarities.

use std::collections::HashMap;

use crate::graph::EdgeType;
use crate::{PathwayError, Result, NEGATIVE, VARIABLE_DIMENSION};

const DOWN: usize = 0;
const UP: usize = VARIABLE_DIMENSION - 1;

/// Computes the conditional probability table of a child given the types of
/// its incoming edges, in parent order.
///
/// The returned table holds `VARIABLE_DIMENSION.pow(edge_types.len() + 1)`
/// values: one block of child-state probabilities per parent state
/// combination, combinations enumerated with the last parent varying fastest.
pub trait FactorGenerator {
    fn generate_values(&self, edge_types: &[EdgeType]) -> Vec<f64>;
}

/// Counter over all digit vectors of a fixed mixed radix, the last digit
/// being the least significant.
#[derive(Debug, Clone)]
pub struct MixedRadix {
    radices: Vec<usize>,
    digits: Vec<usize>,
    valid: bool,
}

impl MixedRadix {
    pub fn new(radices: Vec<usize>) -> Self {
        let valid = radices.iter().all(|r| *r > 0);
        Self {
            digits: vec![0; radices.len()],
            radices,
            valid,
        }
    }

    /// Number of digit vectors enumerated, `None` on overflow.
    pub fn combinations(&self) -> Option<usize> {
        self.radices
            .iter()
            .try_fold(1usize, |acc, r| acc.checked_mul(*r))
    }
}

impl Iterator for MixedRadix {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.valid {
            return None;
        }
        let current = self.digits.clone();
        self.valid = false;
        for (digit, radix) in self.digits.iter_mut().zip(self.radices.iter()).rev() {
            *digit += 1;
            if *digit < *radix {
                self.valid = true;
                break;
            }
            *digit = 0;
        }
        Some(current)
    }
}

/// Expected child state from the votes cast by the parents. Down votes win
/// ties.
fn count_votes_repressor_dominates(down: usize, up: usize) -> usize {
    if up > 0 && up > down {
        UP
    } else if down > 0 && down >= up {
        DOWN
    } else {
        VARIABLE_DIMENSION / 2
    }
}

/// Default generator: each parent votes for the state it is in, inverted
/// through negative edges, and the child takes the winning state with
/// probability `1 - epsilon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepressorDominatesVote {
    epsilon: f64,
}

impl RepressorDominatesVote {
    /// `epsilon` must lie strictly between 0 and 1.
    pub fn new(epsilon: f64) -> Result<Self> {
        if epsilon > 0.0 && epsilon < 1.0 {
            Ok(Self { epsilon })
        } else {
            Err(PathwayError::InvalidEpsilon(epsilon))
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl FactorGenerator for RepressorDominatesVote {
    fn generate_values(&self, edge_types: &[EdgeType]) -> Vec<f64> {
        let minor = self.epsilon / 2.0;
        let major = 1.0 - self.epsilon;
        let states = MixedRadix::new(vec![VARIABLE_DIMENSION; edge_types.len()]);
        let mut values =
            Vec::with_capacity(states.combinations().unwrap_or(0).saturating_mul(VARIABLE_DIMENSION));
        for parent_states in states {
            let mut votes = [0usize; VARIABLE_DIMENSION];
            for (state, edge_type) in parent_states.iter().zip(edge_types) {
                if edge_type == NEGATIVE {
                    votes[VARIABLE_DIMENSION - 1 - state] += 1;
                } else {
                    votes[*state] += 1;
                }
            }
            let expected = count_votes_repressor_dominates(votes[DOWN], votes[UP]);
            values.extend((0..VARIABLE_DIMENSION).map(|s| if s == expected { major } else { minor }));
        }
        values
    }
}

/// Factor generators by (entity type, node subtype) of the child, with a
/// fallback used when no override matches exactly.
pub struct GeneratorRegistry {
    default: Box<dyn FactorGenerator>,
    overrides: HashMap<String, HashMap<String, Box<dyn FactorGenerator>>>,
}

impl GeneratorRegistry {
    pub fn new(default: Box<dyn FactorGenerator>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        entity_type: &str,
        node_subtype: &str,
        generator: Box<dyn FactorGenerator>,
    ) {
        self.overrides
            .entry(entity_type.to_owned())
            .or_default()
            .insert(node_subtype.to_owned(), generator);
    }

    pub fn lookup(&self, entity_type: &str, node_subtype: &str) -> &dyn FactorGenerator {
        self.overrides
            .get(entity_type)
            .and_then(|by_subtype| by_subtype.get(node_subtype))
            .map_or(&*self.default, |g| &**g)
    }
}

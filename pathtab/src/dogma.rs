use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::lines::{self, Stream};
use crate::Result;

const DEFAULT_STEPS: [(&str, &str, &str); 3] = [
    ("genome", "mRNA", "-dt>"),
    ("mRNA", "protein", "-dr>"),
    ("protein", "active", "-dp>"),
];

/// Template of the expression cascade applied to every multi-stage entity.
///
/// Only the set of states and the set of step labels are retained: the
/// direction of each step is given by its entry in the interaction map.
/// Both sets iterate in lexicographic order, which fixes the order in which
/// an expanded entity's nodes receive their identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralDogma {
    states: BTreeSet<String>,
    steps: BTreeSet<String>,
}

impl CentralDogma {
    pub fn new() -> Self {
        Self::default()
    }

    /// genome -> mRNA -> protein -> active.
    pub fn builtin() -> Self {
        let mut dogma = Self::new();
        for (from, to, step) in DEFAULT_STEPS {
            dogma.add_step(from, to, step);
        }
        dogma
    }

    /// Parse lines of `from_state to_state step_label`.
    pub fn parse(src: &str) -> Result<Self> {
        let mut dogma = Self::new();
        for line in lines::tokenize(src, Stream::CentralDogma)? {
            match line.fields.as_slice() {
                [from, to, step] => dogma.add_step(from, to, step),
                _ => return Err(line.malformed(Stream::CentralDogma, "3")),
            }
        }
        Ok(dogma)
    }

    pub fn read<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::parse(&crate::read_to_string(reader)?)
    }

    pub fn add_step(&mut self, from_state: &str, to_state: &str, step: &str) {
        self.states.insert(from_state.to_owned());
        self.states.insert(to_state.to_owned());
        self.steps.insert(step.to_owned());
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(String::as_str)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

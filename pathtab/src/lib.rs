//! Translation of signaling pathway descriptions into discrete Bayesian
//! network factor graphs.
//!
//! A pathway lists entities and typed interactions between them. Entities of
//! the multi-stage type (`protein`) are expanded through a central dogma
//! template into a chain of nodes (genome, mRNA, protein, active). Every
//! node with incoming edges becomes a factor whose conditional probability
//! table is synthesized from the polarities of its incoming edges.

pub mod dai_format;
pub mod dogma;
pub mod factor_gen;
pub mod factors;
pub mod graph;
pub mod interaction;
mod lines;

pub use dogma::CentralDogma;
pub use factor_gen::{FactorGenerator, GeneratorRegistry, MixedRadix, RepressorDominatesVote};
pub use factors::{
    Diagnostic, EmStep, EmSteps, EstimationConfig, Factor, FactorAssembler, FactorOrientations,
    FactorSet, MaximizationStep, SharedParameters,
};
pub use graph::{EdgeType, Node, NodeId, Parents, PathwayGraph, Var};
pub use interaction::{Interaction, InteractionMap};
pub use lines::Stream;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of states of every variable: down, neutral, up.
pub const VARIABLE_DIMENSION: usize = 3;
/// Entity type expanded through the central dogma.
pub const MULTI_STAGE_TYPE: &str = "protein";
/// The only subtype of single-stage entities.
pub const ACTIVE_SUBTYPE: &str = "active";
/// Edge label linking a hidden node to its observation node.
pub const OBSERVATION_INTERACTION: &str = "-obs>";
pub const POSITIVE: &str = "positive";
pub const NEGATIVE: &str = "negative";

pub const DEFAULT_ESTIMATION_METHOD: &str = "ConditionalProbEstimation";

type NamedList<T> = indexmap::IndexMap<String, T>;

pub type Result<T> = std::result::Result<T, PathwayError>;

#[derive(Error, Debug)]
pub enum PathwayError {
    #[error("Malformed {stream} line {line}: expected {expected} fields, found {found}.")]
    MalformedInput {
        stream: Stream,
        line: usize,
        expected: &'static str,
        found: usize,
    },
    #[error("Could not tokenize {stream}:\n{report}")]
    Parse { stream: Stream, report: String },
    #[error("Unrecognized interaction type '{0}'.")]
    UnknownInteraction(String),
    #[error("Off-peak probability mass {0} is outside (0, 1).")]
    InvalidEpsilon(f64),
    #[error("Node {0} already exists.")]
    DuplicateNode(Node),
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Probability mass spread over the non-expected child states.
    epsilon: f64,
    /// Type given to entities that are referenced by an interaction without
    /// being declared.
    #[serde(default = "default_entity_type")]
    default_entity_type: String,
    /// Strategy name handed to the external parameter estimation constructor.
    #[serde(default = "default_estimation_method")]
    estimation_method: String,
}

fn default_entity_type() -> String {
    MULTI_STAGE_TYPE.to_owned()
}

fn default_estimation_method() -> String {
    DEFAULT_ESTIMATION_METHOD.to_owned()
}

impl Config {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            default_entity_type: default_entity_type(),
            estimation_method: default_estimation_method(),
        }
    }
    pub fn with_default_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.default_entity_type = entity_type.into();
        self
    }
    pub fn with_estimation_method(mut self, method: impl Into<String>) -> Self {
        self.estimation_method = method.into();
        self
    }
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
    pub fn default_entity_type(&self) -> &str {
        &self.default_entity_type
    }
    pub fn estimation_method(&self) -> &str {
        &self.estimation_method
    }
}

/// Build a pathway graph from the textual pathway, interaction map and
/// central dogma descriptions.
pub fn build_graph(
    pathway: &str,
    interaction_map: &str,
    dogma: &str,
    config: Config,
) -> Result<PathwayGraph> {
    let imap = InteractionMap::parse(interaction_map)?;
    let dogma = CentralDogma::parse(dogma)?;
    PathwayGraph::from_descriptions(pathway, imap, dogma, config)
}

/// Read a whole input stream, for callers holding files or sockets rather
/// than strings.
pub fn read_to_string<R: std::io::Read>(mut reader: R) -> Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf)
}

use std::collections::BTreeMap;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dogma::CentralDogma;
use crate::factor_gen::{FactorGenerator, GeneratorRegistry, RepressorDominatesVote};
use crate::interaction::InteractionMap;
use crate::lines::{self, Stream};
use crate::{
    Config, NamedList, PathwayError, Result, ACTIVE_SUBTYPE, MULTI_STAGE_TYPE,
    OBSERVATION_INTERACTION, VARIABLE_DIMENSION,
};

pub type NodeId = usize;
/// Label of an edge: an interaction polarity or the observation label.
pub type EdgeType = String;

/// One random variable: an entity in a given stage.
///
/// Ordering is by entity name, then subtype.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node {
    pub entity: String,
    pub subtype: String,
}

impl Node {
    pub fn new(entity: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            subtype: subtype.into(),
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.entity, self.subtype)
    }
}

/// Variable handed to the inference engine: node identifier and number of
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Var {
    pub label: NodeId,
    pub dim: usize,
}

impl Var {
    pub fn new(label: NodeId) -> Self {
        Self {
            label,
            dim: VARIABLE_DIMENSION,
        }
    }
}

/// Parents of a node with the label of the edge from each.
pub type Parents = BTreeMap<Node, EdgeType>;

pub struct PathwayGraph {
    // Insertion order gives the node identifiers. Every node has an entry,
    // possibly without parents.
    nodes: IndexMap<Node, Parents>,
    entities: NamedList<String>,
    imap: InteractionMap,
    dogma: CentralDogma,
    generators: GeneratorRegistry,
    config: Config,
}

impl PathwayGraph {
    /// Fails if the configured epsilon is not a valid off-peak mass.
    pub fn new(imap: InteractionMap, dogma: CentralDogma, config: Config) -> Result<Self> {
        let default_generator = RepressorDominatesVote::new(config.epsilon())?;
        Ok(Self {
            nodes: IndexMap::new(),
            entities: NamedList::new(),
            imap,
            dogma,
            generators: GeneratorRegistry::new(Box::new(default_generator)),
            config,
        })
    }

    /// Build the graph from a pathway description.
    ///
    /// Entity declarations (`type name`) are all applied before interactions
    /// (`from to label`), so interactions may reference entities declared
    /// further down.
    pub fn from_descriptions(
        pathway: &str,
        imap: InteractionMap,
        dogma: CentralDogma,
        config: Config,
    ) -> Result<Self> {
        let mut graph = Self::new(imap, dogma, config)?;
        let lines = lines::tokenize(pathway, Stream::Pathway)?;
        let mut entity_lines = Vec::new();
        let mut interaction_lines = Vec::new();
        for line in &lines {
            match line.fields.as_slice() {
                [entity_type, entity] => entity_lines.push((entity, entity_type)),
                [from, to, label] => interaction_lines.push((from, to, label)),
                _ => return Err(line.malformed(Stream::Pathway, "2 or 3")),
            }
        }
        for (entity, entity_type) in entity_lines {
            graph.add_entity(entity, entity_type)?;
        }
        for (from, to, label) in interaction_lines {
            graph.add_interaction(from, to, label)?;
        }
        debug!(
            entities = graph.entities.len(),
            nodes = graph.nodes.len(),
            edges = graph.edge_count(),
            "pathway graph built"
        );
        Ok(graph)
    }

    /// Register an entity. Nothing happens if the entity is already known:
    /// the type given at first registration is kept.
    pub fn add_entity(&mut self, entity: &str, entity_type: &str) -> Result<()> {
        if self.entities.contains_key(entity) {
            return Ok(());
        }
        if entity_type == MULTI_STAGE_TYPE {
            // All steps must be known before anything is registered.
            if let Some(step) = self.dogma.steps().find(|s| !self.imap.contains(s)) {
                return Err(PathwayError::UnknownInteraction(step.to_owned()));
            }
            self.entities
                .insert(entity.to_owned(), entity_type.to_owned());
            self.add_gene_dogma(entity)
        } else {
            self.entities
                .insert(entity.to_owned(), entity_type.to_owned());
            self.add_node(Node::new(entity, ACTIVE_SUBTYPE));
            Ok(())
        }
    }

    fn add_gene_dogma(&mut self, entity: &str) -> Result<()> {
        let states = self.dogma.states().map(str::to_owned).collect_vec();
        let steps = self.dogma.steps().map(str::to_owned).collect_vec();
        for state in states {
            self.add_node(Node::new(entity, state));
        }
        for step in steps {
            self.add_interaction(entity, entity, &step)?;
        }
        Ok(())
    }

    /// Add an edge for an interaction between two entities. Undeclared
    /// entities are registered with the configured default type.
    ///
    /// An interaction whose endpoints resolve to the same node is dropped.
    pub fn add_interaction(&mut self, from: &str, to: &str, label: &str) -> Result<()> {
        let interaction = self
            .imap
            .get(label)
            .cloned()
            .ok_or_else(|| PathwayError::UnknownInteraction(label.to_owned()))?;
        let default_type = self.config.default_entity_type().to_owned();
        self.add_entity(from, &default_type)?;
        self.add_entity(to, &default_type)?;
        let node_from = self.resolve_entity_node(from, &interaction.from_subtype);
        let node_to = self.resolve_entity_node(to, &interaction.to_subtype);
        if node_from == node_to {
            debug!(node = %node_from, label, "dropping self interaction");
            return Ok(());
        }
        self.add_node(node_from.clone());
        self.add_node(node_to.clone());
        self.add_edge(node_from, node_to, interaction.polarity);
        Ok(())
    }

    /// Add an observed node `(entity, obs_subtype)` as child of the hidden
    /// node of `entity` for `on_subtype`, and return its variable.
    ///
    /// The observed node must be new: an existing node, such as a dogma
    /// stage, is never turned into an observation.
    pub fn add_observation_node(
        &mut self,
        entity: &str,
        on_subtype: &str,
        obs_subtype: &str,
    ) -> Result<Var> {
        let default_type = self.config.default_entity_type().to_owned();
        self.add_entity(entity, &default_type)?;
        let obs_node = Node::new(entity, obs_subtype);
        if self.nodes.contains_key(&obs_node) {
            return Err(PathwayError::DuplicateNode(obs_node));
        }
        let obs_id = self.add_node(obs_node.clone());
        let hidden_node = self.resolve_entity_node(entity, on_subtype);
        self.add_node(hidden_node.clone());
        self.add_edge(hidden_node, obs_node, OBSERVATION_INTERACTION.to_owned());
        Ok(Var::new(obs_id))
    }

    /// Node standing for `entity` in stage `subtype`. Single-stage entities
    /// only have their `active` node.
    pub fn resolve_entity_node(&self, entity: &str, subtype: &str) -> Node {
        if self.entity_type(entity) == Some(MULTI_STAGE_TYPE) {
            Node::new(entity, subtype)
        } else {
            Node::new(entity, ACTIVE_SUBTYPE)
        }
    }

    /// Override the default factor generator for children of the given
    /// entity type and subtype.
    pub fn add_factor_generator(
        &mut self,
        entity_type: &str,
        node_subtype: &str,
        generator: Box<dyn FactorGenerator>,
    ) {
        self.generators.register(entity_type, node_subtype, generator);
    }

    fn add_node(&mut self, node: Node) -> NodeId {
        match self.nodes.get_index_of(&node) {
            Some(id) => id,
            None => self.nodes.insert_full(node, Parents::new()).0,
        }
    }

    // Self loops are never stored. Re-adding an edge replaces its label.
    fn add_edge(&mut self, from: Node, to: Node, label: EdgeType) {
        if from == to {
            return;
        }
        if let Some(parents) = self.nodes.get_mut(&to) {
            parents.insert(from, label);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(BTreeMap::len).sum()
    }

    pub fn node_id(&self, node: &Node) -> Option<NodeId> {
        self.nodes.get_index_of(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get_index(id).map(|(n, _)| n)
    }

    /// Nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.keys()
    }

    pub fn parents(&self, node: &Node) -> Option<&Parents> {
        self.nodes.get(node)
    }

    pub fn entity_type(&self, entity: &str) -> Option<&str> {
        self.entities.get(entity).map(String::as_str)
    }

    pub fn interaction_map(&self) -> &InteractionMap {
        &self.imap
    }

    pub fn dogma(&self) -> &CentralDogma {
        &self.dogma
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Nodes having at least one parent, sorted by node, with their
    /// identifier.
    pub(crate) fn children(&self) -> Vec<(NodeId, &Node, &Parents)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, (_, parents))| !parents.is_empty())
            .map(|(id, (node, parents))| (id, node, parents))
            .sorted_by(|a, b| a.1.cmp(b.1))
            .collect()
    }

    /// Entity name of every `active` node, by node identifier.
    pub fn output_node_map(&self) -> BTreeMap<NodeId, String> {
        self.nodes
            .keys()
            .enumerate()
            .filter(|(_, n)| n.subtype == ACTIVE_SUBTYPE)
            .map(|(id, n)| (id, n.entity.clone()))
            .collect()
    }
}

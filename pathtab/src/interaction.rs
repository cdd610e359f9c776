use serde::{Deserialize, Serialize};

use crate::graph::EdgeType;
use crate::lines::{self, Stream};
use crate::{NamedList, Result};

/// Interactions known without an explicit map: (label, from, to, polarity).
const DEFAULT_INTERACTIONS: [(&str, &str, &str, &str); 13] = [
    ("-dt>", "genome", "mRNA", "positive"),
    ("-dr>", "mRNA", "protein", "positive"),
    ("-dp>", "protein", "active", "positive"),
    ("-t>", "active", "mRNA", "positive"),
    ("-t|", "active", "mRNA", "negative"),
    ("-a>", "active", "active", "positive"),
    ("-a|", "active", "active", "negative"),
    ("-ap>", "active", "active", "positive"),
    ("-ap|", "active", "active", "negative"),
    ("->", "active", "active", "positive"),
    ("-|", "active", "active", "negative"),
    ("<->", "active", "active", "positive"),
    ("component>", "active", "active", "positive"),
];

/// Subtypes of the two endpoints of an interaction and the polarity of the
/// resulting edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub from_subtype: String,
    pub to_subtype: String,
    pub polarity: EdgeType,
}

impl Interaction {
    pub fn new(
        from_subtype: impl Into<String>,
        to_subtype: impl Into<String>,
        polarity: impl Into<EdgeType>,
    ) -> Self {
        Self {
            from_subtype: from_subtype.into(),
            to_subtype: to_subtype.into(),
            polarity: polarity.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionMap {
    interactions: NamedList<Interaction>,
}

impl InteractionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard interaction vocabulary, including the three central dogma
    /// steps.
    pub fn builtin() -> Self {
        let mut imap = Self::new();
        for (label, from, to, polarity) in DEFAULT_INTERACTIONS {
            imap.insert(label, Interaction::new(from, to, polarity));
        }
        imap
    }

    /// Parse lines of `label from_subtype to_subtype polarity`. A label
    /// defined twice keeps its last definition.
    pub fn parse(src: &str) -> Result<Self> {
        let mut imap = Self::new();
        for line in lines::tokenize(src, Stream::InteractionMap)? {
            match line.fields.as_slice() {
                [label, from, to, polarity] => {
                    imap.insert(label.clone(), Interaction::new(from, to, polarity))
                }
                _ => return Err(line.malformed(Stream::InteractionMap, "4")),
            }
        }
        Ok(imap)
    }

    pub fn read<R: std::io::Read>(reader: R) -> Result<Self> {
        Self::parse(&crate::read_to_string(reader)?)
    }

    pub fn insert(&mut self, label: impl Into<String>, interaction: Interaction) {
        self.interactions.insert(label.into(), interaction);
    }

    pub fn get(&self, label: &str) -> Option<&Interaction> {
        self.interactions.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.interactions.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Interaction)> {
        self.interactions.iter().map(|(l, i)| (l.as_str(), i))
    }
}

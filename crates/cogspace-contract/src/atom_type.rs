//! Atom type tags.
//!
//! Node and link kinds are separate closed enums so that a node can never be
//! created with a link tag (and vice versa). `AtomType` joins them for the
//! type index and the debug format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Concept,
    Predicate,
    Variable,
    Number,
    Schema,
}

/// Link kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LinkType {
    Inheritance,
    Implication,
    Similarity,
    Evaluation,
    List,
    And,
    Or,
    Not,
    Member,
    Execution,
}

/// Either kind of atom type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AtomType {
    Node(NodeType),
    Link(LinkType),
}

impl NodeType {
    pub const ALL: &'static [NodeType] = &[
        NodeType::Concept,
        NodeType::Predicate,
        NodeType::Variable,
        NodeType::Number,
        NodeType::Schema,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Concept => "ConceptNode",
            NodeType::Predicate => "PredicateNode",
            NodeType::Variable => "VariableNode",
            NodeType::Number => "NumberNode",
            NodeType::Schema => "SchemaNode",
        }
    }
}

impl LinkType {
    pub const ALL: &'static [LinkType] = &[
        LinkType::Inheritance,
        LinkType::Implication,
        LinkType::Similarity,
        LinkType::Evaluation,
        LinkType::List,
        LinkType::And,
        LinkType::Or,
        LinkType::Not,
        LinkType::Member,
        LinkType::Execution,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LinkType::Inheritance => "InheritanceLink",
            LinkType::Implication => "ImplicationLink",
            LinkType::Similarity => "SimilarityLink",
            LinkType::Evaluation => "EvaluationLink",
            LinkType::List => "ListLink",
            LinkType::And => "AndLink",
            LinkType::Or => "OrLink",
            LinkType::Not => "NotLink",
            LinkType::Member => "MemberLink",
            LinkType::Execution => "ExecutionLink",
        }
    }

    /// Logical connectives evaluated by the conjunction/disjunction/negation rules.
    pub fn is_connective(self) -> bool {
        matches!(self, LinkType::And | LinkType::Or | LinkType::Not)
    }

    /// Ordered links read as `first → second` by the chaining rules.
    pub fn is_directed(self) -> bool {
        matches!(self, LinkType::Implication | LinkType::Inheritance)
    }
}

impl AtomType {
    pub fn is_node(self) -> bool {
        matches!(self, AtomType::Node(_))
    }

    pub fn is_link(self) -> bool {
        matches!(self, AtomType::Link(_))
    }

    pub fn name(self) -> &'static str {
        match self {
            AtomType::Node(t) => t.name(),
            AtomType::Link(t) => t.name(),
        }
    }

    /// Parse the name produced by [`AtomType::name`].
    pub fn from_name(name: &str) -> Option<AtomType> {
        NodeType::ALL
            .iter()
            .find(|t| t.name() == name)
            .map(|&t| AtomType::Node(t))
            .or_else(|| {
                LinkType::ALL
                    .iter()
                    .find(|t| t.name() == name)
                    .map(|&t| AtomType::Link(t))
            })
    }
}

impl From<NodeType> for AtomType {
    fn from(t: NodeType) -> Self {
        AtomType::Node(t)
    }
}

impl From<LinkType> for AtomType {
    fn from(t: LinkType) -> Self {
        AtomType::Link(t)
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

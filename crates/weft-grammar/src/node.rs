//! Node table and per-node side table.

use indexmap::IndexMap;
use weft_core::NodeId;

/// Role a node was declared in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wrapping {
    /// The node spans a whole match.
    Full,
    /// The node is opened by a region's begin match.
    Begin,
    /// The node is closed by a region's end match.
    End,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub autocomplete: Option<String>,
    pub wrapping: Wrapping,
}

/// Auxiliary data about a node, for hosts building their own tree format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeProps {
    /// Repository entry the node was first declared in.
    pub source: Option<String>,
    /// Embedded language marker of the region the node belongs to.
    pub embedded: Option<String>,
    pub autocomplete: Option<String>,
}

/// Dense node storage indexed by [`NodeId`].
#[derive(Clone, Debug)]
pub struct NodeTable {
    nodes: Vec<Node>,
    props: Vec<NodeProps>,
    by_name: IndexMap<String, NodeId>,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTable {
    /// Table holding only the reserved nodes.
    pub fn new() -> Self {
        let mut table = Self {
            nodes: Vec::new(),
            props: Vec::new(),
            by_name: IndexMap::new(),
        };
        for id in [NodeId::ERROR, NodeId::INCOMPLETE, NodeId::DOCUMENT] {
            let name = id.reserved_name().unwrap_or_default();
            table.insert(name, Wrapping::Full);
        }
        table
    }

    /// Returns the id of `name`, declaring it on first use.
    pub fn intern(&mut self, name: &str, wrapping: Wrapping) -> NodeId {
        match self.by_name.get(name) {
            Some(&id) => id,
            None => self.insert(name, wrapping),
        }
    }

    fn insert(&mut self, name: &str, wrapping: Wrapping) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.to_owned(),
            autocomplete: None,
            wrapping,
        });
        self.props.push(NodeProps::default());
        self.by_name.insert(name.to_owned(), id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.get(id).map_or("?", |node| node.name.as_str())
    }

    pub fn props(&self, id: NodeId) -> Option<&NodeProps> {
        self.props.get(id.index())
    }

    pub(crate) fn props_mut(&mut self, id: NodeId) -> &mut NodeProps {
        &mut self.props[id.index()]
    }

    pub(crate) fn set_autocomplete(&mut self, id: NodeId, tag: String) {
        self.nodes[id.index()].autocomplete = Some(tag.clone());
        self.props[id.index()].autocomplete = Some(tag);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

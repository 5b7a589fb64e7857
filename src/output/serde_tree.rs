use crate::dom::{NodeData, NodeId, Tree};
use crate::error::Result;
use crate::select::Elements;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A copy of the nodes in an [`Elements`] that implements [`Serialize`].
///
/// Each node becomes either `{"element": {"tag": ..., "attributes": {...}, "children": [...]}}` or `{"text": "..."}`.
/// Attributes keep their document order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SerializableNodes {
    nodes: Vec<SerdeNode>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SerdeNode {
    Element {
        tag: String,
        #[serde(skip_serializing_if = "SerdeAttributes::is_empty")]
        attributes: SerdeAttributes,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<SerdeNode>,
    },
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SerdeAttributes(Vec<(String, String)>);

impl SerdeAttributes {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SerdeAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl SerializableNodes {
    pub fn new(elements: &Elements) -> Result<Self> {
        let tree = elements.document().tree();
        let nodes = elements
            .ids()
            .iter()
            .map(|&id| SerdeNode::build(&tree, id))
            .collect::<Result<Vec<_>>>();
        Ok(Self { nodes: nodes? })
    }
}

impl SerdeNode {
    fn build(tree: &Tree, id: NodeId) -> Result<Self> {
        Ok(match tree.data(id)? {
            NodeData::Text(text) => Self::Text(text.clone()),
            NodeData::Element(elem) => Self::Element {
                tag: elem.tag().to_string(),
                attributes: SerdeAttributes(
                    elem.attributes()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                ),
                children: tree
                    .children(id)?
                    .iter()
                    .map(|&child| Self::build(tree, child))
                    .collect::<Result<Vec<_>>>()?,
            },
        })
    }
}

use core_types::HostKey;

/// Owned, plain-data copy of an attached host subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum HostNode {
    Element {
        #[cfg_attr(feature = "serde", serde(skip))]
        key: HostKey,
        name: String,
        attributes: Vec<(String, String)>,
        listeners: Vec<String>,
        children: Vec<HostNode>,
    },
    Text {
        #[cfg_attr(feature = "serde", serde(skip))]
        key: HostKey,
        text: String,
    },
}

impl HostNode {
    pub fn key(&self) -> HostKey {
        match self {
            HostNode::Element { key, .. } | HostNode::Text { key, .. } => *key,
        }
    }

    pub fn children(&self) -> &[HostNode] {
        match self {
            HostNode::Element { children, .. } => children,
            HostNode::Text { .. } => &[],
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            HostNode::Element { name, .. } => Some(name),
            HostNode::Text { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            HostNode::Text { text, .. } => Some(text),
            HostNode::Element { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            HostNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            HostNode::Text { .. } => None,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(HostNode::count).sum::<usize>()
    }
}

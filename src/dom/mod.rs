//! In-memory document model for chat transcript pages.
//!
//! The engine runs against a snapshot of the page DOM rather than a live
//! browser tree. Nodes live in an arena owned by [`Document`] and are
//! addressed by [`NodeId`]; preorder traversal over the arena defines
//! "document order" for every search the locator performs. The only
//! mutation the engine ever does (highlight span insertion/removal) goes
//! through the write API here, which keeps untouched node ids stable.

pub mod parser;
pub mod selector;
pub mod xpath;

pub use parser::parse;

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The arena index, for serializing a node reference across a host
    /// boundary (message responses, scroll commands).
    pub fn index(self) -> usize {
        self.0
    }

    /// Rebuilds a handle from a serialized arena index. The caller is
    /// responsible for pairing it with the document it came from.
    pub fn from_index(index: usize) -> Self {
        NodeId(index)
    }
}

/// Payload of a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// The document root; exactly one per document.
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An HTML document held as an id-indexed arena.
///
/// Detached nodes (created but not yet inserted, or removed) stay in the
/// arena; they are simply unreachable from the root. That keeps every
/// previously handed-out `NodeId` valid for the document's lifetime.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Creates an empty document containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena (attached or not). Valid ids are
    /// strictly below this.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    // --- construction ---

    /// Creates a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Inserts `child` at `index` among `parent`'s children (clamped to the
    /// end), detaching it from any previous parent first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Removes a node from its parent. The node (and its subtree) stays in
    /// the arena but becomes unreachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            let children = &mut self.node_mut(parent).children;
            children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Replaces an attached node with a run of nodes at the same position.
    /// Used by the highlighter to split a text node into
    /// (before, span, after) and to merge it back.
    pub fn replace_with(&mut self, target: NodeId, replacements: &[NodeId]) {
        let Some(parent) = self.node(target).parent else {
            return;
        };
        let index = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == target)
            .unwrap_or(0);
        self.detach(target);
        for (offset, &id) in replacements.iter().enumerate() {
            self.insert_child(parent, index + offset, id);
        }
    }

    // --- inspection ---

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    /// Lowercased tag name for element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Text payload for text nodes.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: &str) {
        if let NodeData::Text(text) = &mut self.node_mut(id).data {
            *text = value.to_string();
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            attrs.retain(|(n, _)| n != name);
        }
    }

    /// Whether an element's `class` attribute contains the given token.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|v| v.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Whether a node is reachable from the document root. Detached nodes
    /// (removed or never inserted) stay in the arena but are not attached.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            cur = parent;
        }
        cur == self.root()
    }

    /// Walks up from `id` checking whether `ancestor` is on the parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.parent(id);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    // --- traversal ---

    /// All nodes under `id` in preorder (document order), excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.node(n).children.iter().rev().copied());
        }
        out
    }

    /// Element descendants of `id` in document order.
    pub fn elements_under(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    /// Text-node descendants of `id` in document order.
    pub fn text_nodes_under(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_text(n))
            .collect()
    }

    /// Concatenated text of all text nodes under `id` (or the node's own
    /// text if `id` is a text node), in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for n in self.descendants(id) {
            if let NodeData::Text(text) = &self.node(n).data {
                out.push_str(text);
            }
        }
        out
    }

    /// The `<body>` element, or the root when the document has none.
    pub fn body(&self) -> NodeId {
        self.elements_under(self.root())
            .into_iter()
            .find(|&n| self.tag(n) == Some("body"))
            .unwrap_or_else(|| self.root())
    }

    /// The `<head>` element, if present.
    pub fn head(&self) -> Option<NodeId> {
        self.elements_under(self.root())
            .into_iter()
            .find(|&n| self.tag(n) == Some("head"))
    }

    /// Nearest element at or above `id` (itself when it is an element).
    pub fn nearest_element(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.is_element(n) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// 1-based position of an element among its parent's element children
    /// sharing the same tag. Used by generated structural locators.
    pub fn same_tag_index(&self, id: NodeId) -> usize {
        let Some(tag) = self.tag(id) else { return 1 };
        let Some(parent) = self.parent(id) else {
            return 1;
        };
        let mut index = 0;
        for &sibling in self.children(parent) {
            if self.tag(sibling) == Some(tag) {
                index += 1;
                if sibling == id {
                    return index;
                }
            }
        }
        1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

//! Succinct trie encoded as a Level-Order Unary Degree Sequence.
//!
//! A trie over byte keys is stored as three flat arrays: the LOUDS bit
//! array (one `1` per child followed by a `0`, per node in breadth-first
//! order, preceded by the super-root group `10`), a terminal bitmap and
//! one edge label per node. Navigation is derived from rank/select on
//! the bit arrays; no pointers are stored.
//!
//! Node ids are 0-based level-order positions (the root is 0). Key ids
//! are the dense rank of a terminal node among all terminal nodes and
//! index the parallel value tables of a dictionary.
//!
//! Image layout (all integers little-endian `u32`):
//!
//! ```text
//! [louds bytes][terminal bytes][edge width = 8][edge bytes]
//! [louds bits][terminal bits][edge labels]
//! ```

mod builder;
mod key_expansion;
mod search;

pub use builder::LoudsTrieBuilder;
pub use key_expansion::KeyExpansionTable;
pub use search::{Children, CommonPrefixSearch, PredictiveMatch, PredictiveSearch, SearchControl};

use crate::bit_stream::BitStreamError;
use crate::bit_vector::BitVectorIndex;

pub(crate) const HEADER_SIZE: usize = 16;
pub(crate) const EDGE_WIDTH_BITS: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum LoudsError {
    #[error("LOUDS image is truncated")]
    Truncated,

    #[error("unsupported edge label width: {0} bits (expected 8)")]
    UnsupportedEdgeWidth(u32),

    #[error("LOUDS image has an empty edge table")]
    EmptyEdgeTable,

    #[error("LOUDS image is inconsistent: {0}")]
    Inconsistent(&'static str),

    #[error("bit stream error: {0}")]
    Stream(#[from] BitStreamError),
}

/// Level-order position of a trie node. The root is `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A terminal node reached while walking a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch {
    pub node: NodeId,
    pub key_id: u32,
    /// Number of query bytes consumed.
    pub len: usize,
}

/// Read-only view over a LOUDS image. Cheap to share across threads; the
/// image must outlive the view.
#[derive(Debug, Clone)]
pub struct LoudsTrie<'a> {
    louds: BitVectorIndex<'a>,
    terminal: BitVectorIndex<'a>,
    edges: &'a [u8],
}

fn read_u32(image: &[u8], offset: usize) -> Result<usize, LoudsError> {
    image
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
        .ok_or(LoudsError::Truncated)
}

impl<'a> LoudsTrie<'a> {
    /// Open a view over an image produced by `LoudsTrieBuilder`.
    pub fn open(image: &'a [u8]) -> Result<Self, LoudsError> {
        let louds_size = read_u32(image, 0)?;
        let terminal_size = read_u32(image, 4)?;
        let edge_width = read_u32(image, 8)? as u32;
        let edge_size = read_u32(image, 12)?;
        if edge_width != EDGE_WIDTH_BITS {
            return Err(LoudsError::UnsupportedEdgeWidth(edge_width));
        }
        if edge_size == 0 {
            return Err(LoudsError::EmptyEdgeTable);
        }

        let louds_start = HEADER_SIZE;
        let terminal_start = louds_start + louds_size;
        let edge_start = terminal_start + terminal_size;
        let end = edge_start + edge_size;
        if image.len() < end {
            return Err(LoudsError::Truncated);
        }

        let louds = BitVectorIndex::new(&image[louds_start..terminal_start]);
        let terminal = BitVectorIndex::new(&image[terminal_start..edge_start]);
        let edges = &image[edge_start..end];

        // One `1` for the super-root edge plus one per non-root node.
        if louds.num_ones() != edges.len() {
            return Err(LoudsError::Inconsistent("edge count differs from LOUDS one-bits"));
        }
        if terminal.len() < edges.len() {
            return Err(LoudsError::Inconsistent("terminal bitmap shorter than node count"));
        }

        Ok(Self {
            louds,
            terminal,
            edges,
        })
    }

    /// Total number of nodes, including the root.
    pub fn num_nodes(&self) -> usize {
        self.edges.len()
    }

    /// Number of stored keys (terminal nodes).
    pub fn num_keys(&self) -> usize {
        self.terminal.num_ones()
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        node.index() < self.num_nodes() && self.terminal.get(node.index())
    }

    /// Label of the edge into `node`. The root carries a placeholder label.
    pub fn label(&self, node: NodeId) -> Option<u8> {
        self.edges.get(node.index()).copied()
    }

    /// Dense key id of a terminal node.
    pub fn key_id(&self, node: NodeId) -> Option<u32> {
        self.is_terminal(node)
            .then(|| self.terminal.rank1(node.index()) as u32)
    }

    /// Terminal node holding the given key id.
    pub fn node_of_key_id(&self, key_id: u32) -> Option<NodeId> {
        self.terminal
            .select1(key_id as usize)
            .filter(|&pos| pos < self.num_nodes())
            .map(|pos| NodeId(pos as u32))
    }

    /// Children of `node` in ascending label order.
    pub fn children(&self, node: NodeId) -> Children<'_, 'a> {
        let bit = self.first_child_bit(node);
        Children::new(self, bit)
    }

    /// Child of `node` reached through `label`.
    pub fn child(&self, node: NodeId, label: u8) -> Option<NodeId> {
        for child in self.children(node) {
            let child_label = self.edges[child.index()];
            if child_label == label {
                return Some(child);
            }
            if child_label > label {
                break;
            }
        }
        None
    }

    /// Parent of `node`, or `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if node == NodeId::ROOT || node.index() >= self.num_nodes() {
            return None;
        }
        let edge_bit = self.louds.select1(node.index())?;
        // Zeros before the edge bit count the super-root group as well.
        let parent = self.louds.rank0(edge_bit).checked_sub(1)?;
        Some(NodeId(parent as u32))
    }

    /// Node reached by consuming every byte of `key`, if it is terminal.
    pub fn exact_match(&self, key: &[u8]) -> Option<NodeId> {
        let node = self.traverse(key)?;
        self.is_terminal(node).then_some(node)
    }

    /// Node reached by consuming every byte of `key`, terminal or not.
    pub fn traverse(&self, key: &[u8]) -> Option<NodeId> {
        key.iter()
            .try_fold(NodeId::ROOT, |node, &label| self.child(node, label))
    }

    /// Every terminal node on the path spelled by `key`, shortest first.
    pub fn common_prefix_search<'t, 'k>(&'t self, key: &'k [u8]) -> CommonPrefixSearch<'t, 'a, 'k> {
        CommonPrefixSearch::new(self, key)
    }

    /// Every key that starts with `prefix`, depth-first in label order.
    pub fn predictive_search(&self, prefix: &[u8]) -> PredictiveSearch<'_, 'a> {
        PredictiveSearch::new(self, prefix)
    }

    /// Rebuild the key bytes of `node` by walking parent links to the root.
    ///
    /// A parent always precedes its child in level order; a link that does
    /// not move towards the root means a corrupt image and yields `None`.
    pub fn reverse_lookup(&self, node: NodeId) -> Option<Vec<u8>> {
        if node.index() >= self.num_nodes() {
            return None;
        }
        let mut key = Vec::new();
        let mut current = node;
        while current != NodeId::ROOT {
            key.push(self.edges[current.index()]);
            let parent = self.parent(current)?;
            if parent >= current {
                return None;
            }
            current = parent;
        }
        key.reverse();
        Some(key)
    }

    pub fn reverse_lookup_key_id(&self, key_id: u32) -> Option<Vec<u8>> {
        self.reverse_lookup(self.node_of_key_id(key_id)?)
    }

    /// Bit index of the first child edge of `node`. Past the end of the
    /// array for out-of-range nodes, which reads as "no children".
    fn first_child_bit(&self, node: NodeId) -> usize {
        self.louds
            .select0(node.index())
            .map_or(self.louds.len(), |pos| pos + 1)
    }

    pub(crate) fn louds(&self) -> &BitVectorIndex<'a> {
        &self.louds
    }

    pub(crate) fn edges(&self) -> &'a [u8] {
        self.edges
    }
}

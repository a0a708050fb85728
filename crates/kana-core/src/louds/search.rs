use super::{KeyExpansionTable, LoudsTrie, NodeId, PrefixMatch};

/// Visitor verdict for callback-driven searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    /// Keep searching, including below the reported node.
    Continue,
    /// Skip the subtree below the reported node, continue with its siblings.
    Cull,
    /// Stop the whole search.
    Done,
}

/// Iterator over the children of one node.
///
/// Children of a node occupy consecutive one-bits and consecutive node ids,
/// so only the first id needs a rank query.
#[derive(Debug, Clone)]
pub struct Children<'t, 'a> {
    trie: &'t LoudsTrie<'a>,
    bit: usize,
    next_id: Option<usize>,
}

impl<'t, 'a> Children<'t, 'a> {
    pub(super) fn new(trie: &'t LoudsTrie<'a>, bit: usize) -> Self {
        Self {
            trie,
            bit,
            next_id: None,
        }
    }
}

impl Iterator for Children<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let louds = self.trie.louds();
        if !louds.get(self.bit) {
            return None;
        }
        let id = match self.next_id {
            Some(id) => id,
            None => louds.rank1(self.bit),
        };
        self.bit += 1;
        self.next_id = Some(id + 1);
        Some(NodeId(id as u32))
    }
}

/// Terminal nodes along the path spelled by a query, in increasing length.
/// Each call to `common_prefix_search` starts a fresh walk from the root.
#[derive(Debug, Clone)]
pub struct CommonPrefixSearch<'t, 'a, 'k> {
    trie: &'t LoudsTrie<'a>,
    key: &'k [u8],
    node: NodeId,
    depth: usize,
}

impl<'t, 'a, 'k> CommonPrefixSearch<'t, 'a, 'k> {
    pub(super) fn new(trie: &'t LoudsTrie<'a>, key: &'k [u8]) -> Self {
        Self {
            trie,
            key,
            node: NodeId::ROOT,
            depth: 0,
        }
    }
}

impl Iterator for CommonPrefixSearch<'_, '_, '_> {
    type Item = PrefixMatch;

    fn next(&mut self) -> Option<PrefixMatch> {
        while self.depth < self.key.len() {
            let Some(child) = self.trie.child(self.node, self.key[self.depth]) else {
                self.depth = self.key.len();
                return None;
            };
            self.node = child;
            self.depth += 1;
            if let Some(key_id) = self.trie.key_id(child) {
                return Some(PrefixMatch {
                    node: child,
                    key_id,
                    len: self.depth,
                });
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictiveMatch {
    pub key: Vec<u8>,
    pub node: NodeId,
    pub key_id: u32,
}

/// Depth-first walk of the subtree below a prefix, children in label order.
#[derive(Debug, Clone)]
pub struct PredictiveSearch<'t, 'a> {
    trie: &'t LoudsTrie<'a>,
    /// `(node, key length at node)`; the start node is pushed with the prefix length.
    stack: Vec<(NodeId, usize)>,
    buffer: Vec<u8>,
    prefix_len: usize,
}

impl<'t, 'a> PredictiveSearch<'t, 'a> {
    pub(super) fn new(trie: &'t LoudsTrie<'a>, prefix: &[u8]) -> Self {
        let stack = match trie.traverse(prefix) {
            Some(node) => vec![(node, prefix.len())],
            None => Vec::new(),
        };
        Self {
            trie,
            stack,
            buffer: prefix.to_vec(),
            prefix_len: prefix.len(),
        }
    }
}

impl Iterator for PredictiveSearch<'_, '_> {
    type Item = PredictiveMatch;

    fn next(&mut self) -> Option<PredictiveMatch> {
        while let Some((node, depth)) = self.stack.pop() {
            if depth > self.prefix_len {
                self.buffer.truncate(depth - 1);
                self.buffer.push(self.trie.edges()[node.index()]);
            } else {
                self.buffer.truncate(depth);
            }

            let first = self.stack.len();
            self.stack
                .extend(self.trie.children(node).map(|c| (c, depth + 1)));
            self.stack[first..].reverse();

            if let Some(key_id) = self.trie.key_id(node) {
                return Some(PredictiveMatch {
                    key: self.buffer.clone(),
                    node,
                    key_id,
                });
            }
        }
        None
    }
}

impl LoudsTrie<'_> {
    /// Prefix search where each query byte may match any label the table
    /// expands it to. `visit` receives the matched key bytes.
    pub fn prefix_search_with_key_expansion<F>(
        &self,
        key: &[u8],
        table: &KeyExpansionTable,
        mut visit: F,
    ) where
        F: FnMut(&[u8], PrefixMatch) -> SearchControl,
    {
        let mut buffer = Vec::with_capacity(key.len());
        self.expanded_prefix(key, table, NodeId::ROOT, &mut buffer, &mut visit);
    }

    /// Returns true once the visitor asked to stop.
    fn expanded_prefix<F>(
        &self,
        key: &[u8],
        table: &KeyExpansionTable,
        node: NodeId,
        buffer: &mut Vec<u8>,
        visit: &mut F,
    ) -> bool
    where
        F: FnMut(&[u8], PrefixMatch) -> SearchControl,
    {
        let depth = buffer.len();
        let Some(&key_byte) = key.get(depth) else {
            return false;
        };

        for child in self.children(node) {
            let label = self.edges()[child.index()];
            if !table.is_hit(key_byte, label) {
                continue;
            }
            buffer.push(label);
            if let Some(key_id) = self.key_id(child) {
                let hit = PrefixMatch {
                    node: child,
                    key_id,
                    len: depth + 1,
                };
                match visit(buffer.as_slice(), hit) {
                    SearchControl::Continue => {}
                    SearchControl::Cull => {
                        buffer.pop();
                        continue;
                    }
                    SearchControl::Done => return true,
                }
            }
            if self.expanded_prefix(key, table, child, buffer, visit) {
                return true;
            }
            buffer.pop();
        }
        false
    }

    /// Predictive search where each prefix byte may match any label the
    /// table expands it to. Keys are reported depth-first in label order.
    pub fn predictive_search_with_key_expansion<F>(
        &self,
        prefix: &[u8],
        table: &KeyExpansionTable,
        mut visit: F,
    ) where
        F: FnMut(&[u8], PredictiveMatch) -> SearchControl,
    {
        let mut buffer = Vec::with_capacity(prefix.len() + 8);
        self.expanded_predictive(prefix, table, NodeId::ROOT, &mut buffer, &mut visit);
    }

    fn expanded_predictive<F>(
        &self,
        prefix: &[u8],
        table: &KeyExpansionTable,
        node: NodeId,
        buffer: &mut Vec<u8>,
        visit: &mut F,
    ) -> bool
    where
        F: FnMut(&[u8], PredictiveMatch) -> SearchControl,
    {
        let depth = buffer.len();
        if let Some(&key_byte) = prefix.get(depth) {
            for child in self.children(node) {
                let label = self.edges()[child.index()];
                if !table.is_hit(key_byte, label) {
                    continue;
                }
                buffer.push(label);
                let stop = self.expanded_predictive(prefix, table, child, buffer, visit);
                buffer.pop();
                if stop {
                    return true;
                }
            }
            return false;
        }
        self.visit_subtree(node, buffer, visit)
    }

    fn visit_subtree<F>(&self, node: NodeId, buffer: &mut Vec<u8>, visit: &mut F) -> bool
    where
        F: FnMut(&[u8], PredictiveMatch) -> SearchControl,
    {
        if let Some(key_id) = self.key_id(node) {
            let hit = PredictiveMatch {
                key: buffer.clone(),
                node,
                key_id,
            };
            match visit(buffer.as_slice(), hit) {
                SearchControl::Continue => {}
                SearchControl::Cull => return false,
                SearchControl::Done => return true,
            }
        }
        for child in self.children(node) {
            buffer.push(self.edges()[child.index()]);
            let stop = self.visit_subtree(child, buffer, visit);
            buffer.pop();
            if stop {
                return true;
            }
        }
        false
    }
}

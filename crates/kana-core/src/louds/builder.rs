use std::collections::VecDeque;

use tracing::{debug, debug_span};

use super::{LoudsError, EDGE_WIDTH_BITS, HEADER_SIZE};
use crate::bit_stream::BitStream;

/// Collects keys and emits a LOUDS image.
///
/// Nodes are never materialised: during the breadth-first walk a node is a
/// range of the sorted key list sharing a prefix of the node's depth.
#[derive(Debug, Default)]
pub struct LoudsTrieBuilder {
    keys: Vec<Vec<u8>>,
}

/// Keys `lo..hi` share their first `depth` bytes.
struct PendingNode {
    lo: usize,
    hi: usize,
    depth: usize,
}

impl LoudsTrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<Vec<u8>>) {
        self.keys.push(key.into());
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sort, deduplicate and encode the collected keys.
    pub fn build(mut self) -> Result<Vec<u8>, LoudsError> {
        self.keys.sort();
        self.keys.dedup();
        let keys = &self.keys;
        let _span = debug_span!("louds_build", keys = keys.len()).entered();

        let mut louds = BitStream::new();
        let mut terminal = BitStream::new();
        // Root label is a placeholder; node ids index this table directly.
        let mut edges: Vec<u8> = vec![0];

        // Super-root group.
        louds.push_bit(1)?;
        louds.push_bit(0)?;

        let mut queue = VecDeque::new();
        queue.push_back(PendingNode {
            lo: 0,
            hi: keys.len(),
            depth: 0,
        });

        while let Some(PendingNode { lo, hi, depth }) = queue.pop_front() {
            // Sorted and deduplicated: only the first key can end here.
            let is_terminal = lo < hi && keys[lo].len() == depth;
            terminal.push_bit(u8::from(is_terminal))?;

            let mut i = if is_terminal { lo + 1 } else { lo };
            while i < hi {
                let label = keys[i][depth];
                let start = i;
                while i < hi && keys[i][depth] == label {
                    i += 1;
                }
                louds.push_bit(1)?;
                edges.push(label);
                queue.push_back(PendingNode {
                    lo: start,
                    hi: i,
                    depth: depth + 1,
                });
            }
            louds.push_bit(0)?;
        }

        louds.fill_padding32();
        terminal.fill_padding32();

        let louds = louds.into_image();
        let terminal = terminal.into_image();

        let mut image =
            Vec::with_capacity(HEADER_SIZE + louds.len() + terminal.len() + edges.len());
        BitStream::push_int32(louds.len() as u64, &mut image)?;
        BitStream::push_int32(terminal.len() as u64, &mut image)?;
        BitStream::push_int32(EDGE_WIDTH_BITS as u64, &mut image)?;
        BitStream::push_int32(edges.len() as u64, &mut image)?;
        image.extend_from_slice(&louds);
        image.extend_from_slice(&terminal);
        image.extend_from_slice(&edges);

        debug!(
            node_count = edges.len(),
            louds_bytes = louds.len(),
            image_bytes = image.len()
        );
        Ok(image)
    }
}

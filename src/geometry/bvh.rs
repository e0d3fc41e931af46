// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) over mesh bounding boxes
//! Replaces the all-pairs broad-phase scan for large scenes

use super::BoundingBox;

/// BVH node
#[derive(Debug, Clone)]
pub struct BvhNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BvhNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BvhNode>>,
    /// Items with their own boxes (only for leaf nodes)
    pub items: Vec<(usize, BoundingBox)>,
}

impl BvhNode {
    fn leaf(bbox: BoundingBox, items: Vec<(usize, BoundingBox)>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            items,
        }
    }

    fn internal(left: Box<BvhNode>, right: Box<BvhNode>) -> Self {
        Self {
            bbox: left.bbox.union(&right.bbox),
            left: Some(left),
            right: Some(right),
            items: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy keyed by item bounding boxes.
///
/// Queries use the same inclusive overlap test as the all-pairs scan, so the
/// hierarchy never loses a pair that scan would report.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    boxes: Vec<(usize, BoundingBox)>,
}

impl Bvh {
    const MAX_DEPTH: usize = 32;
    const LEAF_SIZE: usize = 4;

    /// Build from `(item_index, bbox)` pairs
    pub fn build(items: Vec<(usize, BoundingBox)>) -> Self {
        let root = if items.is_empty() {
            None
        } else {
            Some(Self::build_recursive(items.clone(), 0))
        };
        Self { root, boxes: items }
    }

    fn build_recursive(mut items: Vec<(usize, BoundingBox)>, depth: usize) -> BvhNode {
        let bbox = Self::compute_union_bbox(&items);

        if items.len() <= Self::LEAF_SIZE || depth >= Self::MAX_DEPTH {
            return BvhNode::leaf(bbox, items);
        }

        // Split at the median along the longest axis
        let split_axis = bbox.longest_axis();
        items.sort_by(|(_, a), (_, b)| a.center()[split_axis].total_cmp(&b.center()[split_axis]));

        let right_items = items.split_off(items.len() / 2);
        let left = Box::new(Self::build_recursive(items, depth + 1));
        let right = Box::new(Self::build_recursive(right_items, depth + 1));

        BvhNode::internal(left, right)
    }

    /// `items` is never empty: `build` skips empty input and median splits
    /// of more than `LEAF_SIZE` items leave both halves populated.
    fn compute_union_bbox(items: &[(usize, BoundingBox)]) -> BoundingBox {
        items[1..]
            .iter()
            .fold(items[0].1, |acc, (_, bbox)| acc.union(bbox))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Item indices whose boxes overlap `bbox`
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        if let Some(root) = &self.root {
            Self::query_recursive(root, bbox, &mut result);
        }
        result
    }

    fn query_recursive(node: &BvhNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.overlaps(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend(
                node.items
                    .iter()
                    .filter(|(_, item_box)| item_box.overlaps(bbox))
                    .map(|(idx, _)| *idx),
            );
        } else {
            if let Some(ref left) = node.left {
                Self::query_recursive(left, bbox, result);
            }
            if let Some(ref right) = node.right {
                Self::query_recursive(right, bbox, result);
            }
        }
    }

    /// All unordered pairs `(i, j)`, `i < j`, whose boxes overlap, sorted.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .boxes
            .iter()
            .flat_map(|(i, bbox)| {
                let i = *i;
                self.query(bbox)
                    .into_iter()
                    .filter(move |&j| i < j)
                    .map(move |j| (i, j))
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    #[cfg(test)]
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }
}

//! Bounding Volume Hierarchy over tetrahedron boxes.
//!
//! Median split on the longest centroid axis. Only used for point
//! location, so nodes store nothing but boxes and tet indices. Leaves keep
//! each tet's own box so queries report exactly the boxes that contain the
//! point.

use amfilter_math::{Aabb3, Point3};

/// Maximum number of tetrahedra in a leaf.
const LEAF_SIZE: usize = 4;

/// A BVH node - either a leaf holding tetrahedra or an internal node with children.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing tet indices.
    Leaf {
        /// Bounding box of this node.
        aabb: Aabb3,
        /// Indices into the mesh connectivity, with each tet's box.
        tets: Vec<(usize, Aabb3)>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Bounding Volume Hierarchy for point-in-tetrahedron queries.
#[derive(Debug, Clone)]
pub struct TetBvh {
    root: Option<BvhNode>,
}

impl TetBvh {
    /// Build from one box per tetrahedron (index = tet id).
    pub fn build(boxes: &[Aabb3]) -> Self {
        let mut items: Vec<(usize, Aabb3, Point3)> = boxes
            .iter()
            .enumerate()
            .map(|(id, aabb)| (id, *aabb, aabb.center()))
            .collect();

        let root = if items.is_empty() {
            None
        } else {
            Some(build_node(&mut items))
        };

        Self { root }
    }

    /// Tet ids whose box contains `point`, in ascending order.
    pub fn candidates(&self, point: &Point3) -> Vec<usize> {
        let mut out = Vec::new();
        if let Some(ref root) = self.root {
            collect(root, point, &mut out);
        }
        out.sort_unstable();
        out
    }
}

fn collect(node: &BvhNode, point: &Point3, out: &mut Vec<usize>) {
    if !node.aabb().contains_point(point) {
        return;
    }
    match node {
        BvhNode::Leaf { tets, .. } => out.extend(
            tets.iter()
                .filter(|(_, aabb)| aabb.contains_point(point))
                .map(|(id, _)| *id),
        ),
        BvhNode::Internal { left, right, .. } => {
            collect(left, point, out);
            collect(right, point, out);
        }
    }
}

fn build_node(items: &mut [(usize, Aabb3, Point3)]) -> BvhNode {
    let mut aabb = Aabb3::empty();
    for (_, b, _) in items.iter() {
        aabb.merge(b);
    }

    if items.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb,
            tets: items.iter().map(|(id, b, _)| (*id, *b)).collect(),
        };
    }

    let centroids = Aabb3::from_points(items.iter().map(|(_, _, c)| c));
    let axis = centroids.longest_axis();
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| a.2[axis].total_cmp(&b.2[axis]));

    let (lo, hi) = items.split_at_mut(mid);
    BvhNode::Internal {
        aabb,
        left: Box::new(build_node(lo)),
        right: Box::new(build_node(hi)),
    }
}

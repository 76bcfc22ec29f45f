//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree is a flat arena: one `Vec` of nodes addressed by index, with the
//! root at index 0. Nodes are appended in pre-order, so every child sits at a
//! strictly greater index than its parent. The tree is built once per
//! geometry family and is immutable afterwards, so render threads share it
//! without locking.

use crate::{Hit, Primitive};
use glint_math::{Aabb, Ray};

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    /// Internal node; `left` and `right` index into the node arena.
    Branch {
        bbox: Aabb,
        left: usize,
        right: usize,
    },
    /// Leaf referring to one primitive of the family.
    Leaf { bbox: Aabb, primitive: usize },
}

impl BvhNode {
    /// Get the bounding box of this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }
}

/// A median-split BVH over one family of primitives.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Build a BVH over `primitives`. Returns `None` for an empty family.
    pub fn new<P: Primitive>(primitives: &[P]) -> Option<Self> {
        let boxes: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
        Self::from_boxes(&boxes)
    }

    /// Build a BVH from primitive bounding boxes; box `i` belongs to primitive `i`.
    pub fn from_boxes(boxes: &[Aabb]) -> Option<Self> {
        if boxes.is_empty() {
            return None;
        }

        let mut indices: Vec<usize> = (0..boxes.len()).collect();
        let mut nodes = Vec::with_capacity(2 * boxes.len() - 1);
        let root = Self::build(&mut nodes, 0, boxes, &mut indices);
        debug_assert_eq!(root, 0);

        Some(Self { nodes })
    }

    /// Recursive BVH construction.
    ///
    /// Sorts the range by box minimum on `axis`, splits it at the midpoint and
    /// recurses on each half with the next axis.
    fn build(nodes: &mut Vec<BvhNode>, axis: usize, boxes: &[Aabb], indices: &mut [usize]) -> usize {
        let node_index = nodes.len();

        if let [primitive] = *indices {
            nodes.push(BvhNode::Leaf {
                bbox: boxes[primitive],
                primitive,
            });
            return node_index;
        }

        // Reserve the slot so the parent precedes its children
        nodes.push(BvhNode::Leaf {
            bbox: Aabb::EMPTY,
            primitive: 0,
        });

        indices.sort_unstable_by(|&a, &b| boxes[a].axis_min(axis).total_cmp(&boxes[b].axis_min(axis)));

        let next_axis = (axis + 1) % 3;
        let (lower, upper) = indices.split_at_mut(indices.len() / 2);
        let left = Self::build(nodes, next_axis, boxes, lower);
        let right = Self::build(nodes, next_axis, boxes, upper);

        nodes[node_index] = BvhNode::Branch {
            bbox: nodes[left].bbox().union(&nodes[right].bbox()),
            left,
            right,
        };
        node_index
    }

    /// All nodes, root first.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Bounding box of the whole family.
    pub fn bounds(&self) -> Aabb {
        self.nodes[0].bbox()
    }

    /// Find the nearest primitive hit by `ray`.
    ///
    /// `primitives` must be the slice the BVH was built from.
    pub fn closest_hit<P: Primitive>(&self, ray: &Ray, primitives: &[P]) -> Option<Hit> {
        self.closest_hit_from(0, ray, primitives)
    }

    fn closest_hit_from<P: Primitive>(&self, node_index: usize, ray: &Ray, primitives: &[P]) -> Option<Hit> {
        let node = &self.nodes[node_index];
        if !node.bbox().hit(ray) {
            return None;
        }

        match *node {
            BvhNode::Leaf { primitive, .. } => primitives[primitive]
                .hit_distance(ray)
                .map(|distance| Hit {
                    index: primitive,
                    distance,
                }),
            BvhNode::Branch { left, right, .. } => nearer(
                self.closest_hit_from(left, ray, primitives),
                self.closest_hit_from(right, ray, primitives),
            ),
        }
    }
}

/// Pick the strictly nearer of two child results.
///
/// Two equal distances, finite or not, count as a miss. Exact ties between
/// distinct primitives have measure zero, so the quirk is left as is.
fn nearer(left: Option<Hit>, right: Option<Hit>) -> Option<Hit> {
    let left_distance = left.map_or(f64::INFINITY, |hit| hit.distance);
    let right_distance = right.map_or(f64::INFINITY, |hit| hit.distance);

    if left_distance < right_distance {
        left
    } else if right_distance < left_distance {
        right
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sphere, Triangle};
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vec(rng: &mut StdRng, extent: f64) -> Vec3 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    fn random_spheres(rng: &mut StdRng, count: usize) -> Vec<Sphere> {
        (0..count)
            .map(|_| Sphere::new(random_vec(rng, 10.0), rng.gen_range(0.1..1.5)))
            .collect()
    }

    fn random_triangles(rng: &mut StdRng, count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|_| {
                let centre = random_vec(rng, 10.0);
                Triangle::new(
                    centre + random_vec(rng, 1.5),
                    centre + random_vec(rng, 1.5),
                    centre + random_vec(rng, 1.5),
                )
            })
            .collect()
    }

    fn random_ray(rng: &mut StdRng) -> Ray {
        loop {
            let origin = random_vec(rng, 15.0);
            let aim = random_vec(rng, 10.0);
            if (aim - origin).length() > 1e-3 {
                return Ray::towards(origin, aim);
            }
        }
    }

    /// Exhaustive nearest-hit search to check traversal against.
    fn linear_scan<P: Primitive>(ray: &Ray, primitives: &[P]) -> Option<Hit> {
        primitives
            .iter()
            .enumerate()
            .filter_map(|(index, p)| p.hit_distance(ray).map(|distance| Hit { index, distance }))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn check_structure<P: Primitive>(bvh: &Bvh, primitives: &[P]) {
        let nodes = bvh.nodes();
        assert_eq!(nodes.len(), 2 * primitives.len() - 1);

        let mut seen = vec![false; primitives.len()];
        for (index, node) in nodes.iter().enumerate() {
            match *node {
                BvhNode::Branch { bbox, left, right } => {
                    assert!(left > index && right > index);
                    assert_eq!(bbox, nodes[left].bbox().union(&nodes[right].bbox()));
                }
                BvhNode::Leaf { bbox, primitive } => {
                    assert_eq!(bbox, primitives[primitive].bounding_box());
                    assert!(!seen[primitive], "primitive {primitive} in two leaves");
                    seen[primitive] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_bvh_empty() {
        assert!(Bvh::new::<Sphere>(&[]).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let spheres = [Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5)];
        let bvh = Bvh::new(&spheres).unwrap();

        // Should create a single leaf
        assert_eq!(bvh.nodes().len(), 1);
        assert!(matches!(bvh.nodes()[0], BvhNode::Leaf { primitive: 0, .. }));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = bvh.closest_hit(&ray, &spheres).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Sphere> = (0..10)
            .map(|i| Sphere::new(Vec3::new(i as f64, 0.0, -5.0), 0.5))
            .collect();
        let bvh = Bvh::new(&spheres).unwrap();

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), -Vec3::Z);
        let hit = bvh.closest_hit(&ray, &spheres).unwrap();
        assert_eq!(hit.index, 5);
        assert!((hit.distance - 4.5).abs() < 1e-12);

        // And one that misses all of them
        let ray = Ray::new(Vec3::new(5.0, 3.0, 0.0), -Vec3::Z);
        assert!(bvh.closest_hit(&ray, &spheres).is_none());
    }

    #[test]
    fn test_first_split_is_on_x() {
        let spheres: Vec<Sphere> = [3.0, -2.0, 7.0, 0.0]
            .iter()
            .map(|&x| Sphere::new(Vec3::new(x, 0.0, 0.0), 0.25))
            .collect();
        let bvh = Bvh::new(&spheres).unwrap();

        let BvhNode::Branch { left, right, .. } = bvh.nodes()[0] else {
            panic!("root must be a branch");
        };
        // Lower half holds the two smallest x minima
        assert!(bvh.nodes()[left].bbox().max.x < bvh.nodes()[right].bbox().min.x);
        assert_eq!(bvh.nodes()[left].bbox().min.x, -2.25);
        assert_eq!(bvh.nodes()[right].bbox().max.x, 7.25);
    }

    #[test]
    fn test_structure_invariants() {
        let mut rng = StdRng::seed_from_u64(3);
        for count in [1, 2, 3, 7, 64, 200] {
            let spheres = random_spheres(&mut rng, count);
            check_structure(&Bvh::new(&spheres).unwrap(), &spheres);

            let triangles = random_triangles(&mut rng, count);
            check_structure(&Bvh::new(&triangles).unwrap(), &triangles);
        }
    }

    #[test]
    fn test_sphere_traversal_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let count = rng.gen_range(1..=200);
            let spheres = random_spheres(&mut rng, count);
            let bvh = Bvh::new(&spheres).unwrap();

            for _ in 0..200 {
                let ray = random_ray(&mut rng);
                let expected = linear_scan(&ray, &spheres).map(|hit| hit.index);
                let found = bvh.closest_hit(&ray, &spheres).map(|hit| hit.index);
                assert_eq!(found, expected);
            }
        }
    }

    #[test]
    fn test_triangle_traversal_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..20 {
            let count = rng.gen_range(1..=200);
            let triangles = random_triangles(&mut rng, count);
            let bvh = Bvh::new(&triangles).unwrap();

            for _ in 0..200 {
                let ray = random_ray(&mut rng);
                let expected = linear_scan(&ray, &triangles).map(|hit| hit.index);
                let found = bvh.closest_hit(&ray, &triangles).map(|hit| hit.index);
                assert_eq!(found, expected);
            }
        }
    }

    #[test]
    fn test_equal_distances_are_a_miss() {
        let hit = |index| Some(Hit { index, distance: 2.0 });
        assert_eq!(nearer(hit(0), hit(1)), None);
        assert_eq!(nearer(None, None), None);
        assert_eq!(nearer(hit(0), None), hit(0));
        assert_eq!(
            nearer(hit(0), Some(Hit { index: 1, distance: 1.0 })),
            Some(Hit { index: 1, distance: 1.0 })
        );
    }
}

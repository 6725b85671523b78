use crate::error::PhysicsError;
use crate::math::{Transform, Vector2};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A convex polygon with counter-clockwise local vertices.
///
/// World vertices are cached and refreshed by [`PolygonShape::update_vertices`]
/// whenever the owning body moves.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PolygonShape {
    local_vertices: Vec<Vector2>,
    world_vertices: Vec<Vector2>,
}

/// Result of a separating-axis search over one polygon's edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Largest signed distance found; negative means overlap on every axis
    pub distance: f32,

    /// Index of the reference edge that produced `distance`
    pub edge: usize,

    /// Deepest vertex of the other polygon against that edge
    pub point: Vector2,
}

impl PolygonShape {
    /// Creates a polygon from counter-clockwise vertices in body space
    pub fn new(vertices: Vec<Vector2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::InvalidParameter(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::InvalidParameter("polygon vertex is not finite".into()));
        }
        Ok(Self {
            world_vertices: vertices.clone(),
            local_vertices: vertices,
        })
    }

    /// Axis-aligned rectangle centered on the origin
    pub(crate) fn rectangle(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let vertices = vec![
            Vector2::new(-hw, -hh),
            Vector2::new(hw, -hh),
            Vector2::new(hw, hh),
            Vector2::new(-hw, hh),
        ];
        Self {
            world_vertices: vertices.clone(),
            local_vertices: vertices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.local_vertices.len()
    }

    pub fn local_vertices(&self) -> &[Vector2] {
        &self.local_vertices
    }

    pub fn world_vertices(&self) -> &[Vector2] {
        &self.world_vertices
    }

    /// World vertex `index`, wrapping around
    #[inline]
    pub fn world_vertex(&self, index: usize) -> Vector2 {
        self.world_vertices[index % self.world_vertices.len()]
    }

    /// World-space edge vector from vertex `index` to its successor
    #[inline]
    pub fn edge_at(&self, index: usize) -> Vector2 {
        self.world_vertex(index + 1) - self.world_vertex(index)
    }

    /// Outward unit normal of edge `index`
    #[inline]
    pub fn edge_normal(&self, index: usize) -> Vector2 {
        self.edge_at(index).normal()
    }

    /// Signed area from the shoelace formula, positive for CCW winding
    pub fn area(&self) -> f32 {
        let n = self.local_vertices.len();
        (0..n)
            .map(|i| self.local_vertices[i].cross(&self.local_vertices[(i + 1) % n]))
            .sum::<f32>()
            * 0.5
    }

    /// Area centroid in body space
    pub fn centroid(&self) -> Vector2 {
        let n = self.local_vertices.len();
        let mut sum = Vector2::zero();
        for i in 0..n {
            let a = self.local_vertices[i];
            let b = self.local_vertices[(i + 1) % n];
            sum += (a + b) * a.cross(&b);
        }
        let area = self.area();
        if crate::math::approx_zero(area) {
            return Vector2::zero();
        }
        sum / (6.0 * area)
    }

    /// Moment of inertia per unit mass about the body origin
    pub fn moment_of_inertia(&self) -> f32 {
        let n = self.local_vertices.len();
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..n {
            let a = self.local_vertices[i];
            let b = self.local_vertices[(i + 1) % n];
            let cross = a.cross(&b).abs();
            numerator += cross * (a.dot(&a) + b.dot(&b) + a.dot(&b));
            denominator += cross;
        }
        if denominator == 0.0 {
            return 0.0;
        }
        numerator / 6.0 / denominator
    }

    /// Recomputes world vertices from the owning body's transform
    pub fn update_vertices(&mut self, transform: &Transform) {
        for (world, local) in self.world_vertices.iter_mut().zip(&self.local_vertices) {
            *world = transform.transform_point(local);
        }
    }

    /// Best separating axis among this polygon's edges against `other`.
    ///
    /// For each edge, the other polygon's vertex with the smallest projection
    /// onto the edge normal is found; the edge with the largest such value
    /// wins.
    pub fn find_min_separation(&self, other: &PolygonShape) -> Separation {
        let mut best = Separation {
            distance: f32::MIN,
            edge: 0,
            point: Vector2::zero(),
        };
        for i in 0..self.world_vertices.len() {
            let va = self.world_vertices[i];
            let normal = self.edge_normal(i);
            let mut min_sep = f32::MAX;
            let mut min_vertex = va;
            for vb in &other.world_vertices {
                let proj = (*vb - va).dot(&normal);
                if proj < min_sep {
                    min_sep = proj;
                    min_vertex = *vb;
                }
            }
            if min_sep > best.distance {
                best = Separation {
                    distance: min_sep,
                    edge: i,
                    point: min_vertex,
                };
            }
        }
        best
    }

    /// Edge whose normal is most anti-parallel to `normal`
    pub fn find_incident_edge(&self, normal: &Vector2) -> usize {
        let mut incident = 0;
        let mut min_proj = f32::MAX;
        for i in 0..self.world_vertices.len() {
            let proj = self.edge_normal(i).dot(normal);
            if proj < min_proj {
                min_proj = proj;
                incident = i;
            }
        }
        incident
    }

    /// Clips segment `input` against the line `c0 -> c1`.
    ///
    /// Points on the interior side (left of the directed line, distance
    /// `<= 0`) are kept; if the endpoints straddle the line the crossing
    /// point is appended. Returns the output buffer and how many entries are
    /// valid.
    pub fn clip_segment_to_line(input: &[Vector2; 2], c0: Vector2, c1: Vector2) -> ([Vector2; 2], usize) {
        let mut output = [Vector2::zero(); 2];
        let mut count = 0;

        let normal = (c1 - c0).normalize();
        let dist0 = (input[0] - c0).cross(&normal);
        let dist1 = (input[1] - c0).cross(&normal);

        if dist0 <= 0.0 {
            output[count] = input[0];
            count += 1;
        }
        if dist1 <= 0.0 {
            output[count] = input[1];
            count += 1;
        }
        if dist0 * dist1 < 0.0 {
            let total = dist0 - dist1;
            let t = dist0 / total;
            output[count] = input[0] + (input[1] - input[0]) * t;
            count += 1;
        }
        (output, count)
    }
}

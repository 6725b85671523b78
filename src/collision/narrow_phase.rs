use crate::bodies::RigidBody;
use crate::collision::{CollisionPair, Contact};
use crate::core::{BodyHandle, BodyStorage, Storage};
use crate::math::Vector2;
use crate::shapes::{CircleShape, PolygonShape, Shape};

/// Trait for narrow-phase collision detection algorithms
pub trait NarrowPhase: Send + Sync {
    /// Appends the contacts of every touching pair to `contacts`.
    ///
    /// Pairs in which neither body can move are skipped.
    fn detect_collisions(&self, pairs: &[CollisionPair], bodies: &BodyStorage<RigidBody>, contacts: &mut Vec<Contact>);
}

/// Separating-axis narrow phase for circles and convex polygons
#[derive(Debug, Clone, Copy, Default)]
pub struct SatNarrowPhase;

impl SatNarrowPhase {
    pub fn new() -> Self {
        Self
    }
}

impl NarrowPhase for SatNarrowPhase {
    fn detect_collisions(&self, pairs: &[CollisionPair], bodies: &BodyStorage<RigidBody>, contacts: &mut Vec<Contact>) {
        for pair in pairs {
            let (Some(a), Some(b)) = (bodies.get(pair.body_a), bodies.get(pair.body_b)) else {
                continue;
            };
            if !a.is_simulated() && !b.is_simulated() {
                continue;
            }
            is_colliding((pair.body_a, a), (pair.body_b, b), contacts);
        }
    }
}

/// Tests two bodies for overlap, appending contacts on `a`→`b`.
///
/// For a circle against a polygon the contact is reported with the polygon
/// as body A, whichever order the bodies were given in.
pub fn is_colliding(a: (BodyHandle, &RigidBody), b: (BodyHandle, &RigidBody), contacts: &mut Vec<Contact>) -> bool {
    let (handle_a, body_a) = a;
    let (handle_b, body_b) = b;
    match (body_a.get_shape(), body_b.get_shape()) {
        (Shape::Circle(circle_a), Shape::Circle(circle_b)) => {
            match collide_circles(handle_a, body_a.get_position(), circle_a, handle_b, body_b.get_position(), circle_b) {
                Some(contact) => {
                    contacts.push(contact);
                    true
                }
                None => false,
            }
        }
        (Shape::Circle(circle), other) => match other.as_polygon() {
            Some(polygon) => push(collide_polygon_circle(handle_b, polygon, handle_a, body_a.get_position(), circle), contacts),
            None => false,
        },
        (other, Shape::Circle(circle)) => match other.as_polygon() {
            Some(polygon) => push(collide_polygon_circle(handle_a, polygon, handle_b, body_b.get_position(), circle), contacts),
            None => false,
        },
        (shape_a, shape_b) => match (shape_a.as_polygon(), shape_b.as_polygon()) {
            (Some(polygon_a), Some(polygon_b)) => collide_polygons(handle_a, polygon_a, handle_b, polygon_b, contacts),
            _ => false,
        },
    }
}

fn push(contact: Option<Contact>, contacts: &mut Vec<Contact>) -> bool {
    match contact {
        Some(contact) => {
            contacts.push(contact);
            true
        }
        None => false,
    }
}

/// Circle against circle. Touching circles collide with zero depth.
pub fn collide_circles(
    handle_a: BodyHandle,
    center_a: Vector2,
    a: &CircleShape,
    handle_b: BodyHandle,
    center_b: Vector2,
    b: &CircleShape,
) -> Option<Contact> {
    let ab = center_b - center_a;
    let radius_sum = a.radius() + b.radius();
    if ab.length_squared() > radius_sum * radius_sum {
        return None;
    }

    // concentric circles have no preferred direction
    let normal = if ab.is_zero() { Vector2::unit_y() } else { ab.normalize() };
    Some(Contact {
        body_a: handle_a,
        body_b: handle_b,
        start: center_b - normal * b.radius(),
        end: center_a + normal * a.radius(),
        normal,
        depth: radius_sum - ab.length(),
    })
}

/// Polygon against polygon using SAT and reference-edge clipping.
///
/// Produces up to two contacts. The reference face belongs to whichever
/// polygon has the larger (least negative) separation; ties go to `b`.
pub fn collide_polygons(
    handle_a: BodyHandle,
    a: &PolygonShape,
    handle_b: BodyHandle,
    b: &PolygonShape,
    contacts: &mut Vec<Contact>,
) -> bool {
    let ab = a.find_min_separation(b);
    if ab.distance >= 0.0 {
        return false;
    }
    let ba = b.find_min_separation(a);
    if ba.distance >= 0.0 {
        return false;
    }

    let flip = ba.distance >= ab.distance;
    let (reference, incident, reference_edge) = if flip { (b, a, ba.edge) } else { (a, b, ab.edge) };
    let reference_normal = reference.edge_normal(reference_edge);

    let incident_edge = incident.find_incident_edge(&reference_normal);
    let mut clipped = [incident.world_vertex(incident_edge), incident.world_vertex(incident_edge + 1)];
    let mut count = 2;

    for i in 0..reference.vertex_count() {
        if i == reference_edge {
            continue;
        }
        let (output, n) = PolygonShape::clip_segment_to_line(&clipped, reference.world_vertex(i), reference.world_vertex(i + 1));
        clipped = output;
        count = n;
        if n < 2 {
            break;
        }
    }

    let reference_vertex = reference.world_vertex(reference_edge);
    for point in &clipped[..count] {
        let separation = (*point - reference_vertex).dot(&reference_normal);
        if separation > 0.0 {
            continue;
        }
        let surface = *point + reference_normal * -separation;
        let contact = if flip {
            Contact { body_a: handle_a, body_b: handle_b, start: surface, end: *point, normal: -reference_normal, depth: -separation }
        } else {
            Contact { body_a: handle_a, body_b: handle_b, start: *point, end: surface, normal: reference_normal, depth: -separation }
        };
        contacts.push(contact);
    }
    true
}

/// Polygon against circle by Voronoi region. Body A is always the polygon.
pub fn collide_polygon_circle(
    polygon_handle: BodyHandle,
    polygon: &PolygonShape,
    circle_handle: BodyHandle,
    center: Vector2,
    circle: &CircleShape,
) -> Option<Contact> {
    let radius = circle.radius();
    let n = polygon.vertex_count();

    let mut outside = false;
    let mut edge_distance = f32::MIN;
    let mut nearest = 0;
    for i in 0..n {
        let projection = (center - polygon.world_vertex(i)).dot(&polygon.edge_normal(i));
        if projection > 0.0 {
            edge_distance = projection;
            nearest = i;
            outside = true;
            break;
        }
        if projection > edge_distance {
            edge_distance = projection;
            nearest = i;
        }
    }

    let current = polygon.world_vertex(nearest);
    let next = polygon.world_vertex(nearest + 1);
    let contact = |normal: Vector2, depth: f32| {
        let start = center - normal * radius;
        Contact {
            body_a: polygon_handle,
            body_b: circle_handle,
            start,
            end: start + normal * depth,
            normal,
            depth,
        }
    };

    if !outside {
        // center inside: push out through the least-penetrated edge
        return Some(contact(polygon.edge_normal(nearest), radius - edge_distance));
    }

    // vertex region before the edge
    let to_center = center - current;
    if to_center.dot(&(next - current)) < 0.0 {
        let distance = to_center.length();
        if distance > radius {
            return None;
        }
        return Some(contact(to_center.normalize(), radius - distance));
    }

    // vertex region after the edge
    let to_center = center - next;
    if to_center.dot(&(current - next)) < 0.0 {
        let distance = to_center.length();
        if distance > radius {
            return None;
        }
        return Some(contact(to_center.normalize(), radius - distance));
    }

    if edge_distance > radius {
        return None;
    }
    Some(contact((next - current).normal(), radius - edge_distance))
}

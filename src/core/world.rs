use tracing::{debug, trace, warn};

use crate::bodies::RigidBody;
use crate::collision::{new_broad_phase, BroadPhase, Contact, NarrowPhase, SatNarrowPhase};
use crate::constraints::{Constraint, JointConstraint, PenetrationConstraint};
use crate::core::debug_draw::aabb_corners;
use crate::core::{
    BodyHandle, BodyStorage, Color, ConstraintHandle, ConstraintStorage, DebugDraw, DrawFlags,
    SimulationConfig, Storage,
};
use crate::error::PhysicsError;
use crate::forces::ForceGenerator;
use crate::math::{Aabb, Transform, Vector2};
use crate::shapes::Shape;
use crate::Result;

/// The main physics world that owns all bodies and joints and advances the simulation
pub struct PhysicsWorld {
    bodies: BodyStorage<RigidBody>,

    /// Persistent constraints (joints), newest first
    constraints: ConstraintStorage<Box<dyn Constraint>>,

    /// Contacts found during the last step
    contacts: Vec<Contact>,

    /// Contact constraints of the current step
    penetrations: Vec<PenetrationConstraint>,

    broad_phase: Box<dyn BroadPhase>,

    narrow_phase: Box<dyn NarrowPhase>,

    force_generators: Vec<Box<dyn ForceGenerator>>,

    config: SimulationConfig,

    /// The total elapsed simulation time
    time: f32,

    step_count: u64,
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Self {
        let broad_phase = new_broad_phase(config.broad_phase, config.broad_phase_margin);
        debug!(broad_phase = broad_phase.name(), gravity = %config.gravity, "created physics world");
        Self {
            bodies: BodyStorage::new(),
            constraints: ConstraintStorage::new(),
            contacts: Vec::new(),
            penetrations: Vec::new(),
            broad_phase,
            narrow_phase: Box::new(SatNarrowPhase::new()),
            force_generators: Vec::new(),
            config,
            time: 0.0,
            step_count: 0,
        }
    }

    pub fn get_time(&self) -> f32 {
        self.time
    }

    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Sets the gravitational acceleration, applied as given
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.config.gravity = gravity;
    }

    pub fn get_gravity(&self) -> Vector2 {
        self.config.gravity
    }

    pub fn set_position_iterations(&mut self, iterations: u32) {
        self.config.position_iterations = iterations;
    }

    /// Creates a body from a copy of `shape`. Mass `<= 0` makes it static.
    pub fn create_body(&mut self, shape: &Shape, position: Vector2, mass: f32) -> BodyHandle {
        self.add_body(RigidBody::new(shape, position, mass))
    }

    /// Adds a rigid body to the world and returns its handle
    pub fn add_body(&mut self, mut body: RigidBody) -> BodyHandle {
        body.set_proxy(None);
        let aabb = body.get_aabb();
        let body_type = body.get_body_type();
        let handle = self.bodies.add(body);

        let proxy = self.broad_phase.add(handle, aabb);
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_proxy(Some(proxy));
        }
        debug!(body = %handle, ?body_type, "created body");
        handle
    }

    /// Removes a body together with every joint attached to it
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        let mut body = self
            .bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Body with handle {} not found", handle)))?;

        if let Some(proxy) = body.get_proxy() {
            self.broad_phase.remove(proxy);
        }
        body.set_proxy(None);

        let attached: Vec<ConstraintHandle> = self
            .constraints
            .iter()
            .filter(|(_, constraint)| constraint.involves_body(handle))
            .map(|(c_handle, _)| c_handle)
            .collect();
        for c_handle in attached {
            self.constraints.remove(c_handle);
            debug!(constraint = %c_handle, body = %handle, "destroyed constraint with its body");
        }

        for generator in &mut self.force_generators {
            generator.remove_body(handle);
        }

        debug!(body = %handle, "destroyed body");
        Ok(body)
    }

    /// Gets a reference to a rigid body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.fetch(handle)
    }

    /// Gets a mutable reference to a rigid body by its handle.
    ///
    /// Pose changes made through it reach the broad phase on the next step.
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.fetch_mut(handle)
    }

    pub fn get_transform(&self, handle: BodyHandle) -> Result<Transform> {
        Ok(self.bodies.fetch(handle)?.get_transform())
    }

    /// Iterates bodies, most recently created first
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Pins `a` and `b` together at the world point `anchor`
    pub fn create_joint(&mut self, a: BodyHandle, b: BodyHandle, anchor: Vector2) -> Result<ConstraintHandle> {
        if a == b {
            return Err(PhysicsError::InvalidParameter(format!("cannot join {} to itself", a)));
        }
        let body_a = self.bodies.fetch(a)?;
        let body_b = self.bodies.fetch(b)?;
        let joint = JointConstraint::new(a, body_a, b, body_b, anchor)
            .with_stabilization(self.config.joint_beta, self.config.joint_slop)
            .with_max_warm_start(self.config.max_warm_start_impulse);
        Ok(self.add_constraint(Box::new(joint)))
    }

    /// Adds a persistent constraint to the world and returns its handle
    pub fn add_constraint(&mut self, constraint: Box<dyn Constraint>) -> ConstraintHandle {
        for &body_handle in constraint.get_bodies() {
            if let Some(body) = self.bodies.get_mut(body_handle) {
                body.wake_up();
            }
        }
        let kind = constraint.constraint_type();
        let handle = self.constraints.add(constraint);
        debug!(constraint = %handle, kind, "created constraint");
        handle
    }

    /// Removes a constraint from the world
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Result<Box<dyn Constraint>> {
        let constraint = self
            .constraints
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("Constraint with handle {} not found", handle)))?;
        debug!(constraint = %handle, "destroyed constraint");
        Ok(constraint)
    }

    pub fn get_constraint(&self, handle: ConstraintHandle) -> Result<&dyn Constraint> {
        self.constraints.fetch(handle).map(|constraint| constraint.as_ref())
    }

    /// Current world positions of a constraint's two anchor points
    pub fn get_constraint_anchors(&self, handle: ConstraintHandle) -> Result<(Vector2, Vector2)> {
        self.get_constraint(handle)?
            .world_anchors(&self.bodies)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("bodies of {} are gone", handle)))
    }

    /// Iterates constraints, most recently created first
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintHandle, &dyn Constraint)> + '_ {
        self.constraints.iter().map(|(handle, constraint)| (handle, constraint.as_ref()))
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Registers a force generator run at the start of every step
    pub fn add_force_generator(&mut self, generator: Box<dyn ForceGenerator>) {
        debug!(kind = generator.generator_type(), "added force generator");
        self.force_generators.push(generator);
    }

    pub fn force_generator_count(&self) -> usize {
        self.force_generators.len()
    }

    /// Contacts found during the last step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn broad_phase(&self) -> &dyn BroadPhase {
        self.broad_phase.as_ref()
    }

    /// A body whose bounds contain `point`, if any
    pub fn pick(&self, point: Vector2) -> Option<BodyHandle> {
        self.broad_phase.pick(&point)
    }

    /// Bodies whose bounds overlap `aabb`
    pub fn query(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        self.broad_phase.query(aabb)
    }

    /// Advances the simulation by `dt` with the configured iteration count
    pub fn step(&mut self, dt: f32) {
        self.step_with_iterations(dt, self.config.position_iterations);
    }

    /// Advances the simulation by `dt` running `iterations` solver sweeps.
    ///
    /// A non-positive or non-finite `dt` leaves the world untouched.
    pub fn step_with_iterations(&mut self, dt: f32, iterations: u32) {
        if !(dt > 0.0 && dt.is_finite()) {
            warn!(dt, "ignoring step with invalid time step");
            return;
        }

        for generator in &self.force_generators {
            generator.apply_forces(&mut self.bodies, dt);
        }

        let gravity = self.config.gravity;
        let unit_scale = self.config.pixels_per_meter;
        for (_, body) in self.bodies.iter_mut() {
            if body.is_simulated() {
                let weight = gravity * (body.get_mass() * unit_scale * body.get_gravity_scale());
                body.add_force(weight);
            }
            body.integrate_forces(dt);
            body.compute_aabb();
            if let Some(proxy) = body.get_proxy() {
                self.broad_phase.set_aabb(proxy, body.get_aabb());
            }
        }

        self.broad_phase.update();
        self.contacts.clear();
        let pairs = self.broad_phase.compute_pairs();
        let pair_count = pairs.len();
        self.narrow_phase.detect_collisions(pairs, &self.bodies, &mut self.contacts);

        self.penetrations.clear();
        for contact in &self.contacts {
            let (Some(a), Some(b)) = (self.bodies.get(contact.body_a), self.bodies.get(contact.body_b)) else {
                continue;
            };
            self.penetrations.push(
                PenetrationConstraint::new(contact, a, b)
                    .with_stabilization(self.config.contact_beta, self.config.contact_slop),
            );
        }

        for (_, constraint) in self.constraints.iter_mut() {
            constraint.pre_solve(&mut self.bodies, dt);
        }
        for penetration in &mut self.penetrations {
            penetration.pre_solve(&mut self.bodies, dt);
        }

        for _ in 0..iterations {
            for (_, constraint) in self.constraints.iter_mut() {
                constraint.solve(&mut self.bodies);
            }
            for penetration in &mut self.penetrations {
                penetration.solve(&mut self.bodies);
            }
        }

        for (_, constraint) in self.constraints.iter_mut() {
            constraint.post_solve();
        }
        for penetration in &mut self.penetrations {
            penetration.post_solve();
        }

        for (_, body) in self.bodies.iter_mut() {
            if !body.is_simulated() {
                continue;
            }
            body.integrate_velocities(dt);
            if let Some(proxy) = body.get_proxy() {
                self.broad_phase.set_aabb(proxy, body.get_aabb());
            }
        }

        self.time += dt;
        self.step_count += 1;
        trace!(
            step = self.step_count,
            pairs = pair_count,
            contacts = self.contacts.len(),
            joints = self.constraints.len(),
            "stepped world"
        );
    }

    /// Emits the primitives selected by `draw.flags()`
    pub fn debug_draw(&self, draw: &mut dyn DebugDraw) {
        let flags = draw.flags();

        for (_, body) in self.bodies.iter() {
            if !body.is_visible() {
                continue;
            }
            let color = if body.is_static() { Color::static_body() } else { Color::dynamic_body() };
            let transform = body.get_transform();
            let polygon = body.get_shape().as_polygon();

            if flags.contains(DrawFlags::SHAPE) {
                match (body.get_shape().as_circle(), polygon) {
                    (Some(circle), _) => {
                        draw.draw_solid_circle(transform.position, circle.radius(), transform.rotation.x_axis(), color)
                    }
                    (None, Some(polygon)) => draw.draw_solid_polygon(polygon.world_vertices(), color),
                    (None, None) => {}
                }
            }

            if flags.contains(DrawFlags::MESH) {
                if let Some(polygon) = polygon {
                    let center = transform.transform_point(&polygon.centroid());
                    draw.draw_polygon(polygon.world_vertices(), color);
                    for vertex in polygon.world_vertices() {
                        draw.draw_segment(center, *vertex, color);
                    }
                }
            }

            if flags.contains(DrawFlags::AABB) {
                draw.draw_polygon(&aabb_corners(&body.get_aabb()), Color::AABB);
            }

            if flags.contains(DrawFlags::TRANSFORM) {
                let mut frame = transform;
                if let Some(polygon) = polygon {
                    frame.position = transform.transform_point(&polygon.centroid());
                }
                draw.draw_transform(&frame);
            }
        }

        if flags.contains(DrawFlags::AABB_TREE) {
            self.broad_phase.visit_nodes(&mut |aabb: &Aabb, depth: usize| {
                draw.draw_polygon(&aabb_corners(aabb), Color::tree_depth(depth));
            });
        }

        if flags.contains(DrawFlags::JOINT) {
            for (_, constraint) in self.constraints.iter() {
                let &[handle_a, handle_b] = constraint.get_bodies() else {
                    continue;
                };
                let (Some(a), Some(b)) = (self.bodies.get(handle_a), self.bodies.get(handle_b)) else {
                    continue;
                };
                draw.draw_segment(a.get_position(), b.get_position(), Color::joint());
            }
        }
    }

    /// Removes every body, joint and force generator
    pub fn clear(&mut self) {
        for (_, body) in self.bodies.iter() {
            if let Some(proxy) = body.get_proxy() {
                self.broad_phase.remove(proxy);
            }
        }
        self.bodies.clear();
        self.constraints.clear();
        self.contacts.clear();
        self.penetrations.clear();
        self.force_generators.clear();
        self.time = 0.0;
        self.step_count = 0;
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

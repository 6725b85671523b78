use crate::bodies::{BodyFlags, Material, RigidBodyType};
use crate::collision::ProxyId;
use crate::math::{Aabb, Rotation, Transform, Vector2};
use crate::shapes::Shape;

/// A rigid body for physics simulation
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Position and orientation in world space
    transform: Transform,

    linear_velocity: Vector2,

    /// Derived from the accumulated force during the last integration
    linear_acceleration: Vector2,

    angular_velocity: f32,

    angular_acceleration: f32,

    /// Forces accumulated since the last integration
    sum_forces: Vector2,

    sum_torque: f32,

    mass: f32,

    /// Zero for static bodies
    inv_mass: f32,

    /// Rotational inertia, `shape moment * mass`
    inertia: f32,

    inv_inertia: f32,

    gravity_scale: f32,

    material: Material,

    body_type: RigidBodyType,

    flags: BodyFlags,

    /// Owned copy of the geometry with up-to-date world vertices
    shape: Shape,

    /// Tight world bounds, refreshed after every pose change
    aabb: Aabb,

    /// Broad-phase registration, set while the body lives in a world
    proxy: Option<ProxyId>,
}

impl RigidBody {
    /// Creates a body owning a copy of `shape`, placed at `position`.
    ///
    /// Mass `<= 0` (or non-finite) makes the body static.
    pub fn new(shape: &Shape, position: Vector2, mass: f32) -> Self {
        let body_type = RigidBodyType::from_mass(mass);
        let mass = if body_type == RigidBodyType::Dynamic { mass } else { 0.0 };
        let inertia = shape.moment_of_inertia() * mass;

        let mut body = Self {
            transform: Transform::from_position(position),
            linear_velocity: Vector2::zero(),
            linear_acceleration: Vector2::zero(),
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            sum_forces: Vector2::zero(),
            sum_torque: 0.0,
            mass,
            inv_mass: if mass != 0.0 { 1.0 / mass } else { 0.0 },
            inertia,
            inv_inertia: if inertia != 0.0 { 1.0 / inertia } else { 0.0 },
            gravity_scale: 1.0,
            material: Material::default(),
            body_type,
            flags: BodyFlags::default(),
            shape: shape.clone(),
            aabb: Aabb::default(),
            proxy: None,
        };
        body.shape.update_vertices(&body.transform);
        body.compute_aabb();
        body
    }

    pub fn get_transform(&self) -> Transform {
        self.transform
    }

    pub fn get_position(&self) -> Vector2 {
        self.transform.position
    }

    /// Teleports the body, refreshing its vertices and bounds
    pub fn set_position(&mut self, position: Vector2) {
        self.transform.position = position;
        self.refresh_geometry();
    }

    pub fn get_rotation(&self) -> Rotation {
        self.transform.rotation
    }

    /// Current orientation in radians
    pub fn get_angle(&self) -> f32 {
        self.transform.rotation.angle()
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.transform.rotation = rotation;
        self.refresh_geometry();
    }

    pub fn get_linear_velocity(&self) -> Vector2 {
        self.linear_velocity
    }

    pub fn set_linear_velocity(&mut self, velocity: Vector2) {
        if self.is_static() {
            return;
        }
        self.linear_velocity = velocity;
        self.wake_up();
    }

    pub fn get_angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, velocity: f32) {
        if self.is_static() {
            return;
        }
        self.angular_velocity = velocity;
        self.wake_up();
    }

    pub fn get_linear_acceleration(&self) -> Vector2 {
        self.linear_acceleration
    }

    pub fn get_angular_acceleration(&self) -> f32 {
        self.angular_acceleration
    }

    pub fn get_mass(&self) -> f32 {
        self.mass
    }

    pub fn get_inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn get_inertia(&self) -> f32 {
        self.inertia
    }

    pub fn get_inverse_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Inverse mass seen by the solver; zero while static or asleep
    pub fn get_solver_inverse_mass(&self) -> f32 {
        if self.is_simulated() { self.inv_mass } else { 0.0 }
    }

    /// Inverse inertia seen by the solver; zero while static or asleep
    pub fn get_solver_inverse_inertia(&self) -> f32 {
        if self.is_simulated() { self.inv_inertia } else { 0.0 }
    }

    pub fn get_material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn get_friction(&self) -> f32 {
        self.material.friction
    }

    /// Negative and NaN coefficients become 0
    pub fn set_friction(&mut self, friction: f32) {
        self.material.friction = friction.max(0.0);
    }

    pub fn get_restitution(&self) -> f32 {
        self.material.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.material.restitution = restitution;
    }

    pub fn get_gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    /// Multiplier on world gravity; zero disables gravity for this body
    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    pub fn get_body_type(&self) -> RigidBodyType {
        self.body_type
    }

    pub fn is_static(&self) -> bool {
        self.body_type == RigidBodyType::Static
    }

    pub fn get_flags(&self) -> BodyFlags {
        self.flags
    }

    pub fn is_awake(&self) -> bool {
        self.flags.contains(BodyFlags::AWAKE)
    }

    /// Dynamic and awake
    pub fn is_simulated(&self) -> bool {
        !self.is_static() && self.is_awake()
    }

    /// Freezes the body: velocities and accumulators are cleared
    pub fn put_to_sleep(&mut self) {
        self.flags.remove(BodyFlags::AWAKE);
        self.linear_velocity = Vector2::zero();
        self.angular_velocity = 0.0;
        self.clear_forces();
    }

    pub fn wake_up(&mut self) {
        self.flags.insert(BodyFlags::AWAKE);
    }

    pub fn set_awake(&mut self, awake: bool) {
        if awake {
            self.wake_up();
        } else {
            self.put_to_sleep();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(BodyFlags::VISIBLE)
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(BodyFlags::VISIBLE, visible);
    }

    pub fn get_shape(&self) -> &Shape {
        &self.shape
    }

    pub fn get_aabb(&self) -> Aabb {
        self.aabb
    }

    pub(crate) fn get_proxy(&self) -> Option<ProxyId> {
        self.proxy
    }

    pub(crate) fn set_proxy(&mut self, proxy: Option<ProxyId>) {
        self.proxy = proxy;
    }

    /// Accumulates a force through the center of mass
    pub fn add_force(&mut self, force: Vector2) {
        self.sum_forces += force;
    }

    pub fn add_torque(&mut self, torque: f32) {
        self.sum_torque += torque;
    }

    /// Accumulates a force applied at world point `point`
    pub fn add_force_at_point(&mut self, force: Vector2, point: Vector2) {
        self.sum_forces += force;
        self.sum_torque += (point - self.transform.position).cross(&force);
    }

    pub fn clear_forces(&mut self) {
        self.sum_forces = Vector2::zero();
        self.sum_torque = 0.0;
    }

    pub fn get_accumulated_force(&self) -> Vector2 {
        self.sum_forces
    }

    pub fn get_accumulated_torque(&self) -> f32 {
        self.sum_torque
    }

    /// `v += j / m`; ignored by static and sleeping bodies
    pub fn apply_impulse_linear(&mut self, impulse: Vector2) {
        if !self.is_simulated() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
    }

    pub fn apply_impulse_angular(&mut self, impulse: f32) {
        if !self.is_simulated() {
            return;
        }
        self.angular_velocity += impulse * self.inv_inertia;
    }

    /// Impulse at offset `r` from the body origin
    pub fn apply_impulse_at_point(&mut self, impulse: Vector2, r: Vector2) {
        if !self.is_simulated() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += r.cross(&impulse) * self.inv_inertia;
    }

    /// Velocity half of the semi-implicit Euler step.
    ///
    /// Turns accumulated forces into accelerations, advances velocities and
    /// clears the accumulators. Static and sleeping bodies only drop them.
    pub fn integrate_forces(&mut self, dt: f32) {
        if !self.is_simulated() {
            self.clear_forces();
            return;
        }
        self.linear_acceleration = self.sum_forces * self.inv_mass;
        self.linear_velocity += self.linear_acceleration * dt;

        self.angular_acceleration = self.sum_torque * self.inv_inertia;
        self.angular_velocity += self.angular_acceleration * dt;

        self.clear_forces();
    }

    /// Position half of the semi-implicit Euler step, using the solved velocities
    pub fn integrate_velocities(&mut self, dt: f32) {
        if !self.is_simulated() {
            return;
        }
        self.transform.position += self.linear_velocity * dt;
        self.transform.rotation += self.angular_velocity * dt;
        self.transform.rotation.normalize();
        self.refresh_geometry();
    }

    /// Recomputes the tight world bounds from the current pose
    pub fn compute_aabb(&mut self) {
        self.aabb = self.shape.compute_aabb(&self.transform);
    }

    pub fn local_to_world(&self, point: &Vector2) -> Vector2 {
        self.transform.transform_point(point)
    }

    pub fn world_to_local(&self, point: &Vector2) -> Vector2 {
        self.transform.inverse_transform_point(point)
    }

    pub fn local_direction_to_world(&self, direction: &Vector2) -> Vector2 {
        self.transform.transform_direction(direction)
    }

    pub fn world_direction_to_local(&self, direction: &Vector2) -> Vector2 {
        self.transform.inverse_transform_direction(direction)
    }

    /// Velocity of the material point at world position `point`
    pub fn velocity_at_point(&self, point: &Vector2) -> Vector2 {
        let r = *point - self.transform.position;
        self.linear_velocity + Vector2::cross_scalar(self.angular_velocity, &r)
    }

    fn refresh_geometry(&mut self) {
        self.shape.update_vertices(&self.transform);
        self.compute_aabb();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_mass_is_static() {
        let body = RigidBody::new(&Shape::rectangle(1.0, 1.0), Vector2::zero(), 0.0);
        assert!(body.is_static());
        assert_eq!(body.get_inverse_mass(), 0.0);
        assert_eq!(body.get_inverse_inertia(), 0.0);

        let nan = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), f32::NAN);
        assert!(nan.is_static());
        assert_eq!(nan.get_mass(), 0.0);
    }

    #[test]
    fn mass_properties_from_shape() {
        let body = RigidBody::new(&Shape::circle(2.0), Vector2::zero(), 4.0);
        assert_relative_eq!(body.get_inverse_mass(), 0.25);
        assert_relative_eq!(body.get_inertia(), 8.0);
        assert_relative_eq!(body.get_inverse_inertia(), 0.125);
        assert_eq!(body.get_material(), &Material::default());
    }

    #[test]
    fn static_body_ignores_impulses() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 0.0);
        body.apply_impulse_linear(Vector2::new(5.0, 0.0));
        body.apply_impulse_at_point(Vector2::new(0.0, 5.0), Vector2::new(1.0, 0.0));
        body.add_force(Vector2::new(100.0, 0.0));
        body.integrate_forces(1.0);
        body.integrate_velocities(1.0);
        assert_eq!(body.get_linear_velocity(), Vector2::zero());
        assert_eq!(body.get_angular_velocity(), 0.0);
        assert_eq!(body.get_position(), Vector2::zero());
    }

    #[test]
    fn semi_implicit_euler_uses_new_velocity() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 2.0);
        body.add_force(Vector2::new(4.0, 0.0));
        body.integrate_forces(0.5);
        assert_relative_eq!(body.get_linear_velocity().x, 1.0);
        assert_eq!(body.get_accumulated_force(), Vector2::zero());
        body.integrate_velocities(0.5);
        assert_relative_eq!(body.get_position().x, 0.5);
    }

    #[test]
    fn impulse_at_point_spins_body() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        body.apply_impulse_at_point(Vector2::new(0.0, 1.0), Vector2::new(1.0, 0.0));
        assert!(body.get_angular_velocity() > 0.0);
    }

    #[test]
    fn aabb_tracks_pose_changes() {
        let mut body = RigidBody::new(&Shape::rectangle(2.0, 2.0), Vector2::zero(), 1.0);
        body.set_position(Vector2::new(10.0, 0.0));
        assert_relative_eq!(body.get_aabb().min.x, 9.0);
        assert_relative_eq!(body.get_aabb().max.x, 11.0);
    }

    #[test]
    fn sleeping_body_is_frozen() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        body.set_linear_velocity(Vector2::new(1.0, 0.0));
        body.put_to_sleep();
        assert_eq!(body.get_linear_velocity(), Vector2::zero());
        assert_eq!(body.get_solver_inverse_mass(), 0.0);
        body.apply_impulse_linear(Vector2::new(1.0, 0.0));
        body.integrate_velocities(1.0);
        assert_eq!(body.get_position(), Vector2::zero());
        body.wake_up();
        assert_eq!(body.get_solver_inverse_mass(), 1.0);
    }

    #[test]
    fn sleeping_body_drops_accumulated_force() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        body.put_to_sleep();
        body.add_force(Vector2::new(-40.0, 0.0));
        body.add_torque(3.0);
        body.integrate_forces(1.0 / 60.0);
        assert_eq!(body.get_accumulated_force(), Vector2::zero());
        assert_eq!(body.get_accumulated_torque(), 0.0);

        body.wake_up();
        body.integrate_forces(1.0 / 60.0);
        assert_eq!(body.get_linear_velocity(), Vector2::zero());
        assert_eq!(body.get_angular_velocity(), 0.0);
    }

    #[test]
    fn friction_setter_rejects_negative_and_nan() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        body.set_friction(-1.0);
        assert_eq!(body.get_friction(), 0.0);
        body.set_friction(f32::NAN);
        assert_eq!(body.get_friction(), 0.0);
    }

    #[test]
    fn local_world_conversion() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::new(1.0, 1.0), 1.0);
        body.set_rotation(Rotation::new(std::f32::consts::FRAC_PI_2));
        let world = body.local_to_world(&Vector2::new(1.0, 0.0));
        assert_relative_eq!(world.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(world.y, 2.0, epsilon = 1e-6);
        let local = body.world_to_local(&world);
        assert_relative_eq!(local.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(local.y, 0.0, epsilon = 1e-6);
    }
}

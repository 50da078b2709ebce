//! Particle emitter: timed emission, physics integration, expiry

use crate::context::EffectContext;
use crate::error::{EffectError, Result};
use crate::particle::Particle;
use crate::renderer::PointSpriteRenderer;
use crate::shape::EmitterShape;
use ember_core::{Quat, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

/// World gravity applied to particles that opt in
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

/// Default velocity damping coefficient
pub const DEFAULT_DRAG: f32 = 0.5;

/// Hook invoked synchronously during emitter stepping
///
/// Hooks receive the particle plus an [`EffectContext`] for reaching
/// other emitters in the owning system.
pub type ParticleHook = Box<dyn FnMut(&mut Particle, &mut EffectContext)>;

/// Emitter configuration
///
/// Immutable once an [`Emitter`] is built from it, except that
/// [`Emitter::stop`] lowers `max_emission` to request a graceful stop.
pub struct EmitterParams {
    /// Particle lifetime in seconds
    pub max_life: f32,
    /// Particle pool capacity
    pub max_particles: usize,
    /// Particles emitted per second
    pub emission_rate: f32,
    /// Lifetime emission cap; `u64::MAX` means unbounded
    pub max_emission: u64,
    /// Initial speed
    pub velocity_magnitude: f32,
    /// Uniform `[-v, v]` variance added to the initial speed
    pub velocity_magnitude_variance: f32,
    /// Orientation rotating the local +Y emission axis into world space
    pub rotation: Quat,
    /// Half-angle of the initial velocity cone, radians
    pub rotation_angular_variance: f32,
    /// Whether gravity acts on the particles
    pub gravity: bool,
    /// Gravity multiplier
    pub gravity_strength: f32,
    /// Velocity damping coefficient
    pub drag_coefficient: f32,
    /// Sprite rotation rate, radians per second; render-only
    pub spin_speed: f32,
    /// Spawn position policy
    pub shape: EmitterShape,
    /// Buffer adapter for the external rendering stage
    pub renderer: Option<PointSpriteRenderer>,
    /// Invoked once per particle right after emission
    pub on_created: Option<ParticleHook>,
    /// Invoked once per particle per step after integration
    pub on_step: Option<ParticleHook>,
    /// Invoked when a particle expires, and for every live particle on
    /// emitter disposal
    pub on_destroy: Option<ParticleHook>,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            max_life: 5.0,
            max_particles: 100,
            emission_rate: 1.0,
            max_emission: u64::MAX,
            velocity_magnitude: 0.0,
            velocity_magnitude_variance: 0.0,
            rotation: Quat::IDENTITY,
            rotation_angular_variance: 0.0,
            gravity: false,
            gravity_strength: 1.0,
            drag_coefficient: DEFAULT_DRAG,
            spin_speed: 0.0,
            shape: EmitterShape::default(),
            renderer: None,
            on_created: None,
            on_step: None,
            on_destroy: None,
        }
    }
}

impl EmitterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_life(mut self, max_life: f32) -> Self {
        self.max_life = max_life;
        self
    }

    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.max_particles = max;
        self
    }

    pub fn with_emission_rate(mut self, rate: f32) -> Self {
        self.emission_rate = rate;
        self
    }

    pub fn with_max_emission(mut self, max: u64) -> Self {
        self.max_emission = max;
        self
    }

    pub fn with_velocity_magnitude(mut self, magnitude: f32) -> Self {
        self.velocity_magnitude = magnitude;
        self
    }

    pub fn with_velocity_magnitude_variance(mut self, variance: f32) -> Self {
        self.velocity_magnitude_variance = variance;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_rotation_angular_variance(mut self, half_angle: f32) -> Self {
        self.rotation_angular_variance = half_angle;
        self
    }

    pub fn with_gravity(mut self, strength: f32) -> Self {
        self.gravity = true;
        self.gravity_strength = strength;
        self
    }

    pub fn with_drag_coefficient(mut self, drag: f32) -> Self {
        self.drag_coefficient = drag;
        self
    }

    pub fn with_spin_speed(mut self, spin_speed: f32) -> Self {
        self.spin_speed = spin_speed;
        self
    }

    pub fn with_shape(mut self, shape: EmitterShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_renderer(mut self, renderer: PointSpriteRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_on_created(
        mut self,
        hook: impl FnMut(&mut Particle, &mut EffectContext) + 'static,
    ) -> Self {
        self.on_created = Some(Box::new(hook));
        self
    }

    pub fn with_on_step(
        mut self,
        hook: impl FnMut(&mut Particle, &mut EffectContext) + 'static,
    ) -> Self {
        self.on_step = Some(Box::new(hook));
        self
    }

    pub fn with_on_destroy(
        mut self,
        hook: impl FnMut(&mut Particle, &mut EffectContext) + 'static,
    ) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.emission_rate.is_finite() && self.emission_rate > 0.0) {
            return Err(EffectError::InvalidConfig(format!(
                "emission_rate must be positive, got {}",
                self.emission_rate
            )));
        }
        if self.max_particles == 0 {
            return Err(EffectError::InvalidConfig(
                "max_particles must be at least 1".into(),
            ));
        }
        if !(self.max_life.is_finite() && self.max_life > 0.0) {
            return Err(EffectError::InvalidConfig(format!(
                "max_life must be positive, got {}",
                self.max_life
            )));
        }
        if !(self.drag_coefficient.is_finite() && self.drag_coefficient >= 0.0) {
            return Err(EffectError::InvalidConfig(format!(
                "drag_coefficient must be non-negative, got {}",
                self.drag_coefficient
            )));
        }
        if !self.gravity_strength.is_finite() {
            return Err(EffectError::InvalidConfig(
                "gravity_strength must be finite".into(),
            ));
        }
        if !(self.rotation_angular_variance.is_finite()
            && self.rotation_angular_variance >= 0.0)
        {
            return Err(EffectError::InvalidConfig(format!(
                "rotation_angular_variance must be non-negative, got {}",
                self.rotation_angular_variance
            )));
        }
        if !self.velocity_magnitude.is_finite() || !self.velocity_magnitude_variance.is_finite()
        {
            return Err(EffectError::InvalidConfig(
                "velocity magnitude and variance must be finite".into(),
            ));
        }
        if let Some(renderer) = &self.renderer {
            if renderer.capacity() < self.max_particles {
                return Err(EffectError::RendererTooSmall {
                    capacity: renderer.capacity(),
                    required: self.max_particles,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for EmitterParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterParams")
            .field("max_life", &self.max_life)
            .field("max_particles", &self.max_particles)
            .field("emission_rate", &self.emission_rate)
            .field("max_emission", &self.max_emission)
            .field("velocity_magnitude", &self.velocity_magnitude)
            .field(
                "velocity_magnitude_variance",
                &self.velocity_magnitude_variance,
            )
            .field("rotation", &self.rotation)
            .field("rotation_angular_variance", &self.rotation_angular_variance)
            .field("gravity", &self.gravity)
            .field("gravity_strength", &self.gravity_strength)
            .field("drag_coefficient", &self.drag_coefficient)
            .field("spin_speed", &self.spin_speed)
            .field("shape", &self.shape)
            .field("renderer", &self.renderer)
            .field("on_created", &self.on_created.is_some())
            .field("on_step", &self.on_step.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

/// A bounded source of particles
///
/// Lifecycle: emitting, then draining once the emission cap is reached,
/// then exhausted once no live particles remain. [`Emitter::kill`] jumps
/// straight to exhausted; [`Emitter::stop`] caps emission at the current
/// count and lets live particles finish naturally.
#[derive(Debug)]
pub struct Emitter {
    params: EmitterParams,
    particles: Vec<Particle>,
    emission_time: f32,
    emitted_count: u64,
    dead: bool,
    disposed: bool,
}

impl Emitter {
    /// Build an emitter, validating its configuration
    pub fn new(params: EmitterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            particles: Vec::new(),
            emission_time: 0.0,
            emitted_count: 0,
            dead: false,
            disposed: false,
        })
    }

    pub fn params(&self) -> &EmitterParams {
        &self.params
    }

    /// Live particles, in emission order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Total particles emitted over this emitter's lifetime
    pub fn emitted_count(&self) -> u64 {
        self.emitted_count
    }

    pub fn renderer(&self) -> Option<&PointSpriteRenderer> {
        self.params.renderer.as_ref()
    }

    /// Shape access for hooks that move the spawn position
    pub fn shape_mut(&mut self) -> &mut EmitterShape {
        &mut self.params.shape
    }

    /// False once the emitter can never produce a visible particle again
    pub fn still_active(&self) -> bool {
        if self.dead || self.disposed {
            return false;
        }
        self.emitted_count < self.params.max_emission || !self.particles.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Soft stop: cap emission at the current count, drain in place
    pub fn stop(&mut self) {
        self.params.max_emission = self.emitted_count;
    }

    /// Hard stop: the emitter is exhausted immediately
    pub fn kill(&mut self) {
        self.dead = true;
    }

    /// Advance the emitter by `dt` seconds
    ///
    /// `elapsed` is total simulation time, forwarded to the renderer as
    /// the shader time uniform. RNG draws per emission: shape position,
    /// then velocity direction (azimuth, cone angle), then magnitude
    /// variance.
    pub fn step<R: Rng>(
        &mut self,
        dt: f32,
        elapsed: f32,
        rng: &mut R,
        ctx: &mut EffectContext,
    ) -> Result<()> {
        if self.disposed {
            return Err(EffectError::Disposed("emitter"));
        }

        let Self {
            params,
            particles,
            emission_time,
            emitted_count,
            dead,
            ..
        } = self;

        // Emission, with catch-up when dt spans several periods
        if !*dead {
            *emission_time += dt;
            let period = 1.0 / params.emission_rate;

            while *emission_time >= period
                && particles.len() < params.max_particles
                && *emitted_count < params.max_emission
            {
                *emission_time -= period;
                *emitted_count += 1;

                let mut p = params.shape.emit(rng);
                p.max_life = params.max_life;

                let phi = rng.gen::<f32>() * TAU;
                let theta = rng.gen::<f32>() * params.rotation_angular_variance;
                let dir = Vec3::new(
                    theta.sin() * phi.cos(),
                    theta.cos(),
                    theta.sin() * phi.sin(),
                );
                let magnitude = params.velocity_magnitude
                    + (rng.gen::<f32>() * 2.0 - 1.0) * params.velocity_magnitude_variance;
                p.velocity = params.rotation.rotate_vec3(dir * magnitude);

                if let Some(hook) = params.on_created.as_mut() {
                    hook(&mut p, ctx);
                }
                particles.push(p);
            }
        }

        // Integration: semi-implicit Euler, newly emitted particles included
        let gravity_force = if params.gravity {
            GRAVITY * params.gravity_strength
        } else {
            Vec3::ZERO
        };

        for p in particles.iter_mut() {
            p.life = (p.life + dt).min(p.max_life);

            let force = gravity_force + p.velocity * -params.drag_coefficient;
            p.velocity += force * dt;
            p.position += p.velocity * dt;

            if let Some(hook) = params.on_step.as_mut() {
                hook(p, ctx);
            }
            if p.is_expired() {
                if let Some(hook) = params.on_destroy.as_mut() {
                    hook(p, ctx);
                }
            }
        }

        particles.retain(|p| !p.is_expired());

        if let Some(renderer) = params.renderer.as_mut() {
            renderer.update_from_particles(particles, params.spin_speed, elapsed)?;
        }

        Ok(())
    }

    /// Release renderer resources and force destroy hooks for live particles
    ///
    /// Idempotent. A disposed emitter can no longer be stepped.
    pub fn dispose(&mut self, ctx: &mut EffectContext) {
        if self.disposed {
            return;
        }

        let Self {
            params, particles, ..
        } = self;

        if let Some(hook) = params.on_destroy.as_mut() {
            for p in particles.iter_mut() {
                hook(p, ctx);
            }
        }
        particles.clear();

        if let Some(renderer) = params.renderer.as_mut() {
            renderer.dispose();
        }

        self.disposed = true;
        tracing::debug!(emitted = self.emitted_count, "emitter disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PointSpriteRenderer;
    use crate::shape::PointShape;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::f32::consts::PI;
    use std::rc::Rc;

    fn step_once(emitter: &mut Emitter, dt: f32, elapsed: f32) {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ctx = EffectContext::new();
        emitter.step(dt, elapsed, &mut rng, &mut ctx).unwrap();
    }

    fn drive(emitter: &mut Emitter, dt: f32, steps: usize) {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ctx = EffectContext::new();
        let mut elapsed = 0.0;
        for _ in 0..steps {
            elapsed += dt;
            emitter.step(dt, elapsed, &mut rng, &mut ctx).unwrap();
        }
    }

    #[test]
    fn test_catch_up_emission() {
        // One 0.35s step at 10 particles/s emits exactly 3
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_life(5.0),
        )
        .unwrap();

        step_once(&mut emitter, 0.35, 0.35);
        assert_eq!(emitter.emitted_count(), 3);
        assert_eq!(emitter.particles().len(), 3);
    }

    #[test]
    fn test_pool_capacity_bounds_live_count() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(1000.0)
                .with_max_particles(2)
                .with_max_life(10.0),
        )
        .unwrap();

        step_once(&mut emitter, 1.0, 1.0);
        assert_eq!(emitter.particles().len(), 2);
        assert_eq!(emitter.emitted_count(), 2);
    }

    #[test]
    fn test_emission_cap() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(1000.0)
                .with_max_particles(100)
                .with_max_emission(5)
                .with_max_life(10.0),
        )
        .unwrap();

        drive(&mut emitter, 0.5, 4);
        assert_eq!(emitter.emitted_count(), 5);
        assert!(emitter.still_active());
    }

    #[test]
    fn test_life_is_monotonic_and_clamped() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_emission(1)
                .with_max_life(0.25),
        )
        .unwrap();

        let mut rng = SmallRng::seed_from_u64(1);
        let mut ctx = EffectContext::new();
        let mut last_life = 0.0;
        let mut elapsed = 0.0;

        loop {
            elapsed += 0.1;
            emitter.step(0.1, elapsed, &mut rng, &mut ctx).unwrap();
            match emitter.particles().first() {
                Some(p) => {
                    assert!(p.life >= last_life);
                    assert!(p.life <= p.max_life);
                    last_life = p.life;
                }
                None => break,
            }
        }

        assert!(!emitter.still_active());
    }

    #[test]
    fn test_soft_stop_freezes_emission_cap() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_life(10.0),
        )
        .unwrap();

        step_once(&mut emitter, 0.2, 0.2);
        let emitted = emitter.emitted_count();
        assert_eq!(emitted, 2);

        emitter.stop();
        assert_eq!(emitter.params().max_emission, emitted);

        drive(&mut emitter, 0.5, 4);
        assert_eq!(emitter.emitted_count(), emitted);
        // Existing particles keep aging normally
        assert!(emitter.particles().iter().all(|p| p.life > 0.2));
        assert!(emitter.still_active());
    }

    #[test]
    fn test_kill_is_immediate() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_life(10.0),
        )
        .unwrap();
        step_once(&mut emitter, 0.5, 0.5);
        assert!(emitter.still_active());

        emitter.kill();
        assert!(!emitter.still_active());
    }

    #[test]
    fn test_zero_max_emission_is_exhausted() {
        let mut emitter =
            Emitter::new(EmitterParams::new().with_max_emission(0)).unwrap();
        assert!(!emitter.still_active());

        step_once(&mut emitter, 0.1, 0.1);
        assert!(!emitter.still_active());
        assert_eq!(emitter.emitted_count(), 0);
    }

    #[test]
    fn test_gravity_integration() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_emission(1)
                .with_max_life(10.0)
                .with_gravity(1.0)
                .with_drag_coefficient(0.0),
        )
        .unwrap();

        step_once(&mut emitter, 0.1, 0.1);
        let p = &emitter.particles()[0];
        // Semi-implicit Euler: v += g*dt, then x += v*dt
        assert!((p.velocity.y - (-0.98)).abs() < 1e-5);
        assert!((p.position.y - (-0.098)).abs() < 1e-5);
    }

    #[test]
    fn test_drag_damps_velocity() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_emission(1)
                .with_max_life(10.0)
                .with_velocity_magnitude(10.0)
                .with_drag_coefficient(0.5),
        )
        .unwrap();

        step_once(&mut emitter, 0.1, 0.1);
        let p = &emitter.particles()[0];
        // Zero cone angle aims straight up the local +Y axis
        assert!((p.velocity.y - 9.5).abs() < 1e-5);
        assert!(p.velocity.x.abs() < 1e-6);
        assert!(p.velocity.z.abs() < 1e-6);
        assert!((p.position.y - 0.95).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_tilts_velocity_cone() {
        // Quarter turn about Z maps local +Y onto -X
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_emission(1)
                .with_max_life(10.0)
                .with_velocity_magnitude(10.0)
                .with_drag_coefficient(0.0)
                .with_rotation(Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), PI / 2.0)),
        )
        .unwrap();

        step_once(&mut emitter, 0.1, 0.1);
        let p = &emitter.particles()[0];
        assert!((p.velocity.x - (-10.0)).abs() < 1e-3);
        assert!(p.velocity.y.abs() < 1e-3);
    }

    #[test]
    fn test_velocity_magnitude_variance_bounds() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(1000.0)
                .with_max_particles(200)
                .with_max_life(100.0)
                .with_velocity_magnitude(10.0)
                .with_velocity_magnitude_variance(2.0)
                .with_drag_coefficient(0.0)
                .with_rotation_angular_variance(2.0 * PI),
        )
        .unwrap();

        step_once(&mut emitter, 0.1, 0.1);
        // Accumulated float error may leave the count one short of 100
        assert!(emitter.particles().len() >= 99);
        for p in emitter.particles() {
            let speed = p.velocity.length();
            assert!(speed >= 8.0 - 1e-3 && speed <= 12.0 + 1e-3);
        }
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            Emitter::new(EmitterParams::new().with_emission_rate(0.0)),
            Err(EffectError::InvalidConfig(_))
        ));
        assert!(matches!(
            Emitter::new(EmitterParams::new().with_max_particles(0)),
            Err(EffectError::InvalidConfig(_))
        ));
        assert!(matches!(
            Emitter::new(EmitterParams::new().with_max_life(0.0)),
            Err(EffectError::InvalidConfig(_))
        ));
        assert!(matches!(
            Emitter::new(EmitterParams::new().with_drag_coefficient(-1.0)),
            Err(EffectError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_undersized_renderer() {
        let renderer = PointSpriteRenderer::new(1).unwrap();
        let result = Emitter::new(
            EmitterParams::new()
                .with_max_particles(2)
                .with_renderer(renderer),
        );
        assert!(matches!(
            result,
            Err(EffectError::RendererTooSmall {
                capacity: 1,
                required: 2
            })
        ));
    }

    #[test]
    fn test_publish_mirrors_live_list() {
        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_particles(8)
                .with_max_life(5.0)
                .with_spin_speed(PI)
                .with_renderer(PointSpriteRenderer::new(8).unwrap()),
        )
        .unwrap();

        step_once(&mut emitter, 0.3, 0.3);

        let renderer = emitter.renderer().unwrap();
        assert_eq!(renderer.draw_count(), emitter.particles().len());
        let p = &emitter.particles()[0];
        assert_eq!(&renderer.positions()[0..3], &p.position.to_array());
        assert!((renderer.lives()[0] - p.normalized_life()).abs() < 1e-6);
        assert_eq!(renderer.uniforms().time, 0.3);
        assert_eq!(renderer.uniforms().spin_speed, PI);
    }

    #[test]
    fn test_step_after_dispose_fails() {
        let mut emitter = Emitter::new(EmitterParams::new()).unwrap();
        let mut ctx = EffectContext::new();
        emitter.dispose(&mut ctx);

        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            emitter.step(0.1, 0.1, &mut rng, &mut ctx),
            Err(EffectError::Disposed(_))
        ));
    }

    #[test]
    fn test_destroy_hook_fires_on_expiry_and_dispose() {
        let destroyed = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&destroyed);

        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_emission(2)
                .with_max_life(0.15)
                .with_on_destroy(move |_, _| counter.set(counter.get() + 1)),
        )
        .unwrap();

        // First particle expires naturally after two steps
        drive(&mut emitter, 0.1, 2);
        assert_eq!(destroyed.get(), 1);

        // Dispose force-destroys the remaining live particle
        let mut ctx = EffectContext::new();
        emitter.dispose(&mut ctx);
        assert_eq!(destroyed.get(), 2);
        assert!(emitter.is_disposed());
    }

    #[test]
    fn test_created_hook_sees_initial_state() {
        let seen = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&seen);

        let mut emitter = Emitter::new(
            EmitterParams::new()
                .with_emission_rate(10.0)
                .with_max_emission(3)
                .with_max_life(5.0)
                .with_shape(EmitterShape::Point(PointShape::at(Vec3::new(
                    0.0, 7.0, 0.0,
                ))))
                .with_on_created(move |p, _| {
                    assert_eq!(p.life, 0.0);
                    assert_eq!(p.position.y, 7.0);
                    counter.set(counter.get() + 1);
                }),
        )
        .unwrap();

        step_once(&mut emitter, 0.3, 0.3);
        assert_eq!(seen.get(), 3);
    }
}

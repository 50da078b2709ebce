//! Particle system: owns emitters, drives stepping and pruning

use crate::context::{EffectCommand, EffectContext, EmitterId};
use crate::emitter::Emitter;
use crate::error::{EffectError, Result};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;

/// The lifetime root of one effect
///
/// Owns an unordered set of emitters and the shared RNG stream they draw
/// from. Callers step the system once per frame, poll
/// [`still_active`](Self::still_active), and dispose+drop the system once
/// it turns false.
pub struct ParticleSystem {
    emitters: FxHashMap<EmitterId, Emitter>,
    next_id: u64,
    rng: SmallRng,
    disposed: bool,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Deterministic system for reproducible runs and tests
    ///
    /// Emitters step in ascending handle order, so the RNG draw sequence
    /// is fully determined by the seed and the call pattern.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            emitters: FxHashMap::default(),
            next_id: 1,
            rng,
            disposed: false,
        }
    }

    pub fn add_emitter(&mut self, emitter: Emitter) -> EmitterId {
        let id = EmitterId(self.next_id);
        self.next_id += 1;
        tracing::debug!(id = id.0, "emitter added");
        self.emitters.insert(id, emitter);
        id
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.get(&id)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters.get_mut(&id)
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Soft-stop one emitter; returns false if the handle is gone
    pub fn stop_emitter(&mut self, id: EmitterId) -> bool {
        match self.emitters.get_mut(&id) {
            Some(emitter) => {
                emitter.stop();
                true
            }
            None => false,
        }
    }

    /// Hard-kill one emitter; returns false if the handle is gone
    pub fn kill_emitter(&mut self, id: EmitterId) -> bool {
        match self.emitters.get_mut(&id) {
            Some(emitter) => {
                emitter.kill();
                true
            }
            None => false,
        }
    }

    /// True while at least one emitter can still produce visible particles
    pub fn still_active(&self) -> bool {
        !self.disposed && self.emitters.values().any(|e| e.still_active())
    }

    /// Advance the whole effect by `dt` seconds
    ///
    /// Steps every emitter, applies hook commands, then disposes and
    /// removes emitters that became exhausted this frame.
    pub fn step(&mut self, dt: f32, elapsed: f32) -> Result<()> {
        if self.disposed {
            return Err(EffectError::Disposed("particle system"));
        }

        let mut ctx = EffectContext::with_counter(self.next_id);

        let mut ids: Vec<EmitterId> = self.emitters.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            if let Some(emitter) = self.emitters.get_mut(&id) {
                emitter.step(dt, elapsed, &mut self.rng, &mut ctx)?;
            }
        }

        self.apply_commands(&mut ctx);

        let mut exhausted: Vec<EmitterId> = self
            .emitters
            .iter()
            .filter(|(_, e)| !e.still_active())
            .map(|(id, _)| *id)
            .collect();
        exhausted.sort_unstable();

        for id in exhausted {
            if let Some(mut emitter) = self.emitters.remove(&id) {
                emitter.dispose(&mut ctx);
            }
        }

        // Destroy hooks may have spawned replacement effects
        self.apply_commands(&mut ctx);

        self.next_id = ctx.counter();
        Ok(())
    }

    fn apply_commands(&mut self, ctx: &mut EffectContext) {
        for command in ctx.take_commands() {
            match command {
                EffectCommand::Spawn { id, emitter } => {
                    self.emitters.insert(id, emitter);
                }
                EffectCommand::Stop(id) => {
                    if let Some(emitter) = self.emitters.get_mut(&id) {
                        emitter.stop();
                    }
                }
                EffectCommand::Kill(id) => {
                    if let Some(emitter) = self.emitters.get_mut(&id) {
                        emitter.kill();
                    }
                }
                EffectCommand::Mutate { id, apply } => {
                    if let Some(emitter) = self.emitters.get_mut(&id) {
                        apply(emitter);
                    }
                }
            }
        }
    }

    /// Dispose every owned emitter unconditionally
    ///
    /// Idempotent. Destroy hooks fire for all live particles; emitters the
    /// hooks try to spawn are disposed immediately rather than inserted,
    /// since the whole effect is going away. A disposed system fails fast
    /// on further stepping.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        let mut ctx = EffectContext::with_counter(self.next_id);
        for emitter in self.emitters.values_mut() {
            emitter.dispose(&mut ctx);
        }
        self.emitters.clear();

        while ctx.has_commands() {
            for command in ctx.take_commands() {
                if let EffectCommand::Spawn { mut emitter, .. } = command {
                    emitter.dispose(&mut ctx);
                }
            }
        }

        self.disposed = true;
        tracing::debug!("particle system disposed");
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

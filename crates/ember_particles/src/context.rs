//! Hook effect context and deferred emitter commands

use crate::emitter::Emitter;
use smallvec::SmallVec;

/// Stable handle to an emitter owned by a [`ParticleSystem`](crate::ParticleSystem)
///
/// Handles are never reused within one system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(pub(crate) u64);

pub(crate) enum EffectCommand {
    Spawn { id: EmitterId, emitter: Emitter },
    Stop(EmitterId),
    Kill(EmitterId),
    Mutate {
        id: EmitterId,
        apply: Box<dyn FnOnce(&mut Emitter)>,
    },
}

/// Hook-side view of the owning particle system
///
/// Hooks run synchronously inside the emitter step, so they cannot touch
/// other emitters directly; instead they record commands here. The system
/// applies them after the emitter loop of the same `step` call, in the
/// order they were recorded. Spawn handles are valid immediately and may
/// be stored on particles (see [`Particle::attached_emitter`](crate::Particle)).
pub struct EffectContext {
    next_id: u64,
    commands: SmallVec<[EffectCommand; 8]>,
}

impl EffectContext {
    /// Standalone context for driving a single emitter without a system
    ///
    /// Commands recorded here go nowhere unless handed to a system, which
    /// is fine for emitters whose hooks do not reach other emitters.
    pub fn new() -> Self {
        Self::with_counter(1)
    }

    pub(crate) fn with_counter(next_id: u64) -> Self {
        Self {
            next_id,
            commands: SmallVec::new(),
        }
    }

    pub(crate) fn counter(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn alloc_id(&mut self) -> EmitterId {
        let id = EmitterId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an emitter to the owning system; insertion happens after the
    /// current emitter loop, the handle is usable right away
    pub fn spawn(&mut self, emitter: Emitter) -> EmitterId {
        let id = self.alloc_id();
        tracing::debug!(id = id.0, "emitter spawned from hook");
        self.commands.push(EffectCommand::Spawn { id, emitter });
        id
    }

    /// Soft-stop another emitter: no further emission, live particles drain
    pub fn stop(&mut self, id: EmitterId) {
        self.commands.push(EffectCommand::Stop(id));
    }

    /// Hard-kill another emitter
    pub fn kill(&mut self, id: EmitterId) {
        self.commands.push(EffectCommand::Kill(id));
    }

    /// Run a closure against another emitter, e.g. to keep an attached
    /// emitter's shape tracking a particle
    pub fn with_emitter(
        &mut self,
        id: EmitterId,
        apply: impl FnOnce(&mut Emitter) + 'static,
    ) {
        self.commands.push(EffectCommand::Mutate {
            id,
            apply: Box::new(apply),
        });
    }

    pub(crate) fn take_commands(&mut self) -> SmallVec<[EffectCommand; 8]> {
        std::mem::take(&mut self.commands)
    }

    pub(crate) fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }
}

impl Default for EffectContext {
    fn default() -> Self {
        Self::new()
    }
}

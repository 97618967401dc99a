//! Combat engine, the core of the simulation.
//!
//! `CombatEngine` owns the hecs ECS world, the session's object pools, the
//! seeded RNG and the command queue. Each `tick()` runs one fixed step
//! (cooldowns, projectiles, effects, movement) followed by one frame step
//! (commands, candidate maintenance, target selection, engagement, corpse
//! cleanup) and returns a `CombatSnapshot`. Completely headless and
//! deterministic: same seed and same inputs give the same snapshots.

use std::collections::{HashMap, VecDeque};

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::commands::CombatCommand;
use skirmish_core::components::{
    Combatant, CombatantId, Faction, Health, PrototypeId, Scale, Shield, Status, Weapon,
};
use skirmish_core::config::CombatConfig;
use skirmish_core::enums::{DamageType, EngagementState};
use skirmish_core::events::CombatEvent;
use skirmish_core::state::CombatSnapshot;
use skirmish_core::types::SimTime;
use skirmish_rules::damage::{AppliedDamage, DamageInput};

use crate::projectile::{EffectPrototype, PoolManager, ProjectilePrototype};
use crate::scenario::{Scenario, ScenarioError};
use crate::systems;
use crate::tracking::{is_valid_target, Candidates, Engagement, Targeting};
use crate::world_setup::{self, CombatantSpec};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub combat: CombatConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            combat: CombatConfig::default(),
        }
    }
}

/// The combat engine. Owns the ECS world and all sim state.
pub struct CombatEngine {
    world: World,
    pools: PoolManager,
    rng: ChaCha8Rng,
    config: CombatConfig,
    time: SimTime,
    ids: HashMap<CombatantId, Entity>,
    next_id: u32,
    command_queue: VecDeque<CombatCommand>,
    events: Vec<CombatEvent>,
    despawn_buffer: Vec<(Entity, CombatantId)>,
    cleanup_timer_secs: f64,
    sensor_timer_secs: f64,
}

impl CombatEngine {
    /// Create a new engine with the given config. The pools live exactly as
    /// long as the engine.
    pub fn new(config: SimConfig) -> Self {
        let combat = config.combat.sanitized();
        Self {
            world: World::new(),
            pools: PoolManager::new(&combat.pool),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            cleanup_timer_secs: combat.candidates.cleanup_interval_secs,
            sensor_timer_secs: 0.0,
            config: combat,
            time: SimTime::default(),
            ids: HashMap::new(),
            next_id: 1,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Build an engine from a scenario: register its prototypes and spawn
    /// its combatants in order (ids 1, 2, 3...).
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let mut engine = Self::new(SimConfig {
            seed: scenario.seed,
            combat: scenario.config.clone(),
        });
        for proto in &scenario.projectiles {
            engine.register_projectile_prototype(
                proto.id,
                ProjectilePrototype {
                    name: proto.name.clone(),
                    radius: proto.radius,
                },
            );
        }
        for proto in &scenario.effects {
            engine.register_effect_prototype(
                proto.id,
                EffectPrototype {
                    name: proto.name.clone(),
                    kind: proto.kind,
                    lifetime_secs: proto.lifetime_secs,
                },
            );
        }
        for spec in &scenario.combatants {
            engine.spawn_combatant(spec);
        }
        tracing::info!(
            scenario = %scenario.name,
            combatants = scenario.combatants.len(),
            "scenario loaded"
        );
        Ok(engine)
    }

    pub fn register_projectile_prototype(&mut self, id: PrototypeId, prototype: ProjectilePrototype) {
        self.pools.register_projectile(id, prototype);
    }

    pub fn register_effect_prototype(&mut self, id: PrototypeId, prototype: EffectPrototype) {
        self.pools.register_effect(id, prototype);
    }

    /// Spawn a combatant and return its id.
    pub fn spawn_combatant(&mut self, spec: &CombatantSpec) -> CombatantId {
        let id = CombatantId(self.next_id);
        self.next_id += 1;
        let entity = world_setup::spawn_combatant(&mut self.world, id, spec);
        self.ids.insert(id, entity);
        id
    }

    /// Queue a command for processing at the start of the next frame step.
    pub fn queue_command(&mut self, command: CombatCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = CombatCommand>) {
        self.command_queue.extend(commands);
    }

    /// Spatial collaborator: `other` entered `observer`'s detection volume.
    pub fn notify_detection_enter(&mut self, observer: CombatantId, other: CombatantId) {
        self.queue_command(CombatCommand::DetectionEnter { observer, other });
    }

    /// Spatial collaborator: `other` left `observer`'s detection volume.
    pub fn notify_detection_exit(&mut self, observer: CombatantId, other: CombatantId) {
        self.queue_command(CombatCommand::DetectionExit { observer, other });
    }

    /// Advance one fixed step and one frame step, returning the snapshot.
    pub fn tick(&mut self) -> CombatSnapshot {
        let dt = self.config.fixed_dt.0;
        self.advance_fixed(dt);
        self.advance_frame(dt);

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.pools, events)
    }

    /// Fixed-rate step: cooldowns and physics-adjacent motion.
    pub fn advance_fixed(&mut self, dt: f64) {
        // 1. Weapon cooldowns
        systems::engagement::tick_cooldowns(&mut self.world, dt);
        // 2. Projectile flight and impacts
        systems::projectiles::run(
            &mut self.world,
            &mut self.pools,
            &mut self.rng,
            &self.config,
            dt,
            self.time.elapsed_secs,
            &mut self.events,
        );
        // 3. Effect lifetimes
        systems::effects::run(&mut self.pools, dt);
        // 4. Movement and knockback
        systems::movement::run(&mut self.world, dt);
        systems::movement::apply_knockback(&mut self.world, dt, &self.config.damage);

        self.time.advance(dt);
    }

    /// Variable-rate step. Candidate changes happen before re-selection,
    /// which happens before the state machine, which happens before firing.
    pub fn advance_frame(&mut self, dt: f64) {
        // 1. Inbound commands (enter/exit, disable, despawn...)
        self.process_commands();
        // 2. Built-in broadphase, if enabled
        if self.config.candidates.broadphase_enabled {
            self.sensor_timer_secs -= dt;
            if self.sensor_timer_secs <= 0.0 {
                self.sensor_timer_secs += self.config.candidates.sensor_sweep_interval_secs;
                self.sensor_timer_secs = self.sensor_timer_secs.max(0.0);
                systems::sensor::run(
                    &mut self.world,
                    &self.ids,
                    self.config.candidates.sensor_cell_size,
                );
            }
        }
        // 3. Periodic candidate cleanup
        self.cleanup_timer_secs -= dt;
        if self.cleanup_timer_secs <= 0.0 {
            self.cleanup_timer_secs += self.config.candidates.cleanup_interval_secs;
            self.cleanup_timer_secs = self.cleanup_timer_secs.max(0.0);
            systems::candidates::cleanup(&mut self.world);
        }
        // 4. Target selection
        systems::targeting::run(
            &mut self.world,
            dt,
            &self.config.targeting,
            self.config.engagement.lost_target_tolerance,
            &mut self.events,
        );
        // 5. Engagement state machine and firing
        systems::engagement::run(
            &mut self.world,
            &mut self.pools,
            &self.config,
            dt,
            &mut self.events,
        );
        // 6. Corpse cleanup
        let removed = systems::cleanup::run(
            &mut self.world,
            self.time.elapsed_secs,
            self.config.cleanup.corpse_linger_secs,
            &mut self.despawn_buffer,
        );
        for id in removed {
            self.ids.remove(&id);
        }
    }

    /// Fire `attacker`'s weapon at its current target right now, bypassing
    /// the cooldown check. Returns the number of projectiles launched; 0 when
    /// there is no valid target.
    pub fn fire(&mut self, attacker: CombatantId) -> usize {
        let Some(entity) = self.entity(attacker) else {
            return 0;
        };
        let target = match self.world.get::<&Targeting>(entity) {
            Ok(targeting) => targeting.current,
            Err(_) => None,
        };
        let Some(target) = target.filter(|t| is_valid_target(&self.world, *t)) else {
            return 0;
        };
        systems::engagement::fire_weapon(
            &mut self.world,
            &mut self.pools,
            &self.config,
            entity,
            target,
            &mut self.events,
        )
    }

    /// Current target id, or `CombatantId::NONE`.
    pub fn current_target_id(&self, attacker: CombatantId) -> CombatantId {
        self.entity(attacker)
            .and_then(|e| self.world.get::<&Targeting>(e).ok().and_then(|t| t.current))
            .filter(|t| is_valid_target(&self.world, *t))
            .and_then(|t| self.world.get::<&Combatant>(t).ok().map(|c| c.id))
            .unwrap_or(CombatantId::NONE)
    }

    /// Apply non-projectile damage through the same pipeline projectiles use.
    /// No crit and no knockback. Returns `None` if the defender is gone or dead.
    pub fn apply_damage(
        &mut self,
        defender: CombatantId,
        amount: f64,
        damage_type: DamageType,
    ) -> Option<AppliedDamage> {
        let entity = self.entity(defender)?;
        let input = DamageInput::flat(amount, damage_type);
        let result = systems::damage::apply_hit(
            &mut self.world,
            &mut self.rng,
            entity,
            &input,
            None,
            self.time.elapsed_secs,
            &mut self.events,
        )?;
        if result.killed {
            systems::engagement::disengage(&mut self.world, entity, &mut self.events);
        }
        Some(result)
    }

    /// Disable or re-enable an attacker. Disabling clears its target and
    /// move order and puts it in Idle immediately.
    pub fn set_disabled(&mut self, combatant: CombatantId, disabled: bool) {
        let Some(entity) = self.entity(combatant) else {
            return;
        };
        if let Ok(mut status) = self.world.get::<&mut Status>(entity) {
            status.disabled = disabled;
        }
        if disabled {
            systems::engagement::disengage(&mut self.world, entity, &mut self.events);
        }
    }

    /// Remove a combatant from the world now. References to it go stale.
    pub fn despawn(&mut self, combatant: CombatantId) -> bool {
        match self.ids.remove(&combatant) {
            Some(entity) => self.world.despawn(entity).is_ok(),
            None => false,
        }
    }

    // --- Getters: the source of truth for replication and UI ---

    pub fn entity(&self, id: CombatantId) -> Option<Entity> {
        self.ids.get(&id).copied()
    }

    pub fn health(&self, id: CombatantId) -> Option<f64> {
        let entity = self.entity(id)?;
        self.world.get::<&Health>(entity).ok().map(|h| h.current)
    }

    /// Shield points, clamped to zero.
    pub fn shield(&self, id: CombatantId) -> Option<f64> {
        let entity = self.entity(id)?;
        self.world.get::<&Shield>(entity).ok().map(|s| s.display())
    }

    pub fn is_alive(&self, id: CombatantId) -> bool {
        self.entity(id)
            .is_some_and(|e| is_valid_target(&self.world, e))
    }

    pub fn state(&self, id: CombatantId) -> Option<EngagementState> {
        let entity = self.entity(id)?;
        self.world.get::<&Engagement>(entity).ok().map(|e| e.state)
    }

    pub fn cooldown_remaining(&self, id: CombatantId) -> Option<f64> {
        let entity = self.entity(id)?;
        self.world
            .get::<&Weapon>(entity)
            .ok()
            .map(|w| w.cooldown_remaining_secs)
    }

    /// Candidate ids in insertion order, skipping despawned entries.
    pub fn candidate_ids(&self, id: CombatantId) -> Vec<CombatantId> {
        let Some(entity) = self.entity(id) else {
            return Vec::new();
        };
        let Ok(candidates) = self.world.get::<&Candidates>(entity) else {
            return Vec::new();
        };
        candidates
            .entries
            .iter()
            .filter_map(|e| self.world.get::<&Combatant>(*e).ok().map(|c| c.id))
            .collect()
    }

    /// Snapshot of the current state without draining pending events.
    pub fn snapshot(&self) -> CombatSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.time, &self.pools, Vec::new())
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    /// Mutable pool access, for tests and tools that drive pools directly.
    pub fn pools_mut(&mut self) -> &mut PoolManager {
        &mut self.pools
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command. Commands naming unknown combatants are ignored.
    fn handle_command(&mut self, command: CombatCommand) {
        match command {
            CombatCommand::DetectionEnter { observer, other } => {
                if let (Some(o), Some(x)) = (self.entity(observer), self.entity(other)) {
                    systems::candidates::on_enter(&mut self.world, o, x);
                }
            }
            CombatCommand::DetectionExit { observer, other } => {
                if let (Some(o), Some(x)) = (self.entity(observer), self.entity(other)) {
                    systems::candidates::on_exit(&mut self.world, o, x);
                }
            }
            CombatCommand::SetDisabled {
                combatant,
                disabled,
            } => {
                self.set_disabled(combatant, disabled);
            }
            CombatCommand::SetFaction { combatant, faction } => {
                self.set_faction(combatant, faction);
            }
            CombatCommand::SetScale { combatant, scale } => {
                if let Some(entity) = self.entity(combatant) {
                    if scale.is_finite() && scale > 0.0 {
                        let _ = self.world.insert_one(entity, Scale(scale));
                    } else {
                        tracing::warn!(combatant = combatant.0, scale, "invalid scale ignored");
                    }
                }
            }
            CombatCommand::Despawn { combatant } => {
                self.despawn(combatant);
            }
        }
    }

    fn set_faction(&mut self, combatant: CombatantId, faction: Faction) {
        if let Some(entity) = self.entity(combatant) {
            if let Ok(mut c) = self.world.get::<&mut Combatant>(entity) {
                c.faction = faction;
            }
        }
    }
}

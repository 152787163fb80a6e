//! Simulation engine: the single owner of the entity registry.
//!
//! `SimulationEngine` owns the hecs world and every stateful manager,
//! processes queued commands at tick boundaries, runs the systems in a
//! fixed order and produces `WorldSnapshot`s. Completely headless and
//! deterministic for a given seed and dt sequence.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crossbeam_channel::{bounded, Receiver, Sender};
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sentinel_ai::npc::{Brain, Personality, Stimulus};
use sentinel_ai::{BehaviorCoordinator, CognitionLayer, UnitFsm};
use sentinel_core::commands::{Command, RobotTelemetry, TargetSpec};
use sentinel_core::components::{Detour, ExternalTrack};
use sentinel_core::constants::*;
use sentinel_core::enums::*;
use sentinel_core::error::{SimError, SimResult};
use sentinel_core::events::{EventEnvelope, SimEvent, Topic};
use sentinel_core::state::{EntitySnapshot, WorldSnapshot};
use sentinel_core::target::Target;
use sentinel_core::types::{wrap_degrees, Position, SimTime};
use sentinel_nav::{MotionController, Obstacles, Pathfinder, StreetGraph};

use crate::bus::EventBus;
use crate::config::{SimConfig, WaveConfig};
use crate::cover::{CoverObject, CoverSystem};
use crate::escalation::EscalationTracker;
use crate::game_mode::GameMode;
use crate::hazards::HazardManager;
use crate::squads::SquadManager;
use crate::systems;
use crate::systems::cognition::Surroundings;
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: SimConfig,
    world: World,
    index: BTreeMap<String, Entity>,
    time: SimTime,
    rng: ChaCha8Rng,
    command_queue: VecDeque<Command>,
    command_tx: Sender<Command>,
    command_rx: Receiver<Command>,
    despawn_buffer: Vec<Entity>,
    events: Vec<SimEvent>,
    stimuli: Vec<Stimulus>,
    bus: EventBus,

    coordinator: BehaviorCoordinator,
    cognition: CognitionLayer,
    hazards: HazardManager,
    cover: CoverSystem,
    obstacles: Obstacles,
    streets: Option<StreetGraph>,
    squads: SquadManager,
    game: GameMode,
    escalation: EscalationTracker,

    id_counters: BTreeMap<AssetType, u32>,
    next_projectile_id: u64,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let (command_tx, command_rx) = bounded(config.command_queue_capacity.max(1));
        let mut engine = Self {
            world: World::new(),
            index: BTreeMap::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            command_tx,
            command_rx,
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            stimuli: Vec::new(),
            bus: EventBus::new(config.event_queue_capacity),
            coordinator: BehaviorCoordinator::new(config.seed, config.defended_point),
            cognition: CognitionLayer::new(config.npc.hearing_radius, config.npc.crowd_radius),
            hazards: HazardManager::new(),
            cover: CoverSystem::default(),
            obstacles: Obstacles::default(),
            streets: None,
            squads: SquadManager::new(),
            game: GameMode::new(config.game.clone()),
            escalation: EscalationTracker::default(),
            id_counters: BTreeMap::new(),
            next_projectile_id: 0,
            config,
        };
        engine.populate_ambient();
        engine
    }

    fn populate_ambient(&mut self) {
        let population = self.config.npc.population;
        if population > 0 {
            self.spawn_npcs(population);
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn game_state(&self) -> GameState {
        self.game.state()
    }

    pub fn threat_level(&self) -> ThreatLevel {
        self.escalation.level()
    }

    // --- Commands -------------------------------------------------------

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: Command) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.command_queue.extend(commands);
    }

    /// Thread-safe handle for producers on other threads. Commands sent
    /// through it are drained at the next tick boundary.
    pub fn command_sender(&self) -> Sender<Command> {
        self.command_tx.clone()
    }

    /// Subscribe to the event bus. An empty topic list receives everything.
    pub fn subscribe(&self, topics: &[Topic]) -> Receiver<EventEnvelope> {
        self.bus.subscribe(topics)
    }

    /// Cloneable publisher handle onto the same bus.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    fn process_commands(&mut self) {
        self.command_queue.extend(self.command_rx.try_iter());
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::AddTarget(spec) => {
                self.add_target(spec);
            }
            Command::RemoveTarget { target_id } => {
                self.remove_target(&target_id);
            }
            Command::Dispatch {
                target_id,
                destination,
            } => {
                self.dispatch_unit(&target_id, destination);
            }
            Command::FormSquad {
                member_ids,
                formation,
            } => {
                self.form_squad(member_ids, formation);
            }
            Command::ReformSquad {
                squad_id,
                formation,
            } => {
                self.reform_squad(&squad_id, formation);
            }
            Command::OrderSquad { squad_id, order } => {
                self.order_squad(&squad_id, order);
            }
            Command::DispatchSquad {
                squad_id,
                destination,
            } => {
                self.dispatch_squad(&squad_id, destination);
            }
            Command::RallySquad { squad_id, point } => {
                self.rally_squad(&squad_id, point);
            }
            Command::ScatterSquad { squad_id } => {
                self.scatter_squad(&squad_id);
            }
            Command::SpawnHazard {
                kind,
                position,
                radius,
                duration,
            } => {
                self.spawn_hazard(kind, position, radius, duration);
            }
            Command::ClearHazards => self.clear_hazards(),
            Command::SetThreatLevel { level } => self.set_threat_level(level),
            Command::BindExternalTrack { target_id, source } => {
                self.bind_external_track(&target_id, source);
            }
            Command::UnbindExternalTrack { target_id } => {
                self.unbind_external_track(&target_id);
            }
            Command::Telemetry(report) => {
                if let Err(err) = self.apply_telemetry(&report) {
                    tracing::warn!(target_id = %report.target_id, %err, "telemetry dropped");
                }
            }
            Command::BeginWar => {
                self.begin_war();
            }
            Command::ResetGame => self.reset_game(),
        }
    }

    // --- Tick -----------------------------------------------------------

    /// Advance the simulation by `dt` seconds and return the resulting snapshot.
    /// A non-finite or negative `dt` advances the tick counter but not time.
    pub fn tick(&mut self, dt: f64) -> WorldSnapshot {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.process_commands();
        self.time.advance(dt);
        self.run_systems(dt);
        let events = self.flush_events();
        let mut snapshot = self.snapshot();
        snapshot.events = events;
        snapshot
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let now = self.time.elapsed_secs;

        // 1. Motion and waypoints
        systems::motion::run(&mut self.world, dt);

        // 2. Behavior decisions, then NPC cognition
        let requests =
            systems::behavior::run(&mut self.world, &mut self.coordinator, now, dt, &mut self.events);
        let zones = self.hazards.active_zones();
        let surroundings = Surroundings {
            pathfinder: Pathfinder::new(self.streets.as_ref(), &zones),
            cover: &self.cover,
            defended_point: self.config.defended_point,
            threat_level: self.escalation.level(),
        };
        systems::cognition::run(
            &mut self.world,
            &self.index,
            &mut self.cognition,
            &mut self.stimuli,
            &mut self.rng,
            &surroundings,
            now,
            dt,
        );

        // 3. Combat, then removal of spent projectiles and terminal targets.
        // Setup is idle: decisions still drive state machines, but nothing fires.
        if self.game.state() != GameState::Setup {
            systems::combat::fire(
                &mut self.world,
                requests,
                now,
                &mut self.next_projectile_id,
                &mut self.events,
                &mut self.stimuli,
            );
            systems::combat::advance(
                &mut self.world,
                dt,
                now,
                &self.cover,
                &mut self.events,
                &mut self.stimuli,
                &mut self.despawn_buffer,
            );
        }
        let removed = systems::cleanup::run(&mut self.world, &mut self.index, &mut self.despawn_buffer);
        for (id, status) in removed {
            self.forget(&id, status);
        }

        // 4. Cover and degradation caches
        systems::caches::run(&mut self.world, &self.cover, now);

        // 5. Hazards
        self.hazards.tick(dt, &mut self.events);

        // 6. Game mode and escalation
        let friendly_alive = self.count_alive(Alliance::Friendly);
        if let Some(wave) = self.game.update(dt, friendly_alive, &mut self.events) {
            let ids = self.spawn_wave(&wave);
            self.game.start_wave(ids, &mut self.events);
        }
        let hostiles = self.hostile_positions();
        self.escalation.update(
            &hostiles,
            self.config.defended_point,
            self.config.map_radius,
            &mut self.events,
        );
    }

    /// 7. Stamp, publish and return this tick's events.
    fn flush_events(&mut self) -> Vec<EventEnvelope> {
        let interval = self.config.telemetry_interval_ticks;
        if interval > 0 && self.time.tick % interval == 0 {
            self.events.push(SimEvent::SimTelemetry {
                targets: self.targets(),
                hazards: self.hazards.to_telemetry(),
            });
        }
        let (tick, time_secs) = (self.time.tick, self.time.elapsed_secs);
        let envelopes: Vec<EventEnvelope> = self
            .events
            .drain(..)
            .map(|event| EventEnvelope {
                tick,
                time_secs,
                event,
            })
            .collect();
        for envelope in &envelopes {
            self.bus.publish(envelope);
        }
        envelopes
    }

    /// Drop every per-id record of a target that left the registry.
    fn forget(&mut self, id: &str, status: TargetStatus) {
        self.game.record_removal(id, status);
        self.coordinator.forget(id);
        self.cognition.remove(id);
        self.squads.remove_member(id);
    }

    fn count_alive(&self, alliance: Alliance) -> usize {
        self.world
            .query::<&Target>()
            .iter()
            .filter(|(_, t)| t.is_alive() && t.is_combatant() && t.alliance() == alliance)
            .count()
    }

    fn hostile_positions(&self) -> Vec<Position> {
        self.world
            .query::<&Target>()
            .iter()
            .filter(|(_, t)| t.is_alive() && t.is_combatant() && t.alliance() == Alliance::Hostile)
            .map(|(_, t)| t.position)
            .collect()
    }

    fn spawn_wave(&mut self, wave: &WaveConfig) -> Vec<String> {
        let defended = self.config.defended_point;
        let distance = self.config.map_radius * self.game.config().spawn_distance_fraction;
        let positions = world_setup::hostile_spawn_positions(
            &mut self.rng,
            wave.hostile_count as usize,
            defended,
            distance,
        );
        let now = self.time.elapsed_secs;
        let zones = self.hazards.active_zones();
        let mut ids = Vec::with_capacity(positions.len());
        for position in positions {
            let id = self.next_id(wave.asset_type);
            let pathfinder = Pathfinder::new(self.streets.as_ref(), &zones);
            let entity = world_setup::spawn_hostile(
                &mut self.world,
                id.clone(),
                wave,
                position,
                defended,
                self.config.map_radius,
                &pathfinder,
                now,
            );
            self.index.insert(id.clone(), entity);
            ids.push(id);
        }
        ids
    }

    fn next_id(&mut self, asset_type: AssetType) -> String {
        loop {
            let counter = self.id_counters.entry(asset_type).or_insert(0);
            *counter += 1;
            let id = format!("{}-{:04}", asset_type.as_str(), *counter);
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    // --- Registry -------------------------------------------------------

    /// Place a new target. Returns its id, or `None` when the id is taken
    /// or the position is not finite.
    pub fn add_target(&mut self, spec: TargetSpec) -> Option<String> {
        if !spec.position.is_finite() {
            tracing::warn!(position = ?spec.position, "rejected target with non-finite position");
            return None;
        }
        let id = match spec.id {
            Some(id) if self.index.contains_key(&id) => {
                tracing::warn!(target_id = %id, "duplicate target id");
                return None;
            }
            Some(id) => id,
            None => self.next_id(spec.asset_type),
        };
        let name = spec.name.unwrap_or_else(|| id.clone());
        let mut target = Target::new(id.clone(), name, spec.alliance, spec.asset_type, spec.position);
        target.waypoints = spec.waypoints;
        target.loop_waypoints = spec.loop_waypoints;

        let now = self.time.elapsed_secs;
        let entity = world_setup::spawn_target(&mut self.world, target, now);
        if spec.alliance == Alliance::Neutral {
            if let Some(kind) = spec.asset_type.npc_kind() {
                let personality = Personality::random(&mut self.rng);
                self.cognition.insert(id.clone(), Brain::new(kind, personality, now));
            }
        }
        self.index.insert(id.clone(), entity);
        tracing::debug!(target_id = %id, "target added");
        Some(id)
    }

    /// Remove a target. Unknown ids are a no-op returning false.
    pub fn remove_target(&mut self, id: &str) -> bool {
        let Some(entity) = self.index.remove(id) else {
            return false;
        };
        let status = self
            .world
            .get::<&Target>(entity)
            .map(|t| t.status())
            .unwrap_or_default();
        let _ = self.world.despawn(entity);
        self.forget(id, status);
        true
    }

    pub fn get_target(&self, id: &str) -> Option<EntitySnapshot> {
        let entity = *self.index.get(id)?;
        systems::snapshot::entity_snapshot(&self.world, entity, &self.cognition)
    }

    /// Snapshots of every target, sorted by id.
    pub fn targets(&self) -> Vec<EntitySnapshot> {
        systems::snapshot::entity_snapshots(&self.world, &self.cognition)
    }

    pub fn brain(&self, id: &str) -> Option<&Brain> {
        self.cognition.get(id)
    }

    pub fn brain_mut(&mut self, id: &str) -> Option<&mut Brain> {
        self.cognition.get_mut(id)
    }

    /// Route a unit to `destination` through the pathfinder.
    pub fn dispatch_unit(&mut self, id: &str, destination: Position) -> bool {
        match self.try_dispatch(id, destination) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(target_id = %id, %err, "dispatch ignored");
                false
            }
        }
    }

    fn try_dispatch(&mut self, id: &str, destination: Position) -> SimResult<()> {
        if !destination.is_finite() {
            return Err(SimError::NonFinite(id.to_string()));
        }
        let entity = *self
            .index
            .get(id)
            .ok_or_else(|| SimError::UnknownTarget(id.to_string()))?;
        let (start, asset_type) = {
            let target = self
                .world
                .get::<&Target>(entity)
                .map_err(|_| SimError::UnknownTarget(id.to_string()))?;
            (target.position, target.asset_type)
        };
        let zones = self.hazards.active_zones();
        let route = Pathfinder::new(self.streets.as_ref(), &zones).plan(start, destination, asset_type);
        self.install_route(entity, id, route, false)
    }

    /// Install a looping or one-shot route without path planning.
    pub fn set_patrol(&mut self, id: &str, waypoints: Vec<Position>, loop_path: bool) -> bool {
        let Some(&entity) = self.index.get(id) else {
            return false;
        };
        if waypoints.iter().any(|p| !p.is_finite()) {
            return false;
        }
        self.install_route(entity, id, waypoints, loop_path).is_ok()
    }

    fn install_route(
        &mut self,
        entity: Entity,
        id: &str,
        route: Vec<Position>,
        loop_path: bool,
    ) -> SimResult<()> {
        {
            let mut controller = self
                .world
                .get::<&mut MotionController>(entity)
                .map_err(|_| SimError::NotMobile(id.to_string()))?;
            controller.set_path(route.clone(), loop_path);
        }
        if let Ok(mut target) = self.world.get::<&mut Target>(entity) {
            target.waypoints = route;
            target.loop_waypoints = loop_path;
        }
        let _ = self.world.remove_one::<Detour>(entity);
        Ok(())
    }

    // --- Squads ---------------------------------------------------------

    /// Form a squad from known ids; the first known member leads.
    pub fn form_squad(&mut self, member_ids: Vec<String>, formation: FormationKind) -> Option<String> {
        let mut seen = BTreeSet::new();
        let members: Vec<String> = member_ids
            .into_iter()
            .filter(|id| self.index.contains_key(id) && seen.insert(id.clone()))
            .collect();
        let squad_id = self.squads.form(members.clone(), formation)?;
        for id in &members {
            self.set_squad_ref(id, Some(squad_id.clone()));
        }
        tracing::debug!(%squad_id, size = members.len(), "squad formed");
        Some(squad_id)
    }

    pub fn reform_squad(&mut self, squad_id: &str, formation: FormationKind) -> bool {
        self.squads.reform(squad_id, formation)
    }

    pub fn order_squad(&mut self, squad_id: &str, order: SquadOrder) -> bool {
        let Some(squad) = self.squads.get(squad_id).cloned() else {
            return false;
        };
        match order {
            SquadOrder::Hold => {
                for id in &squad.member_ids {
                    if let Some(&entity) = self.index.get(id) {
                        if let Ok(mut controller) = self.world.get::<&mut MotionController>(entity) {
                            controller.stop();
                        }
                    }
                }
            }
            SquadOrder::Patrol { waypoints } => {
                if waypoints.is_empty() || waypoints.iter().any(|p| !p.is_finite()) {
                    return false;
                }
                let n = waypoints.len();
                let mut routes: BTreeMap<String, Vec<Position>> = BTreeMap::new();
                for (i, &point) in waypoints.iter().enumerate() {
                    let previous = waypoints[(i + n - 1) % n];
                    let heading = if previous == point {
                        0.0
                    } else {
                        previous.bearing_to(&point)
                    };
                    for (id, slot) in squad.slots(point, heading, FORMATION_SPACING) {
                        routes.entry(id).or_default().push(slot);
                    }
                }
                for (id, route) in routes {
                    self.set_patrol(&id, route, true);
                }
            }
        }
        true
    }

    /// Move the squad as a group, each member to its formation slot.
    pub fn dispatch_squad(&mut self, squad_id: &str, destination: Position) -> bool {
        let Some(squad) = self.squads.get(squad_id).cloned() else {
            return false;
        };
        let Some(centre) = self.centroid(&squad.member_ids) else {
            return false;
        };
        let heading = if centre == destination {
            0.0
        } else {
            centre.bearing_to(&destination)
        };
        for (id, slot) in squad.slots(destination, heading, FORMATION_SPACING) {
            self.dispatch_unit(&id, slot);
        }
        true
    }

    /// Gather the squad tightly around `point`.
    pub fn rally_squad(&mut self, squad_id: &str, point: Position) -> bool {
        let Some(squad) = self.squads.get(squad_id).cloned() else {
            return false;
        };
        for (id, slot) in squad.slots(point, 0.0, RALLY_SPACING) {
            self.dispatch_unit(&id, slot);
        }
        true
    }

    /// Send every member away from the squad centre and disband it.
    pub fn scatter_squad(&mut self, squad_id: &str) -> bool {
        let Some(squad) = self.squads.disband(squad_id) else {
            return false;
        };
        let centre = self.centroid(&squad.member_ids).unwrap_or(self.config.defended_point);
        let n = squad.member_ids.len().max(1);
        for (i, id) in squad.member_ids.iter().enumerate() {
            let position = self.get_target(id).map(|t| t.position).unwrap_or(centre);
            let bearing = if position.distance_to(&centre) > 1e-6 {
                centre.bearing_to(&position)
            } else {
                360.0 * i as f64 / n as f64
            };
            self.dispatch_unit(id, centre.offset_by_heading(bearing, SCATTER_DISTANCE));
            self.set_squad_ref(id, None);
        }
        true
    }

    fn centroid(&self, ids: &[String]) -> Option<Position> {
        let points: Vec<Position> = ids
            .iter()
            .filter_map(|id| self.index.get(id))
            .filter_map(|&e| self.world.get::<&Target>(e).ok().map(|t| t.position))
            .collect();
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        Some(Position::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        ))
    }

    fn set_squad_ref(&mut self, id: &str, squad_id: Option<String>) {
        if let Some(&entity) = self.index.get(id) {
            if let Ok(mut target) = self.world.get::<&mut Target>(entity) {
                target.squad_id = squad_id;
            }
        }
    }

    // --- Environment ----------------------------------------------------

    pub fn spawn_hazard(&mut self, kind: HazardKind, center: Position, radius: f64, duration: f64) -> Option<String> {
        if !center.is_finite() || !radius.is_finite() || !duration.is_finite() {
            return None;
        }
        Some(self.hazards.spawn(kind, center, radius, duration, &mut self.events))
    }

    /// Scatter `count` random hazards over the map.
    pub fn spawn_random_hazards(&mut self, count: usize) -> Vec<String> {
        self.hazards.spawn_random(
            count,
            self.config.defended_point,
            self.config.map_radius,
            &mut self.rng,
            &mut self.events,
        )
    }

    pub fn clear_hazards(&mut self) {
        self.hazards.clear(&mut self.events);
    }

    pub fn is_blocked(&self, p: Position) -> bool {
        self.hazards.is_blocked(p)
    }

    pub fn add_cover(&mut self, center: Position, radius: f64, value: f64) {
        self.cover.add(CoverObject::new(center, radius, value));
    }

    pub fn clear_cover(&mut self) {
        self.cover.clear();
    }

    /// Building footprints blocking line of sight for ground units.
    pub fn set_obstacles(&mut self, polygons: Vec<Vec<Position>>) {
        let obstacles = Obstacles::new(polygons);
        self.coordinator.set_obstacles(obstacles.clone());
        self.obstacles = obstacles;
    }

    pub fn obstacles(&self) -> &Obstacles {
        &self.obstacles
    }

    /// Load road geometry for the area of interest. Empty input unloads it.
    pub fn load_streets(&mut self, polylines: &[Vec<Position>]) {
        let graph = StreetGraph::from_polylines(polylines);
        tracing::info!(nodes = graph.node_count(), edges = graph.edge_count(), "street graph loaded");
        self.streets = (!graph.is_empty()).then_some(graph);
    }

    /// Pin the escalation tier, or return to automatic assessment with `None`.
    pub fn set_threat_level(&mut self, level: Option<ThreatLevel>) {
        self.escalation.set_manual(level, &mut self.events);
    }

    // --- NPCs -----------------------------------------------------------

    /// Spawn `count` ambient non-combatants with seeded personalities.
    pub fn spawn_npcs(&mut self, count: usize) -> Vec<String> {
        let now = self.time.elapsed_secs;
        let area = self.config.map_radius * 0.8;
        (0..count)
            .map(|_| {
                let asset_type = world_setup::random_npc_type(&mut self.rng);
                let position =
                    world_setup::random_point_in_disc(&mut self.rng, self.config.defended_point, area);
                let id = self.next_id(asset_type);
                let entity = world_setup::spawn_npc(
                    &mut self.world,
                    &mut self.cognition,
                    &mut self.rng,
                    id.clone(),
                    asset_type,
                    position,
                    now,
                );
                self.index.insert(id.clone(), entity);
                id
            })
            .collect()
    }

    // --- External control -----------------------------------------------

    /// Hand a target to an external controller. Its motion and decisions
    /// then come only from mirrored telemetry.
    pub fn bind_external_track(&mut self, id: &str, source: impl Into<String>) -> bool {
        let Some(&entity) = self.index.get(id) else {
            return false;
        };
        let track = ExternalTrack {
            source: source.into(),
            last_report_secs: self.time.elapsed_secs,
        };
        if self.world.insert_one(entity, track).is_err() {
            return false;
        }
        if let Ok(mut controller) = self.world.get::<&mut MotionController>(entity) {
            controller.stop();
        }
        self.cognition.set_bound(id, true);
        true
    }

    pub fn unbind_external_track(&mut self, id: &str) -> bool {
        let Some(&entity) = self.index.get(id) else {
            return false;
        };
        let removed = self.world.remove_one::<ExternalTrack>(entity).is_ok();
        self.cognition.set_bound(id, false);
        removed
    }

    /// Mirror one report from a bound robot or tracker.
    pub fn apply_telemetry(&mut self, report: &RobotTelemetry) -> SimResult<()> {
        let id = report.target_id.as_str();
        let entity = *self
            .index
            .get(id)
            .ok_or_else(|| SimError::UnknownTarget(id.to_string()))?;
        if !report.position.is_finite() {
            return Err(SimError::Telemetry(format!("non-finite position for {id}")));
        }
        let now = self.time.elapsed_secs;
        {
            let mut track = self
                .world
                .get::<&mut ExternalTrack>(entity)
                .map_err(|_| SimError::Telemetry(format!("{id} is not bound to an external track")))?;
            track.last_report_secs = now;
        }
        {
            let mut target = self
                .world
                .get::<&mut Target>(entity)
                .map_err(|_| SimError::UnknownTarget(id.to_string()))?;
            target.position = report.position;
            if let Some(heading) = report.heading.filter(|h| h.is_finite()) {
                target.heading = wrap_degrees(heading);
            }
            if let Some(speed) = report.speed.filter(|s| s.is_finite()) {
                target.speed = speed.max(0.0);
            }
            if let Some(battery) = report.battery {
                target.set_battery(battery);
            }
        }
        if let Ok(mut controller) = self.world.get::<&mut MotionController>(entity) {
            controller.position = report.position;
        }
        if let Some(state) = report.fsm_state {
            self.force_unit_state(id, state);
        }
        Ok(())
    }

    /// Set a unit's state machine without its guard. For externally
    /// mirrored state only; internal decisions use guarded transitions.
    pub fn force_unit_state(&mut self, id: &str, state: UnitState) -> bool {
        let Some(&entity) = self.index.get(id) else {
            return false;
        };
        let now = self.time.elapsed_secs;
        let Ok(mut fsm) = self.world.get::<&mut UnitFsm>(entity) else {
            return false;
        };
        if let Some(from) = fsm.force_state(state, now) {
            self.events.push(SimEvent::RobotFsmStateChange {
                target_id: id.to_string(),
                from,
                to: state,
                forced: true,
            });
        }
        true
    }

    // --- Game -----------------------------------------------------------

    /// Start the wave loop. Only valid from setup.
    pub fn begin_war(&mut self) -> bool {
        let friendlies = self.count_alive(Alliance::Friendly);
        match self.game.begin_war(friendlies, &mut self.events) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "begin_war ignored");
                false
            }
        }
    }

    /// Reinitialize every subsystem and the registry. Map geometry
    /// (streets, obstacles, cover) is kept.
    pub fn reset_game(&mut self) {
        tracing::info!("reset");
        self.world.clear();
        self.index.clear();
        self.time = SimTime::default();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.command_queue.clear();
        while self.command_rx.try_recv().is_ok() {}
        self.despawn_buffer.clear();
        self.events.clear();
        self.stimuli.clear();
        self.coordinator.clear_state();
        self.cognition.clear();
        self.hazards.reset();
        self.squads.clear();
        self.game.reset();
        self.escalation.reset();
        self.id_counters.clear();
        self.next_projectile_id = 0;
        self.populate_ambient();
    }

    /// Current visible state, without this tick's events.
    pub fn snapshot(&self) -> WorldSnapshot {
        let hostiles = self.count_alive(Alliance::Hostile);
        WorldSnapshot {
            time: self.time,
            game: self.game.view(hostiles, self.escalation.level()),
            targets: self.targets(),
            hazards: self.hazards.to_telemetry(),
            squads: self.squads.snapshots(),
            events: Vec::new(),
        }
    }
}

//! Simulation constants and tuning parameters.

/// Nominal tick rate used by the realtime runner (Hz).
pub const TICK_RATE: u32 = 10;

/// Seconds per nominal tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- World ---

/// Default battlespace radius in map units.
pub const DEFAULT_MAP_RADIUS: f64 = 200.0;

// --- Motion ---

/// Distance at which a waypoint counts as reached.
pub const ARRIVAL_TOLERANCE: f64 = 0.75;

/// Default acceleration (units/s²).
pub const DEFAULT_ACCELERATION: f64 = 2.0;

/// Default deceleration (units/s²).
pub const DEFAULT_DECELERATION: f64 = 4.0;

/// Default turn rate (degrees per second).
pub const DEFAULT_TURN_RATE: f64 = 180.0;

/// Collinearity tolerance used when smoothing dispatched paths.
pub const PATH_SMOOTHING_TOLERANCE: f64 = 0.25;

// --- Battery ---

/// Battery drained per second of movement at full speed.
pub const BATTERY_DRAIN_PER_SEC: f64 = 0.0015;

/// Below this charge the target reports low-battery and is speed-capped.
pub const LOW_BATTERY_THRESHOLD: f64 = 0.10;

/// Speed factor applied while on low battery.
pub const LOW_BATTERY_SPEED_FACTOR: f64 = 0.5;

// --- Street graph ---

/// Grid precision used to merge shared intersections into one node.
pub const STREET_NODE_PRECISION: f64 = 0.1;

/// Extra clearance kept from a hazard edge when routing around it.
pub const HAZARD_DETOUR_MARGIN: f64 = 1.5;

// --- Degradation ---

/// Health fraction at or above which performance is not degraded.
pub const DEGRADATION_THRESHOLD: f64 = 0.5;

/// Health fraction below which firing is disallowed entirely.
pub const FIRE_DISABLE_THRESHOLD: f64 = 0.10;

/// Fraction of base speed kept at zero health.
pub const MIN_SPEED_FACTOR: f64 = 0.4;

/// Fraction of base damage output kept at zero health.
pub const MIN_DAMAGE_FACTOR: f64 = 0.6;

// --- Cover ---

/// Hard cap on the damage reduction any cover object can grant.
pub const MAX_COVER_BONUS: f64 = 0.8;

// --- Combat ---

/// Collision radius of a projectile against a target.
pub const PROJECTILE_HIT_RADIUS: f64 = 1.5;

/// Projectiles fly at most this multiple of the firing weapon's range.
pub const PROJECTILE_RANGE_FACTOR: f64 = 1.5;

/// How long a target counts as "under fire" after being hit (seconds).
pub const UNDER_FIRE_WINDOW_SECS: f64 = 2.0;

/// Turrets track contacts out to this multiple of weapon range.
pub const TRACKING_RANGE_FACTOR: f64 = 1.5;

/// Friendly robots below this health fraction return to the defended point.
pub const RETURN_HEALTH: f64 = 0.25;

// --- Hostile tactics ---

pub const DODGE_DURATION_SECS: f64 = 0.8;
pub const DODGE_DISTANCE: f64 = 3.0;
pub const DODGE_COOLDOWN_SECS: f64 = 3.0;
pub const FLANK_DURATION_SECS: f64 = 4.0;
/// Flank when the enemy is within this multiple of weapon range.
pub const FLANK_TRIGGER_RANGE_FACTOR: f64 = 1.6;
/// Angle swung around the enemy when flanking (degrees).
pub const FLANK_ANGLE_DEG: f64 = 60.0;
pub const GROUP_RUSH_MIN_SIZE: usize = 3;
pub const GROUP_RUSH_RADIUS: f64 = 8.0;
pub const GROUP_RUSH_DURATION_SECS: f64 = 5.0;
pub const GROUP_RUSH_SPEED_FACTOR: f64 = 1.5;
pub const RECON_SPEED_FACTOR: f64 = 0.6;
/// Recon-advance applies while the enemy is inside this multiple of weapon range.
pub const RECON_RANGE_FACTOR: f64 = 2.5;
pub const SUPPRESS_COOLDOWN_FACTOR: f64 = 0.5;
pub const DETECTION_RADIUS: f64 = 25.0;
pub const DETECTED_RETREAT_SPEED_FACTOR: f64 = 1.3;
pub const DETECTED_RETREAT_DURATION_SECS: f64 = 3.0;
pub const DETECTED_RETREAT_HEALTH: f64 = 0.5;
pub const DETECTED_RETREAT_DISTANCE: f64 = 6.0;
/// Rush cooldown after a group rush ends (seconds).
pub const GROUP_RUSH_COOLDOWN_SECS: f64 = 5.0;

// --- NPC cognition ---

/// Maximum number of events retained in an NPC memory.
pub const MEMORY_CAPACITY: usize = 32;
/// Time constant of danger decay (seconds).
pub const DANGER_DECAY_SECS: f64 = 20.0;
/// Time constant of interest decay (seconds).
pub const INTEREST_DECAY_SECS: f64 = 10.0;
/// Events within this distance of an NPC count as hostile-proximate.
pub const HOSTILE_PROXIMITY_RADIUS: f64 = 30.0;
/// Radius within which brains perceive combat events.
pub const DEFAULT_HEARING_RADIUS: f64 = 60.0;
/// Identical events from one source within this window are perceived once.
pub const REACTOR_DEBOUNCE_SECS: f64 = 1.0;
/// Radius within which panic and curiosity spread between brains.
pub const DEFAULT_CROWD_RADIUS: f64 = 8.0;
/// Fraction of a neighbour's excess level absorbed per second.
pub const CONTAGION_RATE: f64 = 0.3;
/// Seconds between fallback decisions of a brain.
pub const NPC_DECISION_INTERVAL_SECS: f64 = 0.5;
/// Danger level at which a brain flees.
pub const FLEE_DANGER: f64 = 0.6;
/// Danger level at which a brain panics.
pub const PANIC_DANGER: f64 = 0.9;
/// Interest level at which a curious brain investigates.
pub const CURIOUS_INTEREST: f64 = 0.4;
/// Seconds of uninterrupted walking or wandering before a rest.
pub const NPC_RESTLESS_SECS: f64 = 20.0;
/// Seconds a resting NPC stays put.
pub const NPC_REST_SECS: f64 = 5.0;
/// Seconds a stopped vehicle waits before parking.
pub const VEHICLE_PARK_AFTER_SECS: f64 = 10.0;
/// Seconds a vehicle stays parked.
pub const VEHICLE_PARKED_SECS: f64 = 20.0;
/// Distance a walking NPC picks its next stroll point within.
pub const NPC_WANDER_RADIUS: f64 = 15.0;
/// Distance a fleeing NPC runs from the danger it remembers.
pub const NPC_FLEE_DISTANCE: f64 = 25.0;

/// Speed multiplier for fleeing, panicking or evading NPCs.
pub const NPC_FLEE_SPEED_SCALE: f64 = 1.5;
/// Default size of the ambient NPC population.
pub const DEFAULT_NPC_POPULATION: usize = 0;

// --- Radicalization ---

pub const RADICALIZATION_EVENT_THRESHOLD: usize = 3;
pub const RADICALIZATION_AGGRESSION_CUTOFF: f64 = 0.7;

// --- Escalation ---

/// Hostiles within this fraction of the map radius of the defended point escalate to red.
pub const ESCALATION_INNER_FRACTION: f64 = 0.25;
/// Hostiles within this fraction of the map radius escalate to orange.
pub const ESCALATION_MID_FRACTION: f64 = 0.5;
/// This many active hostiles escalate to orange regardless of distance.
pub const ESCALATION_ORANGE_COUNT: usize = 5;

// --- Squads ---

/// Distance between neighbouring slots of a formation.
pub const FORMATION_SPACING: f64 = 3.0;
/// Slot spacing used when a squad rallies on a point.
pub const RALLY_SPACING: f64 = 1.5;
/// How far members run from the squad centre when scattering.
pub const SCATTER_DISTANCE: f64 = 15.0;

// --- Hazards ---

pub const RANDOM_HAZARD_MIN_RADIUS: f64 = 3.0;
pub const RANDOM_HAZARD_MAX_RADIUS: f64 = 8.0;
pub const RANDOM_HAZARD_MIN_SECS: f64 = 20.0;
pub const RANDOM_HAZARD_MAX_SECS: f64 = 60.0;

// --- Game mode ---

pub const DEFAULT_COUNTDOWN_SECS: f64 = 5.0;
pub const DEFAULT_WAVE_PAUSE_SECS: f64 = 5.0;
pub const DEFAULT_SPAWN_DISTANCE_FRACTION: f64 = 0.9;
/// Hostiles leaving the map beyond this multiple of the radius escape.
pub const EXIT_DISTANCE_FACTOR: f64 = 1.1;
/// Half-width of the sector a wave's hostiles spawn in (degrees).
pub const HOSTILE_SPAWN_SPREAD_DEG: f64 = 30.0;

// --- Telemetry / channels ---

pub const DEFAULT_TELEMETRY_INTERVAL_TICKS: u64 = 10;
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_COMMAND_QUEUE_CAPACITY: usize = 256;

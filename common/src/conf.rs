//! Configuration
//!
//! Engine tunables that aren't operator-configurable live here as plain
//! constants, in the same spirit as the teacher's `conf` module. Operator
//! configuration (listen port, session secret, OAuth credentials, base URL)
//! is read from the environment by `cli` on the server binary.

/// The name of this application
pub const APP_NAME: &str = "warbotsd";

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_SUBTITLE: &str = "Simultaneous-turn grid strategy server";

/// Minimum and maximum number of players allowed in a game.
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 8;

/// Turn timer bounds, in seconds.
pub const MIN_TURN_TIMER_SECS: u64 = 30;
pub const MAX_TURN_TIMER_SECS: u64 = 604_800;

/// Delay after a turn advances before an AI player's orders are generated,
/// giving humans time to submit first.
pub const AI_DELAY_SECS: u64 = 20;

/// Subscriber heartbeat interval.
pub const HEARTBEAT_SECS: u64 = 30;

/// Fraction of the grid's area that becomes regular (non-homeworld) planets.
pub const REGULAR_PLANET_DENSITY: f64 = 0.10;

/// Minimum Euclidean distance enforced between homeworlds at map generation.
pub const MIN_HOMEWORLD_SPACING: f64 = 10.0;

/// Minimum Euclidean distance enforced between a regular planet and any
/// homeworld or other planet.
pub const MIN_PLANET_SPACING: f64 = 4.5;

/// Attempt budgets for map generation.
pub const MAX_HOMEWORLD_ATTEMPTS: u32 = 1000;
pub const MAX_PLANET_ATTEMPTS_FACTOR: u32 = 100;

/// Margin (as a fraction of grid size) within which homeworld edge-sampling
/// and interior-sampling both operate.
pub const HOMEWORLD_EDGE_MARGIN: f64 = 0.10;

pub const HOMEWORLD_BASE_INCOME: i64 = 5;
pub const REGULAR_PLANET_INCOME_RANGE: (i64, i64) = (1, 3);

/// Fortification hit points. The teacher's original schema used 10; the
/// later, richer schema (and this spec) uses 30.
pub const FORTIFICATION_MAX_HP: i64 = 30;
pub const FORTIFICATION_REPAIR_PER_TURN: i64 = 5;
pub const MECH_REPAIR_PER_TURN: i64 = 2;

/// Combat safety valve: after this many rounds, the side with more
/// remaining mechs is declared the winner (ties go to the defender).
pub const MAX_COMBAT_ROUNDS: u32 = 20;

pub const VISIBILITY_RADIUS_PLANET: u16 = 3;
pub const VISIBILITY_RADIUS_MECH: u16 = 2;

pub const BUILDING_COST_MINING: i64 = 10;
pub const BUILDING_COST_FACTORY: i64 = 30;
pub const BUILDING_COST_FORTIFICATION: i64 = 25;

pub const MECH_COST_LIGHT: i64 = 2;
pub const MECH_COST_MEDIUM: i64 = 5;
pub const MECH_COST_HEAVY: i64 = 12;
pub const MECH_COST_ASSAULT: i64 = 20;

pub const MECH_MAINTENANCE_LIGHT: i64 = 1;
pub const MECH_MAINTENANCE_MEDIUM: i64 = 2;
pub const MECH_MAINTENANCE_HEAVY: i64 = 3;
pub const MECH_MAINTENANCE_ASSAULT: i64 = 4;

pub const MINING_INCOME_BONUS: i64 = 2;

pub const DESIGNATION_MIN_DIGITS: usize = 4;

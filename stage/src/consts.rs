//! Shared numeric constants for the stage crate.

// ── Timing ──────────────────────────────────────────────────────

/// Nominal frame duration in milliseconds. Velocities are in units per nominal frame.
pub const NOMINAL_DT: f64 = 16.0;

/// Length of the frame-rate measurement window in milliseconds.
pub const FPS_WINDOW_MS: f64 = 1000.0;

// ── Physics ─────────────────────────────────────────────────────

/// Distance from each viewport edge where entities bounce.
pub const BOUNDARY_MARGIN: f64 = 50.0;

/// Fraction of speed kept (and inverted) on a wall bounce.
pub const RESTITUTION: f64 = 0.9;

/// Per-tick velocity damping factor.
pub const DAMPING: f64 = 0.999;

/// Half-width of the uniform velocity jitter added each tick.
pub const JITTER: f64 = 0.005;

// ── Entities ────────────────────────────────────────────────────

/// Footprint of an entity whose image has not resolved yet.
pub const DEFAULT_ENTITY_SIZE: f64 = 100.0;

/// Edge length of the substitute image bound when an asset fails to load.
pub const PLACEHOLDER_SIZE: f64 = 100.0;

// ── Behaviors ───────────────────────────────────────────────────

/// Seconds between disperse emissions.
pub const DISPERSE_INTERVAL: f64 = 0.1;

/// Particles per disperse emission.
pub const DISPERSE_COUNT: usize = 3;

/// Particles in one explode burst.
pub const EXPLODE_COUNT: usize = 20;

/// Seconds an explode shake lasts before the cycle restarts.
pub const EXPLODE_CYCLE: f64 = 2.0;

/// Peak shake displacement, peak to peak.
pub const EXPLODE_SHAKE: f64 = 10.0;

/// Paired fighters attract only while farther apart than this.
pub const FIGHT_ATTRACT_DISTANCE: f64 = 50.0;

/// Paired fighters spark while closer than this.
pub const FIGHT_CONTACT_DISTANCE: f64 = 60.0;

/// Velocity increment toward the opponent per tick.
pub const FIGHT_PULL: f64 = 0.5;

/// Seconds between contact spark bursts.
pub const SPARK_INTERVAL: f64 = 0.05;

/// Particles per contact spark burst.
pub const SPARK_COUNT: usize = 5;

/// Rightward speed of an entity streaming in, in units per nominal frame.
pub const STREAM_SPEED: f64 = 4.0;

/// Stream-in finishes once x passes this fraction of the viewport width.
pub const STREAM_FINISH_FRACTION: f64 = 0.1;

// ── Particles ───────────────────────────────────────────────────

/// Downward acceleration of particles: added to `vy` per millisecond of step.
pub const PARTICLE_GRAVITY: f64 = 0.1;

/// Per-entity particle cap; the oldest particles are dropped beyond it.
pub const MAX_BATCH_PARTICLES: usize = 512;

// ── Debug overlay ───────────────────────────────────────────────

/// Baseline of the first overlay line.
pub const DEBUG_TEXT_TOP: f64 = 20.0;

/// Vertical distance between overlay lines.
pub const DEBUG_LINE_HEIGHT: f64 = 15.0;

/// Left edge of overlay text.
pub const DEBUG_TEXT_LEFT: f64 = 10.0;

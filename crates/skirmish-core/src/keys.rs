//! Well-known metadata keys.
//!
//! Executors write these and rules read them, so both sides share the
//! names from here.

/// `bool`: the unit is mid-jump.
pub const JUMPING: &str = "jumping";
/// `f32`: jump launch x.
pub const JUMP_ORIGIN_X: &str = "jump_origin_x";
/// `f32`: jump launch y.
pub const JUMP_ORIGIN_Y: &str = "jump_origin_y";
/// `f32`: jump landing x.
pub const JUMP_TARGET_X: &str = "jump_target_x";
/// `f32`: jump landing y.
pub const JUMP_TARGET_Y: &str = "jump_target_y";
/// `u64`: tick the jump started on.
pub const JUMP_START: &str = "jump_start";
/// `u64`: jump flight time in ticks.
pub const JUMP_DURATION: &str = "jump_duration";
/// `f32`: jump peak height.
pub const JUMP_HEIGHT: &str = "jump_height";

/// `u64`: tick on which the current attack animation ends.
pub const ATTACK_END_TICK: &str = "attack_end_tick";

/// Array of `{status, amount, until}` objects.
pub const EFFECTS: &str = "effects";
/// `bool`: the unit cannot move or act.
pub const STUNNED: &str = "stunned";
/// `bool`: the unit moves at half speed.
pub const SLOWED: &str = "slowed";

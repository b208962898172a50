//! Unit data model and the canonical small-integer encodings.
//!
//! `Team`, `UnitState` and `ProjectileKind` are stored as `u8` in the hot
//! arrays. The discriminants declared here are the single source of truth
//! for that encoding: every consumer, including the vectorised batch paths,
//! decodes through [`Team::from_code`] and [`UnitState::from_code`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::id::UnitId;
use crate::meta::Meta;

/// Allegiance of a unit or projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Team {
    /// Belongs to nobody; never hostile to anyone.
    #[default]
    Neutral = 0,
    /// Player side.
    Friendly = 1,
    /// Opposing side.
    Hostile = 2,
}

impl Team {
    /// Stored code for this team.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a stored team code. Unknown codes decode as `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Neutral),
            1 => Some(Self::Friendly),
            2 => Some(Self::Hostile),
            _ => None,
        }
    }

    /// Whether two teams fight each other. Neutral fights nobody.
    pub fn is_enemy_of(self, other: Team) -> bool {
        matches!(
            (self, other),
            (Team::Friendly, Team::Hostile) | (Team::Hostile, Team::Friendly)
        )
    }

    /// Parse the lower-case name used in command params and templates.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "neutral" => Some(Self::Neutral),
            "friendly" => Some(Self::Friendly),
            "hostile" => Some(Self::Hostile),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neutral => write!(f, "neutral"),
            Self::Friendly => write!(f, "friendly"),
            Self::Hostile => write!(f, "hostile"),
        }
    }
}

/// Lifecycle state of a unit.
///
/// Transitions are driven entirely by commands:
/// `Idle → Moving → Attacking → Dead`. `Dead` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum UnitState {
    /// Standing still.
    #[default]
    Idle = 0,
    /// Moved this tick.
    Moving = 1,
    /// Engaged in an attack.
    Attacking = 2,
    /// Terminal. Never leaves this state.
    Dead = 3,
}

impl UnitState {
    /// Stored code for this state.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a stored state code. Unknown codes decode as `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Idle),
            1 => Some(Self::Moving),
            2 => Some(Self::Attacking),
            3 => Some(Self::Dead),
            _ => None,
        }
    }

    /// Whether a raw stored code means dead.
    ///
    /// Hot loops use this instead of comparing against a literal.
    pub fn code_is_dead(code: u8) -> bool {
        code == Self::Dead as u8
    }
}

/// Flight model of a projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ProjectileKind {
    /// Travels in a straight line and hits the first enemy it touches.
    #[default]
    Bullet = 0,
    /// Lobbed along an arc; explodes where it lands.
    Bomb = 1,
}

impl ProjectileKind {
    /// Stored code for this kind.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a stored kind code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Bullet),
            1 => Some(Self::Bomb),
            _ => None,
        }
    }
}

/// A 2D vector in field units (one unit = one tile).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component (grows east).
    pub x: f32,
    /// Vertical component (grows south).
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct a vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared length.
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Squared distance to another point.
    pub fn distance_squared(self, other: Vec2) -> f32 {
        (self - other).length_squared()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len > f32::EPSILON {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }

    /// Shorten the vector to at most `max` length.
    pub fn clamp_length(self, max: f32) -> Vec2 {
        let len = self.length();
        if len > max && len > f32::EPSILON {
            self * (max / len)
        } else {
            self
        }
    }

    /// Whether both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Heterogeneous, variable-size per-unit data kept out of the hot arrays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColdData {
    /// Sprite key consumed by the renderer.
    pub sprite: Option<String>,
    /// Ability names, resolved against the ability book.
    pub abilities: Vec<String>,
    /// Free-form tags (`"ai"`, `"flying"`, ...).
    pub tags: Vec<String>,
    /// Free-form metadata dictionary.
    pub meta: Meta,
    /// Template name the unit was spawned from.
    pub unit_type: Option<String>,
    /// Behavioural posture (`"hold"`, `"aggressive"`, ...).
    pub posture: Option<String>,
    /// Unit this one intends to attack.
    pub intended_target: Option<UnitId>,
    /// Tick at which each ability was last used.
    pub last_ability_tick: IndexMap<String, u64>,
}

impl ColdData {
    /// Whether the unit carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Read a boolean metadata flag; missing or non-boolean reads `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.meta
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Complete description of a unit, used to add it to the store and
/// returned when it is removed.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitRecord {
    /// Stable id. Must be non-empty.
    pub id: UnitId,
    /// Ground position.
    pub position: Vec2,
    /// Vertical offset above the ground (airborne units).
    pub z: f32,
    /// Movement the unit wants to make next tick.
    pub intended_move: Vec2,
    /// Current hit points.
    pub hp: f32,
    /// Hit point ceiling.
    pub max_hp: f32,
    /// Damage dealt per strike.
    pub damage: f32,
    /// Mass, divides applied forces.
    pub mass: f32,
    /// Allegiance.
    pub team: Team,
    /// Lifecycle state.
    pub state: UnitState,
    /// Everything that is not hot.
    pub cold: ColdData,
}

impl UnitRecord {
    /// A unit with default stats (100 hp, 1 damage, mass 1) at `position`.
    pub fn new(id: impl Into<UnitId>, team: Team, position: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            z: 0.0,
            intended_move: Vec2::ZERO,
            hp: 100.0,
            max_hp: 100.0,
            damage: 1.0,
            mass: 1.0,
            team,
            state: UnitState::Idle,
            cold: ColdData::default(),
        }
    }

    /// Set both current and maximum hit points.
    pub fn with_hp(mut self, hp: f32) -> Self {
        self.hp = hp;
        self.max_hp = hp;
        self
    }

    /// Set strike damage.
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set mass.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Replace the cold data.
    pub fn with_cold(mut self, cold: ColdData) -> Self {
        self.cold = cold;
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.cold.tags.push(tag.into());
        self
    }

    /// Add an ability by name.
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.cold.abilities.push(ability.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_codes_round_trip() {
        for team in [Team::Neutral, Team::Friendly, Team::Hostile] {
            assert_eq!(Team::from_code(team.code()), Some(team));
        }
        assert_eq!(Team::from_code(9), None);
    }

    #[test]
    fn dead_has_a_single_canonical_code() {
        assert_eq!(UnitState::Dead.code(), 3);
        assert!(UnitState::code_is_dead(3));
        // 5 is not a state code.
        assert!(!UnitState::code_is_dead(5));
        assert_eq!(UnitState::from_code(5), None);
    }

    #[test]
    fn neutral_is_nobodys_enemy() {
        assert!(Team::Friendly.is_enemy_of(Team::Hostile));
        assert!(Team::Hostile.is_enemy_of(Team::Friendly));
        assert!(!Team::Neutral.is_enemy_of(Team::Hostile));
        assert!(!Team::Friendly.is_enemy_of(Team::Friendly));
    }

    #[test]
    fn vec2_clamp_and_normalize() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.length(), 5.0);
        let c = v.clamp_length(1.0);
        assert!((c.length() - 1.0).abs() < 1e-6);
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        assert_eq!(Vec2::new(0.5, 0.0).clamp_length(1.0), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn cold_data_deserializes_with_defaults() {
        let cold: ColdData = serde_json::from_str(r#"{"tags":["ai"]}"#).unwrap();
        assert!(cold.has_tag("ai"));
        assert!(cold.abilities.is_empty());
        assert!(!cold.flag("jumping"));
    }

    #[test]
    fn record_builder_sets_stats() {
        let r = UnitRecord::new("a", Team::Hostile, Vec2::new(1.0, 2.0))
            .with_hp(50.0)
            .with_damage(10.0)
            .with_tag("ai");
        assert_eq!(r.hp, 50.0);
        assert_eq!(r.max_hp, 50.0);
        assert_eq!(r.damage, 10.0);
        assert!(r.cold.has_tag("ai"));
        assert_eq!(r.state, UnitState::Idle);
    }
}

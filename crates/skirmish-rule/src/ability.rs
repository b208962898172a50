//! Ability and effect data.
//!
//! Abilities arrive as data: a cooldown, a range, a target selector, a
//! trigger predicate and a list of [`EffectDescriptor`]s. The predicate is
//! compiled elsewhere; this crate only stores it. Effects travel through
//! the command queue as `effect` commands and are expanded by the engine.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use skirmish_store::UnitProxy;

use crate::context::TickContext;

/// One thing an ability does to its target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDescriptor {
    /// Direct damage to the target.
    Damage {
        /// Hit points removed.
        amount: f32,
    },
    /// Direct healing of the target.
    Heal {
        /// Hit points restored.
        amount: f32,
    },
    /// Damage everything near the target.
    Aoe {
        /// Blast radius.
        radius: f32,
        /// Hit points removed per unit.
        amount: f32,
        /// Whether the caster's team is hit too.
        #[serde(default)]
        friendly_fire: bool,
    },
    /// Apply a timed status effect to the target.
    Status {
        /// Status name (`"burn"`, `"regen"`, `"stun"`, `"slow"`).
        status: String,
        /// Lifetime in ticks.
        duration: u64,
        /// Per-tick magnitude, where it applies.
        #[serde(default)]
        amount: f32,
    },
    /// The caster leaps to the target.
    Jump {
        /// Flight time in ticks.
        #[serde(default)]
        duration: Option<u64>,
        /// Peak height.
        #[serde(default)]
        height: Option<f32>,
    },
    /// Shove the target away from the caster.
    Knockback {
        /// Force applied; divided by the target's mass.
        force: f32,
    },
    /// Create units next to the caster.
    Spawn {
        /// Template name.
        unit_type: String,
        /// How many.
        #[serde(default = "one")]
        count: u32,
    },
    /// Fire a projectile at the target.
    Projectile {
        /// Tiles per tick (bullets).
        #[serde(default = "default_speed")]
        speed: f32,
        /// Damage on hit.
        damage: f32,
        /// Lob a bomb instead of firing a bullet.
        #[serde(default)]
        lobbed: bool,
        /// Explosion radius for bombs.
        #[serde(default)]
        aoe_radius: f32,
    },
}

fn one() -> u32 {
    1
}

fn default_speed() -> f32 {
    1.0
}

/// Who an ability is aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelector {
    /// The caster itself.
    #[serde(rename = "self")]
    Caster,
    /// The closest living enemy.
    #[default]
    NearestEnemy,
    /// The closest living teammate.
    NearestAlly,
    /// The living enemy with the fewest hit points.
    WeakestEnemy,
}

/// Compiled trigger: `(caster, target, ctx) -> fire?`.
pub type Trigger = Box<dyn Fn(&UnitProxy<'_>, &UnitProxy<'_>, &TickContext<'_>) -> bool>;

/// Serializable part of an ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilitySpec {
    /// Unique name.
    pub name: String,
    /// Ticks between uses.
    #[serde(default)]
    pub cooldown: u64,
    /// Maximum caster-to-target distance.
    pub range: f32,
    /// Target selection.
    #[serde(default)]
    pub target: TargetSelector,
    /// What happens on use.
    pub effects: Vec<EffectDescriptor>,
}

/// An ability ready to run.
pub struct CompiledAbility {
    /// Unique name.
    pub name: String,
    /// Ticks between uses.
    pub cooldown: u64,
    /// Maximum caster-to-target distance.
    pub range: f32,
    /// Target selection.
    pub target: TargetSelector,
    /// Fire condition.
    pub trigger: Trigger,
    /// What happens on use.
    pub effects: Vec<EffectDescriptor>,
}

impl CompiledAbility {
    /// Combine a spec with a compiled trigger.
    pub fn new(spec: AbilitySpec, trigger: Trigger) -> Self {
        Self {
            name: spec.name,
            cooldown: spec.cooldown,
            range: spec.range,
            target: spec.target,
            trigger,
            effects: spec.effects,
        }
    }

    /// An ability whose trigger always fires.
    pub fn unconditional(spec: AbilitySpec) -> Self {
        Self::new(
            spec,
            Box::new(|_: &UnitProxy<'_>, _: &UnitProxy<'_>, _: &TickContext<'_>| true),
        )
    }

    /// Whether the cooldown has elapsed at `tick` given the last use.
    pub fn ready(&self, last_used: Option<u64>, tick: u64) -> bool {
        last_used.is_none_or(|t| tick >= t.saturating_add(self.cooldown))
    }
}

impl fmt::Debug for CompiledAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledAbility")
            .field("name", &self.name)
            .field("cooldown", &self.cooldown)
            .field("range", &self.range)
            .field("target", &self.target)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}

/// Abilities by name.
#[derive(Debug, Default)]
pub struct AbilityBook {
    abilities: IndexMap<String, CompiledAbility>,
}

impl AbilityBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load specs from a JSON array. Every trigger is unconditional until
    /// replaced with [`AbilityBook::set_trigger`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let specs: Vec<AbilitySpec> = serde_json::from_str(json)?;
        let mut book = Self::new();
        for spec in specs {
            book.insert(CompiledAbility::unconditional(spec));
        }
        Ok(book)
    }

    /// Add or replace an ability.
    pub fn insert(&mut self, ability: CompiledAbility) {
        self.abilities.insert(ability.name.clone(), ability);
    }

    /// Replace an ability's trigger. Returns `false` if no such ability.
    pub fn set_trigger(&mut self, name: &str, trigger: Trigger) -> bool {
        match self.abilities.get_mut(name) {
            Some(a) => {
                a.trigger = trigger;
                true
            }
            None => false,
        }
    }

    /// Look an ability up.
    pub fn get(&self, name: &str) -> Option<&CompiledAbility> {
        self.abilities.get(name)
    }

    /// Number of abilities.
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_parse_by_type_tag() {
        let json = r#"[
            {"type": "damage", "amount": 5},
            {"type": "aoe", "radius": 2, "amount": 3},
            {"type": "jump"},
            {"type": "spawn", "unit_type": "imp"},
            {"type": "projectile", "damage": 4, "lobbed": true, "aoe_radius": 1.5}
        ]"#;
        let effects: Vec<EffectDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(effects[0], EffectDescriptor::Damage { amount: 5.0 });
        assert_eq!(
            effects[1],
            EffectDescriptor::Aoe {
                radius: 2.0,
                amount: 3.0,
                friendly_fire: false
            }
        );
        assert_eq!(
            effects[2],
            EffectDescriptor::Jump {
                duration: None,
                height: None
            }
        );
        assert_eq!(
            effects[3],
            EffectDescriptor::Spawn {
                unit_type: "imp".into(),
                count: 1
            }
        );
        assert!(matches!(
            effects[4],
            EffectDescriptor::Projectile { lobbed: true, speed, .. } if speed == 1.0
        ));
    }

    #[test]
    fn book_loads_from_json() {
        let book = AbilityBook::from_json(
            r#"[{"name": "firebolt", "cooldown": 5, "range": 6,
                 "target": "nearest_enemy",
                 "effects": [{"type": "damage", "amount": 8}]},
                {"name": "mend", "range": 3, "target": "self",
                 "effects": [{"type": "heal", "amount": 4}]}]"#,
        )
        .unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.get("mend").unwrap().target, TargetSelector::Caster);
        assert_eq!(book.get("firebolt").unwrap().cooldown, 5);
    }

    #[test]
    fn cooldown_readiness() {
        let a = CompiledAbility::unconditional(AbilitySpec {
            name: "x".into(),
            cooldown: 3,
            range: 1.0,
            target: TargetSelector::Caster,
            effects: vec![],
        });
        assert!(a.ready(None, 0));
        assert!(!a.ready(Some(10), 12));
        assert!(a.ready(Some(10), 13));
    }
}

//! Unit templates for `spawn` commands.
//!
//! A [`UnitFactory`] maps a unit-type name to a [`UnitTemplate`]. The
//! bundled [`TemplateFactory`] keeps templates in memory and loads them
//! from a JSON object keyed by unit type.

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use skirmish_core::{ColdData, Team, UnitId, UnitRecord, Vec2};

/// Stats and cold data shared by every unit of one type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UnitTemplate {
    /// Starting and maximum hit points.
    pub hp: f32,
    /// Damage per strike.
    #[serde(default = "unit_f32")]
    pub damage: f32,
    /// Mass.
    #[serde(default = "unit_f32")]
    pub mass: f32,
    /// Team used when the spawn request names none.
    #[serde(default)]
    pub team: Option<Team>,
    /// Sprite key.
    #[serde(default)]
    pub sprite: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ability names.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Starting posture.
    #[serde(default)]
    pub posture: Option<String>,
}

fn unit_f32() -> f32 {
    1.0
}

impl UnitTemplate {
    /// Build a record for a new unit of `unit_type`.
    pub fn instantiate(
        &self,
        unit_type: &str,
        id: impl Into<UnitId>,
        team: Team,
        position: Vec2,
    ) -> UnitRecord {
        let cold = ColdData {
            sprite: self.sprite.clone(),
            abilities: self.abilities.clone(),
            tags: self.tags.clone(),
            unit_type: Some(unit_type.to_string()),
            posture: self.posture.clone(),
            ..ColdData::default()
        };
        UnitRecord::new(id, team, position)
            .with_hp(self.hp)
            .with_damage(self.damage)
            .with_mass(self.mass)
            .with_cold(cold)
    }
}

/// Source of unit templates.
pub trait UnitFactory {
    /// The template for `unit_type`, if known.
    fn template(&self, unit_type: &str) -> Option<UnitTemplate>;
}

/// Errors from loading templates.
#[derive(Debug)]
pub enum FactoryError {
    /// The JSON did not parse.
    Parse(serde_json::Error),
    /// A template has unusable stats.
    InvalidTemplate {
        /// Offending unit type.
        unit_type: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "template json: {e}"),
            Self::InvalidTemplate { unit_type, reason } => {
                write!(f, "template '{unit_type}': {reason}")
            }
        }
    }
}

impl Error for FactoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::InvalidTemplate { .. } => None,
        }
    }
}

impl From<serde_json::Error> for FactoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// In-memory templates.
#[derive(Clone, Debug, Default)]
pub struct TemplateFactory {
    templates: IndexMap<String, UnitTemplate>,
}

impl TemplateFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load templates from a JSON object keyed by unit type.
    pub fn from_json(json: &str) -> Result<Self, FactoryError> {
        let templates: IndexMap<String, UnitTemplate> = serde_json::from_str(json)?;
        let mut factory = Self::new();
        for (unit_type, template) in templates {
            factory.insert(unit_type, template)?;
        }
        Ok(factory)
    }

    /// Add or replace a template. Hit points must be positive and mass
    /// positive, both finite.
    pub fn insert(
        &mut self,
        unit_type: impl Into<String>,
        template: UnitTemplate,
    ) -> Result<(), FactoryError> {
        let unit_type = unit_type.into();
        if !template.hp.is_finite() || template.hp <= 0.0 {
            return Err(FactoryError::InvalidTemplate {
                unit_type,
                reason: format!("hp must be finite and positive, got {}", template.hp),
            });
        }
        if !template.mass.is_finite() || template.mass <= 0.0 {
            return Err(FactoryError::InvalidTemplate {
                unit_type,
                reason: format!("mass must be finite and positive, got {}", template.mass),
            });
        }
        if !template.damage.is_finite() {
            return Err(FactoryError::InvalidTemplate {
                unit_type,
                reason: "damage must be finite".to_string(),
            });
        }
        self.templates.insert(unit_type, template);
        Ok(())
    }

    /// Known unit types, in load order.
    pub fn unit_types(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl UnitFactory for TemplateFactory {
    fn template(&self, unit_type: &str) -> Option<UnitTemplate> {
        self.templates.get(unit_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATES: &str = r#"{
        "grunt": {"hp": 30, "damage": 4, "tags": ["ai"], "sprite": "grunt"},
        "wall":  {"hp": 500, "mass": 50, "team": "neutral", "posture": "hold"}
    }"#;

    #[test]
    fn loads_templates_in_order() {
        let f = TemplateFactory::from_json(TEMPLATES).unwrap();
        assert_eq!(f.unit_types().collect::<Vec<_>>(), vec!["grunt", "wall"]);
        let wall = f.template("wall").unwrap();
        assert_eq!(wall.team, Some(Team::Neutral));
        assert_eq!(wall.damage, 1.0);
        assert!(f.template("dragon").is_none());
    }

    #[test]
    fn instantiate_fills_record() {
        let f = TemplateFactory::from_json(TEMPLATES).unwrap();
        let r = f.template("grunt").unwrap().instantiate(
            "grunt",
            "g1",
            Team::Hostile,
            Vec2::new(3.0, 4.0),
        );
        assert_eq!(r.hp, 30.0);
        assert_eq!(r.max_hp, 30.0);
        assert_eq!(r.damage, 4.0);
        assert_eq!(r.mass, 1.0);
        assert_eq!(r.cold.unit_type.as_deref(), Some("grunt"));
        assert!(r.cold.has_tag("ai"));
    }

    #[test]
    fn rejects_bad_stats() {
        let err = TemplateFactory::from_json(r#"{"ghost": {"hp": 0}}"#).unwrap_err();
        assert!(matches!(err, FactoryError::InvalidTemplate { .. }));
        let err = TemplateFactory::from_json(r#"{"rock": {"hp": 5, "mass": -1}}"#).unwrap_err();
        assert!(err.to_string().contains("rock"));
    }

    #[test]
    fn parse_errors_chain_source() {
        let err = TemplateFactory::from_json("not json").unwrap_err();
        assert!(matches!(err, FactoryError::Parse(_)));
        assert!(err.source().is_some());
    }
}

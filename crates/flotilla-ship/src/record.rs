//! Saved-game form of a ship.
//!
//! A record keeps what a player would expect to survive a save: identity,
//! equipment, cargo, pool levels, whereabouts, and the hardpoint and bay
//! layout with docked craft nested inside. Transient flight state (reload
//! timers, boarding progress, targets) is not kept. Everything derived from
//! equipment is rebuilt from the catalog on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flotilla_catalog::prelude::*;

use crate::armament::Armament;
use crate::cargo::CargoHold;
use crate::carrier::Bay;
use crate::personality::Personality;
use crate::ship::{check_hardpoints, Ship};
use crate::ShipError;

/// A bay and the craft saved inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayRecord {
    pub offset: Point,
    #[serde(default)]
    pub ship: Option<Box<ShipRecord>>,
}

/// Persistent state of one ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipRecord {
    pub model: String,
    pub name: String,
    #[serde(default)]
    pub government: Option<String>,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub outfits: BTreeMap<String, i32>,
    #[serde(default)]
    pub cargo: CargoHold,
    pub crew: i32,
    pub fuel: f64,
    pub shields: f64,
    pub hull: f64,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub angle: Angle,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub planet: Option<String>,
    #[serde(default)]
    pub hardpoints: Vec<HardpointSpec>,
    #[serde(default)]
    pub engines: Vec<Point>,
    #[serde(default)]
    pub fighter_bays: Vec<BayRecord>,
    #[serde(default)]
    pub drone_bays: Vec<BayRecord>,
    #[serde(default)]
    pub explode: BTreeMap<String, u32>,
}

impl ShipRecord {
    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ShipError::Parse`] if the text is not a valid record.
    pub fn from_json_str(json: &str) -> Result<Self, ShipError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the record to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ShipError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ShipError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Ship {
    /// Capture the persistent state of this ship and its docked craft.
    pub fn to_record(&self) -> ShipRecord {
        let bays = |bays: &[Bay]| -> Vec<BayRecord> {
            bays.iter()
                .map(|bay| BayRecord {
                    offset: bay.offset(),
                    ship: bay.ship().map(|craft| Box::new(craft.to_record())),
                })
                .collect()
        };
        ShipRecord {
            model: self.model_name.clone(),
            name: self.name.clone(),
            government: self.government.clone(),
            personality: self.personality,
            is_special: self.is_special,
            outfits: self.outfits.clone(),
            cargo: self.cargo.clone(),
            crew: self.crew,
            fuel: self.fuel,
            shields: self.shields,
            hull: self.hull,
            position: self.position,
            angle: self.angle,
            system: self.system.clone(),
            planet: self.landing_planet.clone(),
            hardpoints: self.armament.hardpoints().iter().map(|hardpoint| hardpoint.spec()).collect(),
            engines: self.engines.clone(),
            fighter_bays: bays(&self.fighter_bays),
            drone_bays: bays(&self.drone_bays),
            explode: self.explode.clone(),
        }
    }

    /// Rebuild a ship from its record.
    ///
    /// The hull template supplies the base stats, category, sprite extent and
    /// death blast; the record supplies everything else.
    ///
    /// # Errors
    ///
    /// Returns [`ShipError::UnknownModel`] if the record's model, or that of
    /// any docked craft, is missing from the catalog, and
    /// [`ShipError::TooManyHardpoints`] if the record lists more hardpoints
    /// than a command can fire.
    pub fn from_record(record: &ShipRecord, catalog: &Catalog) -> Result<Ship, ShipError> {
        let model = catalog
            .ship(&record.model)
            .ok_or_else(|| ShipError::UnknownModel(record.model.clone()))?;
        check_hardpoints(&record.model, record.hardpoints.len())?;

        let mut armament = Armament::new();
        for hardpoint in &record.hardpoints {
            armament.add_hardpoint(hardpoint.kind, hardpoint.offset);
        }
        let mut ship = Ship {
            model_name: record.model.clone(),
            name: record.name.clone(),
            category: model.category.clone(),
            description: model.description.clone(),
            government: record.government.clone(),
            personality: record.personality,
            is_special: record.is_special,
            base_attributes: model.attributes.clone(),
            outfits: record.outfits.clone(),
            armament,
            cargo: record.cargo.clone(),
            engines: record.engines.clone(),
            fighter_bays: load_bays(&record.fighter_bays, catalog)?,
            drone_bays: load_bays(&record.drone_bays, catalog)?,
            explode: record.explode.clone(),
            explosion_weapon: model.explosion.clone(),
            extent: model.extent,
            ..Ship::default()
        };
        ship.bind_hardpoints(&record.hardpoints, catalog);
        ship.finish_loading(catalog);

        ship.crew = record.crew;
        ship.fuel = record.fuel;
        ship.shields = record.shields;
        ship.hull = record.hull;
        ship.system = record.system.clone();
        ship.landing_planet = record.planet.clone();
        ship.zoom = if record.planet.is_some() { 0.0 } else { 1.0 };
        ship.position = record.position;
        ship.angle = record.angle;
        Ok(ship)
    }
}

fn load_bays(records: &[BayRecord], catalog: &Catalog) -> Result<Vec<Bay>, ShipError> {
    records
        .iter()
        .map(|record| {
            let mut bay = Bay::new(record.offset);
            if let Some(craft) = &record.ship {
                bay.dock(Box::new(Ship::from_record(craft, catalog)?));
            }
            Ok(bay)
        })
        .collect()
}

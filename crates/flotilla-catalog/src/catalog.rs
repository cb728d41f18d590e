//! The read-only content catalog.
//!
//! A [`Catalog`] is populated once at startup, either from JSON content via
//! [`Catalog::from_json_str`] or programmatically with the `insert_*`
//! methods, and is then shared immutably with the simulation. All lookups
//! return `Option`; callers treat a missing entry as "contributes nothing".

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::galaxy::{Government, Planet, StarSystem, StellarObject};
use crate::model::ShipModel;
use crate::outfit::{Outfit, WeaponSpec};
use crate::CatalogError;

// ---------------------------------------------------------------------------
// ObjectRef
// ---------------------------------------------------------------------------

/// A stable reference to a stellar object: its system plus its index in
/// that system's object list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// System name.
    pub system: String,
    /// Index into [`StarSystem::objects`].
    pub index: usize,
}

impl ObjectRef {
    /// Reference object `index` of `system`.
    pub fn new(system: impl Into<String>, index: usize) -> Self {
        Self {
            system: system.into(),
            index,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Raw content file layout.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CatalogFile {
    outfits: Vec<Outfit>,
    ships: Vec<ShipModel>,
    systems: Vec<StarSystem>,
    planets: Vec<Planet>,
    governments: Vec<Government>,
}

/// Name-keyed lookup of every piece of static content.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    outfits: BTreeMap<String, Outfit>,
    ships: BTreeMap<String, ShipModel>,
    systems: BTreeMap<String, StarSystem>,
    planets: BTreeMap<String, Planet>,
    governments: BTreeMap<String, Government>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate JSON content.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, or the first
    /// validation error (see [`validate`](Self::validate)).
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Like [`from_json_str`](Self::from_json_str), reading from any source.
    ///
    /// # Errors
    ///
    /// See [`from_json_str`](Self::from_json_str).
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_reader(reader)?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();
        for outfit in file.outfits {
            catalog.insert_outfit(outfit);
        }
        for ship in file.ships {
            catalog.insert_ship(ship);
        }
        for system in file.systems {
            catalog.insert_system(system);
        }
        for planet in file.planets {
            catalog.insert_planet(planet);
        }
        for government in file.governments {
            catalog.insert_government(government);
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check cross references.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::UnknownOutfit`] if a hull template installs an
    ///   outfit, or a weapon consumes an ammo outfit, that does not exist.
    /// - [`CatalogError::UnknownSystem`] if a system links to, or a wormhole
    ///   leads to, a system that does not exist.
    /// - [`CatalogError::UnknownPlanet`] if a stellar object names a planet
    ///   that does not exist.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for ship in self.ships.values() {
            let bound = ship.hardpoints.iter().filter_map(|h| h.outfit.as_ref());
            for name in ship.outfits.keys().chain(bound) {
                if !self.outfits.contains_key(name) {
                    return Err(CatalogError::UnknownOutfit {
                        name: name.clone(),
                        referenced_by: ship.model_name.clone(),
                    });
                }
            }
        }
        for outfit in self.outfits.values() {
            if let Some(ammo) = outfit.weapon.as_ref().and_then(|w| w.ammo.as_ref()) {
                if !self.outfits.contains_key(ammo) {
                    return Err(CatalogError::UnknownOutfit {
                        name: ammo.clone(),
                        referenced_by: outfit.name.clone(),
                    });
                }
            }
        }
        for system in self.systems.values() {
            for link in &system.links {
                if !self.systems.contains_key(link) {
                    return Err(CatalogError::UnknownSystem {
                        name: link.clone(),
                        referenced_by: system.name.clone(),
                    });
                }
            }
            for planet in system.objects.iter().filter_map(|o| o.planet.as_ref()) {
                if !self.planets.contains_key(planet) {
                    return Err(CatalogError::UnknownPlanet {
                        name: planet.clone(),
                        referenced_by: system.name.clone(),
                    });
                }
            }
        }
        for planet in self.planets.values() {
            for destination in planet.wormhole.values() {
                if !self.systems.contains_key(destination) {
                    return Err(CatalogError::UnknownSystem {
                        name: destination.clone(),
                        referenced_by: planet.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // -- insertion ----------------------------------------------------------

    /// Add or replace an outfit.
    pub fn insert_outfit(&mut self, outfit: Outfit) {
        self.outfits.insert(outfit.name.clone(), outfit);
    }

    /// Add or replace a hull template.
    pub fn insert_ship(&mut self, ship: ShipModel) {
        self.ships.insert(ship.model_name.clone(), ship);
    }

    /// Add or replace a star system.
    pub fn insert_system(&mut self, system: StarSystem) {
        self.systems.insert(system.name.clone(), system);
    }

    /// Add or replace a planet.
    pub fn insert_planet(&mut self, planet: Planet) {
        self.planets.insert(planet.name.clone(), planet);
    }

    /// Add or replace a government.
    pub fn insert_government(&mut self, government: Government) {
        self.governments.insert(government.name.clone(), government);
    }

    // -- lookup -------------------------------------------------------------

    /// Look up an outfit by name.
    pub fn outfit(&self, name: &str) -> Option<&Outfit> {
        self.outfits.get(name)
    }

    /// Look up an outfit's weapon behavior by name.
    pub fn weapon(&self, name: &str) -> Option<&WeaponSpec> {
        self.outfit(name).and_then(|o| o.weapon.as_ref())
    }

    /// Look up a hull template by model name.
    pub fn ship(&self, model_name: &str) -> Option<&ShipModel> {
        self.ships.get(model_name)
    }

    /// Look up a star system by name.
    pub fn system(&self, name: &str) -> Option<&StarSystem> {
        self.systems.get(name)
    }

    /// Look up a planet by name.
    pub fn planet(&self, name: &str) -> Option<&Planet> {
        self.planets.get(name)
    }

    /// Look up a government by name.
    pub fn government(&self, name: &str) -> Option<&Government> {
        self.governments.get(name)
    }

    /// Resolve an [`ObjectRef`].
    pub fn object(&self, object: &ObjectRef) -> Option<&StellarObject> {
        self.system(&object.system)
            .and_then(|system| system.objects.get(object.index))
    }

    /// Iterate every hull template in name order.
    pub fn ships(&self) -> impl Iterator<Item = &ShipModel> {
        self.ships.values()
    }

    /// Iterate every outfit in name order.
    pub fn outfits(&self) -> impl Iterator<Item = &Outfit> {
        self.outfits.values()
    }

    // -- relations ----------------------------------------------------------

    /// Whether two governments are hostile. Either side declaring the other
    /// an enemy is enough; unknown or absent governments are never hostile.
    pub fn is_enemy(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let (Some(a), Some(b)) = (a, b) else {
            return false;
        };
        if a == b {
            return false;
        }
        let declares = |from: &str, to: &str| {
            self.government(from)
                .is_some_and(|gov| gov.enemies.contains(to))
        };
        declares(a, b) || declares(b, a)
    }

    /// Whether `planet` grants landing to a ship of `government`.
    pub fn can_land_on(&self, planet: &Planet, government: Option<&str>) -> bool {
        !self.is_enemy(planet.government.as_deref(), government)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Eligibility checks for landing and jumping.

use flotilla_catalog::prelude::*;

use crate::constants::*;
use crate::ship::Ship;

impl Ship {
    /// Whether the ship may begin landing on its target planet this tick:
    /// it is operable, the planet admits its government, and it is slow and
    /// inside the landing radius.
    pub fn can_land(&self, catalog: &Catalog) -> bool {
        if self.disabled || self.is_destroyed() {
            return false;
        }
        let Some(target) = &self.target_planet else {
            return false;
        };
        let Some(object) = catalog.object(target) else {
            return false;
        };
        let Some(planet) = object.planet.as_deref().and_then(|name| catalog.planet(name)) else {
            return false;
        };
        if !catalog.can_land_on(planet, self.government.as_deref()) {
            return false;
        }

        let distance = (object.position - self.position).length();
        self.velocity.length() < LANDING_SPEED_LIMIT && distance < object.radius
    }

    /// Whether the ship may begin a jump to its target system this tick.
    ///
    /// A scram drive tolerates sideways drift up to its rating; otherwise the
    /// ship must be no faster than its jump speed. A jump drive may leave in
    /// any heading. A hyperdrive must be facing the target within one turn
    /// step.
    pub fn can_hyperspace(&self, catalog: &Catalog) -> bool {
        if self.is_disabled() {
            return false;
        }
        let Some(target) = self.target_system.as_deref().and_then(|name| catalog.system(name)) else {
            return false;
        };
        let Some(current) = self.system.as_deref().and_then(|name| catalog.system(name)) else {
            return false;
        };
        if self.fuel < self.attributes.get(StatKey::JumpFuel) {
            return false;
        }

        let direction = target.position - current.position;
        let scram = self.attributes.get(StatKey::ScramDrive);
        if scram != 0.0 {
            let deviation = direction.unit().cross(self.velocity).abs();
            if deviation > scram {
                return false;
            }
        } else if self.velocity.length() > self.attributes.get(StatKey::JumpSpeed) {
            return false;
        }

        if self.attributes.get(StatKey::JumpDrive) != 0.0 {
            return true;
        }
        if self.attributes.get(StatKey::Hyperdrive) == 0.0 {
            return false;
        }

        let left = direction.cross(self.angle.unit()) < 0.0;
        let step = if left { 1.0 } else { -1.0 };
        let turned = self.angle + self.turn_rate() * step;
        let still_left = direction.cross(turned.unit()) < 0.0;
        left != still_left
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let mut sol = StarSystem::new("Sol", Point::new(0.0, 0.0));
        sol.objects.push(StellarObject {
            planet: Some("Earth".into()),
            position: Point::new(500.0, 0.0),
            radius: 100.0,
        });
        sol.links.insert("Alpha".into());
        catalog.insert_system(sol);
        // Straight "up" from Sol.
        catalog.insert_system(StarSystem::new("Alpha", Point::new(0.0, -100.0)));
        let mut earth = Planet::new("Earth");
        earth.spaceport = true;
        earth.government = Some("Republic".into());
        catalog.insert_planet(earth);
        catalog.insert_government(Government::new("Republic").hostile_to("Pirate"));
        catalog
    }

    fn ship() -> Ship {
        let mut ship = Ship {
            system: Some("Sol".into()),
            hull: 100.0,
            crew: 1,
            fuel: 200.0,
            ..Ship::default()
        };
        ship.attributes.set(StatKey::Hull, 100.0);
        ship.attributes.set(StatKey::Mass, 10.0);
        ship.attributes.set(StatKey::Turn, 10.0);
        ship.attributes.set(StatKey::JumpFuel, 100.0);
        ship
    }

    #[test]
    fn landing_needs_target_range_and_slow_speed() {
        let catalog = catalog();
        let mut ship = ship();
        assert!(!ship.can_land(&catalog), "no target");

        ship.set_target_planet(Some(ObjectRef::new("Sol", 0)));
        ship.position = Point::new(450.0, 0.0);
        assert!(ship.can_land(&catalog));

        ship.velocity = Point::new(2.0, 0.0);
        assert!(!ship.can_land(&catalog), "too fast");

        ship.velocity = Point::ZERO;
        ship.position = Point::new(300.0, 0.0);
        assert!(!ship.can_land(&catalog), "out of range");
    }

    #[test]
    fn enemies_of_the_planet_cannot_land() {
        let catalog = catalog();
        let mut ship = ship();
        ship.set_target_planet(Some(ObjectRef::new("Sol", 0)));
        ship.position = Point::new(500.0, 0.0);
        ship.set_government(Some("Pirate".into()));
        assert!(!ship.can_land(&catalog));
    }

    #[test]
    fn hyperdrive_needs_alignment() {
        let catalog = catalog();
        let mut ship = ship();
        ship.attributes.set(StatKey::Hyperdrive, 1.0);
        ship.set_target_system(Some("Alpha".into()));

        // Angle zero faces "up", toward Alpha.
        assert!(ship.can_hyperspace(&catalog));

        ship.angle = Angle::from_degrees(90.0);
        assert!(!ship.can_hyperspace(&catalog), "facing away");
    }

    #[test]
    fn jump_drive_ignores_heading_but_not_speed() {
        let catalog = catalog();
        let mut ship = ship();
        ship.attributes.set(StatKey::JumpDrive, 1.0);
        ship.set_target_system(Some("Alpha".into()));
        ship.angle = Angle::from_degrees(135.0);
        assert!(ship.can_hyperspace(&catalog));

        ship.velocity = Point::new(3.0, 0.0);
        assert!(!ship.can_hyperspace(&catalog));
    }

    #[test]
    fn scram_drive_tolerates_drift_along_the_route() {
        let catalog = catalog();
        let mut ship = ship();
        ship.attributes.set(StatKey::JumpDrive, 1.0);
        ship.attributes.set(StatKey::ScramDrive, 0.5);
        ship.set_target_system(Some("Alpha".into()));

        ship.velocity = Point::new(0.0, -8.0);
        assert!(ship.can_hyperspace(&catalog), "moving along the route");

        ship.velocity = Point::new(2.0, -8.0);
        assert!(!ship.can_hyperspace(&catalog), "drifting sideways");
    }

    #[test]
    fn jump_needs_fuel() {
        let catalog = catalog();
        let mut ship = ship();
        ship.attributes.set(StatKey::JumpDrive, 1.0);
        ship.set_target_system(Some("Alpha".into()));
        ship.fuel = 99.0;
        assert!(!ship.can_hyperspace(&catalog));
    }
}

//! Resolving a completed boarding, and capture.

use serde::{Deserialize, Serialize};
use tracing::debug;

use flotilla_catalog::prelude::*;

use crate::constants::*;
use crate::registry::ShipId;
use crate::ship::Ship;

/// What a completed boarding turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardOutcome {
    /// Nothing happened: the ship had not boarded, could not act, or the
    /// victim was neither friendly nor disabled.
    None,
    /// The boarder is a carried craft and should dock with the other ship.
    Dock,
    /// The other ship was friendly and has been patched up and refuelled.
    Assisted,
    /// The other ship was disabled and has been stripped of fuel and cargo.
    /// It is now open to capture.
    Plundered,
}

impl Ship {
    /// Resolve a completed boarding of `victim`.
    ///
    /// Docking of carried craft needs ownership of the boarder and is left to
    /// the caller on [`BoardOutcome::Dock`]. With `auto_plunder`, installed
    /// outfits are pulled into the boarder's hold as well as its cargo.
    pub fn board(&mut self, victim: &mut Ship, auto_plunder: bool, catalog: &Catalog) -> BoardOutcome {
        if !self.has_boarded || self.cannot_act() {
            return BoardOutcome::None;
        }
        self.has_boarded = false;
        if victim.is_destroyed() {
            return BoardOutcome::None;
        }
        if self.is_fighter() {
            return BoardOutcome::Dock;
        }

        if !catalog.is_enemy(self.government.as_deref(), victim.government.as_deref()) {
            self.ship_to_assist = None;
            victim.hull = victim.hull.max(victim.minimum_hull());
            victim.disabled = false;
            if victim.jumps_remaining() == 0 && self.can_refuel(victim) {
                let needed = victim.attributes.get(StatKey::JumpFuel);
                self.transfer_fuel(needed, Some(victim));
            }
            debug!(ship = %self.name, victim = %victim.name, "assisted");
            return BoardOutcome::Assisted;
        }
        if !victim.is_disabled() {
            return BoardOutcome::None;
        }

        let fuel = victim.fuel;
        victim.transfer_fuel(fuel, Some(self));

        if auto_plunder {
            let installed: Vec<(String, i32)> = victim
                .outfits
                .iter()
                .map(|(name, &count)| (name.clone(), count))
                .collect();
            for (name, count) in installed {
                let unit_mass = catalog.outfit(&name).map_or(0.0, Outfit::cargo_mass);
                let taken = self.cargo.add_outfit(&name, unit_mass, count.max(0) as u32);
                if taken > 0 {
                    victim.add_outfit(&name, -(taken as i32), catalog);
                }
            }
        }
        victim.cargo.transfer_all(&mut self.cargo);

        self.target_ship = None;
        self.pilot_error = PLUNDER_PAUSE_TICKS;
        debug!(ship = %self.name, victim = %victim.name, auto_plunder, "plundered");
        BoardOutcome::Plundered
    }

    /// Change hands to `capturer`.
    ///
    /// The hull is patched to just above the disabled threshold and crew is
    /// moved over: the bare minimum this ship needs, unless the capturer
    /// cannot spare that many, in which case crew is shared in proportion to
    /// need (but at least one moves). The ship adopts the capturer's
    /// government and traits, follows it, and forgets every order it had.
    pub fn was_captured(&mut self, capturer: &mut Ship, capturer_id: ShipId) {
        self.hull = self.hull.max(self.minimum_hull());
        self.government = capturer.government.clone();

        let required = self.required_crew();
        let total_required = capturer.required_crew() + required;
        let transfer = if total_required > capturer.crew {
            1.max(capturer.crew * required / total_required.max(1))
        } else {
            required
        };
        capturer.add_crew(-transfer);
        self.add_crew(transfer);

        self.set_parent(Some(capturer_id));
        self.commands = Default::default();
        self.disabled = false;
        self.hyperspace_system = None;
        self.is_special = capturer.is_special;
        self.personality = capturer.personality;
        debug!(ship = %self.name, capturer = %capturer.name, crew = transfer, "captured");
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
        catalog.insert_government(Government::new("Merchant"));
        catalog.insert_government(Government::new("Pirate").hostile_to("Merchant"));
        catalog.insert_outfit(Outfit::new(
            "Shield Generator",
            Attributes::new().with(StatKey::Mass, 10.0),
        ));
        catalog
    }

    fn hull(government: &str) -> Ship {
        let mut ship = Ship {
            government: Some(government.into()),
            hull: 1000.0,
            crew: 10,
            fuel: 300.0,
            has_boarded: true,
            ..Ship::default()
        };
        ship.attributes.set(StatKey::Hull, 1000.0);
        ship.attributes.set(StatKey::FuelCapacity, 300.0);
        ship.attributes.set(StatKey::JumpFuel, 100.0);
        ship.attributes.set(StatKey::RequiredCrew, 3.0);
        ship.cargo.set_size(100.0);
        ship
    }

    #[test]
    fn friendly_boarding_assists() {
        let catalog = catalog();
        let mut rescuer = hull("Merchant");
        let mut stranded = hull("Merchant");
        stranded.hull = 100.0;
        stranded.fuel = 20.0;

        let outcome = rescuer.board(&mut stranded, false, &catalog);

        assert_eq!(outcome, BoardOutcome::Assisted);
        assert_eq!(stranded.hull_points(), stranded.minimum_hull());
        assert_eq!(stranded.fuel_level(), 120.0);
        assert_eq!(rescuer.fuel_level(), 200.0);
        assert!(!rescuer.has_boarded());
    }

    #[test]
    fn hostile_boarding_needs_a_disabled_victim() {
        let catalog = catalog();
        let mut pirate = hull("Pirate");
        let mut merchant = hull("Merchant");
        assert_eq!(pirate.board(&mut merchant, true, &catalog), BoardOutcome::None);
    }

    #[test]
    fn plunder_takes_fuel_cargo_and_outfits() {
        let catalog = catalog();
        let mut pirate = hull("Pirate");
        pirate.fuel = 100.0;
        let mut merchant = hull("Merchant");
        merchant.hull = 50.0;
        merchant.cargo.add_commodity("Food", 30);
        merchant.add_outfit("Shield Generator", 2, &catalog);

        let outcome = pirate.board(&mut merchant, true, &catalog);

        assert_eq!(outcome, BoardOutcome::Plundered);
        assert_eq!(pirate.fuel_level(), 300.0);
        assert_eq!(merchant.fuel_level(), 100.0);
        assert_eq!(pirate.cargo().commodity("Food"), 30);
        assert_eq!(pirate.cargo().outfit("Shield Generator"), 2);
        assert_eq!(merchant.outfit_count("Shield Generator"), 0);
        assert_eq!(merchant.attributes().get(StatKey::Mass), 0.0);
        assert!(pirate.cannot_act(), "plunder pauses the boarder");
    }

    #[test]
    fn capture_moves_minimum_crew() {
        let mut captor = hull("Pirate");
        let mut prize = hull("Merchant");
        prize.crew = 0;
        prize.hull = 10.0;

        prize.was_captured(&mut captor, ShipId::new(4, 0));

        assert_eq!(prize.crew(), 3);
        assert_eq!(captor.crew(), 7);
        assert_eq!(prize.government(), Some("Pirate"));
        assert_eq!(prize.parent(), Some(ShipId::new(4, 0)));
        assert_eq!(prize.hull_points(), prize.minimum_hull());
        assert!(!prize.is_disabled());
    }

    #[test]
    fn capture_shares_crew_when_short_handed() {
        let mut captor = hull("Pirate");
        captor.crew = 4;
        let mut prize = hull("Merchant");
        prize.crew = 0;

        prize.was_captured(&mut captor, ShipId::new(4, 0));

        // 4 * 3 / 6 = 2 crew move over.
        assert_eq!(prize.crew(), 2);
        assert_eq!(captor.crew(), 2);
    }
}

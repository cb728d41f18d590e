//! Weapons fire, point defense, damage intake and scanning.

use rand::Rng;
use tracing::{debug, trace};

use flotilla_catalog::prelude::*;

use crate::command::Command;
use crate::constants::*;
use crate::effect::{Effect, Projectile};
use crate::events::ShipEvents;
use crate::ship::Ship;
use crate::tick::ShipView;

impl Ship {
    /// Whether there is ammunition, energy and fuel for one shot of `weapon`.
    pub fn can_fire(&self, weapon: &WeaponSpec) -> bool {
        if let Some(ammo) = &weapon.ammo {
            if self.outfit_count(ammo) <= 0 {
                return false;
            }
        }
        self.energy >= weapon.firing_energy && self.fuel >= weapon.firing_fuel
    }

    /// Pay for one shot of `weapon`: ammunition, energy, fuel, and heat.
    /// Assumes [`can_fire`](Self::can_fire) holds.
    pub fn expend_ammo(&mut self, weapon: &WeaponSpec, catalog: &Catalog) {
        if let Some(ammo) = &weapon.ammo {
            self.add_outfit(ammo, -1, catalog);
        }
        self.energy -= weapon.firing_energy;
        self.fuel -= weapon.firing_fuel;
        self.heat += weapon.firing_heat;
    }

    /// Fire every ready weapon whose fire bit is set, then advance reloads.
    ///
    /// A ship on the tick its last explosion went off also releases its death
    /// blast here. Returns whether any anti-missile system is ready; those
    /// are never fired here but wait for [`fire_anti_missile`](Self::fire_anti_missile).
    pub fn fire(&mut self, catalog: &Catalog, projectiles: &mut Vec<Projectile>) -> bool {
        if self.is_destroyed() && self.explosion_count == self.explosion_total {
            if let Some(blast) = &self.explosion_weapon {
                debug!(ship = %self.name, "death blast");
                projectiles.push(Projectile {
                    source_name: self.model_name.clone(),
                    weapon: blast.clone(),
                    government: self.government.clone(),
                    position: self.position,
                    velocity: Point::ZERO,
                    angle: self.angle,
                    is_blast: true,
                });
            }
        }
        if self.cannot_act() {
            return false;
        }

        let mut has_anti_missile = false;
        for index in 0..self.armament.len() {
            let Some(hardpoint) = self.armament.get(index) else {
                continue;
            };
            let (Some(name), Some(weapon)) = (hardpoint.outfit(), hardpoint.weapon()) else {
                continue;
            };
            if !self.can_fire(weapon) {
                continue;
            }
            if weapon.is_anti_missile() {
                has_anti_missile = true;
                continue;
            }
            if !self.commands.has_fire(index) || !hardpoint.is_ready() {
                continue;
            }

            let name = name.to_owned();
            let weapon = weapon.clone();
            let muzzle = self.position + self.angle.rotate(hardpoint.offset()) * self.zoom;
            self.armament.fire(index);
            self.expend_ammo(&weapon, catalog);
            trace!(ship = %self.name, weapon = %name, index, "fired");
            projectiles.push(Projectile {
                source_name: name,
                velocity: self.velocity + self.angle.unit() * weapon.velocity,
                weapon,
                government: self.government.clone(),
                position: muzzle,
                angle: self.angle,
                is_blast: false,
            });
        }

        self.armament.step();
        has_anti_missile
    }

    /// Try to shoot down `missile` with the first ready anti-missile system in
    /// range. Firing spends the shot either way; the return value says whether
    /// the missile was destroyed.
    pub fn fire_anti_missile<R: Rng + ?Sized>(
        &mut self,
        missile: &Projectile,
        catalog: &Catalog,
        rng: &mut R,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if self.cannot_act() || missile.weapon.missile_strength <= 0.0 {
            return false;
        }

        for index in 0..self.armament.len() {
            let Some(hardpoint) = self.armament.get(index) else {
                continue;
            };
            let (Some(name), Some(weapon)) = (hardpoint.outfit(), hardpoint.weapon()) else {
                continue;
            };
            if !weapon.is_anti_missile() || !hardpoint.is_ready() || !self.can_fire(weapon) {
                continue;
            }
            let muzzle = self.position + self.angle.rotate(hardpoint.offset()) * self.zoom;
            if (missile.position - muzzle).length() > weapon.range() {
                continue;
            }

            let name = name.to_owned();
            let weapon = weapon.clone();
            self.armament.fire(index);
            self.expend_ammo(&weapon, catalog);
            effects.push(Effect::new(name, muzzle, self.velocity, self.angle));

            let defense = rng.gen_range(0.0..weapon.anti_missile);
            let evasion = rng.gen_range(0.0..missile.weapon.missile_strength);
            let destroyed = defense > evasion;
            trace!(ship = %self.name, destroyed, "anti-missile fired");
            return destroyed;
        }
        false
    }

    /// Take a hit.
    ///
    /// Shields stronger than the shot's shield damage absorb it and take half
    /// its heat. Otherwise the shot breaks through: hull damage is scaled by
    /// the share of shield damage that was not absorbed, shields drop to zero
    /// and the ship takes the full heat. A shot that carries no shield damage
    /// cannot touch the hull while any shields remain.
    ///
    /// Returns the transitions the hit caused. `PROVOKE` is reported for a
    /// direct hit from a government this ship does not consider hostile,
    /// unless the ship is forbearing and still mostly intact.
    pub fn take_damage(&mut self, projectile: &Projectile, catalog: &Catalog) -> ShipEvents {
        let weapon = &projectile.weapon;
        let shield_damage = weapon.shield_damage;
        let mut hull_damage = weapon.hull_damage;
        let was_disabled = self.is_disabled();
        let was_destroyed = self.is_destroyed();

        self.is_boarding = false;

        if self.shields > shield_damage {
            self.shields -= shield_damage;
            self.heat += 0.5 * weapon.heat_damage;
        } else if self.shields == 0.0 || shield_damage != 0.0 {
            if shield_damage != 0.0 {
                hull_damage *= 1.0 - self.shields / shield_damage;
                self.shields = 0.0;
            }
            self.hull -= hull_damage;
            self.heat += weapon.heat_damage;
        }

        if weapon.hit_force != 0.0 {
            let d = self.position - projectile.position;
            let distance = d.length();
            if distance > 0.0 {
                self.apply_force(d * (weapon.hit_force / distance));
            }
        }

        let mut events = ShipEvents::NONE;
        if !was_disabled && self.is_disabled() {
            events |= ShipEvents::DISABLE;
        }
        if !was_destroyed && self.is_destroyed() {
            events |= ShipEvents::DESTROY;
        }
        let provoked = !projectile.is_blast
            && projectile.government.is_some()
            && !catalog.is_enemy(projectile.government.as_deref(), self.government.as_deref())
            && (self.shields() < PROVOKE_TOLERANCE
                || self.hull() < PROVOKE_TOLERANCE
                || !self.personality.forbearing);
        if provoked {
            events |= ShipEvents::PROVOKE;
        }
        if !events.is_empty() {
            debug!(ship = %self.name, ?events, hull = self.hull, shields = self.shields, "damage taken");
        }
        events
    }

    /// Push the ship. The resulting speed never exceeds the ship's own
    /// terminal velocity.
    pub fn apply_force(&mut self, force: Point) {
        let mass = self.mass();
        if mass <= 0.0 {
            return;
        }
        self.velocity += force / mass;
        let max_velocity = self.max_velocity();
        let speed = self.velocity.length();
        if speed > max_velocity {
            self.velocity *= max_velocity / speed;
        }
    }

    /// Scan `target` if commanded and in range of the scanners.
    pub fn scan(&self, target: Option<&ShipView>) -> ShipEvents {
        if !self.commands.has(Command::SCAN) || self.cannot_act() {
            return ShipEvents::NONE;
        }
        let Some(target) = target else {
            return ShipEvents::NONE;
        };

        let distance = (target.position - self.position).length();
        let mut events = ShipEvents::NONE;
        if distance < self.attributes.get(StatKey::CargoScan) {
            events |= ShipEvents::SCAN_CARGO;
        }
        if distance < self.attributes.get(StatKey::OutfitScan) {
            events |= ShipEvents::SCAN_OUTFITS;
        }
        events
    }
}

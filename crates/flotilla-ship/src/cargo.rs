//! Cargo hold: trade commodities and outfits carried as freight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outfits carried as freight, with the tonnage of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CargoOutfit {
    /// Units carried.
    pub count: u32,
    /// Tons per unit.
    pub unit_mass: f64,
}

/// A capacity-limited hold. Commodities weigh one ton per unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoHold {
    size: f64,
    commodities: BTreeMap<String, u32>,
    outfits: BTreeMap<String, CargoOutfit>,
}

impl CargoHold {
    /// An empty hold of `size` tons.
    pub fn new(size: f64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Capacity in tons.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Change the capacity. Existing cargo is kept even if it no longer fits.
    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    /// Tons in use.
    pub fn used(&self) -> f64 {
        let commodities: u32 = self.commodities.values().sum();
        let outfits: f64 = self
            .outfits
            .values()
            .map(|entry| f64::from(entry.count) * entry.unit_mass)
            .sum();
        f64::from(commodities) + outfits
    }

    /// Tons still available.
    pub fn free(&self) -> f64 {
        (self.size - self.used()).max(0.0)
    }

    /// Whether nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty() && self.outfits.is_empty()
    }

    /// Load up to `tons` of a commodity. Returns how many tons fit.
    pub fn add_commodity(&mut self, name: &str, tons: u32) -> u32 {
        let fits = (self.free().floor() as u32).min(tons);
        if fits > 0 {
            *self.commodities.entry(name.to_owned()).or_insert(0) += fits;
        }
        fits
    }

    /// Unload up to `tons` of a commodity. Returns how many tons came off.
    pub fn remove_commodity(&mut self, name: &str, tons: u32) -> u32 {
        let Some(held) = self.commodities.get_mut(name) else {
            return 0;
        };
        let removed = (*held).min(tons);
        *held -= removed;
        if *held == 0 {
            self.commodities.remove(name);
        }
        removed
    }

    /// Tons of `name` carried.
    pub fn commodity(&self, name: &str) -> u32 {
        self.commodities.get(name).copied().unwrap_or(0)
    }

    /// Load up to `count` units of an outfit. Returns how many fit.
    pub fn add_outfit(&mut self, name: &str, unit_mass: f64, count: u32) -> u32 {
        let fits = if unit_mass > 0.0 {
            ((self.free() / unit_mass).floor() as u32).min(count)
        } else {
            count
        };
        if fits > 0 {
            let entry = self
                .outfits
                .entry(name.to_owned())
                .or_insert(CargoOutfit { count: 0, unit_mass });
            entry.count += fits;
        }
        fits
    }

    /// Unload up to `count` units of an outfit. Returns how many came off.
    pub fn remove_outfit(&mut self, name: &str, count: u32) -> u32 {
        let Some(entry) = self.outfits.get_mut(name) else {
            return 0;
        };
        let removed = entry.count.min(count);
        entry.count -= removed;
        if entry.count == 0 {
            self.outfits.remove(name);
        }
        removed
    }

    /// Units of outfit `name` carried.
    pub fn outfit(&self, name: &str) -> u32 {
        self.outfits.get(name).map_or(0, |entry| entry.count)
    }

    /// Commodities carried, by name.
    pub fn commodities(&self) -> impl Iterator<Item = (&str, u32)> {
        self.commodities.iter().map(|(name, &tons)| (name.as_str(), tons))
    }

    /// Outfits carried, by name.
    pub fn outfits(&self) -> impl Iterator<Item = (&str, CargoOutfit)> {
        self.outfits.iter().map(|(name, &entry)| (name.as_str(), entry))
    }

    /// Move as much cargo as fits into `to`. Whatever does not fit stays.
    pub fn transfer_all(&mut self, to: &mut CargoHold) {
        let commodities: Vec<(String, u32)> = self
            .commodities
            .iter()
            .map(|(name, &tons)| (name.clone(), tons))
            .collect();
        for (name, tons) in commodities {
            let moved = to.add_commodity(&name, tons);
            self.remove_commodity(&name, moved);
        }

        let outfits: Vec<(String, CargoOutfit)> = self
            .outfits
            .iter()
            .map(|(name, &entry)| (name.clone(), entry))
            .collect();
        for (name, entry) in outfits {
            let moved = to.add_outfit(&name, entry.unit_mass, entry.count);
            self.remove_outfit(&name, moved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commodities_respect_capacity() {
        let mut hold = CargoHold::new(10.0);
        assert_eq!(hold.add_commodity("Food", 7), 7);
        assert_eq!(hold.add_commodity("Metal", 7), 3);
        assert_eq!(hold.free(), 0.0);
        assert_eq!(hold.remove_commodity("Food", 100), 7);
        assert_eq!(hold.commodity("Food"), 0);
        assert_eq!(hold.used(), 3.0);
    }

    #[test]
    fn outfits_use_their_unit_mass() {
        let mut hold = CargoHold::new(10.0);
        assert_eq!(hold.add_outfit("Blaster", 4.0, 5), 2);
        assert_eq!(hold.used(), 8.0);
        assert_eq!(hold.add_outfit("Decal", 0.0, 3), 3);
        assert_eq!(hold.outfit("Decal"), 3);
    }

    #[test]
    fn transfer_moves_only_what_fits() {
        let mut source = CargoHold::new(50.0);
        source.add_commodity("Food", 20);
        source.add_outfit("Blaster", 5.0, 2);
        let mut dest = CargoHold::new(25.0);

        source.transfer_all(&mut dest);

        assert_eq!(dest.commodity("Food"), 20);
        assert_eq!(dest.outfit("Blaster"), 1);
        assert_eq!(source.commodity("Food"), 0);
        assert_eq!(source.outfit("Blaster"), 1);
    }
}

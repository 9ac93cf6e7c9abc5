//! Responder units and the capacity pool they belong to.
//!
//! Units are registered once before a run and never removed. Their available
//! capacity only moves through [`ResponderPool::dispatch`] and
//! [`ResponderPool::release`], and always stays within `0..=total`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::grid::Coordinate;

/// Station size; fixes how many teams a unit holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn teams(self) -> u32 {
        match self {
            SizeClass::Small => 3,
            SizeClass::Medium => 5,
            SizeClass::Large => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderUnit {
    pub location: Coordinate,
    pub size: SizeClass,
    total_capacity: u32,
    available_capacity: u32,
}

impl ResponderUnit {
    pub fn new(size: SizeClass, location: Coordinate) -> Self {
        Self::with_capacity(size, location, size.teams())
    }

    /// Unit with an explicit team count instead of the size-class default.
    pub fn with_capacity(size: SizeClass, location: Coordinate, teams: u32) -> Self {
        Self {
            location,
            size,
            total_capacity: teams,
            available_capacity: teams,
        }
    }

    pub fn total_capacity(&self) -> u32 {
        self.total_capacity
    }

    pub fn available_capacity(&self) -> u32 {
        self.available_capacity
    }

    pub fn dispatched_capacity(&self) -> u32 {
        self.total_capacity - self.available_capacity
    }
}

/// How much of a requirement one unit can cover right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Requirement left after taking from this unit.
    pub remaining: u32,
    /// False only when the unit has nothing available.
    pub any_taken: bool,
    /// Teams this unit would contribute.
    pub taken: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ResponderPool {
    units: Vec<ResponderUnit>,
    by_location: HashMap<Coordinate, UnitId>,
}

impl ResponderPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, unit: ResponderUnit) -> Result<UnitId, PoolError> {
        if self.by_location.contains_key(&unit.location) {
            return Err(PoolError::DuplicateLocation(unit.location));
        }
        let id = UnitId(self.units.len());
        self.by_location.insert(unit.location, id);
        self.units.push(unit);
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Result<&ResponderUnit, PoolError> {
        self.units.get(id.0).ok_or(PoolError::UnknownUnit(id))
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut ResponderUnit, PoolError> {
        self.units.get_mut(id.0).ok_or(PoolError::UnknownUnit(id))
    }

    pub fn unit_at(&self, location: Coordinate) -> Option<UnitId> {
        self.by_location.get(&location).copied()
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &ResponderUnit)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Take `teams` from a unit. Fails without side effects if the unit has
    /// fewer available.
    pub fn dispatch(&mut self, id: UnitId, teams: u32) -> Result<(), PoolError> {
        let unit = self.unit_mut(id)?;
        if teams > unit.available_capacity {
            return Err(PoolError::InsufficientCapacity {
                unit: id,
                requested: teams,
                available: unit.available_capacity,
            });
        }
        unit.available_capacity -= teams;
        Ok(())
    }

    /// Return `teams` to a unit. Releasing more than was dispatched is an
    /// accounting bug and is rejected rather than clamped.
    pub fn release(&mut self, id: UnitId, teams: u32) -> Result<(), PoolError> {
        let unit = self.unit_mut(id)?;
        let restored = unit.available_capacity.saturating_add(teams);
        if restored > unit.total_capacity {
            return Err(PoolError::ReleaseExceedsCapacity {
                unit: id,
                released: teams,
                available: unit.available_capacity,
                total: unit.total_capacity,
            });
        }
        unit.available_capacity = restored;
        Ok(())
    }

    pub fn check_availability(&self, id: UnitId, required: u32) -> Result<Availability, PoolError> {
        let available = self.unit(id)?.available_capacity;
        let taken = required.min(available);
        Ok(Availability {
            remaining: required.saturating_sub(available),
            any_taken: available > 0,
            taken,
        })
    }

    /// Restore every unit to full capacity.
    pub fn reset(&mut self) {
        for unit in &mut self.units {
            unit.available_capacity = unit.total_capacity;
        }
    }

    pub fn total_capacity(&self) -> u32 {
        self.units.iter().map(|u| u.total_capacity).sum()
    }

    pub fn available_capacity(&self) -> u32 {
        self.units.iter().map(|u| u.available_capacity).sum()
    }

    pub fn dispatched_capacity(&self) -> u32 {
        self.units.iter().map(ResponderUnit::dispatched_capacity).sum()
    }

    pub fn is_fully_available(&self) -> bool {
        self.units
            .iter()
            .all(|u| u.available_capacity == u.total_capacity)
    }
}

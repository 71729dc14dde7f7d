#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Lemming Defence.
//!
//! The [`World`] owns the navigation grid and the unit roster. It is only
//! mutated through [`apply`], which executes a [`Command`] and reports what
//! changed as [`Event`] values; read access goes through [`query`].

mod grid;
mod navigation;
mod units;

use std::time::Duration;

use lemming_defence_core::{
    AttackBehavior, CellCoord, Command, Event, Faction, MoverType, UnitId, DEFAULT_GRID_HEIGHT,
    DEFAULT_GRID_WIDTH,
};
use tracing::{debug, warn};

pub use grid::{Grid, GridPoint, SavedBlockers};
pub use navigation::Navigation;
pub use units::MovementBehavior;

use crate::units::{choose_target, Unit};

const DEFAULT_TILE_LENGTH: f32 = 100.0;

/// Represents the authoritative Lemming Defence world state.
#[derive(Debug)]
pub struct World {
    navigation: Navigation,
    units: Vec<Unit>,
    next_unit: u32,
    elapsed: Duration,
}

impl World {
    /// Creates a world on an open default-sized grid with no units.
    #[must_use]
    pub fn new() -> Self {
        Self::with_navigation(Navigation::new(
            DEFAULT_GRID_WIDTH,
            DEFAULT_GRID_HEIGHT,
            DEFAULT_TILE_LENGTH,
        ))
    }

    /// Creates a world around an existing navigation grid.
    #[must_use]
    pub fn with_navigation(navigation: Navigation) -> Self {
        Self {
            navigation,
            units: Vec::new(),
            next_unit: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn unit_index(&self, unit: UnitId) -> Option<usize> {
        self.units.binary_search_by_key(&unit, |candidate| candidate.id).ok()
    }

    fn spawn(&mut self, command: SpawnRequest, out_events: &mut Vec<Event>) {
        let cell = command.at.or(self.navigation.first_tile());
        let Some(cell) = cell.filter(|cell| self.navigation.point(*cell).is_some()) else {
            debug!(cell = ?command.at, "rejected spawn outside the grid");
            out_events.push(Event::SpawnRejected { cell: command.at });
            return;
        };

        let id = UnitId::new(self.next_unit);
        self.next_unit = self.next_unit.saturating_add(1);

        let _ = self.navigation.occupy(cell, id);
        self.units.push(Unit::new(
            id,
            command.faction,
            command.mover,
            command.speed,
            command.attack,
            cell,
        ));
        out_events.push(Event::UnitSpawned { unit: id, cell });
    }

    fn plan(&mut self, unit: UnitId, destination: CellCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.unit_index(unit) else {
            return;
        };
        let (cell, mover) = (self.units[index].cell, self.units[index].mover);

        match self.navigation.path_to(cell, destination, mover) {
            Some(path) => {
                let unit_state = &mut self.units[index];
                unit_state.assign_path(path);
                out_events.push(Event::PathAssigned {
                    unit,
                    steps: unit_state.tiles_until_end(),
                });
                if !unit_state.has_path() {
                    out_events.push(Event::DestinationReached {
                        unit,
                        cell: unit_state.cell,
                    });
                }
            }
            None => {
                warn!(?unit, ?destination, ?mover, "no path for unit");
                self.units[index].clear_path();
                out_events.push(Event::PathNotFound { unit, destination });
            }
        }
    }

    fn acquire_targets(&mut self, out_events: &mut Vec<Event>) {
        let roster: Vec<(UnitId, Faction, usize)> = self
            .units
            .iter()
            .map(|unit| (unit.id, unit.faction, unit.tiles_until_end()))
            .collect();
        let lookup = |id: UnitId| {
            roster
                .binary_search_by_key(&id, |entry| entry.0)
                .ok()
                .map(|index| roster[index])
        };

        for unit in &mut self.units {
            let Some(range) = unit.attack.range() else {
                continue;
            };
            let Some(origin) = self.navigation.point(unit.cell) else {
                continue;
            };

            let candidates = self
                .navigation
                .points_in_range(unit.cell, range)
                .into_iter()
                .filter(|point| origin.in_range(point, range as f32))
                .flat_map(|point| point.occupants().iter().copied())
                .filter(|occupant| *occupant != unit.id)
                .filter_map(lookup);
            let target = choose_target(unit.faction, candidates);

            let was_halted = unit.is_halted();
            let previous = unit.target;
            unit.target = target;
            if !unit.attack.halts_on_target() {
                continue;
            }

            match target {
                Some(target) if previous != Some(target) => {
                    out_events.push(Event::UnitHalted {
                        unit: unit.id,
                        target,
                    });
                }
                None if was_halted => out_events.push(Event::UnitResumed { unit: unit.id }),
                _ => {}
            }
        }
    }

    fn advance_units(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for unit in &mut self.units {
            let travelling = unit.has_path();
            unit.accumulate(dt);

            let mut from = unit.cell;
            while let Some(to) = unit.take_step() {
                let _ = self.navigation.vacate(from, unit.id);
                let _ = self.navigation.occupy(to, unit.id);
                out_events.push(Event::UnitAdvanced {
                    unit: unit.id,
                    from,
                    to,
                });
                from = to;
            }

            if travelling && !unit.has_path() {
                out_events.push(Event::DestinationReached {
                    unit: unit.id,
                    cell: unit.cell,
                });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

struct SpawnRequest {
    faction: Faction,
    mover: MoverType,
    speed: f32,
    attack: AttackBehavior,
    at: Option<CellCoord>,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMap { tiles, tile_length } => {
            world.navigation = Navigation::from_tile_map(&tiles, tile_length);
            world.units.clear();
            out_events.push(Event::MapConfigured {
                width: tiles.width(),
                height: tiles.height(),
                start: world.navigation.first_tile(),
                end: world.navigation.last_tile(),
            });
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.acquire_targets(out_events);
            world.advance_units(dt, out_events);
        }
        Command::SpawnUnit {
            faction,
            mover,
            speed,
            attack,
            at,
        } => world.spawn(
            SpawnRequest {
                faction,
                mover,
                speed,
                attack,
                at,
            },
            out_events,
        ),
        Command::PathUnitTo { unit, destination } => world.plan(unit, destination, out_events),
        Command::AddBlocker { cell, mover } => {
            if let Some(count) = world.navigation.add_blocker(cell, mover) {
                out_events.push(Event::BlockersChanged { cell, mover, count });
            }
        }
        Command::RemoveBlocker { cell, mover } => {
            if world.navigation.remove_blocker(cell, mover) {
                let count = world.navigation.blockers(cell, mover).unwrap_or(0);
                out_events.push(Event::BlockersChanged { cell, mover, count });
            }
        }
        Command::RemoveUnit { unit } => {
            if let Some(index) = world.unit_index(unit) {
                let removed = world.units.remove(index);
                let _ = world.navigation.vacate(removed.cell, unit);
                out_events.push(Event::UnitRemoved {
                    unit,
                    cell: removed.cell,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use lemming_defence_core::{AttackBehavior, CellCoord, Faction, MoverType, UnitId};

    use super::{MovementBehavior, Navigation, Unit, World};

    /// Provides read-only access to the navigation grid.
    #[must_use]
    pub fn navigation(world: &World) -> &Navigation {
        &world.navigation
    }

    /// Total simulated time applied through ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures every unit in ascending identifier order.
    #[must_use]
    pub fn unit_view(world: &World) -> Vec<UnitSnapshot> {
        world.units.iter().map(UnitSnapshot::from_unit).collect()
    }

    /// Captures a single unit, if it exists.
    #[must_use]
    pub fn unit(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
        world
            .unit_index(unit)
            .map(|index| UnitSnapshot::from_unit(&world.units[index]))
    }

    /// Read-only snapshot of a unit.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct UnitSnapshot {
        /// Identifier of the unit.
        pub id: UnitId,
        /// Side the unit fights for.
        pub faction: Faction,
        /// Traversal capability of the unit.
        pub mover: MoverType,
        /// Movement rules of the unit.
        pub movement: MovementBehavior,
        /// Engagement rules of the unit.
        pub attack: AttackBehavior,
        /// Cell the unit stands on.
        pub cell: CellCoord,
        /// Enemy currently engaged, if any.
        pub target: Option<UnitId>,
        /// Cells left before the unit's path ends.
        pub tiles_until_end: usize,
        /// Whether an engagement currently stops the unit from moving.
        pub halted: bool,
    }

    impl UnitSnapshot {
        fn from_unit(unit: &Unit) -> Self {
            Self {
                id: unit.id,
                faction: unit.faction,
                mover: unit.mover,
                movement: unit.movement,
                attack: unit.attack,
                cell: unit.cell,
                target: unit.target,
                tiles_until_end: unit.tiles_until_end(),
                halted: unit.is_halted(),
            }
        }
    }
}

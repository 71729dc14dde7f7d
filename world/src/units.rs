//! Units, their movement along planned paths and target selection.

use std::time::Duration;

use lemming_defence_core::{AttackBehavior, CellCoord, Faction, MoverType, UnitId};

/// How a unit travels along its planned path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementBehavior {
    /// Follows the planned path at a fixed number of cells per second.
    Generic {
        /// Cells travelled per second.
        speed: f32,
    },
    /// Never leaves the spawn cell.
    Stationary,
}

impl MovementBehavior {
    /// Movement matching the traversal capability of a mover type.
    #[must_use]
    pub fn for_mover(mover: MoverType, speed: f32) -> Self {
        match mover {
            MoverType::Walker | MoverType::Flyer => Self::Generic {
                speed: speed.max(0.0),
            },
            MoverType::Stationary => Self::Stationary,
        }
    }

    /// Cells per second, zero for stationary units.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        match self {
            Self::Generic { speed } => *speed,
            Self::Stationary => 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) faction: Faction,
    pub(crate) mover: MoverType,
    pub(crate) movement: MovementBehavior,
    pub(crate) attack: AttackBehavior,
    pub(crate) cell: CellCoord,
    pub(crate) target: Option<UnitId>,
    path: Vec<CellCoord>,
    next: usize,
    progress: f32,
}

impl Unit {
    pub(crate) fn new(
        id: UnitId,
        faction: Faction,
        mover: MoverType,
        speed: f32,
        attack: AttackBehavior,
        cell: CellCoord,
    ) -> Self {
        Self {
            id,
            faction,
            mover,
            movement: MovementBehavior::for_mover(mover, speed),
            attack,
            cell,
            target: None,
            path: Vec::new(),
            next: 0,
            progress: 0.0,
        }
    }

    /// Replaces the planned path. A path starting on the unit's cell skips it.
    pub(crate) fn assign_path(&mut self, path: Vec<CellCoord>) {
        self.next = usize::from(path.first() == Some(&self.cell));
        self.path = path;
        self.progress = 0.0;
        if self.tiles_until_end() == 0 {
            self.clear_path();
        }
    }

    pub(crate) fn clear_path(&mut self) {
        self.path.clear();
        self.next = 0;
        self.progress = 0.0;
    }

    pub(crate) fn has_path(&self) -> bool {
        self.next < self.path.len()
    }

    /// Cells left to enter before the path ends.
    pub(crate) fn tiles_until_end(&self) -> usize {
        self.path.len().saturating_sub(self.next)
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.target.is_some() && self.attack.halts_on_target()
    }

    /// Accumulates travel progress for the elapsed time.
    pub(crate) fn accumulate(&mut self, dt: Duration) {
        if self.is_halted() || !self.has_path() {
            return;
        }
        self.progress += self.movement.speed() * dt.as_secs_f32();
    }

    /// Consumes one cell of progress, returning the cell entered.
    pub(crate) fn take_step(&mut self) -> Option<CellCoord> {
        if self.progress < 1.0 || !self.has_path() {
            return None;
        }

        let next = *self.path.get(self.next)?;
        self.next += 1;
        self.progress -= 1.0;
        self.cell = next;

        if !self.has_path() {
            self.clear_path();
        }
        Some(next)
    }
}

/// Picks the enemy to engage among `candidates`, visited in scan order.
///
/// Each candidate is `(unit, faction, tiles_until_end)`. The enemy closest to
/// the end of its own path wins; ties keep the first one scanned.
pub(crate) fn choose_target<I>(faction: Faction, candidates: I) -> Option<UnitId>
where
    I: IntoIterator<Item = (UnitId, Faction, usize)>,
{
    let mut best: Option<(UnitId, usize)> = None;
    for (unit, other, remaining) in candidates {
        if !faction.is_hostile_to(other) {
            continue;
        }
        if best.map_or(true, |(_, closest)| remaining < closest) {
            best = Some((unit, remaining));
        }
    }
    best.map(|(unit, _)| unit)
}

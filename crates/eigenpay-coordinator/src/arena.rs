//! # Dispute Arena
//!
//! Disputes occupy slots addressed by [`DisputeHandle`]. Resolving a dispute
//! drops its working state and keeps only the outcome; releasing an expired
//! dispute empties the slot. Either way the slot returns to the free list
//! and its next occupant is issued under a higher generation, so handles to
//! earlier occupants fail with [`CoordinatorError::StaleHandle`].

use eigenpay_dispute::{Dispute, DisputeHandle, DisputeOutcome};

use crate::error::CoordinatorError;

#[derive(Debug)]
enum SlotState {
    Vacant,
    Active(Box<Dispute>),
    Resolved(DisputeOutcome),
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    state: SlotState,
}

/// Generational slot storage for disputes.
#[derive(Debug, Default)]
pub struct DisputeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl DisputeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dispute built for the handle it will occupy.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::ArenaFull`] if no index is available, or
    /// any error from `build`. A failed build leaves the arena unchanged.
    pub fn insert_with<F>(&mut self, build: F) -> Result<DisputeHandle, CoordinatorError>
    where
        F: FnOnce(DisputeHandle) -> Result<Dispute, CoordinatorError>,
    {
        let handle = self.next_handle()?;
        let dispute = build(handle)?;
        let index = handle.index() as usize;
        if index == self.slots.len() {
            self.slots.push(Slot {
                generation: handle.generation(),
                state: SlotState::Active(Box::new(dispute)),
            });
        } else {
            self.free.pop();
            self.slots[index] = Slot {
                generation: handle.generation(),
                state: SlotState::Active(Box::new(dispute)),
            };
        }
        Ok(handle)
    }

    /// The active dispute at `handle`.
    pub fn get(&self, handle: DisputeHandle) -> Result<&Dispute, CoordinatorError> {
        match &self.slot(handle)?.state {
            SlotState::Active(d) => Ok(d),
            SlotState::Resolved(_) => Err(CoordinatorError::AlreadyResolved(handle)),
            SlotState::Vacant => Err(self.stale(handle)),
        }
    }

    /// The active dispute at `handle`, mutably.
    pub fn get_mut(&mut self, handle: DisputeHandle) -> Result<&mut Dispute, CoordinatorError> {
        self.slot(handle)?;
        let stale = self.stale(handle);
        match &mut self.slots[handle.index() as usize].state {
            SlotState::Active(d) => Ok(d),
            SlotState::Resolved(_) => Err(CoordinatorError::AlreadyResolved(handle)),
            SlotState::Vacant => Err(stale),
        }
    }

    /// The stored outcome of a resolved dispute.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NotResolved`] while the dispute is active.
    pub fn outcome(&self, handle: DisputeHandle) -> Result<&DisputeOutcome, CoordinatorError> {
        match &self.slot(handle)?.state {
            SlotState::Resolved(o) => Ok(o),
            SlotState::Active(_) => Err(CoordinatorError::NotResolved(handle)),
            SlotState::Vacant => Err(self.stale(handle)),
        }
    }

    /// Replace an active dispute with its outcome and free the slot.
    pub fn resolve(&mut self, handle: DisputeHandle, outcome: DisputeOutcome) -> Result<(), CoordinatorError> {
        self.get(handle)?;
        self.slots[handle.index() as usize].state = SlotState::Resolved(outcome);
        self.free.push(handle.index());
        Ok(())
    }

    /// Drop an active dispute without an outcome and free the slot.
    pub fn release(&mut self, handle: DisputeHandle) -> Result<Dispute, CoordinatorError> {
        self.get(handle)?;
        let index = handle.index() as usize;
        match std::mem::replace(&mut self.slots[index].state, SlotState::Vacant) {
            SlotState::Active(d) => {
                self.free.push(handle.index());
                Ok(*d)
            }
            other => {
                self.slots[index].state = other;
                Err(CoordinatorError::AlreadyResolved(handle))
            }
        }
    }

    /// Number of active disputes.
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Active(_)))
            .count()
    }

    fn next_handle(&self) -> Result<DisputeHandle, CoordinatorError> {
        if let Some(&index) = self.free.last() {
            let generation = self.slots[index as usize]
                .generation
                .checked_add(1)
                .ok_or(CoordinatorError::ArenaFull)?;
            return Ok(DisputeHandle::new(index, generation));
        }
        let index = u32::try_from(self.slots.len()).map_err(|_| CoordinatorError::ArenaFull)?;
        Ok(DisputeHandle::new(index, 0))
    }

    fn slot(&self, handle: DisputeHandle) -> Result<&Slot, CoordinatorError> {
        let slot = self
            .slots
            .get(handle.index() as usize)
            .ok_or(CoordinatorError::UnknownHandle(handle))?;
        if slot.generation != handle.generation() {
            return Err(CoordinatorError::StaleHandle {
                handle,
                current_generation: slot.generation,
            });
        }
        Ok(slot)
    }

    fn stale(&self, handle: DisputeHandle) -> CoordinatorError {
        let current_generation = self
            .slots
            .get(handle.index() as usize)
            .map_or(handle.generation(), |s| s.generation);
        CoordinatorError::StaleHandle {
            handle,
            current_generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eigenpay_core::{AccountId, AmountSplit, PeriodRange, Timestamp};
    use eigenpay_dispute::{DisputeSetup, Party, ResolutionReason};

    fn build(handle: DisputeHandle) -> Result<Dispute, CoordinatorError> {
        let setup = DisputeSetup {
            operator: AccountId::from_bytes([1; 20]),
            challenger: AccountId::from_bytes([2; 20]),
            range: PeriodRange::new(0, 4).unwrap(),
            split: AmountSplit::new(2, 2),
            first_turn: Party::Operator,
        };
        Ok(Dispute::new(setup, handle, Timestamp::from_epoch_secs(0).unwrap())?)
    }

    fn outcome(handle: DisputeHandle) -> DisputeOutcome {
        DisputeOutcome {
            handle,
            operator: AccountId::from_bytes([1; 20]),
            challenger: AccountId::from_bytes([2; 20]),
            challenge_successful: true,
            reason: ResolutionReason::Timeout { lapsed: Party::Operator },
            resolved_at: Timestamp::from_epoch_secs(10).unwrap(),
        }
    }

    #[test]
    fn handles_are_sequential_and_carry_their_slot() {
        let mut arena = DisputeArena::new();
        let a = arena.insert_with(build).unwrap();
        let b = arena.insert_with(build).unwrap();
        assert_eq!(a, DisputeHandle::new(0, 0));
        assert_eq!(b, DisputeHandle::new(1, 0));
        assert_eq!(arena.get(b).unwrap().coordinator_ref(), b);
        assert_eq!(arena.active_count(), 2);
    }

    #[test]
    fn resolved_slot_keeps_outcome_until_reused() {
        let mut arena = DisputeArena::new();
        let a = arena.insert_with(build).unwrap();
        arena.resolve(a, outcome(a)).unwrap();

        assert!(matches!(arena.get(a), Err(CoordinatorError::AlreadyResolved(_))));
        assert!(matches!(arena.get_mut(a), Err(CoordinatorError::AlreadyResolved(_))));
        assert!(arena.outcome(a).unwrap().challenge_successful);

        let reused = arena.insert_with(build).unwrap();
        assert_eq!(reused, DisputeHandle::new(0, 1));
        assert!(matches!(arena.get(a), Err(CoordinatorError::StaleHandle { current_generation: 1, .. })));
        assert!(matches!(arena.outcome(a), Err(CoordinatorError::StaleHandle { .. })));
    }

    #[test]
    fn released_slot_is_vacant_then_reused() {
        let mut arena = DisputeArena::new();
        let a = arena.insert_with(build).unwrap();
        arena.release(a).unwrap();
        assert_eq!(arena.active_count(), 0);
        assert!(matches!(arena.get(a), Err(CoordinatorError::StaleHandle { .. })));
        assert!(arena.release(a).is_err());
        assert_eq!(arena.insert_with(build).unwrap(), DisputeHandle::new(0, 1));
    }

    #[test]
    fn failed_build_leaves_arena_unchanged() {
        let mut arena = DisputeArena::new();
        let a = arena.insert_with(build).unwrap();
        arena.resolve(a, outcome(a)).unwrap();
        let err = arena.insert_with(|_| Err(CoordinatorError::ArenaFull));
        assert!(err.is_err());
        assert!(arena.outcome(a).is_ok());
        assert_eq!(arena.insert_with(build).unwrap(), DisputeHandle::new(0, 1));
    }

    #[test]
    fn unknown_index_rejected() {
        let arena = DisputeArena::new();
        assert!(matches!(
            arena.get(DisputeHandle::new(7, 0)),
            Err(CoordinatorError::UnknownHandle(_))
        ));
    }

    #[test]
    fn double_resolve_rejected() {
        let mut arena = DisputeArena::new();
        let a = arena.insert_with(build).unwrap();
        arena.resolve(a, outcome(a)).unwrap();
        assert!(arena.resolve(a, outcome(a)).is_err());
    }
}

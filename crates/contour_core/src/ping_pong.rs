//! Two-slot ping-pong buffer roles

use crate::buffers::BufferId;

/// One of the two ping-pong slots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Read/write roles of two equally sized buffers
///
/// Every pass reads one slot and writes the other, then [`PingPong::swap`]s.
/// The starting slot is picked from the parity of the number of passes still
/// to run so the last write always lands in slot A.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PingPong {
    buffers: [BufferId; 2],
    read: Slot,
}

impl PingPong {
    pub fn new(a: BufferId, b: BufferId) -> Self {
        Self {
            buffers: [a, b],
            read: Slot::A,
        }
    }

    /// Slot that must receive the seed so `passes` swaps end in slot A
    pub fn seed_slot(passes: usize) -> Slot {
        if passes % 2 == 0 {
            Slot::A
        } else {
            Slot::B
        }
    }

    /// Roles for a loop of `passes` passes whose seed sits in [`Self::seed_slot`]
    pub fn starting_at(a: BufferId, b: BufferId, passes: usize) -> Self {
        Self {
            buffers: [a, b],
            read: Self::seed_slot(passes),
        }
    }

    pub fn buffer(&self, slot: Slot) -> BufferId {
        self.buffers[slot.index()]
    }

    pub fn read_slot(&self) -> Slot {
        self.read
    }

    /// Buffer sampled by the current pass
    pub fn read(&self) -> BufferId {
        self.buffer(self.read)
    }

    /// Buffer written by the current pass
    pub fn write(&self) -> BufferId {
        self.buffer(self.read.other())
    }

    pub fn swap(&mut self) {
        self.read = self.read.other();
    }

    /// Buffer holding the result once all passes ran
    pub fn final_buffer(&self) -> BufferId {
        self.buffer(Slot::A)
    }
}

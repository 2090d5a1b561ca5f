/// Identifies one scheduled tick chain. A handle stays valid until it is
/// cancelled; after that its slot may be reused under a new generation, so a
/// message carrying an old handle can never be mistaken for the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    live: bool,
}

#[derive(Debug, Default)]
pub struct TickScheduler {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self) -> TickHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.live = true;
            return TickHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            live: true,
        });
        TickHandle {
            index,
            generation: 0,
        }
    }

    /// Returns false when the handle was already stale.
    pub fn cancel(&mut self, handle: TickHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        self.slots[handle.index as usize].live = false;
        self.free.push(handle.index);
        true
    }

    pub fn is_live(&self, handle: TickHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .map(|slot| slot.live && slot.generation == handle.generation)
            .unwrap_or(false)
    }
}

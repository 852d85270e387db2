#[derive(Debug)]
pub struct IndexPool {
    // Hands out unique slot indices and recycles the ones given back.
    //
    // Clients keep their own `Vec` of slots; an index from `take` is either the
    // next fresh slot (== current length) or one that was previously given back.
    free: Vec<u32>,
    // One flag per index ever handed out; true while taken.
    taken: Vec<bool>,
}

impl IndexPool {
    pub fn new() -> IndexPool {
        IndexPool {
            free: Vec::new(),
            taken: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> IndexPool {
        IndexPool {
            free: Vec::with_capacity(capacity),
            taken: Vec::with_capacity(capacity),
        }
    }

    pub fn take(&mut self) -> u32 {
        // Reuse the most recently released index first.
        if let Some(index) = self.free.pop() {
            self.taken[index as usize] = true;
            return index;
        }

        let index = self.taken.len() as u32;
        self.taken.push(true);
        index
    }

    pub fn give(&mut self, index: u32) {
        debug_assert!(!self.is_free(index), "index {} is not taken", index);
        match self.taken.get_mut(index as usize) {
            Some(taken) if *taken => {
                *taken = false;
                self.free.push(index);
            }
            _ => {}
        }
    }

    /// Number of indices currently taken.
    pub fn live(&self) -> usize {
        self.taken.len() - self.free.len()
    }

    /// One past the highest index ever handed out.
    pub fn high_water(&self) -> usize {
        self.taken.len()
    }

    pub fn is_free(&self, index: u32) -> bool {
        !self.taken.get(index as usize).copied().unwrap_or(false)
    }
}

impl Default for IndexPool {
    fn default() -> Self {
        Self::new()
    }
}

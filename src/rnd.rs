use std::cell::Cell;

const TABLE_LEN: usize = 256;

/// Table-driven pseudo random source for the AI direction picks. The
/// table is filled once from a small LCG so runs are reproducible from
/// the seed alone.
pub struct RndT {
    table: [u8; TABLE_LEN],
    index: Cell<usize>,
}

pub fn new_rnd_t(seed: u32) -> RndT {
    let mut table = [0u8; TABLE_LEN];
    let mut state = seed | 1;
    for entry in table.iter_mut() {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        *entry = (state >> 16) as u8;
    }
    RndT {
        table,
        index: Cell::new(0),
    }
}

impl RndT {
    pub fn rnd_t(&self) -> u8 {
        let ix = self.index.get();
        self.index.set((ix + 1) & (TABLE_LEN - 1));
        self.table[ix]
    }
}

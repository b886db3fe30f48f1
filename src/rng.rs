use anyhow::{anyhow, Result};

/// Small seeded generator for everything random in a session: the cube code,
/// light flicker and the scare delay. Seeded once from the browser's crypto
/// source so tests can swap in a fixed seed.
#[derive(Debug, Clone)]
pub struct SessionRng {
    state: u64,
}

impl SessionRng {
    pub fn from_seed(seed: u64) -> Self {
        SessionRng { state: seed }
    }

    pub fn from_entropy() -> Result<Self> {
        let mut bytes = [0u8; 8];
        getrandom::getrandom(&mut bytes)
            .map_err(|err| anyhow!("Could not seed session rng : {}", err))?;
        Ok(SessionRng::from_seed(u64::from_le_bytes(bytes)))
    }

    /// splitmix64 step
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// uniform in [low, high)
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    /// uniform in [low, high), `low` when the range is empty
    pub fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + (self.next_u64() % u64::from(high - low)) as u32
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_u64() % items.len() as u64) as usize;
        items.get(index).copied()
    }
}

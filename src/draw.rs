//! Draw Engine
//!
//! Tracks which pool numbers are still in the drum and the order in which
//! the others were called.

use crate::error::{CallerError, CallerResult};
use crate::pool::Pool;
use rand::Rng;
use tracing::debug;

/// Remaining and drawn numbers for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawState {
    remaining: Vec<u8>,
    drawn: Vec<u8>,
    last_drawn: Option<u8>,
}

impl DrawState {
    /// Fresh state with every pool number remaining
    pub fn reset(pool: &Pool) -> Self {
        Self {
            remaining: pool.numbers().to_vec(),
            drawn: Vec::new(),
            last_drawn: None,
        }
    }

    /// Numbers still available, in pool order
    pub fn remaining(&self) -> &[u8] {
        &self.remaining
    }

    /// Numbers called so far, oldest first
    pub fn drawn(&self) -> &[u8] {
        &self.drawn
    }

    pub fn last_drawn(&self) -> Option<u8> {
        self.last_drawn
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Take one remaining number, chosen uniformly at random
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> CallerResult<u8> {
        if self.remaining.is_empty() {
            return Err(CallerError::EmptyPool);
        }

        let index = rng.gen_range(0..self.remaining.len());
        let number = self.remaining.remove(index);
        self.drawn.push(number);
        self.last_drawn = Some(number);

        debug!(
            "Drew {} ({} remaining, {} drawn)",
            number,
            self.remaining.len(),
            self.drawn.len()
        );
        Ok(number)
    }

    /// Rebuild `remaining` from a (possibly regenerated) pool, keeping the
    /// drawn history untouched
    pub fn resume(&mut self, pool: &Pool) {
        self.remaining = resume_remaining(pool, &self.drawn);
    }
}

/// `pool − drawn`, preserving pool order
pub fn resume_remaining(pool: &Pool, drawn: &[u8]) -> Vec<u8> {
    pool.numbers()
        .iter()
        .copied()
        .filter(|n| !drawn.contains(n))
        .collect()
}

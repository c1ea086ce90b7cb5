//! Test helpers producing predictable random streams.

#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::cast_precision_loss
)]

use rand::RngCore;

/// Random number generator that replays a fixed script of `u64` values, starting over once the
/// script is exhausted.
///
/// Together with [`uniform_bits`], it produces (approximately) chosen uniform draws, which makes
/// event times in unit tests predictable.
pub struct ScriptedRng {
    script: Vec<u64>,
    next: usize,
}

impl ScriptedRng {
    /// Constructs a generator replaying `script`.
    ///
    /// # Panics
    ///
    /// Panics if `script` is empty.
    #[must_use]
    pub fn new(script: Vec<u64>) -> Self {
        assert!(!script.is_empty(), "script must not be empty");
        Self { script, next: 0 }
    }

    /// Constructs a generator that always returns `value`.
    #[must_use]
    pub fn constant(value: u64) -> Self {
        Self::new(vec![value])
    }

    /// Constructs a generator whose uniform draws approximate the given values, in order.
    #[must_use]
    pub fn from_uniforms(values: &[f64]) -> Self {
        Self::new(values.iter().copied().map(uniform_bits).collect())
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.script[self.next];
        self.next = (self.next + 1) % self.script.len();
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Returns a `u64` whose most significant bits encode `u`, a value in `[0, 1)`.
///
/// Float samplers build their values from the high bits of `next_u64`, so a uniform draw from a
/// [`ScriptedRng`] returning this value is within `2^-52` of `u`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn uniform_bits(u: f64) -> u64 {
    assert!((0.0..1.0).contains(&u), "{} is not in [0, 1)", u);
    (u * 18_446_744_073_709_551_616.0) as u64
}

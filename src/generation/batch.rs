//! Token range generation over one shared draw stream
//!
//! Token `i` always consumes the draws following those of tokens `0..i`, so a
//! range can be regenerated in isolation by fast-forwarding the stream.

use crate::generation::attributes::AttributeSet;
use crate::generation::engine::AttributeGenerator;
use crate::generation::random::DrawSource;
use crate::io::error::Result;
use std::ops::Range;
use tracing::debug;

/// Outcome of a token range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Tokens generated and emitted
    pub generated: usize,
    /// Tokens whose draws were consumed without generating
    pub skipped: usize,
}

/// Generates consecutive token ids from a shared stream
pub struct BatchGenerator<'g, 'a> {
    generator: &'g AttributeGenerator<'a>,
    tokens: Range<usize>,
}

impl<'g, 'a> BatchGenerator<'g, 'a> {
    /// Generate `count` tokens starting at `start`
    pub const fn new(generator: &'g AttributeGenerator<'a>, start: usize, count: usize) -> Self {
        Self {
            generator,
            tokens: start..start.saturating_add(count),
        }
    }

    /// Token ids covered by the batch
    pub fn tokens(&self) -> Range<usize> {
        self.tokens.clone()
    }

    /// Advance the stream to the first token of the batch
    pub fn fast_forward<R: DrawSource + ?Sized>(&self, rng: &mut R) {
        if self.tokens.start > 0 {
            debug!(tokens = self.tokens.start, "fast-forwarding stream");
            self.generator.skip_tokens(rng, self.tokens.start);
        }
    }

    /// Run the batch, handing each generated set to `emit`
    ///
    /// Tokens rejected by `include` still consume one token's worth of draws.
    /// The stream must already be positioned at the first token.
    ///
    /// # Errors
    ///
    /// Propagates generation and `emit` failures
    pub fn run<R, I, E>(&self, rng: &mut R, mut include: I, mut emit: E) -> Result<BatchStats>
    where
        R: DrawSource + ?Sized,
        I: FnMut(usize) -> bool,
        E: FnMut(usize, AttributeSet) -> Result<()>,
    {
        let mut stats = BatchStats::default();

        for token_id in self.tokens.clone() {
            if !include(token_id) {
                self.generator.skip_tokens(rng, 1);
                stats.skipped += 1;
                continue;
            }

            let attributes = self.generator.generate(rng)?;
            debug!(token_id, ?attributes, "generated token");
            emit(token_id, attributes)?;
            stats.generated += 1;
        }

        Ok(stats)
    }
}

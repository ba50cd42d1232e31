//! Duplicate detection and regeneration

use crate::generation::attributes::AttributeSet;
use crate::generation::engine::AttributeGenerator;
use crate::generation::random::DrawSource;
use crate::io::configuration::MAX_DEDUPE_ATTEMPTS;
use crate::io::error::{GeneratorError, Result};
use crate::io::metadata::NftMetadata;
use md5::{Digest, Md5};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// MD5 of a record's metadata JSON, ignoring the given attributes
pub fn attribute_hash(attributes: &AttributeSet, ignore_attributes: &[String]) -> String {
    let kept: AttributeSet = attributes
        .iter()
        .filter(|(attribute, _)| !ignore_attributes.iter().any(|i| i == attribute))
        .collect();
    let encoded = serde_json::to_vec(&NftMetadata::from_attributes(&kept)).unwrap_or_default();
    hex::encode(Md5::digest(&encoded))
}

/// Token ids whose hash already appeared on a lower token id
pub fn find_duplicates(records: &[(usize, AttributeSet)], ignore_attributes: &[String]) -> Vec<usize> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|(_, attributes)| !seen.insert(attribute_hash(attributes, ignore_attributes)))
        .map(|(token_id, _)| *token_id)
        .collect()
}

/// Regenerates colliding tokens until every hash is unique
pub struct Deduplicator<'g, 'a> {
    generator: &'g AttributeGenerator<'a>,
    ignore_attributes: &'g [String],
    hashes: HashMap<String, usize>,
}

impl<'g, 'a> Deduplicator<'g, 'a> {
    /// Index the hashes of the existing records
    pub fn new(
        generator: &'g AttributeGenerator<'a>,
        ignore_attributes: &'g [String],
        records: &[(usize, AttributeSet)],
    ) -> Self {
        let mut hashes = HashMap::new();
        for (_, attributes) in records {
            *hashes
                .entry(attribute_hash(attributes, ignore_attributes))
                .or_insert(0) += 1;
        }
        Self {
            generator,
            ignore_attributes,
            hashes,
        }
    }

    /// Replace one duplicate with a fresh, unique attribute set
    ///
    /// # Errors
    ///
    /// Returns an error if generation fails or no unique set is found within
    /// the attempt limit
    pub fn regenerate<R: DrawSource + ?Sized>(
        &mut self,
        token_id: usize,
        current: &AttributeSet,
        rng: &mut R,
    ) -> Result<AttributeSet> {
        let old_hash = attribute_hash(current, self.ignore_attributes);
        debug!(token_id, hash = old_hash.as_str(), "regenerating duplicate");

        for attempt in 1..=MAX_DEDUPE_ATTEMPTS {
            let candidate = self.generator.generate(rng)?;
            let new_hash = attribute_hash(&candidate, self.ignore_attributes);
            if self.hashes.contains_key(&new_hash) {
                debug!(token_id, attempt, "candidate still collides");
                continue;
            }

            if let Some(count) = self.hashes.get_mut(&old_hash) {
                *count = count.saturating_sub(1);
            }
            self.hashes.retain(|_, count| *count > 0);
            self.hashes.insert(new_hash.clone(), 1);
            debug!(token_id, hash = new_hash.as_str(), attempt, "found unique set");
            return Ok(candidate);
        }

        Err(GeneratorError::DuplicateExhausted {
            token_id,
            attempts: MAX_DEDUPE_ATTEMPTS,
        })
    }

    /// Regenerate every duplicate, returning the replacements in token order
    ///
    /// # Errors
    ///
    /// Propagates the first regeneration failure
    pub fn run<R: DrawSource + ?Sized>(
        &mut self,
        records: &[(usize, AttributeSet)],
        rng: &mut R,
    ) -> Result<Vec<(usize, AttributeSet)>> {
        let duplicates = find_duplicates(records, self.ignore_attributes);
        info!(duplicates = duplicates.len(), "found duplicates");

        let mut replacements = Vec::with_capacity(duplicates.len());
        for (token_id, attributes) in records {
            if duplicates.contains(token_id) {
                let fresh = self.regenerate(*token_id, attributes, rng)?;
                replacements.push((*token_id, fresh));
            }
        }
        Ok(replacements)
    }
}

//! Weighted trait selection with None-weight renormalization

use crate::generation::canonical::canonical_name;
use crate::generation::random::DrawSource;
use crate::generation::weights::TraitWeights;
use crate::io::configuration::NONE_TRAIT;
use crate::io::error::GeneratorError;
use tracing::debug;

/// Outcome of a single weighted pick
#[derive(Clone, Debug, PartialEq)]
pub enum Pick {
    /// Canonical name of the chosen trait
    Picked(String),
    /// No candidate could be chosen for a required attribute
    Unsatisfiable(PickDiagnostics),
}

/// State captured when a required attribute has no viable candidate
#[derive(Clone, Debug, PartialEq)]
pub struct PickDiagnostics {
    /// Attribute being picked
    pub attribute: String,
    /// Candidates after constraint filtering
    pub candidates: Vec<String>,
    /// Draw threshold
    pub threshold: f64,
    /// Weight accumulated over all candidates
    pub cumulative_weight: f64,
}

impl From<PickDiagnostics> for GeneratorError {
    fn from(diagnostics: PickDiagnostics) -> Self {
        Self::Unsatisfiable {
            attribute: diagnostics.attribute,
            candidates: diagnostics.candidates,
            threshold: diagnostics.threshold,
            cumulative_weight: diagnostics.cumulative_weight,
        }
    }
}

/// Attribute-level inputs to a pick
#[derive(Clone, Copy, Debug)]
pub struct PickContext<'a> {
    /// Attribute being picked
    pub attribute: &'a str,
    /// Whether the attribute may resolve to `None`
    pub optional: bool,
    /// Weight of every trait of the attribute before constraint filtering
    pub original_weight: f64,
}

/// Draw one trait from the filtered candidates
///
/// Consumes exactly one draw. When the attribute is optional and its `None`
/// candidate carries weight, the mass removed by constraint filtering is added
/// to `None` and the draw spans the unfiltered total, so every surviving trait
/// keeps its absolute probability.
pub fn pick_trait<S, R>(
    candidates: &[S],
    weights: &TraitWeights,
    context: PickContext<'_>,
    rng: &mut R,
) -> Pick
where
    S: AsRef<str>,
    R: DrawSource + ?Sized,
{
    let none_name = canonical_name(context.attribute, NONE_TRAIT);
    let mut resolved: Vec<(&str, f64)> = candidates
        .iter()
        .map(|c| (c.as_ref(), weights.weight(c.as_ref())))
        .collect();

    let filtered_weight: f64 = resolved.iter().map(|&(_, w)| w).sum();

    let none_slot = resolved
        .iter_mut()
        .find(|(name, weight)| *name == none_name && *weight > 0.0);

    let total_weight = match none_slot {
        Some(slot) if context.optional => {
            let adjusted = slot.1 + (context.original_weight - filtered_weight).max(0.0);
            debug!(
                attribute = context.attribute,
                from = slot.1,
                to = adjusted,
                "adjusting None weight"
            );
            slot.1 = adjusted;
            context.original_weight.max(filtered_weight)
        }
        _ => filtered_weight,
    };

    let threshold = rng.next_unit() * total_weight;
    debug!(
        attribute = context.attribute,
        filtered_weight,
        original_weight = context.original_weight,
        total_weight,
        threshold,
        "drawing trait"
    );

    let mut cumulative = 0.0;
    for &(name, weight) in &resolved {
        cumulative += weight;
        if weight > 0.0 && cumulative >= threshold {
            debug!(attribute = context.attribute, picked = name, "picked trait");
            return Pick::Picked(name.to_string());
        }
    }

    if context.optional {
        debug!(attribute = context.attribute, "falling back to None");
        return Pick::Picked(none_name);
    }

    Pick::Unsatisfiable(PickDiagnostics {
        attribute: context.attribute.to_string(),
        candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        threshold,
        cumulative_weight: cumulative,
    })
}

//! Blend mode overrides resolved per layer

use crate::io::error::Result;
use crate::rules::pattern::{Pattern, PatternSpec};
use serde::{Deserialize, Serialize};

/// Separable blend modes supported by the compositor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Plain alpha compositing
    #[default]
    #[serde(alias = "normal")]
    SourceOver,
    /// Darkens by multiplying channels
    Multiply,
    /// Lightens by inverse multiplication
    Screen,
    /// Multiply or screen depending on the backdrop
    Overlay,
    /// Minimum of both channels
    Darken,
    /// Maximum of both channels
    Lighten,
}

impl BlendMode {
    /// Blend one straight color channel in `[0, 1]`
    pub fn blend(self, backdrop: f32, source: f32) -> f32 {
        match self {
            Self::SourceOver => source,
            Self::Multiply => backdrop * source,
            Self::Screen => backdrop + source - backdrop * source,
            Self::Overlay => {
                if backdrop <= 0.5 {
                    2.0 * backdrop * source
                } else {
                    let b = 2.0f32.mul_add(backdrop, -1.0);
                    b + source - b * source
                }
            }
            Self::Darken => backdrop.min(source),
            Self::Lighten => backdrop.max(source),
        }
    }
}

/// Blend override as written in a project file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendRuleSpec {
    /// Pattern over layer canonical names
    pub pattern: PatternSpec,
    /// Mode for matching layers
    pub mode: BlendMode,
}

/// Compiled blend overrides, first match wins
#[derive(Clone, Debug, Default)]
pub struct BlendRules {
    rules: Vec<(Pattern, BlendMode)>,
}

impl BlendRules {
    /// Compile overrides in declaration order
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern fails to compile
    pub fn compile(specs: &[BlendRuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| Ok((spec.pattern.compile()?, spec.mode)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Mode for a layer, `source-over` when nothing matches
    pub fn mode_for(&self, canonical_name: &str) -> BlendMode {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(canonical_name))
            .map_or(BlendMode::SourceOver, |&(_, mode)| mode)
    }
}

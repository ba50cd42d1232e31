//! Pattern-matched layer rules applied before compositing
//!
//! Each render-eligible layer of the input fires at most one rule: the first
//! declared rule whose pattern matches its canonical name.

use crate::generation::attributes::AttributeSet;
use crate::io::error::Result;
use crate::layers::blending::BlendRules;
use crate::layers::layer_set::{Layer, LayerSet};
use crate::rules::pattern::{Pattern, PatternSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Mutation performed by a declarative rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LayerAction {
    /// Move the matched layer before the first layer of `target`
    MoveBefore {
        /// Anchor attribute
        target: String,
    },
    /// Move the matched layer after the first layer of `target`
    MoveAfter {
        /// Anchor attribute
        target: String,
    },
    /// Insert a new layer before the first layer of `target`
    InsertBefore {
        /// Anchor attribute
        target: String,
        /// Canonical name of the inserted layer
        layer: String,
    },
    /// Insert a new layer after the first layer of `target`
    InsertAfter {
        /// Anchor attribute
        target: String,
        /// Canonical name of the inserted layer
        layer: String,
    },
    /// Remove every layer of an attribute, the matched layer's by default
    Remove {
        /// Attribute to remove
        #[serde(default)]
        attribute: Option<String>,
    },
}

/// Declarative layer rule as written in a project file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRuleSpec {
    /// Pattern over the triggering layer's canonical name
    pub pattern: PatternSpec,
    /// Only act when some layer matches this pattern
    #[serde(default)]
    pub when: Option<PatternSpec>,
    /// Only act when no layer matches this pattern
    #[serde(default)]
    pub unless: Option<PatternSpec>,
    /// Mutation to perform
    #[serde(flatten)]
    pub action: LayerAction,
}

/// Compiled declarative mutation with its presence conditions
#[derive(Clone, Debug)]
pub struct LayerDirective {
    when: Option<Pattern>,
    unless: Option<Pattern>,
    action: LayerAction,
}

impl LayerDirective {
    /// Unconditional directive
    pub const fn new(action: LayerAction) -> Self {
        Self {
            when: None,
            unless: None,
            action,
        }
    }

    /// Require a layer matching the pattern to be present
    #[must_use]
    pub fn when(mut self, pattern: Pattern) -> Self {
        self.when = Some(pattern);
        self
    }

    /// Require no layer matching the pattern to be present
    #[must_use]
    pub fn unless(mut self, pattern: Pattern) -> Self {
        self.unless = Some(pattern);
        self
    }

    /// Perform the mutation for the triggering layer
    ///
    /// Conditions are checked against the working set.
    ///
    /// # Errors
    ///
    /// Propagates layer mutation failures
    pub fn apply(&self, layers: &mut LayerSet, layer: &Layer) -> Result<()> {
        if self.when.as_ref().is_some_and(|p| !layers.has(p))
            || self.unless.as_ref().is_some_and(|p| layers.has(p))
        {
            return Ok(());
        }

        match &self.action {
            LayerAction::MoveBefore { target } => layers.move_before(layer, target),
            LayerAction::MoveAfter { target } => layers.move_after(layer, target),
            LayerAction::InsertBefore { target, layer: new } => {
                layers.insert_before(target, new).map(|_| ())
            }
            LayerAction::InsertAfter { target, layer: new } => {
                layers.insert_after(target, new).map(|_| ())
            }
            LayerAction::Remove { attribute } => {
                let _ = layers.remove(attribute.as_deref().unwrap_or(layer.attribute.as_str()));
                Ok(())
            }
        }
    }
}

/// Rule callback with full access to the working layer set
pub type LayerCallback = Box<dyn Fn(&mut LayerSet, &Layer) -> Result<()> + Send + Sync>;

enum RuleEffect {
    Directive(LayerDirective),
    Callback(LayerCallback),
}

impl fmt::Debug for RuleEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directive(directive) => f.debug_tuple("Directive").field(directive).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// One compiled layer rule
#[derive(Debug)]
pub struct LayerRule {
    pattern: Pattern,
    effect: RuleEffect,
}

impl LayerRule {
    /// Whether the rule applies to the canonical name
    pub fn matches(&self, canonical_name: &str) -> bool {
        self.pattern.is_match(canonical_name)
    }

    /// Pattern the rule was declared with
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn fire(&self, layers: &mut LayerSet, layer: &Layer) -> Result<()> {
        match &self.effect {
            RuleEffect::Directive(directive) => directive.apply(layers, layer),
            RuleEffect::Callback(callback) => callback(layers, layer),
        }
    }
}

/// Layer rules in priority order
#[derive(Debug, Default)]
pub struct LayerRules {
    rules: Vec<LayerRule>,
}

impl LayerRules {
    /// Empty rule list
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile declarative rules in declaration order
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern fails to compile
    pub fn compile(specs: &[LayerRuleSpec]) -> Result<Self> {
        let mut rules = Self::new();
        for spec in specs {
            let mut directive = LayerDirective::new(spec.action.clone());
            if let Some(when) = &spec.when {
                directive = directive.when(when.compile()?);
            }
            if let Some(unless) = &spec.unless {
                directive = directive.unless(unless.compile()?);
            }
            rules.push_directive(spec.pattern.compile()?, directive);
        }
        Ok(rules)
    }

    /// Append a declarative rule with the lowest priority so far
    pub fn push_directive(&mut self, pattern: Pattern, directive: LayerDirective) {
        self.rules.push(LayerRule {
            pattern,
            effect: RuleEffect::Directive(directive),
        });
    }

    /// Append a callback rule with the lowest priority so far
    pub fn push_callback<F>(&mut self, pattern: Pattern, callback: F)
    where
        F: Fn(&mut LayerSet, &Layer) -> Result<()> + Send + Sync + 'static,
    {
        self.rules.push(LayerRule {
            pattern,
            effect: RuleEffect::Callback(Box::new(callback)),
        });
    }

    /// Register one callback under several patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any glob fails to compile
    pub fn push_callback_for_globs<F>(&mut self, globs: &[&str], callback: F) -> Result<()>
    where
        F: Fn(&mut LayerSet, &Layer) -> Result<()> + Send + Sync + Clone + 'static,
    {
        for glob in globs {
            self.push_callback(Pattern::glob(glob)?, callback.clone());
        }
        Ok(())
    }

    /// First declared rule matching the canonical name
    pub fn first_match(&self, canonical_name: &str) -> Option<&LayerRule> {
        self.rules.iter().find(|rule| rule.matches(canonical_name))
    }

    /// Apply the rules to a copy of the layer set
    ///
    /// The input is the frozen view that decides which layers fire; every
    /// mutation lands on the returned copy.
    ///
    /// # Errors
    ///
    /// Propagates the first failing rule's error
    pub fn apply(&self, layers: &LayerSet) -> Result<LayerSet> {
        let mut working = layers.snapshot();

        for layer in layers.render_sequence() {
            if let Some(rule) = self.first_match(&layer.canonical_name) {
                debug!(
                    layer = layer.canonical_name.as_str(),
                    rule = rule.pattern.source(),
                    "applying layer rule"
                );
                rule.fire(&mut working, layer)?;
            }
        }

        Ok(working)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are declared
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Everything needed to turn an attribute set into a render sequence
#[derive(Debug, Default)]
pub struct LayerPlan {
    /// Base stacking order, bottom first
    pub layer_order: Vec<String>,
    /// Directory holding `{attribute}/{trait}.png` assets
    pub asset_root: PathBuf,
    /// Rules applied to every token's layers
    pub rules: LayerRules,
    /// Blend mode overrides
    pub blending: BlendRules,
}

impl LayerPlan {
    /// Build the base layer set and apply the rules
    ///
    /// # Errors
    ///
    /// Propagates layer rule failures
    pub fn resolve(&self, attributes: &AttributeSet) -> Result<LayerSet> {
        let base = LayerSet::new(attributes, &self.layer_order, self.asset_root.clone());
        self.rules.apply(&base)
    }
}

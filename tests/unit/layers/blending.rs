//! Tests for blend mode formulas and overrides

#[cfg(test)]
mod tests {
    use traitweave::layers::blending::{BlendMode, BlendRuleSpec, BlendRules};
    use traitweave::rules::pattern::PatternSpec;

    // Tests separable blend formulas on fixed channels
    // Verified by swapping multiply and screen
    #[test]
    fn test_blend_formulas() {
        let close = |a: f32, b: f32| (a - b).abs() < 1e-6;
        assert!(close(BlendMode::SourceOver.blend(0.2, 0.6), 0.6));
        assert!(close(BlendMode::Multiply.blend(0.5, 0.5), 0.25));
        assert!(close(BlendMode::Screen.blend(0.5, 0.5), 0.75));
        assert!(close(BlendMode::Overlay.blend(0.25, 0.5), 0.25));
        assert!(close(BlendMode::Overlay.blend(0.75, 0.5), 0.75));
        assert!(close(BlendMode::Darken.blend(0.3, 0.7), 0.3));
        assert!(close(BlendMode::Lighten.blend(0.3, 0.7), 0.7));
    }

    // Tests first matching override wins and source-over is the default
    // Verified by using the last match
    #[test]
    fn test_mode_for() {
        let Ok(rules) = BlendRules::compile(&[
            BlendRuleSpec {
                pattern: PatternSpec::from("Shadow/*"),
                mode: BlendMode::Multiply,
            },
            BlendRuleSpec {
                pattern: PatternSpec::from("*"),
                mode: BlendMode::Screen,
            },
        ]) else {
            panic!("blend rules should compile");
        };
        assert_eq!(rules.mode_for("Shadow/Soft"), BlendMode::Multiply);
        assert_eq!(rules.mode_for("Hat/Cap"), BlendMode::Screen);
        assert_eq!(BlendRules::default().mode_for("Hat/Cap"), BlendMode::SourceOver);
    }

    // Tests kebab-case names and the normal alias
    // Verified by removing the alias
    #[test]
    fn test_mode_names() {
        #[derive(serde::Deserialize)]
        struct Holder {
            modes: Vec<BlendMode>,
        }
        let Ok(holder) = toml::from_str::<Holder>(r#"modes = ["source-over", "normal", "overlay"]"#)
        else {
            panic!("modes should parse");
        };
        assert_eq!(
            holder.modes,
            vec![BlendMode::SourceOver, BlendMode::SourceOver, BlendMode::Overlay]
        );
    }
}

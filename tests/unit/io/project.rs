//! Tests for project file parsing and compilation

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use traitweave::GeneratorError;
    use traitweave::io::configuration::DEFAULT_IMAGE_SIZE;
    use traitweave::io::project::{Project, ProjectConfig};

    const PROJECT: &str = r#"
        attribute_order = ["Base", "Arm", "Hat"]
        optional_attributes = ["Hat"]
        layer_order = ["Base", "Hat", "Arm"]
        must_pair = [["Base/Red", "Arm/Red"]]

        [[traits]]
        pattern = "Hat/None"
        weight = 2.0

        [[traits]]
        pattern = "Hat/C*"
        weight = 1.0

        [[traits]]
        pattern = "Base/*"
        weight = 1.0

        [[traits]]
        pattern = "Arm/*"
        weight = 1.0

        [[layer_rules]]
        pattern = "Hat/Cowboy*"
        action = "move_before"
        target = "Base"

        [final_metadata]
        hidden_attributes = ["Arm"]
    "#;

    fn parse(text: &str) -> Result<ProjectConfig, GeneratorError> {
        ProjectConfig::from_toml_str(text, Path::new("project.toml"))
    }

    // Tests omitted settings fall back to defaults
    // Verified by changing the default image size
    #[test]
    fn test_defaults() {
        let config = parse(r#"attribute_order = ["Base"]"#).unwrap();
        assert_eq!(config.asset_root, Path::new("assets"));
        assert_eq!(config.output_root, Path::new("output"));
        assert!(config.shuffle_pool);
        assert_eq!(config.image_size, DEFAULT_IMAGE_SIZE);
        assert!(config.final_metadata.drop_none);
        assert!(config.duplicates.ignore_attributes.is_empty());
    }

    // Tests a full project compiles every table
    // Verified by ignoring the layer order
    #[test]
    fn test_compile() {
        let project = parse(PROJECT).unwrap().compile().unwrap();
        assert!(project.generation.is_optional("Hat"));
        assert_eq!(project.generation.must_pair.len(), 1);
        assert!((project.generation.probabilities.weight_of("Hat/None") - 2.0).abs() < f64::EPSILON);
        assert_eq!(project.layers.layer_order, vec!["Base", "Hat", "Arm"]);
        assert_eq!(project.layers.rules.len(), 1);
        assert_eq!(project.final_metadata.hidden_attributes, vec!["Arm"]);
    }

    // Tests the layer order defaults to the attribute order
    // Verified by leaving the layer order empty
    #[test]
    fn test_layer_order_default() {
        let project = parse(r#"attribute_order = ["Base", "Hat"]"#)
            .unwrap()
            .compile()
            .unwrap();
        assert_eq!(project.layers.layer_order, vec!["Base", "Hat"]);
    }

    // Tests invalid projects are rejected at compile time
    // Verified by compiling patterns lazily
    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            parse("attribute_order = []").unwrap().compile(),
            Err(GeneratorError::InvalidParameter { parameter: "attribute_order", .. })
        ));

        let bad_regex = r#"
            attribute_order = ["Base"]
            [[traits]]
            pattern = { regex = "Base/(" }
            weight = 1.0
        "#;
        assert!(matches!(
            parse(bad_regex).unwrap().compile(),
            Err(GeneratorError::InvalidPattern { .. })
        ));

        let negative = r#"
            attribute_order = ["Base"]
            [[traits]]
            pattern = "*"
            weight = -1.0
        "#;
        assert!(matches!(
            parse(negative).unwrap().compile(),
            Err(GeneratorError::InvalidWeight { .. })
        ));

        assert!(matches!(
            parse("attribute_order = 3"),
            Err(GeneratorError::Config { .. })
        ));
    }

    // Tests relative directories resolve against the project file
    // Verified by resolving against the working directory
    #[test]
    fn test_load_rebases_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("traitweave.toml");
        fs::write(
            &path,
            "attribute_order = [\"Base\"]\nasset_root = \"art\"\n",
        )
        .unwrap();

        let project = Project::load(&path).unwrap();
        assert_eq!(project.asset_root, temp_dir.path().join("art"));
        assert_eq!(project.output_root, temp_dir.path().join("output"));
        assert_eq!(project.layers.asset_root, temp_dir.path().join("art"));

        assert!(matches!(
            Project::load(&temp_dir.path().join("missing.toml")),
            Err(GeneratorError::FileSystem { .. })
        ));
    }

    // Tests the pool keeps picked attributes and adds None for optional ones
    // Verified by keeping assets of unpicked attributes
    #[test]
    fn test_pool_from_assets() {
        let project = parse(PROJECT).unwrap().compile().unwrap();
        let assets = [
            "Arm/Red",
            "Background/Blue",
            "Base/Red",
            "Hat/Cap",
            "Hat/Cowboy Hat",
        ];
        let pool = project.pool_from_assets(&assets).unwrap();
        assert_eq!(
            pool.entries(),
            &["Arm/Red", "Base/Red", "Hat/None", "Hat/Cap", "Hat/Cowboy Hat"]
        );
    }

    // Tests assets matching two patterns are rejected
    // Verified by taking the first match silently
    #[test]
    fn test_pool_rejects_ambiguous_weights() {
        let text = r#"
            attribute_order = ["Base"]
            [[traits]]
            pattern = "Base/*"
            weight = 1.0
            [[traits]]
            pattern = "*/Red"
            weight = 2.0
        "#;
        let project = parse(text).unwrap().compile().unwrap();
        assert!(matches!(
            project.pool_from_assets(&["Base/Red"]),
            Err(GeneratorError::AmbiguousProbability { .. })
        ));
    }

    // Tests a synthesized None entry matching two patterns is rejected
    // Verified by checking discovered assets only
    #[test]
    fn test_pool_rejects_ambiguous_none() {
        let text = r#"
            attribute_order = ["Hat"]
            optional_attributes = ["Hat"]
            [[traits]]
            pattern = "Hat/None"
            weight = 3.0
            [[traits]]
            pattern = "*"
            weight = 1.0
        "#;
        let project = parse(text).unwrap().compile().unwrap();
        let err = project.pool_from_assets(&["Hat/Crown"]).unwrap_err();
        match err {
            GeneratorError::AmbiguousProbability { canonical_name, patterns } => {
                assert_eq!(canonical_name, "Hat/None");
                assert_eq!(patterns, vec!["Hat/None", "*"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // Tests the project file shown in the README builds a pool
    // Verified by adding a catch-all pattern to the README
    #[test]
    fn test_readme_project_builds_pool() {
        let readme = include_str!("../../../README.md");
        let text = readme
            .split("```toml")
            .nth(1)
            .and_then(|rest| rest.split("```").next())
            .unwrap();
        let project = parse(text).unwrap().compile().unwrap();

        let assets = [
            "Arm/Metal",
            "Arm/Wood",
            "Background/Blue",
            "Base/Metal",
            "Base/Wood",
            "Hat/Cowboy Hat",
            "Hat/Crown",
            "Outerwear/Space Suit",
        ];
        let pool = project.pool_from_assets(&assets).unwrap();
        assert_eq!(pool.len(), assets.len() + 1);
        assert!(pool.entries().iter().any(|entry| entry == "Hat/None"));
        assert_eq!(project.layers.rules.len(), 1);
    }
}

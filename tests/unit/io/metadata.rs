//! Tests for metadata records and the output layout

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use traitweave::generation::attributes::AttributeSet;
    use traitweave::io::metadata::{
        NftMetadata, OutputFormat, OutputLayout, RecordKind, StoredRecord, final_attributes,
        read_json,
    };
    use traitweave::io::project::FinalMetadataConfig;

    fn attributes() -> AttributeSet {
        [("Base", "Red"), ("Hat", "None"), ("Secret", "Gold")]
            .into_iter()
            .collect()
    }

    fn final_config() -> FinalMetadataConfig {
        FinalMetadataConfig {
            drop_none: true,
            hidden_attributes: vec!["Secret".to_string()],
        }
    }

    // Tests metadata records keep the pick order
    // Verified by sorting attributes by name
    #[test]
    fn test_metadata_shape() {
        let value = serde_json::to_value(NftMetadata::from_attributes(&attributes())).unwrap();
        assert_eq!(
            value,
            json!({
                "attributes": [
                    { "trait_type": "Base", "value": "Red" },
                    { "trait_type": "Hat", "value": "None" },
                    { "trait_type": "Secret", "value": "Gold" },
                ]
            })
        );
    }

    // Tests the public transform drops None and hidden attributes
    // Verified by ignoring the hidden list
    #[test]
    fn test_final_attributes() {
        let published = final_attributes(&attributes(), &final_config());
        let entries: Vec<(&str, &str)> = published.iter().collect();
        assert_eq!(entries, vec![("Base", "Red")]);

        let keep_none = FinalMetadataConfig {
            drop_none: false,
            hidden_attributes: Vec::new(),
        };
        assert_eq!(final_attributes(&attributes(), &keep_none), attributes());
    }

    // Tests records may be stored in either shape
    // Verified by accepting only metadata records
    #[test]
    fn test_stored_record_shapes() {
        let metadata: StoredRecord =
            serde_json::from_str(r#"{"attributes":[{"trait_type":"Base","value":"Red"}]}"#)
                .unwrap();
        let plain: StoredRecord = serde_json::from_str(r#"{"Base":"Red"}"#).unwrap();
        assert_eq!(metadata.into_attributes(), plain.into_attributes());
    }

    // Tests both output formats write the expected files
    // Verified by writing public records for the attributes format
    #[test]
    fn test_write_token_formats() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(temp_dir.path());
        layout.ensure_dirs().unwrap();

        layout
            .write_token(0, &attributes(), OutputFormat::Metadata, &final_config())
            .unwrap();
        let public: NftMetadata = read_json(&layout.record_path(RecordKind::Final, 0)).unwrap();
        assert_eq!(public.attributes.len(), 1);
        assert_eq!(layout.load_token(0).unwrap(), attributes());

        layout
            .write_token(1, &attributes(), OutputFormat::Attributes, &final_config())
            .unwrap();
        assert!(!layout.record_path(RecordKind::Final, 1).exists());
        let raw = fs::read_to_string(layout.record_path(RecordKind::Internal, 1)).unwrap();
        assert!(raw.contains(r#""Base": "Red""#));
        assert_eq!(layout.load_token(1).unwrap(), attributes());
    }

    // Tests records load in numeric token order and stray files are skipped
    // Verified by sorting ids as strings
    #[test]
    fn test_load_all_order() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(temp_dir.path());
        for id in [10, 2, 1] {
            layout
                .write_token(id, &attributes(), OutputFormat::Metadata, &final_config())
                .unwrap();
        }
        let internal = layout.record_dir(RecordKind::Internal);
        fs::write(internal.join("notes.json"), "{}").unwrap();
        fs::write(internal.join("3.txt"), "ignored").unwrap();

        let ids: Vec<usize> = layout
            .load_all()
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    // Tests the seed history returns the latest seed
    // Verified by returning the first line
    #[test]
    fn test_seed_history() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(temp_dir.path().join("output"));
        assert_eq!(layout.last_seed().unwrap(), None);

        layout.append_seed("first").unwrap();
        layout.append_seed("second seed").unwrap();
        assert_eq!(layout.last_seed().unwrap().as_deref(), Some("second seed"));
    }

    // Tests artifact paths below the root
    // Verified by swapping the record directories
    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("out");
        assert_eq!(
            layout.record_path(RecordKind::Internal, 4),
            std::path::Path::new("out/internal/4.json")
        );
        assert_eq!(
            layout.record_path(RecordKind::Final, 4),
            std::path::Path::new("out/json/4.json")
        );
        assert_eq!(layout.image_path(4), std::path::Path::new("out/images/4.png"));
    }
}

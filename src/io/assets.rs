//! Asset discovery and validation

use crate::generation::canonical::{attribute_of, canonical_name};
use crate::io::configuration::{ASSET_EXTENSION, NONE_TRAIT};
use crate::io::error::{GeneratorError, Result, invalid_parameter, io_error};
use crate::rules::probability::ProbabilityTable;
use std::collections::HashSet;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Canonical names of every PNG under the asset root, sorted
///
/// The canonical name is the relative path without extension, joined with `/`.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked or a path is not UTF-8
pub fn discover_assets(asset_root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in WalkDir::new(asset_root).follow_links(true) {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map_or_else(|| asset_root.to_path_buf(), Path::to_path_buf);
            GeneratorError::FileSystem {
                path,
                operation: "scan assets",
                source: err.into(),
            }
        })?;

        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(ASSET_EXTENSION)
        {
            continue;
        }

        let relative = path
            .strip_prefix(asset_root)
            .map_err(|err| invalid_parameter("asset_root", &path.display(), &err))?;
        names.push(canonical_from_relative(&relative.with_extension(""))?);
    }

    names.sort();
    Ok(names)
}

fn canonical_from_relative(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(
                part.to_str()
                    .ok_or_else(|| io_error("Asset path is not valid UTF-8"))?,
            );
        }
    }
    Ok(parts.join("/"))
}

/// Problems with the probability coverage of picked attributes' assets
///
/// Every asset of a picked attribute should match exactly one pattern. The
/// `None` entry of an optional attribute may match no pattern but never more
/// than one.
pub fn coverage_problems<S: AsRef<str>>(
    assets: &[S],
    attribute_order: &[String],
    optional_attributes: &HashSet<String>,
    probabilities: &ProbabilityTable,
) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen_optional = HashSet::new();

    for name in assets {
        let name = name.as_ref();
        let attribute = attribute_of(name);
        if !attribute_order.iter().any(|a| a == attribute) {
            continue;
        }

        if optional_attributes.contains(attribute) && seen_optional.insert(attribute) {
            let none = canonical_name(attribute, NONE_TRAIT);
            problems.extend(ambiguity(&none, probabilities));
        }

        if probabilities.covers(name) {
            problems.extend(ambiguity(name, probabilities));
        } else {
            problems.push(format!("'{name}' is not covered by any trait probability"));
        }
    }

    problems
}

fn ambiguity(name: &str, probabilities: &ProbabilityTable) -> Option<String> {
    let matches = probabilities.matching_patterns(name);
    (matches.len() > 1).then(|| {
        format!(
            "'{name}' matches multiple trait probabilities: {}",
            matches
                .iter()
                .map(|p| p.source())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

/// Assets whose pixel dimensions differ from `size` x `size`
///
/// # Errors
///
/// Returns an error if an asset header cannot be read
pub fn dimension_problems<S: AsRef<str>>(
    assets: &[S],
    asset_root: &Path,
    size: u32,
) -> Result<Vec<String>> {
    let mut problems = Vec::new();

    for name in assets {
        let name = name.as_ref();
        let path = crate::layers::layer_set::resolve_file(asset_root, name);
        let (width, height) =
            image::image_dimensions(&path).map_err(|source| GeneratorError::ImageLoad {
                path: path.clone(),
                source,
            })?;
        if width != size || height != size {
            problems.push(format!(
                "'{name}' is {width}x{height}, expected {size}x{size}"
            ));
        }
    }

    Ok(problems)
}

//! Whole-package checks

use tracing::{debug, warn};

use super::{ValidationReport, validate_content};
use crate::package::Package;

/// Check a whole package: metadata, content and libraries.
///
/// Missing main library and options that do not match their field type are
/// violations. Unbundled preloaded dependencies and library directories
/// whose name disagrees with their definition are warnings.
pub fn validate_package(package: &Package) -> ValidationReport {
    let mut report = ValidationReport::new();

    match package.metadata() {
        None => report.violation("metadata", "h5p.json is missing"),
        Some(metadata) => {
            if metadata.title.trim().is_empty() {
                report.violation("metadata.title", "title is required");
            }
            if metadata.main_library.trim().is_empty() {
                report.violation("metadata.mainLibrary", "main library is required");
            } else if package.main_library().is_none() {
                report.violation_with_value(
                    "metadata.mainLibrary",
                    "main library is not bundled in the package",
                    metadata.main_library.as_str(),
                );
            }

            for dependency in &metadata.preloaded_dependencies {
                let bundled = package
                    .libraries()
                    .iter()
                    .filter_map(|l| l.definition())
                    .any(|d| d.satisfies(dependency));
                if !bundled {
                    report.warning(format!("preloaded dependency {dependency} is not bundled"));
                }
            }
        }
    }

    match package.content() {
        None => report.violation("content", "content/content.json is missing"),
        Some(content) => report.merge_prefixed("content", validate_content(content)),
    }

    for library in package.libraries() {
        let base = format!("libraries[{}]", library.name());

        match library.definition() {
            None => report.violation(format!("{base}.definition"), "library.json is missing"),
            Some(definition) => {
                if definition.machine_name.trim().is_empty() {
                    report.violation(format!("{base}.definition.machineName"), "machine name is required");
                } else if library.name() != definition.directory_name()
                    && library.name() != definition.machine_name
                {
                    report.warning(format!(
                        "library directory {} does not match its definition {}",
                        library.name(),
                        definition.directory_name()
                    ));
                }
            }
        }

        if let Some(semantics) = library.semantics() {
            for (path, err) in semantics.ambiguous_options() {
                report.violation(format!("{base}.semantics.{path}.options"), err.to_string());
            }
        }
    }

    for warning in &report.warnings {
        warn!("{warning}");
    }
    debug!(
        violations = report.violations.len(),
        warnings = report.warnings.len(),
        "Validated package"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Library;
    use h5p_schema::{
        Field, FieldType, LibraryDefinition, LibraryDependency, LibraryVersion, PackageMetadata,
        Semantics,
    };
    use serde_json::json;

    fn valid_package() -> Package {
        let mut package = Package::new();
        package.set_metadata(
            PackageMetadata::new("Capital", "H5P.MultiChoice")
                .with_dependency(LibraryDependency::new("H5P.MultiChoice", 1, 16)),
        );
        package.set_content(json!({
            "question": "Capital of France?",
            "answers": [{"text": "Paris", "correct": true}]
        }));
        let definition =
            LibraryDefinition::new("Multiple Choice", "H5P.MultiChoice", LibraryVersion::new(1, 16, 3));
        package
            .add_library(Library::from_definition(definition).unwrap())
            .unwrap();
        package
    }

    fn fields(report: &ValidationReport) -> Vec<&str> {
        report.violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_package() {
        let report = validate_package(&valid_package());
        assert!(report.is_valid(), "{:?}", report.violations);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_package() {
        let report = validate_package(&Package::new());
        assert_eq!(fields(&report), vec!["metadata", "content"]);
    }

    #[test]
    fn test_main_library_must_be_bundled() {
        let mut package = valid_package();
        package.remove_library("H5P.MultiChoice-1.16");

        let report = validate_package(&package);
        assert_eq!(fields(&report), vec!["metadata.mainLibrary"]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_content_violations_are_prefixed() {
        let mut package = valid_package();
        package.set_content(json!({"question": "Q?", "answers": [{"text": "A", "correct": false}]}));

        let report = validate_package(&package);
        assert_eq!(fields(&report), vec!["content.answers"]);
    }

    #[test]
    fn test_library_without_definition() {
        let mut package = valid_package();
        package.add_library(Library::new("H5P.Question-1.5").unwrap()).unwrap();

        let report = validate_package(&package);
        assert_eq!(fields(&report), vec!["libraries[H5P.Question-1.5].definition"]);
    }

    #[test]
    fn test_misnamed_library_directory_is_a_warning() {
        let mut package = valid_package();
        let mut library = Library::new("H5P.Question-9.9").unwrap();
        library.set_definition(LibraryDefinition::new("Question", "H5P.Question", LibraryVersion::new(1, 5, 0)));
        package.add_library(library).unwrap();

        let report = validate_package(&package);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_mismatched_options_are_violations() {
        let mut package = valid_package();
        let semantics: Semantics = serde_json::from_value(json!([
            {"name": "layout", "type": "select", "options": ["H5P.Image 1.1"]},
            {"name": "media", "type": "library", "options": ["H5P.Image 1.1"]}
        ]))
        .unwrap();
        assert_eq!(semantics.fields()[1].field_type, FieldType::Library);
        package
            .library_mut("H5P.MultiChoice-1.16")
            .unwrap()
            .set_semantics(semantics);

        let report = validate_package(&package);
        assert_eq!(
            fields(&report),
            vec!["libraries[H5P.MultiChoice-1.16].semantics.layout.options"]
        );
    }

    #[test]
    fn test_well_formed_semantics() {
        let mut package = valid_package();
        let semantics = Semantics::from(vec![Field::library("media", vec!["H5P.Image 1.1".to_string()])]);
        package
            .library_mut("H5P.MultiChoice-1.16")
            .unwrap()
            .set_semantics(semantics);
        assert!(validate_package(&package).is_valid());
    }
}

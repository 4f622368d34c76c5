//! Tests for HierarchyService
//!
//! Instance files are written to a temp dir and read through RealFileSystem.

use std::path::PathBuf;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use hierfix::application::services::HierarchyService;
use hierfix::application::ApplicationError;
use hierfix::config::Settings;
use hierfix::domain::{BuildOptions, DomainError, IssueKind};
use hierfix::infrastructure::di::ServiceContainer;
use hierfix::infrastructure::traits::RealFileSystem;
use hierfix::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn service(settings: Settings) -> HierarchyService {
    HierarchyService::new(Arc::new(RealFileSystem), Arc::new(settings))
}

fn write_input(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const SPARSE_INPUT: &str = "\
# id,x,y
gen.0,1.0,2.0
gen.0,3.0,4.0
gen.0.2,5.0,6.0
";

// ============================================================
// load() tests
// ============================================================

#[test]
fn given_repeated_ids_when_loading_then_instances_grouped_per_node() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", SPARSE_INPUT);

    // Act
    let arena = service(Settings::default()).load(&input).unwrap();

    // Assert
    assert_eq!(arena.len(), 2);
    assert!(arena.root().is_none());
    let counts: Vec<(String, usize)> = arena
        .indices()
        .into_iter()
        .map(|idx| {
            let node = arena.node(idx).unwrap();
            (node.id.to_string(), node.instances.len())
        })
        .collect();
    assert_eq!(
        counts,
        vec![("gen.0".to_string(), 2), ("gen.0.2".to_string(), 1)]
    );
}

#[test]
fn given_line_with_root_id_when_loading_then_becomes_arena_root() {
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", "gen.1,0.5\ngen,1.5\n");

    let arena = service(Settings::default()).load(&input).unwrap();

    let root = arena.root().expect("root set");
    assert_eq!(arena.node(root).unwrap().id.as_str(), "gen");
    assert_eq!(arena.indices()[0], root);
}

#[test]
fn given_root_line_with_foreign_prefix_when_building_then_used_as_root() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", "gen.1,0.5\ng,1.5\n");

    // Act
    let built = service(Settings::default())
        .build(&input, BuildOptions::default())
        .unwrap();

    // Assert
    let root = built.arena.root().expect("root set");
    let root_node = built.arena.node(root).unwrap();
    assert_eq!(root_node.id.as_str(), "g");
    assert!(!root_node.artificial);
    assert_eq!(built.artificial_count(), 0);
    assert!(built.validate().is_healthy());
}

#[test]
fn given_two_root_lines_with_different_prefixes_when_loading_then_duplicate_id() {
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", "gen,0.5\ng,1.5\n");

    let result = service(Settings::default()).load(&input);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::DuplicateId(id))) if id == "g"
    ));
}

#[test]
fn given_missing_file_when_loading_then_input_not_found() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("absent.csv");

    let result = service(Settings::default()).load(&input);

    assert!(matches!(result, Err(ApplicationError::InputNotFound(p)) if p == input));
}

#[test]
fn given_directory_as_input_when_loading_then_input_not_found() {
    let temp = TempDir::new().unwrap();

    let result = service(Settings::default()).load(temp.path());

    assert!(matches!(result, Err(ApplicationError::InputNotFound(_))));
}

#[test]
fn given_ragged_rows_when_loading_then_dimension_mismatch() {
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", "gen.0,1.0,2.0\n\ngen.1,3.0\n");

    let result = service(Settings::default()).load(&input);

    match result {
        Err(ApplicationError::Domain(DomainError::DimensionMismatch {
            line,
            expected,
            found,
        })) => {
            assert_eq!((line, expected, found), (3, 2, 1));
        }
        other => panic!("expected dimension mismatch, got {:?}", other),
    }
}

#[rstest]
#[case("gen.x,1.0\n")]
#[case("gen.+2,1.0\n")]
fn given_malformed_id_when_loading_then_invalid_id(#[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", content);

    let result = service(Settings::default()).load(&input);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidId { .. }))
    ));
}

#[test]
fn given_custom_layout_when_loading_then_labels_and_values_split() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(
        &temp,
        "data.tsv",
        "id\tclass\tname\tv\nn/3/1\tcat\tfelix\t0.25\n",
    );
    let mut settings = Settings::default();
    settings.ids.separator = "/".into();
    settings.ids.generation_prefix = "n".into();
    settings.input.delimiter = '\t';
    settings.input.class_column = true;
    settings.input.name_column = true;
    settings.input.skip_header = true;

    // Act
    let arena = service(settings).load(&input).unwrap();

    // Assert
    let idx = arena.indices()[0];
    let node = arena.node(idx).unwrap();
    assert_eq!(node.id.segments(), &[3, 1]);
    let instance = &node.instances[0];
    assert_eq!(instance.class.as_deref(), Some("cat"));
    assert_eq!(instance.name.as_deref(), Some("felix"));
    assert_eq!(instance.values, vec![0.25]);
}

// ============================================================
// build() / check() tests
// ============================================================

#[test]
fn given_sparse_file_when_building_with_breadth_then_complete_hierarchy() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", SPARSE_INPUT);
    let options = BuildOptions {
        fix_breadth_gaps: true,
        use_subtree: false,
        max_breadth_gap: None,
    };

    // Act
    let built = service(Settings::default()).build(&input, options).unwrap();

    // Assert
    let ids: Vec<String> = built
        .nodes
        .iter()
        .map(|&idx| built.arena.node(idx).unwrap().id.to_string())
        .collect();
    assert_eq!(ids, vec!["gen", "gen.0", "gen.0.0", "gen.0.1", "gen.0.2"]);
    assert_eq!(built.artificial_count(), 3);
    assert!(built.validate().is_healthy());

    let gen0 = built.nodes[1];
    assert_eq!(built.arena.node(gen0).unwrap().centroid, Some(vec![2.0, 3.0]));
}

#[test]
fn given_depth_only_build_when_checking_then_no_contiguity_errors() {
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", SPARSE_INPUT);

    let report = service(Settings::default())
        .check(&input, BuildOptions::default())
        .unwrap();

    assert!(report.is_healthy());
    assert_eq!(report.count(IssueKind::ChildrenGap), 0);
    assert_eq!(report.nodes_checked, 3);
}

#[test]
fn given_unrelated_id_when_building_then_fatal_domain_error() {
    let temp = TempDir::new().unwrap();
    let input = write_input(&temp, "data.csv", "gen.0.1,1.0\ngen.1.0,2.0\n");
    let mut settings = Settings::default();
    settings.ids.root_id = Some("gen.0".into());

    let result = service(settings).build(&input, BuildOptions::default());

    match result {
        Err(ApplicationError::Domain(e)) => {
            assert_eq!(e, DomainError::NoAncestor("gen.1.0".into()));
            assert!(e.is_fatal());
        }
        other => panic!("expected domain error, got {:?}", other.map(|b| b.nodes)),
    }
}

#[test]
fn given_rendered_output_when_writing_then_file_created() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.txt");

    service(Settings::default())
        .write_output(&output, "gen\n")
        .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "gen\n");
}

#[test]
fn given_output_in_missing_dir_when_writing_then_operation_failed() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("nope").join("out.txt");

    let result = service(Settings::default()).write_output(&output, "gen\n");

    assert!(matches!(
        result,
        Err(ApplicationError::OperationFailed { .. })
    ));
}

// ============================================================
// ServiceContainer wiring
// ============================================================

#[test]
fn given_local_config_when_container_built_then_service_uses_it() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join(".hierfix.toml"),
        "[ids]\nseparator = \"_\"\n\n[build]\nfix_breadth_gaps = true\n",
    )
    .unwrap();
    let input = write_input(&temp, "data.csv", "gen_1,1.0\n");
    let settings = Settings::load(Some(temp.path())).unwrap();

    // Act
    let container = ServiceContainer::new(settings);
    let built = container
        .hierarchy
        .build(&input, container.settings.build_options())
        .unwrap();

    // Assert
    let ids: Vec<String> = built
        .nodes
        .iter()
        .map(|&idx| built.arena.node(idx).unwrap().id.to_string())
        .collect();
    assert_eq!(ids, vec!["gen", "gen_0", "gen_1"]);
}

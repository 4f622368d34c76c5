//! Hierarchy service
//!
//! Reads instance files into a node arena and runs the hierarchy builder on it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::instance::parse_records;
use crate::domain::{
    validate_hierarchy, BuildOptions, DomainError, HierarchyArena, HierarchyBuilder, HierarchyNode, IdScheme,
    ValidationReport,
};
use crate::infrastructure::traits::FileSystem;

/// A complete hierarchy and its nodes in id order.
#[derive(Debug, Clone)]
pub struct BuiltHierarchy {
    pub arena: HierarchyArena,
    /// Every node handle, sorted by id
    pub nodes: Vec<Index>,
    pub options: BuildOptions,
}

impl BuiltHierarchy {
    pub fn artificial_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|&&idx| self.arena.get_node(idx).is_some_and(|n| n.artificial))
            .count()
    }

    pub fn validate(&self) -> ValidationReport {
        validate_hierarchy(&self.arena, &self.nodes, self.options.fix_breadth_gaps)
    }
}

/// Service for loading and completing hierarchies.
pub struct HierarchyService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl HierarchyService {
    /// Create a new hierarchy service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    fn scheme(&self) -> ApplicationResult<IdScheme> {
        Ok(self.settings.id_scheme()?)
    }

    /// Read an instance file into an arena of real nodes, one node per distinct id.
    ///
    /// The node whose segments equal those of the scheme's root id becomes the
    /// arena root, whatever its prefix.
    pub fn load(&self, input: &Path) -> ApplicationResult<HierarchyArena> {
        if !self.fs.exists(input) || !self.fs.is_file(input) {
            return Err(ApplicationError::InputNotFound(input.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(input)
            .reading_input(input)?;

        let scheme = self.scheme()?;
        let records = parse_records(&content, &self.settings.input_format())?;
        debug!("load: {} records from {}", records.len(), input.display());

        let mut arena = HierarchyArena::new();
        let mut by_id: HashMap<String, Index> = HashMap::new();

        for record in records {
            let idx = match by_id.get(&record.node_id) {
                Some(&idx) => idx,
                None => {
                    let id = scheme.parse(&record.node_id)?;
                    if id.prefix() != scheme.generation_prefix() {
                        warn!(
                            "node {} does not use generation prefix '{}'",
                            id,
                            scheme.generation_prefix()
                        );
                    }
                    // Identity is positional, so a foreign prefix still names the root
                    let is_root = id.segments() == scheme.root_id().segments();
                    if is_root && arena.root().is_some() {
                        return Err(DomainError::DuplicateId(id.to_string()).into());
                    }
                    let node = HierarchyNode::real(id, Vec::new());
                    let idx = if is_root {
                        arena.insert_root(node)
                    } else {
                        arena.insert_node(node)
                    };
                    by_id.insert(record.node_id.clone(), idx);
                    idx
                }
            };
            arena.node_mut(idx)?.instances.push(record.instance);
        }

        debug!("load: {} distinct nodes", arena.len());
        Ok(arena)
    }

    /// Load `input` and complete its hierarchy.
    pub fn build(&self, input: &Path, options: BuildOptions) -> ApplicationResult<BuiltHierarchy> {
        let mut arena = self.load(input)?;
        let builder = HierarchyBuilder::new(self.scheme()?).with_options(options);
        let nodes = builder.build_complete_hierarchy(&mut arena)?;
        Ok(BuiltHierarchy {
            arena,
            nodes,
            options,
        })
    }

    /// Build and run structural validation on the result.
    pub fn check(&self, input: &Path, options: BuildOptions) -> ApplicationResult<ValidationReport> {
        let built = self.build(input, options)?;
        Ok(built.validate())
    }

    /// Write lines of `content` to `output`.
    pub fn write_output(&self, output: &Path, content: &str) -> ApplicationResult<()> {
        self.fs
            .write(output, content)
            .with_path_context("write output", output)
    }
}

//! The `Project` facade: a graph bound to a document path.
//!
//! All file I/O lives here; the graph itself is text-in/text-out. A project
//! path conventionally names the `.xcodeproj` bundle directory, inside which
//! the actual document is `project.pbxproj`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use pbx_graph::{Node, ProjectGraph};
use pbx_schema::SchemaTable;
use pbx_types::{AttrValue, Uuid};

use crate::error::{ProjectError, ProjectResult};

/// Name of the document inside a project bundle.
pub const PBXPROJ_FILE: &str = "project.pbxproj";

/// A project document bound to its location on disk.
#[derive(Debug)]
pub struct Project {
    graph: ProjectGraph,
    path: PathBuf,
}

impl Project {
    /// Create a new project at `path` (not yet written to disk).
    ///
    /// Matches the shape of a freshly generated document: a main group
    /// holding a `Products` group (also wired to `productRefGroup`) and a
    /// `Frameworks` group, plus a `Debug`/`Release` configuration list on
    /// the root object.
    pub fn new(schema: Arc<SchemaTable>, path: impl Into<PathBuf>) -> ProjectResult<Self> {
        let mut graph = ProjectGraph::new(schema)?;
        let root = graph.root().clone();

        let main = graph.create("PBXGroup")?;
        graph.set_attribute(&root, "mainGroup", AttrValue::Ref(main.clone()))?;
        let products = graph.create("PBXGroup")?;
        graph.set_attribute(&products, "name", AttrValue::scalar("Products"))?;
        graph.push_reference(&main, "children", &products)?;
        graph.set_attribute(&root, "productRefGroup", AttrValue::Ref(products))?;
        let frameworks = graph.create("PBXGroup")?;
        graph.set_attribute(&frameworks, "name", AttrValue::scalar("Frameworks"))?;
        graph.push_reference(&main, "children", &frameworks)?;

        let list = graph.create("XCConfigurationList")?;
        for name in ["Debug", "Release"] {
            let config = graph.create("XCBuildConfiguration")?;
            graph.set_attribute(&config, "name", AttrValue::scalar(name))?;
            graph.push_reference(&list, "buildConfigurations", &config)?;
        }
        graph.set_attribute(&root, "buildConfigurationList", AttrValue::Ref(list))?;

        Ok(Self {
            graph,
            path: path.into(),
        })
    }

    /// Open the project at `path`.
    ///
    /// `path` may name either the `.xcodeproj` bundle directory or the
    /// `project.pbxproj` document directly. All errors carry the document
    /// path.
    pub fn open(schema: Arc<SchemaTable>, path: impl Into<PathBuf>) -> ProjectResult<Self> {
        let path = path.into();
        let file = document_path(&path);
        let text = fs::read_to_string(&file).map_err(|source| ProjectError::Read {
            path: file.clone(),
            source,
        })?;
        let graph = ProjectGraph::from_pbxproj_str(schema, &text)
            .map_err(|source| ProjectError::Load { path: file, source })?;
        debug!(path = %path.display(), objects = graph.len(), "opened project");
        Ok(Self { graph, path })
    }

    /// Write the project back to its path, creating the bundle directory if
    /// needed.
    pub fn save(&self) -> ProjectResult<()> {
        self.save_as(&self.path)
    }

    /// Write the project to `path` without rebinding `self`.
    pub fn save_as(&self, path: impl AsRef<Path>) -> ProjectResult<()> {
        let path = path.as_ref();
        let file = document_path(path);
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir).map_err(|source| ProjectError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&file, self.graph.to_pbxproj_string()).map_err(|source| {
            ProjectError::Write {
                path: file.clone(),
                source,
            }
        })?;
        debug!(path = %path.display(), objects = self.graph.len(), "saved project");
        Ok(())
    }

    /// The bound document path as given at construction.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory paths inside the project resolve against: the parent of
    /// the bundle.
    pub fn source_root(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ProjectGraph {
        &mut self.graph
    }

    /// Encode the current graph as document text.
    pub fn to_pbxproj_string(&self) -> String {
        self.graph.to_pbxproj_string()
    }

    // ---------------------------------------------------------------
    // Attachment helpers
    // ---------------------------------------------------------------

    /// Create a named group and attach it under `parent` (the main group
    /// when `None`).
    pub fn new_group(&mut self, name: &str, parent: Option<&Uuid>) -> ProjectResult<Uuid> {
        let parent = match parent {
            Some(p) => p.clone(),
            None => self.main_group_uuid()?,
        };
        let group = self.graph.create("PBXGroup")?;
        self.graph
            .set_attribute(&group, "name", AttrValue::scalar(name))?;
        self.graph.push_reference(&parent, "children", &group)?;
        Ok(group)
    }

    /// Create a file reference for `path` and attach it under `parent` (the
    /// main group when `None`).
    pub fn new_file(&mut self, path: &str, parent: Option<&Uuid>) -> ProjectResult<Uuid> {
        let parent = match parent {
            Some(p) => p.clone(),
            None => self.main_group_uuid()?,
        };
        let file = self.graph.create("PBXFileReference")?;
        self.graph
            .set_attribute(&file, "path", AttrValue::scalar(path))?;
        self.graph.push_reference(&parent, "children", &file)?;
        Ok(file)
    }

    pub(crate) fn main_group_uuid(&mut self) -> ProjectResult<Uuid> {
        if let Some(AttrValue::Ref(main)) = self.graph.root_node().get("mainGroup") {
            return Ok(main.clone());
        }
        // Loaded documents are not required to carry one; lazily add it.
        let root = self.graph.root().clone();
        let main = self.graph.create("PBXGroup")?;
        self.graph
            .set_attribute(&root, "mainGroup", AttrValue::Ref(main.clone()))?;
        Ok(main)
    }

    /// The project's main group, if set.
    pub fn main_group(&self) -> Option<&Node> {
        match self.graph.root_node().get("mainGroup") {
            Some(AttrValue::Ref(main)) => self.graph.node(main),
            _ => None,
        }
    }
}

/// Resolve the document path: a `.xcodeproj` bundle path points at the
/// `project.pbxproj` inside it; anything else is taken verbatim.
fn document_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "xcodeproj") {
        path.join(PBXPROJ_FILE)
    } else {
        path.to_path_buf()
    }
}

//! Convenience queries over an open project.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use pbx_graph::{GraphError, Node};
use pbx_types::{AttrValue, Uuid};

use crate::error::{ProjectError, ProjectResult};
use crate::project::Project;

const GROUP_KINDS: [&str; 2] = ["PBXGroup", "PBXVariantGroup"];
const APP_EXTENSION_PRODUCT_TYPE: &str = "com.apple.product-type.app-extension";

/// `dstSubfolderSpec` of copy-files phases embedding into `PlugIns`.
const PLUGINS_DST_SUBFOLDER_SPEC: &str = "13";

impl Project {
    /// All groups (plain and variant), in registration order.
    pub fn groups(&self) -> Vec<&Node> {
        self.graph()
            .nodes()
            .filter(|n| GROUP_KINDS.contains(&n.kind()))
            .collect()
    }

    /// All file references, in registration order.
    pub fn files(&self) -> Vec<&Node> {
        self.graph().list_by_kind("PBXFileReference")
    }

    /// The root object's targets, in list order.
    pub fn targets(&self) -> Vec<&Node> {
        self.graph()
            .root_node()
            .get("targets")
            .and_then(AttrValue::as_ref_list)
            .map(|uuids| uuids.iter().filter_map(|u| self.graph().node(u)).collect())
            .unwrap_or_default()
    }

    /// The subset of [`targets`](Self::targets) that are native targets.
    pub fn native_targets(&self) -> Vec<&Node> {
        self.targets()
            .into_iter()
            .filter(|t| t.kind() == "PBXNativeTarget")
            .collect()
    }

    /// The project-level configuration list, if set.
    pub fn build_configuration_list(&self) -> Option<&Node> {
        self.graph()
            .root_node()
            .get("buildConfigurationList")
            .and_then(AttrValue::as_ref_uuid)
            .and_then(|u| self.graph().node(u))
    }

    /// The project-level build configurations, in list order.
    pub fn build_configurations(&self) -> Vec<&Node> {
        self.build_configuration_list()
            .and_then(|list| list.get("buildConfigurations"))
            .and_then(AttrValue::as_ref_list)
            .map(|uuids| uuids.iter().filter_map(|u| self.graph().node(u)).collect())
            .unwrap_or_default()
    }

    /// The `buildSettings` of the project configuration named
    /// `configuration`.
    pub fn build_settings(&self, configuration: &str) -> Option<&BTreeMap<String, AttrValue>> {
        self.build_configurations()
            .into_iter()
            .find(|c| c.scalar("name") == Some(configuration))
            .and_then(|c| c.get("buildSettings"))
            .and_then(|v| match v {
                AttrValue::Dict(settings) => Some(settings),
                _ => None,
            })
    }

    /// Walk `/`-separated display names from the main group down.
    pub fn group_at_path(&self, path: &str) -> Option<&Node> {
        let mut current = self.main_group()?;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let children = current.get("children").and_then(AttrValue::as_ref_list)?;
            current = children
                .iter()
                .filter_map(|u| self.graph().node(u))
                .filter(|n| GROUP_KINDS.contains(&n.kind()))
                .find(|n| n.display_name(self.graph().schema()) == component)?;
        }
        Some(current)
    }

    /// The file reference whose resolved location is `path`.
    ///
    /// `path` must be absolute; a relative path cannot be resolved against
    /// the project and is rejected.
    pub fn reference_for_path(&self, path: &Path) -> ProjectResult<Option<&Node>> {
        if !path.is_absolute() {
            return Err(ProjectError::RelativePath(path.to_path_buf()));
        }
        Ok(self
            .files()
            .into_iter()
            .find(|file| self.resolved_path(file) == path))
    }

    /// A file reference's location: its own `path` when absolute, otherwise
    /// the ancestor groups' `path` components stacked onto the source root.
    fn resolved_path(&self, node: &Node) -> PathBuf {
        if let Some(p) = node.scalar("path") {
            if Path::new(p).is_absolute() {
                return PathBuf::from(p);
            }
        }
        let mut components = Vec::new();
        let mut current = node.uuid().clone();
        // Group containment can be cyclic; stop on revisit like every other
        // traversal.
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.clone()) {
                break;
            }
            let Some(n) = self.graph().node(&current) else {
                break;
            };
            if let Some(p) = n.scalar("path") {
                components.push(p.to_string());
            }
            let parent = self
                .graph()
                .referrers_of(&current)
                .into_iter()
                .find(|(u, attr)| {
                    *attr == "children"
                        && self
                            .graph()
                            .node(u)
                            .is_some_and(|p| GROUP_KINDS.contains(&p.kind()))
                })
                .map(|(u, _)| u.clone());
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        let mut path = self.source_root().to_path_buf();
        for component in components.iter().rev() {
            path.push(component);
        }
        path
    }

    // ---------------------------------------------------------------
    // App-extension relationships
    // ---------------------------------------------------------------

    /// The native targets embedding the given app-extension target's product
    /// through a `PlugIns` copy-files phase.
    ///
    /// Asking about a target that is not an app extension is a contract
    /// violation, not an empty answer.
    pub fn host_targets_for_app_extension_target(
        &self,
        extension: &Uuid,
    ) -> ProjectResult<Vec<&Node>> {
        let node = self
            .graph()
            .node(extension)
            .ok_or_else(|| GraphError::NotRegistered(extension.clone()))?;
        if node.scalar("productType") != Some(APP_EXTENSION_PRODUCT_TYPE) {
            return Err(ProjectError::NotAnAppExtension(
                node.display_name(self.graph().schema()),
            ));
        }
        let Some(product) = node.get("productReference").and_then(AttrValue::as_ref_uuid)
        else {
            return Ok(Vec::new());
        };
        Ok(self
            .native_targets()
            .into_iter()
            .filter(|host| {
                host.uuid() != extension
                    && self.embedded_products(host).contains(&product)
            })
            .collect())
    }

    /// The app-extension targets whose products the given target embeds.
    pub fn app_extensions_for_target(&self, host: &Uuid) -> ProjectResult<Vec<&Node>> {
        let node = self
            .graph()
            .node(host)
            .ok_or_else(|| GraphError::NotRegistered(host.clone()))?;
        let embedded = self.embedded_products(node);
        Ok(self
            .native_targets()
            .into_iter()
            .filter(|t| {
                t.scalar("productType") == Some(APP_EXTENSION_PRODUCT_TYPE)
                    && t.get("productReference")
                        .and_then(AttrValue::as_ref_uuid)
                        .is_some_and(|p| embedded.contains(&p))
            })
            .collect())
    }

    /// File references copied by the target's `PlugIns` copy-files phases.
    fn embedded_products<'a>(&'a self, target: &'a Node) -> Vec<&'a Uuid> {
        let mut out = Vec::new();
        let Some(phases) = target.get("buildPhases").and_then(AttrValue::as_ref_list)
        else {
            return out;
        };
        for phase_uuid in phases {
            let Some(phase) = self.graph().node(phase_uuid) else {
                continue;
            };
            if phase.kind() != "PBXCopyFilesBuildPhase"
                || phase.scalar("dstSubfolderSpec") != Some(PLUGINS_DST_SUBFOLDER_SPEC)
            {
                continue;
            }
            let Some(files) = phase.get("files").and_then(AttrValue::as_ref_list) else {
                continue;
            };
            for file_uuid in files {
                if let Some(file_ref) = self
                    .graph()
                    .node(file_uuid)
                    .and_then(|bf| bf.get("fileRef"))
                    .and_then(AttrValue::as_ref_uuid)
                {
                    out.push(file_ref);
                }
            }
        }
        out
    }

    // ---------------------------------------------------------------
    // Reporting
    // ---------------------------------------------------------------

    /// A short human-readable summary: file references, targets, and
    /// project build configurations by display name.
    pub fn pretty_print(&self) -> String {
        let schema = self.graph().schema();
        let mut out = String::new();
        let mut section = |title: &str, nodes: Vec<&Node>| {
            let _ = writeln!(out, "{title}:");
            if nodes.is_empty() {
                let _ = writeln!(out, "  (none)");
            }
            for node in nodes {
                let _ = writeln!(out, "  - {}", node.display_name(schema));
            }
        };
        section("File References", self.files());
        section("Targets", self.targets());
        section("Build Configurations", self.build_configurations());
        out
    }
}

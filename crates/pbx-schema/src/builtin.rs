//! The standard schema catalog for Xcode project object kinds.
//!
//! This module is the injected data the rest of the workspace consumes
//! through [`SchemaTable`]; nothing outside this file names a kind tag.
//! Attribute classifications and default values follow what Xcode itself
//! writes for each kind.

use std::collections::BTreeMap;

use pbx_types::AttrValue;

use crate::schema::{ObjectSchema, SchemaTable};

fn empty_refs() -> AttrValue {
    AttrValue::Refs(Vec::new())
}

fn empty_dict() -> AttrValue {
    AttrValue::Dict(BTreeMap::new())
}

fn build_phase(kind: &str) -> ObjectSchema {
    ObjectSchema::new(kind)
        .reference_list("files")
        .default_attr("buildActionMask", AttrValue::scalar("2147483647"))
        .default_attr("files", empty_refs())
        .default_attr("runOnlyForDeploymentPostprocessing", AttrValue::scalar("0"))
}

/// The standard table covering the object kinds of the pbxproj format.
pub fn standard() -> SchemaTable {
    SchemaTable::new([
        ObjectSchema::new("PBXProject")
            .reference("mainGroup")
            .reference("buildConfigurationList")
            .reference("productRefGroup")
            .reference_list("targets")
            .reference_list("packageReferences")
            .sorted_list("targets")
            .default_attr("attributes", empty_dict())
            .default_attr("projectDirPath", AttrValue::scalar(""))
            .default_attr("projectRoot", AttrValue::scalar(""))
            .default_attr("targets", empty_refs()),
        ObjectSchema::new("PBXGroup")
            .reference_list("children")
            .sorted_list("children")
            .display_keys(&["name", "path"])
            .default_attr("children", empty_refs())
            .default_attr("sourceTree", AttrValue::scalar("<group>")),
        ObjectSchema::new("PBXVariantGroup")
            .reference_list("children")
            .sorted_list("children")
            .display_keys(&["name", "path"])
            .default_attr("children", empty_refs())
            .default_attr("sourceTree", AttrValue::scalar("<group>")),
        ObjectSchema::new("PBXFileReference")
            .display_keys(&["name", "path"])
            .default_attr("sourceTree", AttrValue::scalar("SOURCE_ROOT"))
            .default_attr("includeInIndex", AttrValue::scalar("1")),
        // A build file exists only to place a file reference (or package
        // product) into a build phase.
        ObjectSchema::new("PBXBuildFile")
            .reference("fileRef")
            .reference("productRef")
            .owned_link(),
        build_phase("PBXSourcesBuildPhase"),
        build_phase("PBXFrameworksBuildPhase"),
        build_phase("PBXResourcesBuildPhase"),
        build_phase("PBXHeadersBuildPhase"),
        build_phase("PBXShellScriptBuildPhase")
            .default_attr("shellPath", AttrValue::scalar("/bin/sh")),
        build_phase("PBXCopyFilesBuildPhase")
            .default_attr("dstPath", AttrValue::scalar("")),
        ObjectSchema::new("PBXNativeTarget")
            .reference("buildConfigurationList")
            .reference("productReference")
            .reference_list("buildPhases")
            .reference_list("buildRules")
            .reference_list("dependencies")
            .reference_list("packageProductDependencies")
            .display_keys(&["name"])
            .default_attr("buildPhases", empty_refs())
            .default_attr("buildRules", empty_refs())
            .default_attr("dependencies", empty_refs()),
        ObjectSchema::new("PBXAggregateTarget")
            .reference("buildConfigurationList")
            .reference_list("buildPhases")
            .reference_list("dependencies")
            .display_keys(&["name"])
            .default_attr("buildPhases", empty_refs())
            .default_attr("dependencies", empty_refs()),
        ObjectSchema::new("PBXLegacyTarget")
            .reference("buildConfigurationList")
            .reference_list("buildPhases")
            .reference_list("dependencies")
            .display_keys(&["name"]),
        // Link objects that exist only to point at a target or a
        // subproject's objects. `remoteGlobalIDString` is deliberately plain
        // data: it names an object in a *different* project's identity space
        // and must be passed through untouched.
        ObjectSchema::new("PBXTargetDependency")
            .reference("target")
            .reference("targetProxy")
            .owned_link(),
        ObjectSchema::new("PBXContainerItemProxy")
            .reference("containerPortal")
            .owned_link(),
        ObjectSchema::new("PBXReferenceProxy")
            .reference("remoteRef")
            .display_keys(&["name", "path"])
            .owned_link(),
        ObjectSchema::new("PBXBuildRule"),
        ObjectSchema::new("XCConfigurationList")
            .reference_list("buildConfigurations")
            .sorted_list("buildConfigurations")
            .default_attr("buildConfigurations", empty_refs())
            .default_attr("defaultConfigurationIsVisible", AttrValue::scalar("0")),
        ObjectSchema::new("XCBuildConfiguration")
            .reference("baseConfigurationReference")
            .display_keys(&["name"])
            .default_attr("buildSettings", empty_dict()),
        ObjectSchema::new("XCRemoteSwiftPackageReference")
            .display_keys(&["repositoryURL"]),
        ObjectSchema::new("XCSwiftPackageProductDependency")
            .reference("package")
            .display_keys(&["productName"]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttrClass;

    #[test]
    fn standard_table_knows_the_core_kinds() {
        let table = standard();
        for kind in [
            "PBXProject",
            "PBXGroup",
            "PBXFileReference",
            "PBXNativeTarget",
            "XCConfigurationList",
            "XCBuildConfiguration",
        ] {
            assert!(table.knows(kind), "missing schema for {kind}");
        }
    }

    #[test]
    fn group_children_is_a_reference_list() {
        let table = standard();
        let group = table.get("PBXGroup").unwrap();
        assert_eq!(group.classify("children"), AttrClass::ReferenceList);
        assert_eq!(group.classify("sourceTree"), AttrClass::Scalar);
    }

    #[test]
    fn proxy_kinds_are_owned_links() {
        let table = standard();
        assert!(table.get("PBXContainerItemProxy").unwrap().is_owned_link());
        assert!(table.get("PBXTargetDependency").unwrap().is_owned_link());
        assert!(table.get("PBXReferenceProxy").unwrap().is_owned_link());
        assert!(!table.get("PBXGroup").unwrap().is_owned_link());
    }

    #[test]
    fn remote_global_id_is_plain_data() {
        let table = standard();
        let proxy = table.get("PBXContainerItemProxy").unwrap();
        assert_eq!(proxy.classify("remoteGlobalIDString"), AttrClass::Scalar);
        assert_eq!(proxy.classify("containerPortal"), AttrClass::Reference);
    }

    #[test]
    fn file_reference_defaults_match_xcode() {
        let table = standard();
        let file = table.get("PBXFileReference").unwrap();
        let defaults: Vec<(&str, &AttrValue)> = file.defaults().collect();
        assert_eq!(
            defaults,
            vec![
                ("sourceTree", &AttrValue::scalar("SOURCE_ROOT")),
                ("includeInIndex", &AttrValue::scalar("1")),
            ]
        );
    }
}

use std::collections::HashMap;

use modgraph_cli::config::{GraphInput, ModgraphConfig};
use modgraph_cli::core::{Dependency, ModgraphError};
use modgraph_cli::module::{
    AggregationSettings, DependencyOrigin, ModuleDescriptor, ModuleMap, SharedModuleMap,
};
use modgraph_cli::planner::{ModulePlan, ModulePlanner};
use modgraph_cli::resolver::{Collection, RejectionFlags, Resolver};
use modgraph_cli::test_utils::{dependency, init_test_logging};

fn plan(config: &str, graph: &str) -> ModulePlan {
    init_test_logging(None);
    let config = ModgraphConfig::from_toml_str(config).unwrap();
    let input = GraphInput::from_toml_str(graph).unwrap();
    let planner = ModulePlanner::from_config(&config, input.to_graph().unwrap()).unwrap();
    planner.plan(&input.roots().unwrap()).unwrap()
}

#[test]
fn test_templated_module_names() {
    let plan = plan(
        r#"
[[module]]
name = "$g1"
[[module.include]]
group-id = "(org\\.acme\\.[a-z]+)"
"#,
        r#"
roots = ["org.acme.billing:api:2.0.0"]

[[artifact]]
coordinates = "org.acme.billing:api:2.0.0"
dependencies = ["org.acme.shipping:api:1.0.0", "org.acme.billing:impl:2.0.0"]
"#,
    );

    let names: Vec<_> = plan.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["org.acme.billing", "org.acme.shipping"]);
    assert!(plan.modules.iter().all(|m| !m.synthetic));

    let billing = plan.module("org.acme.billing").unwrap();
    assert_eq!(billing.members.len(), 2);
    assert_eq!(billing.dependencies.len(), 1);
    assert_eq!(billing.dependencies[0].name, "org.acme.shipping");
}

#[test]
fn test_inherited_slot_with_version_major() {
    let plan = plan(
        r#"
slot-strategy = "version-major"

[[module]]
name = "app"
slot = "prodx"
inherit-slot = true
[[module.include]]
group-id = "org\\.example"
"#,
        r#"
roots = ["org.example:app:1.4.0"]

[[artifact]]
coordinates = "org.example:app:1.4.0"
dependencies = ["org.lib:lib:3.1.0"]
"#,
    );

    let app = plan.module("app").unwrap();
    assert_eq!(app.slot, "prodx1");
    assert_eq!(app.dependencies[0].slot, "prodx3");
    assert_eq!(plan.module("org.lib").unwrap().slot, "3");
}

#[test]
fn test_ignore_optional_dependencies() {
    let graph = r#"
roots = ["org.example:app:1.0"]

[[artifact]]
coordinates = "org.example:app:1.0"
dependencies = [{ coordinates = "org.opt:opt:1.0", optional = true }]
"#;

    let kept = plan("", graph);
    let app = kept.module("org.example.app").unwrap();
    assert_eq!(app.dependencies.len(), 1);
    assert!(app.dependencies[0].optional);

    let pruned = plan("ignore-optional-dependencies = true", graph);
    assert!(pruned.module("org.example.app").unwrap().dependencies.is_empty());
    assert!(pruned.module("org.opt").is_none());
    // optional edges are pruned without being reported
    assert!(pruned.pruned.is_empty());
}

#[test]
fn test_apply_to_dependencies_overrides_attributes() {
    let plan = plan(
        r#"
[[module]]
name = "app"
[[module.include]]
group-id = "org\\.example"

[[module.apply-to-dependencies]]
include = ["org\\.slf4j.*"]
export = true
services = "export"
"#,
        r#"
roots = ["org.example:app:1.0"]

[[artifact]]
coordinates = "org.example:app:1.0"
dependencies = ["org.slf4j:slf4j-api:1.7.36", "org.lib:lib:2.0"]
"#,
    );

    let app = plan.module("app").unwrap();
    let slf4j = app.dependencies.iter().find(|d| d.name == "org.slf4j.slf4j-api").unwrap();
    assert!(slf4j.export);
    assert_eq!(slf4j.origin, DependencyOrigin::Resolved);

    let lib = app.dependencies.iter().find(|d| d.name == "org.lib").unwrap();
    assert!(!lib.export);
}

#[test]
fn test_per_edge_exclusion_prunes_subtree() {
    let plan = plan(
        "",
        r#"
roots = [{ coordinates = "org.example:app:1.0", exclusions = ["org.noise:*"] }]

[[artifact]]
coordinates = "org.example:app:1.0"
dependencies = ["org.lib:lib:1.0"]

[[artifact]]
coordinates = "org.lib:lib:1.0"
dependencies = ["org.noise:noise:1.0"]
"#,
    );

    assert!(plan.module("org.noise").is_none());
    assert_eq!(plan.pruned.len(), 1);
    assert_eq!(plan.pruned[0].coordinates, "org.noise:noise:1.0");
    assert_eq!(plan.pruned[0].policy, "exclusion");
}

/// A resolver backed by a table; artifacts missing from the table fail.
struct TableResolver {
    children: HashMap<String, Vec<Dependency>>,
}

impl Resolver for TableResolver {
    fn resolve_direct(&self, dependency: &Dependency) -> Result<Vec<Dependency>, ModgraphError> {
        self.children.get(&dependency.artifact.to_string()).cloned().ok_or_else(|| {
            ModgraphError::ArtifactNotFound {
                coordinates: dependency.artifact.to_string(),
            }
        })
    }

    fn collect(&self, roots: &[Dependency]) -> Result<Collection, ModgraphError> {
        let mut dependencies = roots.to_vec();
        for root in roots {
            dependencies.extend(self.resolve_direct(root)?);
        }
        Ok(Collection {
            dependencies,
            flags: RejectionFlags::new(),
        })
    }
}

#[test]
fn test_member_resolution_failure_is_not_fatal() {
    let mut children = HashMap::new();
    children.insert("org.example:app:1.0".to_string(), vec![dependency("org.lib:lib:1.0")]);
    let resolver = TableResolver {
        children,
    };

    let descriptors = vec![
        ModuleDescriptor::builder("app").include(Some("org\\.example"), None).build().unwrap(),
    ];
    let planner = ModulePlanner::new(resolver, descriptors, AggregationSettings::default());
    let plan = planner.plan(&[dependency("org.example:app:1.0")]).unwrap();

    assert_eq!(plan.module("app").unwrap().dependencies.len(), 1);
    // org.lib:lib cannot be resolved; its module still exists without dependencies
    assert!(plan.module("org.lib").unwrap().dependencies.is_empty());
}

#[test]
fn test_shared_module_map_across_threads() {
    let descriptors = vec![
        ModuleDescriptor::builder("commons")
            .include(Some("org\\.apache\\.commons"), None)
            .build()
            .unwrap(),
    ];
    let shared = SharedModuleMap::new(ModuleMap::new(descriptors));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let shared = shared.clone();
            scope.spawn(move || {
                for id in 0..5 {
                    let coordinates = format!("org.apache.commons:lib{}:1.0", (worker + id) % 5);
                    let module = shared.classify(&dependency(&coordinates));
                    assert_eq!(module.name(), "commons");
                }
            });
        }
    });

    let entries = shared.to_map();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].dependencies.len(), 5);
}

// Diagram generation for Surveyor
//
// Renders class relationships and the call graph as fenced Mermaid blocks.
// Both diagrams are capped so large repositories stay renderable.

use crate::analysis::{CallGraph, CallNode};
use crate::config::DiagramConfig;
use crate::parser::ParsedUnit;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Base type every class implicitly derives from; never drawn
const ROOT_BASE: &str = "object";

/// Kind of rendered diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Class,
    Graph,
}

/// A rendered diagram: opaque Mermaid markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub kind: DiagramKind,
    pub payload: String,
}

impl std::fmt::Display for Diagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.payload)
    }
}

/// Diagram renderer with size caps
#[derive(Debug, Clone)]
pub struct DiagramRenderer {
    /// Units considered by the class diagram
    max_units: usize,
    /// Methods listed per class
    max_methods: usize,
    /// Functions kept in the call graph diagram
    max_functions: usize,
    /// Outgoing calls considered per function
    max_calls: usize,
}

impl DiagramRenderer {
    /// Create a renderer with the default caps
    pub fn new() -> Self {
        Self {
            max_units: 10,
            max_methods: 5,
            max_functions: 15,
            max_calls: 5,
        }
    }

    /// Create a renderer from configuration
    pub fn from_config(config: &DiagramConfig) -> Self {
        Self {
            max_units: config.max_units,
            max_methods: config.max_methods,
            max_functions: config.max_functions,
            max_calls: config.max_calls,
        }
    }

    /// Set maximum functions for the call graph diagram
    pub fn with_max_functions(mut self, max: usize) -> Self {
        self.max_functions = max;
        self
    }

    /// Render classes of the first units as boxes with inheritance edges
    ///
    /// Output follows unit order, then declaration order.
    pub fn render_class_diagram(&self, units: &[ParsedUnit]) -> Diagram {
        let mut lines = vec!["```mermaid".to_string(), "classDiagram".to_string()];

        for unit in units.iter().take(self.max_units) {
            for class in &unit.classes {
                lines.push(format!("    class {} {{", class.name));

                for method in class.method_names.iter().take(self.max_methods) {
                    let visibility = if method.starts_with('_') && !method.ends_with("__") {
                        "-"
                    } else {
                        "+"
                    };
                    lines.push(format!("        {}{}()", visibility, method));
                }

                lines.push("    }".to_string());

                for base in &class.base_names {
                    let safe_base = sanitize_class_name(base.as_str());
                    if safe_base.is_empty() || safe_base == ROOT_BASE {
                        continue;
                    }
                    lines.push(format!("    {} <|-- {}", safe_base, class.name));
                }
            }
        }

        lines.push("```".to_string());
        Diagram {
            kind: DiagramKind::Class,
            payload: lines.join("\n"),
        }
    }

    /// Render the most-connected functions and the calls between them
    ///
    /// Functions are ranked by number of distinct targets, ties broken by
    /// name. Each kept function contributes edges from its first
    /// `max_calls` targets in name order that are functions of the graph,
    /// so classes and external names never appear.
    pub fn render_call_graph_diagram(&self, graph: &CallGraph) -> Diagram {
        let mut lines = vec!["```mermaid".to_string(), "graph TD".to_string()];

        // iter() is name-ordered and the sort is stable
        let mut ranked: Vec<(&String, &CallNode)> = graph.iter().collect();
        ranked.sort_by_key(|(_, node)| Reverse(node.calls.len()));
        ranked.truncate(self.max_functions);

        for (name, node) in &ranked {
            for target in node.calls.iter().take(self.max_calls) {
                if graph.contains(target) {
                    lines.push(format!("    {} --> {}", name, target));
                }
            }
        }

        lines.push("```".to_string());
        Diagram {
            kind: DiagramKind::Graph,
            payload: lines.join("\n"),
        }
    }
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a class diagram with the default caps
pub fn render_class_diagram(units: &[ParsedUnit]) -> Diagram {
    DiagramRenderer::new().render_class_diagram(units)
}

/// Render a call graph diagram with the default caps
pub fn render_call_graph_diagram(graph: &CallGraph) -> Diagram {
    DiagramRenderer::new().render_call_graph_diagram(graph)
}

/// Sanitize a class name for Mermaid class diagrams
fn sanitize_class_name(s: &str) -> String {
    // Drop subscripts and call arguments, then keep the last dotted segment
    let head = s.split(|c: char| c == '[' || c == '(').next().unwrap_or(s);
    let name = head.split('.').next_back().unwrap_or(head);
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ClassEntity, Ref};
    use std::collections::{BTreeSet, HashSet};
    use std::path::PathBuf;

    fn class(name: &str, methods: &[&str], bases: &[Ref]) -> ClassEntity {
        let mut class = ClassEntity::new(name, 1);
        class.method_names = methods.iter().map(|m| m.to_string()).collect();
        class.base_names = bases.to_vec();
        class
    }

    fn unit(path: &str, classes: Vec<ClassEntity>) -> ParsedUnit {
        let mut unit = ParsedUnit::new(path);
        unit.classes = classes;
        unit
    }

    fn node(calls: &[&str]) -> CallNode {
        CallNode {
            calls: calls.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
            source_path: PathBuf::from("a.py"),
        }
    }

    fn body(diagram: &Diagram) -> Vec<&str> {
        let lines: Vec<&str> = diagram.payload.lines().collect();
        lines[2..lines.len() - 1].to_vec()
    }

    #[test]
    fn test_sanitize_class_name() {
        assert_eq!(sanitize_class_name("MyClass"), "MyClass");
        assert_eq!(sanitize_class_name("module.MyClass"), "MyClass");
        assert_eq!(sanitize_class_name("typing.Generic[T]"), "Generic");
        assert_eq!(sanitize_class_name("with_metaclass(Meta)"), "with_metaclass");
        assert_eq!(sanitize_class_name("six.with_metaclass(abc.ABCMeta)"), "with_metaclass");
    }

    #[test]
    fn test_qualified_root_base_skipped() {
        let units = vec![unit(
            "legacy.py",
            vec![class(
                "Old",
                &[],
                &[
                    Ref::Opaque("builtins.object".to_string()),
                    Ref::Named("Mixin".to_string()),
                ],
            )],
        )];
        let diagram = render_class_diagram(&units);
        assert!(!diagram.payload.contains("object <|--"));
        assert!(diagram.payload.contains("    Mixin <|-- Old"));
    }

    #[test]
    fn test_empty_class_diagram() {
        let diagram = render_class_diagram(&[]);
        assert_eq!(diagram.kind, DiagramKind::Class);
        assert_eq!(diagram.payload, "```mermaid\nclassDiagram\n```");
    }

    #[test]
    fn test_class_box_and_inheritance() {
        let units = vec![unit(
            "models.py",
            vec![class(
                "User",
                &["__init__", "_hash", "save"],
                &[
                    Ref::Named("Base".to_string()),
                    Ref::Named("object".to_string()),
                    Ref::Opaque("mixins.Auditable".to_string()),
                ],
            )],
        )];

        let diagram = render_class_diagram(&units);
        assert_eq!(
            body(&diagram),
            vec![
                "    class User {",
                "        +__init__()",
                "        -_hash()",
                "        +save()",
                "    }",
                "    Base <|-- User",
                "    Auditable <|-- User",
            ]
        );
    }

    #[test]
    fn test_methods_capped() {
        let methods = ["a", "b", "c", "d", "e", "f", "g"];
        let units = vec![unit("big.py", vec![class("Big", &methods, &[])])];
        let diagram = render_class_diagram(&units);

        assert!(diagram.payload.contains("+e()"));
        assert!(!diagram.payload.contains("+f()"));
    }

    #[test]
    fn test_units_capped() {
        let units: Vec<ParsedUnit> = (0..12)
            .map(|i| unit(&format!("m{}.py", i), vec![class(&format!("C{}", i), &[], &[])]))
            .collect();
        let diagram = render_class_diagram(&units);

        let boxes = diagram.payload.matches("    class ").count();
        assert_eq!(boxes, 10);
        assert!(diagram.payload.contains("class C9 {"));
        assert!(!diagram.payload.contains("class C10 {"));
    }

    #[test]
    fn test_class_diagram_is_deterministic() {
        let units = vec![
            unit("a.py", vec![class("A", &["run"], &[]), class("B", &[], &[])]),
            unit("b.py", vec![class("C", &[], &[Ref::Named("A".to_string())])]),
        ];
        let first = render_class_diagram(&units);
        let second = render_class_diagram(&units);
        assert_eq!(first, second);

        let a = first.payload.find("class A {").unwrap();
        let b = first.payload.find("class B {").unwrap();
        let c = first.payload.find("class C {").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_empty_call_graph_diagram() {
        let diagram = render_call_graph_diagram(&CallGraph::default());
        assert_eq!(diagram.kind, DiagramKind::Graph);
        assert_eq!(diagram.payload, "```mermaid\ngraph TD\n```");
    }

    #[test]
    fn test_call_graph_edges_only_between_functions() {
        let graph: CallGraph = [
            ("main".to_string(), node(&["Config", "load", "run"])),
            ("load".to_string(), node(&[])),
            ("run".to_string(), node(&["load"])),
        ]
        .into_iter()
        .collect();

        let diagram = render_call_graph_diagram(&graph);
        assert_eq!(
            body(&diagram),
            vec!["    main --> load", "    main --> run", "    run --> load"]
        );
    }

    #[test]
    fn test_call_graph_caps() {
        let names: Vec<String> = (0..30).map(|i| format!("f{:02}", i)).collect();
        let graph: CallGraph = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // f00 calls everything, later functions call fewer
                let targets: Vec<&str> = names.iter().skip(i).map(|s| s.as_str()).collect();
                (name.clone(), node(&targets))
            })
            .collect();

        let diagram = render_call_graph_diagram(&graph);
        let edges = body(&diagram);

        let mut sources: HashSet<&str> = HashSet::new();
        for edge in &edges {
            let (from, _) = edge.trim().split_once(" --> ").unwrap();
            sources.insert(from);
            let out = edges.iter().filter(|e| e.trim().starts_with(&format!("{} ", from))).count();
            assert!(out <= 5);
        }
        assert!(sources.len() <= 15);
        assert!(!sources.contains("f15"));
        // Targets outside the top 15 are still drawn
        assert!(edges.contains(&"    f14 --> f18"));
    }

    #[test]
    fn test_call_graph_keeps_edges_to_unranked_functions() {
        let mut entries = vec![
            ("hub".to_string(), node(&["aaa_leaf", "x1", "x2"])),
            ("aaa_leaf".to_string(), node(&[])),
        ];
        for i in 0..14 {
            entries.push((format!("m{:02}", i), node(&["q"])));
        }
        let graph: CallGraph = entries.into_iter().collect();

        let diagram = render_call_graph_diagram(&graph);
        // aaa_leaf ranks 16th but is still a function of the graph
        assert!(diagram.payload.contains("    hub --> aaa_leaf"));
        assert!(!diagram.payload.contains("--> x1"));
        assert!(!diagram.payload.contains("aaa_leaf -->"));
    }

    #[test]
    fn test_call_graph_tie_break_by_name() {
        let graph: CallGraph = [
            ("zeta".to_string(), node(&["alpha"])),
            ("alpha".to_string(), node(&["zeta"])),
            ("mid".to_string(), node(&["alpha"])),
        ]
        .into_iter()
        .collect();

        let diagram = DiagramRenderer::new()
            .with_max_functions(2)
            .render_call_graph_diagram(&graph);
        // alpha and mid are kept, zeta only appears as a target
        assert_eq!(body(&diagram), vec!["    alpha --> zeta", "    mid --> alpha"]);
    }

    #[test]
    fn test_from_config() {
        let config = DiagramConfig {
            max_units: 1,
            ..DiagramConfig::default()
        };
        let units = vec![
            unit("a.py", vec![class("A", &[], &[])]),
            unit("b.py", vec![class("B", &[], &[])]),
        ];
        let diagram = DiagramRenderer::from_config(&config).render_class_diagram(&units);
        assert!(diagram.payload.contains("class A {"));
        assert!(!diagram.payload.contains("class B {"));
    }
}

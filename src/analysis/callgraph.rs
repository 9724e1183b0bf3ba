// Name-based call graph over parsed units
//
// Pass 1 indexes every function and class by name. Pass 2 rescans each
// file's raw text for `name(` call sites of indexed names. There is no scope
// or shadowing analysis: a match in a comment or string counts, and every
// function in a file shares the call sites found anywhere in that file.

use crate::parser::ParsedUnit;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Kind of an indexed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
}

/// Where an indexed entity was declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLocation {
    pub kind: EntityKind,
    pub source_path: PathBuf,
    pub line_start: usize,
}

/// Entity name to declaration, last declaration wins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityIndex(BTreeMap<String, EntityLocation>);

impl EntityIndex {
    /// Index every function and class in `units`
    ///
    /// Units are processed in slice order, functions before classes within
    /// a unit. A later declaration of a name replaces an earlier one, so the
    /// result depends on input order.
    pub fn build(units: &[ParsedUnit]) -> Self {
        let mut index = BTreeMap::new();
        for unit in units.iter().filter(|u| u.is_ok()) {
            for func in &unit.functions {
                index.insert(
                    func.name.clone(),
                    EntityLocation {
                        kind: EntityKind::Function,
                        source_path: unit.source_path.clone(),
                        line_start: func.line_start,
                    },
                );
            }
            for class in &unit.classes {
                index.insert(
                    class.name.clone(),
                    EntityLocation {
                        kind: EntityKind::Class,
                        source_path: unit.source_path.clone(),
                        line_start: class.line_start,
                    },
                );
            }
        }
        Self(index)
    }

    pub fn get(&self, name: &str) -> Option<&EntityLocation> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityLocation)> {
        self.0.iter()
    }
}

/// Outgoing references of one function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    /// Indexed entity names referenced with call syntax
    pub calls: BTreeSet<String>,
    pub source_path: PathBuf,
}

/// Function name to its outgoing references
///
/// Only functions are keys; classes appear as call targets only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallGraph(BTreeMap<String, CallNode>);

impl CallGraph {
    /// Build the call graph, indexing `units` first
    pub fn build(units: &[ParsedUnit]) -> Self {
        let index = EntityIndex::build(units);
        Self::build_with_index(units, &index)
    }

    /// Build the call graph against an existing index
    ///
    /// Files are re-read from `source_path`; a file that cannot be read is
    /// skipped and contributes no functions.
    pub fn build_with_index(units: &[ParsedUnit], index: &EntityIndex) -> Self {
        let scanned: Vec<(&ParsedUnit, Option<BTreeSet<String>>)> = units
            .par_iter()
            .filter(|unit| unit.is_ok() && !unit.functions.is_empty())
            .map(|unit| (unit, scan_unit(unit, index)))
            .collect();

        let mut graph = BTreeMap::new();
        for (unit, calls) in scanned {
            let Some(calls) = calls else {
                continue;
            };
            for func in &unit.functions {
                graph.insert(
                    func.name.clone(),
                    CallNode {
                        calls: calls.clone(),
                        source_path: unit.source_path.clone(),
                    },
                );
            }
        }
        Self(graph)
    }

    pub fn get(&self, name: &str) -> Option<&CallNode> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Functions in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CallNode)> {
        self.0.iter()
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.0.values().map(|n| n.calls.len()).sum()
    }
}

impl FromIterator<(String, CallNode)> for CallGraph {
    fn from_iter<I: IntoIterator<Item = (String, CallNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Map every function and class name to its last definition site
pub fn build_entity_index(units: &[ParsedUnit]) -> EntityIndex {
    EntityIndex::build(units)
}

/// Build the call graph for `units`
pub fn build_call_graph(units: &[ParsedUnit]) -> CallGraph {
    CallGraph::build(units)
}

/// Read a unit's source and collect the indexed names it calls
fn scan_unit(unit: &ParsedUnit, index: &EntityIndex) -> Option<BTreeSet<String>> {
    match std::fs::read_to_string(&unit.source_path) {
        Ok(source) => Some(
            call_sites(&source)
                .into_iter()
                .filter(|name| index.contains(name))
                .collect(),
        ),
        Err(e) => {
            tracing::warn!(
                "skipping call sites of {}: {}",
                unit.source_path.display(),
                e
            );
            None
        }
    }
}

fn call_site_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Group 1 marks a line-leading declaration (`def f(` / `class C(`),
        // group 2 is the name
        Regex::new(r"(?m)(?:^[ \t]*(?:async[ \t]+)?(def|class)\s+)?\b([^\W\d]\w*)\s*\(")
            .expect("call-site pattern is valid")
    })
}

/// Every identifier written with call syntax, declarations excluded
pub fn call_sites(source: &str) -> BTreeSet<String> {
    call_site_pattern()
        .captures_iter(source)
        .filter(|c| c.get(1).is_none())
        .filter_map(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ClassEntity, FunctionEntity};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn unit_with(path: &Path, functions: &[(&str, usize)], classes: &[&str]) -> ParsedUnit {
        let mut unit = ParsedUnit::new(path);
        for (name, line) in functions {
            unit.functions.push(FunctionEntity::new(name, *line));
        }
        for name in classes {
            unit.classes.push(ClassEntity::new(name, 1));
        }
        unit
    }

    fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        path
    }

    fn calls(graph: &CallGraph, name: &str) -> Vec<String> {
        graph.get(name).unwrap().calls.iter().cloned().collect()
    }

    #[test]
    fn test_call_sites() {
        let found = call_sites("def run(x):\n    helper (x)\n    obj.method()\n    return Model(1)\n");
        let found: Vec<&str> = found.iter().map(|s| s.as_str()).collect();
        assert_eq!(found, vec!["Model", "helper", "method"]);
    }

    #[test]
    fn test_call_sites_skip_declarations() {
        let found = call_sites("class Widget(Base):\n    async def draw(self): pass\n");
        assert!(found.is_empty());
    }

    #[test]
    fn test_call_sites_keep_prose_after_keywords() {
        let found = call_sites("# the class helper(x) is reused
x = \"def build(\"\n");
        assert!(found.contains("helper"));
        assert!(found.contains("build"));
    }

    #[test]
    fn test_call_sites_need_word_boundary() {
        let found = call_sites("my_helper()\nundef foo()\n");
        assert!(found.contains("my_helper"));
        assert!(found.contains("foo"));
        assert!(!found.contains("helper"));
    }

    #[test]
    fn test_index_last_write_wins() {
        let first = unit_with(Path::new("a.py"), &[("f", 1)], &[]);
        let second = unit_with(Path::new("b.py"), &[("f", 7)], &[]);

        let index = EntityIndex::build(&[first.clone(), second.clone()]);
        let entry = index.get("f").unwrap();
        assert_eq!(entry.source_path, PathBuf::from("b.py"));
        assert_eq!(entry.line_start, 7);

        let index = EntityIndex::build(&[second, first]);
        assert_eq!(index.get("f").unwrap().source_path, PathBuf::from("a.py"));
    }

    #[test]
    fn test_index_class_overrides_function_in_same_unit() {
        let unit = unit_with(Path::new("a.py"), &[("Thing", 1)], &["Thing"]);
        let index = EntityIndex::build(&[unit]);
        assert_eq!(index.get("Thing").unwrap().kind, EntityKind::Class);
    }

    #[test]
    fn test_index_skips_failed_units() {
        let mut unit = unit_with(Path::new("a.py"), &[("f", 1)], &[]);
        unit.parse_error = Some("syntax error at line 1, column 1".to_string());
        assert!(EntityIndex::build(&[unit]).is_empty());
    }

    #[test]
    fn test_two_file_example() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def foo(): bar()");
        let b = write(&dir, "b.py", "def bar(): pass");
        let units = vec![
            unit_with(&a, &[("foo", 1)], &[]),
            unit_with(&b, &[("bar", 1)], &[]),
        ];

        let index = EntityIndex::build(&units);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("foo").unwrap().source_path, a);
        assert_eq!(index.get("bar").unwrap().source_path, b);

        let graph = CallGraph::build(&units);
        assert_eq!(graph.len(), 2);
        assert_eq!(calls(&graph, "foo"), vec!["bar"]);
        assert!(calls(&graph, "bar").is_empty());
        assert_eq!(graph.get("foo").unwrap().source_path, a);
    }

    #[test]
    fn test_matches_in_comments_and_strings_count() {
        let dir = TempDir::new().unwrap();
        let a = write(
            &dir,
            "a.py",
            "def caller():\n    # helper(1) is disabled\n    return \"see cleanup()\"\n",
        );
        let b = write(&dir, "b.py", "def helper(): pass\ndef cleanup(): pass\n");
        let units = vec![
            unit_with(&a, &[("caller", 1)], &[]),
            unit_with(&b, &[("helper", 1), ("cleanup", 2)], &[]),
        ];

        let graph = CallGraph::build(&units);
        assert_eq!(calls(&graph, "caller"), vec!["cleanup", "helper"]);
    }

    #[test]
    fn test_recursion_gives_self_edge() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def walk(n):\n    return walk(n - 1)\n");
        let graph = CallGraph::build(&[unit_with(&a, &[("walk", 1)], &[])]);
        assert_eq!(calls(&graph, "walk"), vec!["walk"]);
    }

    #[test]
    fn test_class_targets_are_not_keys() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "class Repo: pass\ndef make(): return Repo()\n");
        let graph = CallGraph::build(&[unit_with(&a, &[("make", 2)], &["Repo"])]);

        assert_eq!(calls(&graph, "make"), vec!["Repo"]);
        assert!(!graph.contains("Repo"));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def main():\n    print(len(sys.argv))\n");
        let graph = CallGraph::build(&[unit_with(&a, &[("main", 1)], &[])]);
        assert!(calls(&graph, "main").is_empty());
    }

    #[test]
    fn test_functions_in_one_file_share_call_sites() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def one(): two()\ndef two(): pass\n");
        let graph = CallGraph::build(&[unit_with(&a, &[("one", 1), ("two", 2)], &[])]);
        assert_eq!(calls(&graph, "one"), vec!["two"]);
        assert_eq!(calls(&graph, "two"), vec!["two"]);
    }

    #[test]
    fn test_unreadable_unit_is_skipped() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def foo(): gone()");
        let missing = dir.path().join("gone.py");
        let units = vec![
            unit_with(&a, &[("foo", 1)], &[]),
            unit_with(&missing, &[("gone", 1)], &[]),
        ];

        let graph = CallGraph::build(&units);
        // Still indexed, so foo's reference resolves, but gone has no node
        assert_eq!(calls(&graph, "foo"), vec!["gone"]);
        assert!(!graph.contains("gone"));
    }

    #[test]
    fn test_empty_input() {
        let graph = CallGraph::build(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edge_targets_exist_in_index() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def a(): b(); C(); c(); os.path.join()\n");
        let b = write(&dir, "b.py", "def b(): a()\nclass C: pass\n");
        let units = vec![
            unit_with(&a, &[("a", 1)], &[]),
            unit_with(&b, &[("b", 1)], &["C"]),
        ];
        let index = EntityIndex::build(&units);
        let graph = CallGraph::build_with_index(&units, &index);

        for (_, node) in graph.iter() {
            for target in &node.calls {
                assert!(index.contains(target));
            }
        }
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_free_functions_match_methods() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.py", "def foo():\n    bar()\n\ndef bar():\n    pass\n");
        let units = vec![unit_with(&a, &[("foo", 1), ("bar", 4)], &[])];

        assert_eq!(build_entity_index(&units), EntityIndex::build(&units));
        assert_eq!(build_call_graph(&units), CallGraph::build(&units));
    }
}

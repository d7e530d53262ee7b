//! MTROBDD to DOT (Graphviz) conversion.
//!
//! The generated DOT output follows these conventions:
//! - **Root names** are rendered as circles in the first rank
//! - **Inner nodes** are rendered as boxes, one rank per variable level
//! - **Terminal nodes** are rendered as double circles in the last rank;
//!   the sink terminal is labeled `sink`
//! - **Edges** are labeled with the bit they stand for: dashed `0` for low
//!   edges, solid `1` for high edges
//!
//! # Examples
//!
//! ```
//! use mtbdd_bridge::mtrobdd::MtRobdd;
//!
//! let mut bdd = MtRobdd::new(2);
//! bdd.insert_path(0, &[true, false], 1);
//!
//! let dot = bdd.to_dot().unwrap();
//! assert!(dot.starts_with("digraph MtRobdd {"));
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::mtrobdd::MtRobdd;
use crate::node::{Node, NodeId};
use crate::types::{Value, SINK_VALUE};

/// Configuration options for DOT output generation.
///
/// Use `DotConfig::default()` for standard settings.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for root name nodes (default: "circle")
    pub root_shape: &'static str,
    /// Shape for inner nodes (default: "box")
    pub node_shape: &'static str,
    /// Shape for terminal nodes (default: "doublecircle")
    pub terminal_shape: &'static str,
    /// Style for high edges (default: "solid")
    pub high_edge_style: &'static str,
    /// Style for low edges (default: "dashed")
    pub low_edge_style: &'static str,
    /// Graph rank direction (default: "LR")
    pub rankdir: &'static str,
    /// Whether to use HTML labels for subscripts (default: false)
    pub use_html_labels: bool,
    /// Terminal value shown as `sink` (default: [`SINK_VALUE`])
    pub sink_value: Option<Value>,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            root_shape: "circle",
            node_shape: "box",
            terminal_shape: "doublecircle",
            high_edge_style: "solid",
            low_edge_style: "dashed",
            rankdir: "LR",
            use_html_labels: false,
            sink_value: Some(SINK_VALUE),
        }
    }
}

impl DotConfig {
    fn value_label(&self, value: Value) -> String {
        if self.sink_value == Some(value) {
            "sink".to_string()
        } else {
            value.to_string()
        }
    }
}

impl MtRobdd {
    /// Converts the whole diagram to DOT format.
    ///
    /// Every live node is shown, together with one extra node per root name
    /// pointing at its root.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the whole diagram to DOT format with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use mtbdd_bridge::dot::DotConfig;
    /// use mtbdd_bridge::mtrobdd::MtRobdd;
    ///
    /// let mut bdd = MtRobdd::new(1);
    /// bdd.insert_path(0, &[true], 1);
    /// bdd.make_complete(3, false);
    ///
    /// let config = DotConfig {
    ///     sink_value: Some(3),
    ///     ..DotConfig::default()
    /// };
    /// let dot = bdd.to_dot_with_config(&config).unwrap();
    /// assert!(dot.contains("label=\"sink\""));
    /// ```
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph MtRobdd {{")?;
        writeln!(dot, "  rankdir={};", config.rankdir)?;

        // Root names
        writeln!(dot, "  node [shape={}];", config.root_shape)?;
        writeln!(dot, "  {{ rank=source;")?;
        for (name, _) in self.roots() {
            writeln!(dot, "    r{} [label=\"{}\"];", name, config.value_label(name))?;
        }
        writeln!(dot, "  }}")?;

        // Group nodes by level for proper ranking
        let mut levels = BTreeMap::<usize, Vec<NodeId>>::new();
        let mut terminals = Vec::new();
        for (id, node) in self.nodes() {
            match node.level() {
                Some(level) => levels.entry(level.index()).or_default().push(id),
                None => terminals.push(id),
            }
        }

        writeln!(dot, "  node [shape={}];", config.node_shape)?;
        for (level, ids) in levels.iter() {
            writeln!(dot, "  // Level {}", level)?;
            writeln!(dot, "  {{ rank=same;")?;
            for &id in ids.iter() {
                let label = if config.use_html_labels {
                    format!("<x<SUB>{}</SUB>>", level)
                } else {
                    format!("\"x{}\"", level)
                };
                writeln!(dot, "    n{} [label={}];", id.index(), label)?;
            }
            writeln!(dot, "  }}")?;
        }

        writeln!(dot, "  node [shape={}];", config.terminal_shape)?;
        writeln!(dot, "  {{ rank=sink;")?;
        for &id in terminals.iter() {
            if let Node::Terminal { value } = *self.node(id) {
                writeln!(dot, "    n{} [label=\"{}\"];", id.index(), config.value_label(value))?;
            }
        }
        writeln!(dot, "  }}")?;

        // Edges from root names into the diagram
        for (name, root) in self.roots() {
            writeln!(dot, "  r{} -> n{};", name, root.index())?;
        }

        // Edges between nodes
        for (id, node) in self.nodes() {
            if let Some(low) = node.low() {
                writeln!(
                    dot,
                    "  n{} -> n{} [label=\"0\", style={}];",
                    id.index(),
                    low.index(),
                    config.low_edge_style
                )?;
            }
            if let Some(high) = node.high() {
                writeln!(
                    dot,
                    "  n{} -> n{} [label=\"1\", style={}];",
                    id.index(),
                    high.index(),
                    config.high_edge_style
                )?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }

    /// Writes the DOT representation into `writer`.
    pub fn write_dot<W: io::Write>(&self, mut writer: W, config: &DotConfig) -> io::Result<()> {
        let dot = self
            .to_dot_with_config(config)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writer.write_all(dot.as_bytes())?;
        writer.flush()
    }

    /// Saves the DOT representation into the file at `path`.
    pub fn save_as_dot(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_dot(BufWriter::new(file), &DotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> MtRobdd {
        let mut bdd = MtRobdd::new(2);
        bdd.insert_path(0, &[false, false], 1);
        bdd.insert_path(0, &[true, true], 0);
        bdd.trim().remove_redundant_tests().make_complete(SINK_VALUE, true);
        bdd
    }

    /// Basic test: verify DOT output is generated without errors
    #[test]
    fn test_to_dot_basic() {
        let bdd = example();
        let dot = bdd.to_dot().unwrap();

        assert!(dot.starts_with("digraph MtRobdd {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("label=\"sink\""));
        assert!(dot.contains("// Level 0"));
        assert!(dot.contains("// Level 1"));
    }

    /// Every edge of the diagram shows up with its bit label
    #[test]
    fn test_to_dot_edges() {
        let bdd = example();
        let dot = bdd.to_dot().unwrap();

        let edges = bdd.nodes().map(|(_, node)| node.children().count()).sum::<usize>();
        let labeled = dot.matches("[label=\"0\", style").count() + dot.matches("[label=\"1\", style").count();
        assert_eq!(edges, labeled);

        for (name, root) in bdd.roots() {
            assert!(dot.contains(&format!("r{} -> n{};", name, root.index())));
        }
    }

    /// Test with custom configuration
    #[test]
    fn test_to_dot_with_config() {
        let bdd = example();
        let config = DotConfig {
            use_html_labels: true,
            rankdir: "TB",
            ..DotConfig::default()
        };

        let dot = bdd.to_dot_with_config(&config).unwrap();
        assert!(dot.contains("rankdir=TB;"));
        assert!(dot.contains("<x<SUB>0</SUB>>"));
    }

    #[test]
    fn test_write_dot_to_buffer() {
        let bdd = example();
        let mut buffer = Vec::new();
        bdd.write_dot(&mut buffer, &DotConfig::default()).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), bdd.to_dot().unwrap());
    }

    /// Helper test to write DOT file for manual inspection (disabled by default)
    #[test]
    #[ignore]
    fn test_write_dot_file() {
        let bdd = example();
        bdd.save_as_dot("test_output.dot").unwrap();
        println!("DOT output:\n{}", bdd.to_dot().unwrap());
    }
}

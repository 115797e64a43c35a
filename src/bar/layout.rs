//! Module tree of a bar: sections, nested groups and their orientation

use serde_json::Value;
use std::fmt;
use tracing::warn;

use super::config::BarConfig;
use super::group::GroupRef;
use super::position::Orientation;
use crate::constants::sections;
use crate::json::json_get_to;

/// How a group lays out its children relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrientation {
    #[default]
    Inherit,
    Horizontal,
    Vertical,
    Orthogonal,
}

impl GroupOrientation {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "inherit" => Some(Self::Inherit),
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            "orthogonal" => Some(Self::Orthogonal),
            _ => None,
        }
    }

    pub fn resolve(&self, parent: Orientation) -> Orientation {
        match self {
            Self::Inherit => parent,
            Self::Horizontal => Orientation::Horizontal,
            Self::Vertical => Orientation::Vertical,
            Self::Orthogonal => parent.flipped(),
        }
    }
}

crate::from_json_by_name!(GroupOrientation);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleNode {
    Module {
        /// Reference as listed, `#class` suffix included
        name: String,
    },
    Group {
        reference: String,
        id: String,
        class_name: Option<String>,
        orientation: Orientation,
        children: Vec<ModuleNode>,
    },
}

/// Resolved modules for the three sections, in render order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTree {
    pub left: Vec<ModuleNode>,
    pub center: Vec<ModuleNode>,
    pub right: Vec<ModuleNode>,
}

impl ModuleTree {
    /// Build the tree for a bar laid out with `orientation`.
    /// Group references that point back at an enclosing group are dropped.
    pub fn resolve(config: &BarConfig, orientation: Orientation) -> Self {
        let mut stack = Vec::new();
        let mut build = |section| build_nodes(config, section, orientation, &mut stack);
        Self {
            left: build(sections::LEFT),
            center: build(sections::CENTER),
            right: build(sections::RIGHT),
        }
    }

    pub fn section(&self, section: &str) -> &[ModuleNode] {
        match section {
            sections::LEFT => &self.left,
            sections::CENTER => &self.center,
            sections::RIGHT => &self.right,
            _ => &[],
        }
    }

    /// Every plain module reference, depth first
    pub fn modules(&self) -> Vec<&str> {
        fn walk<'a>(nodes: &'a [ModuleNode], out: &mut Vec<&'a str>) {
            for node in nodes {
                match node {
                    ModuleNode::Module { name } => out.push(name),
                    ModuleNode::Group { children, .. } => walk(children, out),
                }
            }
        }

        let mut out = Vec::new();
        for section in sections::ALL {
            walk(self.section(section), &mut out);
        }
        out
    }
}

fn build_nodes<'a>(
    config: &'a BarConfig,
    list: &str,
    parent: Orientation,
    stack: &mut Vec<&'a str>,
) -> Vec<ModuleNode> {
    let mut nodes = Vec::new();
    for reference in config.get_module_list(list) {
        let Some(group) = GroupRef::parse(reference) else {
            nodes.push(ModuleNode::Module { name: reference.to_string() });
            continue;
        };

        if stack.contains(&reference) {
            warn!(group = %reference, parent = %list, "Group includes itself, skipping");
            continue;
        }

        let group_config: &Value = config.get_module_config(reference);
        let mut orientation = GroupOrientation::default();
        json_get_to(&group_config["orientation"], &mut orientation);
        let orientation = orientation.resolve(parent);

        stack.push(reference);
        let children = build_nodes(config, reference, orientation, stack);
        stack.pop();

        nodes.push(ModuleNode::Group {
            reference: reference.to_string(),
            id: group.id.to_string(),
            class_name: group.class_name.map(str::to_owned),
            orientation,
            children,
        });
    }
    nodes
}

impl fmt::Display for ModuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[ModuleNode], depth: usize) -> fmt::Result {
            for node in nodes {
                let indent = "  ".repeat(depth);
                match node {
                    ModuleNode::Module { name } => writeln!(f, "{indent}{name}")?,
                    ModuleNode::Group { reference, orientation, children, .. } => {
                        writeln!(f, "{indent}{reference} [{orientation}]")?;
                        write_nodes(f, children, depth + 1)?;
                    }
                }
            }
            Ok(())
        }

        for section in sections::ALL {
            writeln!(f, "{section}:")?;
            write_nodes(f, self.section(section), 1)?;
        }
        Ok(())
    }
}

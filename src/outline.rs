//! A text tree of a document, for logs and the command line.
//!
//! ```text
//! route #route-1
//! └── from: from #from-1 timer:tick
//!     ├── log #log-1 tick
//!     └── to #to-1 direct:audit
//! ```
use crate::catalog::Catalog;
use crate::model::{Document, Node};
use std::fmt;

const SUMMARY_KEYS: &[&str] = &["uri", "message", "name", "expression", "path", "to", "ref"];

/// Formats a document as a tree. Slots other than `steps` are shown as a
/// `slot:` prefix on the child line.
pub struct DisplayDocument<'a> {
    pub doc: &'a Document,
    pub catalog: &'a Catalog,
}

impl<'a> DisplayDocument<'a> {
    pub fn new(doc: &'a Document, catalog: &'a Catalog) -> Self {
        Self { doc, catalog }
    }

    fn fmt_node(
        &self,
        node: &Node,
        slot: Option<&str>,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
        is_root: bool,
    ) -> fmt::Result {
        let child_prefix = if is_root {
            String::new()
        } else {
            let node_marker = if is_last { "└── " } else { "├── " };
            write!(f, "{}{}", prefix, node_marker)?;
            format!("{}{}", prefix, if is_last { "    " } else { "│   " })
        };

        if let Some(slot) = slot.filter(|s| *s != "steps") {
            write!(f, "{}: ", slot)?;
        }
        let name = self
            .catalog
            .descriptor(node.type_tag())
            .map(|d| d.dsl_name.as_str())
            .unwrap_or(node.type_tag());
        write!(f, "{} #{}", name, node.id())?;
        if let Some(summary) = SUMMARY_KEYS
            .iter()
            .find_map(|k| node.get(k).filter(|v| v.is_scalar() || v.as_expression().is_some()))
        {
            write!(f, " {}", summary)?;
        }
        writeln!(f)?;

        let children: Vec<(&str, &Node)> = node.children().collect();
        let count = children.len();
        for (i, (slot, child)) in children.into_iter().enumerate() {
            self.fmt_node(child, Some(slot), f, &child_prefix, i + 1 == count, false)?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.doc.is_empty() {
            return writeln!(f, "(empty document)");
        }
        for root in self.doc.flows() {
            self.fmt_node(root, None, f, "", true, true)?;
        }
        Ok(())
    }
}

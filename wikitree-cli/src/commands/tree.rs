//! Print the resolved navigation tree.

use anyhow::{Context, Result};
use wikitree_core::{Config, NodeId, SiteTree};

pub fn print_tree(config: &Config) -> Result<()> {
    let tree = SiteTree::build(config.source_dir(), &config.tree_options())
        .context("Failed to resolve site tree")?;
    print!("{}", render_tree(&tree));
    Ok(())
}

fn render_tree(tree: &SiteTree) -> String {
    let mut out = String::new();
    render_node(tree, tree.root(), 0, &mut out);
    for draft in tree.drafts() {
        out.push_str(&format!("draft: {}\n", draft.display()));
    }
    out
}

fn render_node(tree: &SiteTree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    let mut line = format!("{}{}  {}", "  ".repeat(depth), node.name, node.url);
    if node.needs_auto_index {
        line.push_str("  [auto-index]");
    }
    if let Some(adopted) = node.adopted {
        line.push_str(&format!("  [page: {}]", tree.node(adopted).source.display()));
    }
    out.push_str(&line);
    out.push('\n');

    for &child in tree.children(id) {
        render_node(tree, child, depth + 1, out);
    }
}

//! Parse command - validate a DepSet and print its canonical form.

use anyhow::Result;
use clap::Args;
use pox_depset::{BoolOp, Element, Node};

use super::{dispatch, parse_input, InputArgs, LeafCommand, Session};

#[derive(Args, Debug)]
pub struct ParseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the tree one node per line instead of the canonical form
    #[arg(short = 't', long)]
    pub tree: bool,
}

struct Parse {
    tree: bool,
}

impl LeafCommand for Parse {
    fn run<T: Element>(&self, session: &Session) -> Result<()> {
        let depset = parse_input::<T>(session)?;
        if self.tree {
            let mut lines = Vec::new();
            render_tree(depset.restrictions(), 0, &mut lines);
            for line in lines {
                println!("{}", line);
            }
        } else {
            println!("{}", depset);
        }
        Ok(())
    }
}

pub fn execute(args: ParseArgs) -> Result<()> {
    let kind = args.input.kind;
    let session = args.input.prepare()?;
    dispatch(kind, &Parse { tree: args.tree }, &session)
}

fn render_tree<T: Element>(nodes: &[Node<T>], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let opener = match node {
            Node::Leaf(leaf) => {
                lines.push(format!("{}{}", indent, leaf));
                continue;
            }
            Node::Group(group) if group.op() == BoolOp::And => "(".to_string(),
            Node::Group(group) => format!("{} (", group.op()),
            Node::Conditional(cond) => format!("{} (", cond.restriction()),
        };
        lines.push(format!("{}{}", indent, opener));
        render_tree(node.children(), depth + 1, lines);
        lines.push(format!("{})", indent));
    }
}

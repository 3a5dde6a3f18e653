use super::{Edge, Manager};
use std::collections::HashSet;
use std::io::Write;

/// Write the BDD rooted at `root` to `output` as a Graphviz dot graph.
/// Decision nodes are labeled with `var_names`; a complemented child edge is
/// drawn in red, matching the usual complement-edge convention.
pub fn print_bdd_as_dot(
    output: &mut dyn Write,
    manager: &Manager,
    root: Edge,
    var_names: &[String],
) -> Result<(), std::io::Error> {
    output.write_all(b"digraph G {\n")?;
    output.write_all(b"init__ [label=\"\", style=invis, height=0, width=0];\n")?;
    let root_node = manager.regular(root);
    output.write_all(
        format!(
            "init__ -> n{}{};\n",
            root_node.0,
            if manager.is_complemented(root) {
                " [style=dashed]"
            } else {
                ""
            }
        )
        .as_bytes(),
    )?;

    if manager.is_constant(root_node) {
        output.write_all(b"n0 [shape=box, label=\"1\", style=filled, height=0.3, width=0.3];\n")?;
        output.write_all(b"}\n")?;
        return Result::Ok(());
    }

    // DFS over the reachable node set; dot does not care about emission order.
    let mut seen: HashSet<Edge> = HashSet::new();
    let mut stack: Vec<Edge> = vec![root_node];
    while let Some(n) = stack.pop() {
        if !seen.insert(n) {
            continue;
        }
        let label = var_names
            .get(manager.var(n) as usize)
            .cloned()
            .unwrap_or_else(|| manager.var(n).to_string());
        output.write_all(format!("n{}[label=\"{}\"];\n", n.0, label).as_bytes())?;

        let hi = manager.hi(n);
        let hi_node = manager.regular(hi);
        let hi_target = if manager.is_constant(hi_node) {
            "n0".to_string()
        } else {
            format!("n{}", hi_node.0)
        };
        output.write_all(
            format!(
                "n{} -> {} [style=filled{}];\n",
                n.0,
                hi_target,
                if manager.is_complemented(hi) { ",color=red" } else { "" }
            )
            .as_bytes(),
        )?;

        let lo = manager.lo(n);
        let lo_node = manager.regular(lo);
        let lo_target = if manager.is_constant(lo_node) {
            "n0".to_string()
        } else {
            format!("n{}", lo_node.0)
        };
        output.write_all(
            format!(
                "n{} -> {} [style=dotted{}];\n",
                n.0,
                lo_target,
                if manager.is_complemented(lo) { ",color=red" } else { "" }
            )
            .as_bytes(),
        )?;

        if !manager.is_constant(hi_node) {
            stack.push(hi_node);
        }
        if !manager.is_constant(lo_node) {
            stack.push(lo_node);
        }
    }

    output.write_all(b"n0 [shape=box, label=\"1\", style=filled, height=0.3, width=0.3];\n")?;
    output.write_all(b"}\n")?;
    Result::Ok(())
}

//! Renders the operation DAG with graphviz. This is strictly for debugging.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::LV;
use crate::list::ListOpLog;
use crate::list::operation::ListOpKind;

#[derive(Debug, Clone, Copy)]
#[allow(unused)]
pub enum DotColor {
    Red, Green, Blue, Grey, Black
}

impl DotColor {
    fn to_string(self) -> String {
        match self {
            DotColor::Red => "red".into(),
            DotColor::Green => "\"#98ea79\"".into(),
            DotColor::Blue => "\"#84a7e8\"".into(),
            DotColor::Grey => "\"#eeeeee\"".into(),
            DotColor::Black => "black".into(),
        }
    }
}

impl ListOpLog {
    /// One node per operation, with edges pointing from each op up to its
    /// parents. Ops with multiple parents are folded through a little
    /// synthetic merge node so the merge reads at a glance.
    pub fn to_dot_graph(&self) -> String {
        let mut merges_touched = HashSet::new();

        fn key_for_parents(p: &[LV]) -> String {
            p.iter().map(|t| format!("{t}"))
                .collect::<Vec<_>>().join("0")
        }

        let mut out = String::new();
        out.push_str("strict digraph {\n");
        out.push_str("\trankdir=\"BT\"\n");
        out.push_str("\tlabelloc=\"t\"\n");
        out.push_str("\tnode [shape=box style=filled]\n");
        out.push_str("\tedge [color=\"#333333\" dir=none]\n");

        writeln!(&mut out, "\tROOT [fillcolor={} label=<ROOT>]", DotColor::Red.to_string()).unwrap();
        for (lv, op) in self.ops.iter().enumerate() {
            let parents = self.cg.parents_at(lv);

            let parent_item = match parents.len() {
                0 => "ROOT".to_string(),
                1 => format!("{}", parents[0]),
                _ => {
                    let key = key_for_parents(parents);
                    if merges_touched.insert(key.clone()) {
                        // Emit the merge item.
                        writeln!(&mut out, "\t{key} [fillcolor={} label=\"\" shape=point]", DotColor::Blue.to_string()).unwrap();
                        for &p in parents.iter() {
                            writeln!(&mut out, "\t{key} -> {} [label={} color={}]", p, p, DotColor::Blue.to_string()).unwrap();
                        }
                    }

                    key
                }
            };

            let label = match op.kind {
                ListOpKind::Ins => format!("{} (INS '{}' at {})", lv, op.content.unwrap(), op.pos),
                ListOpKind::Del => format!("{} (DEL {})", lv, op.pos),
            };
            writeln!(&mut out, "\t{} [label=<{}>]", lv, label).unwrap();
            writeln!(&mut out, "\t{} -> {}", lv, parent_item).unwrap();
        }

        out.push_str("}\n");

        out
    }

    pub fn generate_dot_svg(&self, out_filename: &Path) {
        render_dot_string(self.to_dot_graph(), out_filename);
    }
}

fn render_dot_string(dot_content: String, out_filename: &Path) {
    let out_file = File::create(out_filename).expect("Could not create output file");
    let mut child = Command::new("dot")
        .arg("-Tsvg")
        .stdin(Stdio::piped())
        .stdout(out_file)
        .stderr(Stdio::piped())
        .spawn()
        .expect("Could not run dot");

    let mut stdin = child.stdin.take().unwrap();
    // Spawn is needed here to prevent a potential deadlock. See:
    // https://doc.rust-lang.org/std/process/index.html#handling-io
    std::thread::spawn(move || {
        stdin.write_all(dot_content.as_bytes()).unwrap();
    });

    let out = child.wait_with_output().unwrap();
    std::io::stderr().write_all(&out.stderr).unwrap();

    println!("Wrote DOT output to {}", out_filename.display());
}

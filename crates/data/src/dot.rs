//! Whole-graph export in Graphviz DOT notation.
//!
//! Every generation is emitted as a `rank=same` row where each union is an
//! invisible node chained between its principals. Below it sits a second row
//! of invisible helper nodes, one per child, so that `dot` draws a sibling
//! bus under each couple.

use crate::generations::Generations;
use crate::graph::FamilyGraph;
use crate::model::{Gender, Person, Union, UnionId};
use std::fmt::{self, Write};

const INVISIBLE: &str = r#"[shape=circle,label="",height=0.01,width=0.01]"#;

impl FamilyGraph {
    pub fn to_dot(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        write_dot(&mut out, self, &self.generations())?;
        Ok(out)
    }
}

pub fn write_dot(
    out: &mut impl Write,
    graph: &FamilyGraph,
    generations: &Generations,
) -> fmt::Result {
    writeln!(out, "digraph {{")?;
    writeln!(out, "\tnode [shape=box];")?;
    writeln!(out, "\tedge [dir=none];")?;
    writeln!(out, "\tgraph [splines=ortho];")?;

    for person in graph.people() {
        writeln!(out, "\t{};", person_node(person))?;
    }
    writeln!(out)?;

    for bucket in generations.buckets() {
        let unions = unions_of(graph, bucket.iter().filter_map(|&id| graph.get_person(id)));
        write_generation(out, &unions)?;
    }

    write!(out, "}}")
}

fn person_node(person: &Person) -> String {
    let (shape, color) = match person.gender {
        Gender::Male => ("square", "cornflowerblue"),
        Gender::Female | Gender::Unknown => ("ellipse", "lightcoral"),
    };
    format!(
        "{}[label=\"{}\",style=filled,shape={shape},fillcolor={color},color={color}]",
        person.id,
        escape(person.label())
    )
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Unions of the given people, each listed once, in the order first met
fn unions_of<'g>(graph: &'g FamilyGraph, people: impl Iterator<Item = &'g Person>) -> Vec<&'g Union> {
    let mut seen: Vec<UnionId> = Vec::new();
    let mut unions = Vec::new();
    for person in people {
        for &id in person.unions() {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            if let Some(union) = graph.union(id) {
                unions.push(union);
            }
        }
    }
    unions
}

fn write_generation(out: &mut impl Write, unions: &[&Union]) -> fmt::Result {
    // Principals with their union node between them
    writeln!(out, "\t{{ rank=same;")?;
    for union in unions {
        writeln!(
            out,
            "\t\t{} -> {} -> {};",
            union.principal1, union.id, union.principal2
        )?;
        writeln!(out, "\t\t{}{INVISIBLE};", union.id)?;
    }
    writeln!(out, "\t}}")?;

    // One helper per child, chained left to right
    writeln!(out, "\t{{ rank=same;")?;
    for union in unions.iter().filter(|u| !u.children.is_empty()) {
        let chain = (0..union.children.len())
            .map(|i| format!("{}_{i}", union.id))
            .collect::<Vec<_>>()
            .join(" -> ");
        writeln!(out, "\t\t{chain};")?;
        for i in 0..union.children.len() {
            writeln!(out, "\t\t{}_{i}{INVISIBLE};", union.id)?;
        }
    }
    writeln!(out, "\t}}")?;

    for union in unions.iter().filter(|u| !u.children.is_empty()) {
        let middle = union.children.len() / 2;
        writeln!(out, "\t\t{id} -> {id}_{middle};", id = union.id)?;
        for (i, child) in union.children.iter().enumerate() {
            writeln!(out, "\t\t{}_{i} -> {child};", union.id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PersonRecord, UnionRecord};
    use test_log::test;

    fn family() -> FamilyGraph {
        FamilyGraph::from_records(
            [
                PersonRecord::new(1, "Dad", Gender::Male),
                PersonRecord::new(2, "Mom", Gender::Female),
                PersonRecord::new(3, "Me", Gender::Male),
                PersonRecord::new(4, "Sister", Gender::Female),
            ],
            [UnionRecord::new(1, 2, &[3, 4])],
        )
        .unwrap()
    }

    #[test]
    fn people_are_styled_by_gender() {
        let dot = family().to_dot().unwrap();
        assert!(dot.starts_with("digraph {\n\tnode [shape=box];\n\tedge [dir=none];\n"));
        assert!(dot.contains(
            "\t1[label=\"Dad\",style=filled,shape=square,fillcolor=cornflowerblue,color=cornflowerblue];\n"
        ));
        assert!(dot.contains(
            "\t2[label=\"Mom\",style=filled,shape=ellipse,fillcolor=lightcoral,color=lightcoral];\n"
        ));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn unions_get_a_sibling_bus() {
        let dot = family().to_dot().unwrap();
        assert!(dot.contains("\t\t1 -> m0 -> 2;\n"));
        assert!(dot.contains(&format!("\t\tm0{INVISIBLE};\n")));
        assert!(dot.contains("\t\tm0_0 -> m0_1;\n"));
        assert!(dot.contains("\t\tm0 -> m0_1;\n"));
        assert!(dot.contains("\t\tm0_0 -> 3;\n"));
        assert!(dot.contains("\t\tm0_1 -> 4;\n"));
        // The parents' generation is the only one with a union.
        assert_eq!(dot.matches("1 -> m0 -> 2").count(), 1);
    }

    #[test]
    fn labels_are_escaped() {
        let graph = FamilyGraph::from_records(
            [PersonRecord::new(1, "Jo \"JJ\"", Gender::Unknown)],
            [],
        )
        .unwrap();
        assert!(graph.to_dot().unwrap().contains(r#"label="Jo \"JJ\"""#));
    }
}

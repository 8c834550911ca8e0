//! Static description of the decision graph

use serde::Serialize;

use super::{Node, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNodeKind {
    Agent,
    Evaluator,
    Retrieval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub kind: GraphNodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStructure {
    pub total_nodes: usize,
    pub agent_nodes: usize,
    pub evaluator_nodes: usize,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub state_type: &'static str,
}

const START: &str = "[*]";

fn edge(from: impl Into<String>, to: impl Into<String>, label: Option<&'static str>) -> GraphEdge {
    GraphEdge {
        from: from.into(),
        to: to.into(),
        label,
    }
}

/// Nodes and edges of the pipeline, in execution order
pub fn structure() -> GraphStructure {
    let mut nodes = Vec::new();
    let mut edges = vec![edge(START, Node::Stage(Stage::CaptureQuery).name(), None)];

    for stage in Stage::ALL {
        let stage_node = Node::Stage(stage).name();
        nodes.push(GraphNode {
            name: stage_node.clone(),
            kind: GraphNodeKind::Agent,
        });

        let Some(next) = stage.next() else {
            continue;
        };

        if stage == Stage::CaptureQuery {
            edges.push(edge(&stage_node, Node::Stage(next).name(), None));
            continue;
        }

        let evaluator = Node::Evaluator(stage).name();
        nodes.push(GraphNode {
            name: evaluator.clone(),
            kind: GraphNodeKind::Evaluator,
        });
        edges.push(edge(&stage_node, &evaluator, None));
        edges.push(edge(&evaluator, Node::Stage(next).name(), Some("approved")));

        if stage == Stage::IdentifyInformationNeeded {
            let retrieval = Node::RetrieveInformation.name();
            nodes.push(GraphNode {
                name: retrieval.clone(),
                kind: GraphNodeKind::Retrieval,
            });
            edges.push(edge(&evaluator, &retrieval, Some("rejected")));
            edges.push(edge(&retrieval, &stage_node, Some("augmented")));
        } else {
            edges.push(edge(&evaluator, &stage_node, Some("rejected")));
        }
    }

    let result_evaluator = Node::Evaluator(Stage::Result).name();
    nodes.push(GraphNode {
        name: result_evaluator.clone(),
        kind: GraphNodeKind::Evaluator,
    });
    edges.push(edge(Node::Stage(Stage::Result).name(), &result_evaluator, None));
    edges.push(edge(&result_evaluator, Node::Stage(Stage::Result).name(), Some("rejected")));
    edges.push(edge(&result_evaluator, START, Some("approved")));

    let count = |kind| nodes.iter().filter(|n| n.kind == kind).count();
    let agent_nodes = count(GraphNodeKind::Agent) + count(GraphNodeKind::Retrieval);
    let evaluator_nodes = count(GraphNodeKind::Evaluator);

    GraphStructure {
        total_nodes: nodes.len(),
        agent_nodes,
        evaluator_nodes,
        nodes,
        edges,
        state_type: "DecisionState",
    }
}

/// Mermaid state diagram of the pipeline
pub fn mermaid() -> String {
    let mut out = String::from("---\ntitle: decision_graph\n---\nstateDiagram-v2\n");
    for edge in structure().edges {
        match edge.label {
            Some(label) => out.push_str(&format!("  {} --> {}: {}\n", edge.from, edge.to, label)),
            None => out.push_str(&format!("  {} --> {}\n", edge.from, edge.to)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_counts() {
        let graph = structure();
        assert_eq!(graph.evaluator_nodes, 9);
        assert_eq!(graph.agent_nodes, 11);
        assert_eq!(graph.total_nodes, 20);
        assert_eq!(graph.state_type, "DecisionState");
    }

    #[test]
    fn test_every_evaluator_loops_back() {
        let graph = structure();
        for stage in &Stage::ALL[1..] {
            let evaluator = Node::Evaluator(*stage).name();
            assert!(
                graph
                    .edges
                    .iter()
                    .any(|e| e.from == evaluator && e.label == Some("rejected")),
                "{} has no rejection edge",
                evaluator
            );
        }
    }

    #[test]
    fn test_mermaid_output() {
        let diagram = mermaid();
        assert!(diagram.contains("stateDiagram-v2"));
        assert!(diagram.contains("  [*] --> capture_query\n"));
        assert!(diagram.contains(
            "  evaluate_identify_information_needed --> retrieve_information_needed: rejected\n"
        ));
        assert!(diagram.contains("  evaluate_result --> [*]: approved\n"));
    }
}

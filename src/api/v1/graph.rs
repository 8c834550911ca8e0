//! Workflow graph description endpoints

use serde::Serialize;

use crate::api::types::Json;
use crate::domain::workflow::graph::{self, GraphStructure};

#[derive(Debug, Serialize)]
pub struct MermaidResponse {
    pub mermaid: String,
    pub description: &'static str,
}

/// GET /api/v1/graph/mermaid
pub async fn get_mermaid() -> Json<MermaidResponse> {
    Json(MermaidResponse {
        mermaid: graph::mermaid(),
        description: "Decision workflow: each agent is followed by its evaluator; rejected answers loop back",
    })
}

/// GET /api/v1/graph/structure
pub async fn get_structure() -> Json<GraphStructure> {
    Json(graph::structure())
}

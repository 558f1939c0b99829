use vellum_doc::NodeSpec;

use crate::extension::{Extension, SchemaContribution};

/// The document root.
pub struct Doc;

impl Extension for Doc {
    fn name(&self) -> &str {
        "doc"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            content: Some("block+".to_string()),
            ..Default::default()
        }))
    }
}

use vellum_doc::NodeSpec;

use crate::extension::{Extension, SchemaContribution};

/// Plain text leaves. Serialization and parsing of text is handled by
/// the codec state machine itself; this extension only contributes the
/// schema type.
pub struct Text;

impl Extension for Text {
    fn name(&self) -> &str {
        "text"
    }

    fn schema(&self) -> Option<SchemaContribution> {
        Some(SchemaContribution::Node(NodeSpec {
            group: Some("inline".to_string()),
            ..Default::default()
        }))
    }
}

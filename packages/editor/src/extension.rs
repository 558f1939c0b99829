//! The extension model.
//!
//! An extension is a capability bundle, not a class: any type
//! implementing [`Extension`] may contribute a schema type, codec
//! rules, commands, keybindings, input rules, raw plugins, tokenizer
//! rule plugins, or a node-view renderer — in any combination. The
//! extension's kind (node / mark / behavior) is derived from which
//! capabilities are populated, never from type identity.

use std::rc::Rc;
use std::sync::Arc;

use vellum_doc::{MarkSpec, NodeSpec, Plugin, Schema};
use vellum_markdown::{MarkSerializer, NodeSerializerFn, ParseSpec, RulePlugin};

use crate::commands::{Command, InputRule, KeyBinding};
use crate::error::CompositionError;
use crate::node_view::NodeViewRenderer;

/// A named schema contribution: exactly one node type or one mark type.
pub enum SchemaContribution {
    Node(NodeSpec),
    Mark(MarkSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Node,
    Mark,
    Behavior,
}

/// The serialize half of an extension's markdown codec rule.
pub enum MarkdownRule {
    Node(NodeSerializerFn),
    Mark(MarkSerializer),
}

/// Context handed to the schema-dependent capability builders.
pub struct ExtensionContext {
    pub schema: Arc<Schema>,
}

/// The unit of pluggable behavior.
///
/// Every method except `name` is optional; defaults contribute nothing.
pub trait Extension {
    /// Stable identity: schema type key and disable-list key.
    fn name(&self) -> &str;

    /// Construction-time configuration check; failures abort
    /// composition before a view exists.
    fn validate(&self) -> Result<(), CompositionError> {
        Ok(())
    }

    fn schema(&self) -> Option<SchemaContribution> {
        None
    }

    fn commands(&self, _ctx: &ExtensionContext) -> Vec<(String, Command)> {
        Vec::new()
    }

    fn keys(&self, _ctx: &ExtensionContext) -> Vec<KeyBinding> {
        Vec::new()
    }

    fn input_rules(&self, _ctx: &ExtensionContext) -> Vec<InputRule> {
        Vec::new()
    }

    fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        Vec::new()
    }

    fn rule_plugins(&self) -> Vec<RulePlugin> {
        Vec::new()
    }

    /// The markdown token this extension's parse rule is keyed by.
    fn markdown_token(&self) -> String {
        self.name().to_string()
    }

    fn to_markdown(&self) -> Option<MarkdownRule> {
        None
    }

    fn parse_markdown(&self) -> Option<ParseSpec> {
        None
    }

    fn node_view(&self) -> Option<NodeViewRenderer> {
        None
    }

    fn kind(&self) -> ExtensionKind {
        match self.schema() {
            Some(SchemaContribution::Node(_)) => ExtensionKind::Node,
            Some(SchemaContribution::Mark(_)) => ExtensionKind::Mark,
            None => ExtensionKind::Behavior,
        }
    }
}

/// Convenience alias for the shared handle extensions are held by.
pub type ExtensionRef = Rc<dyn Extension>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Extension for Plain {
        fn name(&self) -> &str {
            "plain"
        }
    }

    struct WithNode;
    impl Extension for WithNode {
        fn name(&self) -> &str {
            "with_node"
        }
        fn schema(&self) -> Option<SchemaContribution> {
            Some(SchemaContribution::Node(NodeSpec::default()))
        }
    }

    struct WithMark;
    impl Extension for WithMark {
        fn name(&self) -> &str {
            "with_mark"
        }
        fn schema(&self) -> Option<SchemaContribution> {
            Some(SchemaContribution::Mark(MarkSpec::default()))
        }
    }

    #[test]
    fn test_kind_is_derived_from_capabilities() {
        assert_eq!(Plain.kind(), ExtensionKind::Behavior);
        assert_eq!(WithNode.kind(), ExtensionKind::Node);
        assert_eq!(WithMark.kind(), ExtensionKind::Mark);
    }
}

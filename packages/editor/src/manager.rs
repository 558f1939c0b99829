//! The extension composition engine.
//!
//! [`ExtensionManager`] folds an ordered extension list into every
//! composed artifact the editor needs: schema type tables, the plugin
//! and rule-plugin lists, keymaps, input rules, the command table, and
//! the markdown codec. Order is contractual: for conflicting command
//! names and key chords, the later extension in list order wins.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use vellum_doc::{MarkSpec, NodeSpec, Plugin, Schema};
use vellum_markdown::{
    MarkSerializer, MarkdownParser, MarkdownSerializer, NodeSerializerFn, ParseSpec, ParserRules,
    RulePlugin,
};

use crate::commands::{CommandTable, InputRule, KeyBinding};
use crate::error::CompositionError;
use crate::extension::{
    Extension, ExtensionContext, ExtensionKind, MarkdownRule, SchemaContribution,
};
use crate::view::NodeViewFactory;

pub struct ExtensionManager {
    extensions: Vec<Rc<dyn Extension>>,
}

impl ExtensionManager {
    /// Filter out disabled extensions by name, then validate what is
    /// left. Validation failures abort composition.
    pub fn new(
        extensions: Vec<Rc<dyn Extension>>,
        disabled: &[String],
    ) -> Result<Self, CompositionError> {
        let extensions: Vec<Rc<dyn Extension>> = extensions
            .into_iter()
            .filter(|ext| !disabled.iter().any(|name| name == ext.name()))
            .collect();

        for extension in &extensions {
            extension.validate()?;
        }

        Ok(Self { extensions })
    }

    pub fn extensions(&self) -> &[Rc<dyn Extension>] {
        &self.extensions
    }

    /// Node specs in list order. A name contributed twice is a fatal
    /// composition error, never a silent merge.
    pub fn nodes(&self) -> Result<IndexMap<String, NodeSpec>, CompositionError> {
        let mut nodes = IndexMap::new();
        for extension in &self.extensions {
            if let Some(SchemaContribution::Node(spec)) = extension.schema() {
                if nodes.insert(extension.name().to_string(), spec).is_some() {
                    return Err(CompositionError::DuplicateNode(extension.name().to_string()));
                }
            }
        }
        Ok(nodes)
    }

    pub fn marks(&self) -> Result<IndexMap<String, MarkSpec>, CompositionError> {
        let mut marks = IndexMap::new();
        for extension in &self.extensions {
            if let Some(SchemaContribution::Mark(spec)) = extension.schema() {
                if marks.insert(extension.name().to_string(), spec).is_some() {
                    return Err(CompositionError::DuplicateMark(extension.name().to_string()));
                }
            }
        }
        Ok(marks)
    }

    pub fn schema(&self) -> Result<Arc<Schema>, CompositionError> {
        Ok(Arc::new(Schema::new(self.nodes()?, self.marks()?)?))
    }

    /// Every extension's raw plugins, flattened in list order.
    pub fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.plugins())
            .collect()
    }

    /// Every extension's tokenizer rule plugins, flattened in list order.
    pub fn rule_plugins(&self) -> Vec<RulePlugin> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.rule_plugins())
            .collect()
    }

    /// Flat keybinding list in list order; when folded into a chord
    /// map, later entries shadow earlier ones for the same chord.
    pub fn keymaps(&self, ctx: &ExtensionContext) -> Vec<KeyBinding> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.keys(ctx))
            .collect()
    }

    pub fn input_rules(&self, ctx: &ExtensionContext) -> Vec<InputRule> {
        self.extensions
            .iter()
            .flat_map(|extension| extension.input_rules(ctx))
            .collect()
    }

    /// The unified command table. Later extensions overwrite earlier
    /// ones on a name conflict.
    pub fn commands(&self, ctx: &ExtensionContext) -> CommandTable {
        let mut table = CommandTable::new();
        for extension in &self.extensions {
            for (name, command) in extension.commands(ctx) {
                table.insert(name, command);
            }
        }
        table
    }

    /// Markdown serializer from every `to_markdown` contribution,
    /// keyed by extension name.
    pub fn serializer(&self) -> MarkdownSerializer {
        let mut nodes: HashMap<String, NodeSerializerFn> = HashMap::new();
        let mut marks: HashMap<String, MarkSerializer> = HashMap::new();
        for extension in &self.extensions {
            match extension.to_markdown() {
                Some(MarkdownRule::Node(f)) => {
                    nodes.insert(extension.name().to_string(), f);
                }
                Some(MarkdownRule::Mark(m)) => {
                    marks.insert(extension.name().to_string(), m);
                }
                None => {}
            }
        }
        MarkdownSerializer::new(nodes, marks)
    }

    /// Markdown parser wired to every `parse_markdown` contribution,
    /// keyed by markdown token name. `rules` toggles tokenizer
    /// behavior (the paste parser enables `linkify`); `plugins` is the
    /// ordered rule-plugin list to install.
    pub fn parser(
        &self,
        schema: Arc<Schema>,
        rules: Option<ParserRules>,
        plugins: Vec<RulePlugin>,
    ) -> MarkdownParser {
        let mut specs: HashMap<String, ParseSpec> = HashMap::new();
        for extension in &self.extensions {
            if let Some(spec) = extension.parse_markdown() {
                specs.insert(extension.markdown_token(), spec);
            }
        }
        MarkdownParser::new(schema, specs, rules.unwrap_or_default(), plugins)
    }

    /// Node-view factories for every node extension declaring a
    /// renderer, keyed by node type name.
    pub fn node_views(&self) -> HashMap<String, NodeViewFactory> {
        let mut factories = HashMap::new();
        for extension in &self.extensions {
            if extension.kind() != ExtensionKind::Node {
                continue;
            }
            let Some(renderer) = extension.node_view() else {
                continue;
            };
            let inline = match extension.schema() {
                Some(SchemaContribution::Node(spec)) => spec.inline,
                _ => false,
            };
            factories.insert(
                extension.name().to_string(),
                NodeViewFactory { renderer, inline },
            );
        }
        factories
    }
}

//! The rendered-fragment tree owned by node-view bindings.
//!
//! A [`Fragment`] is the framework-neutral stand-in for whatever surface
//! the host actually paints into; the bridge only ever hands the host a
//! tree of these.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Fragment {
    Element {
        tag: String,
        attributes: HashMap<String, String>,
        children: Vec<Fragment>,
    },

    Text {
        content: String,
    },
}

impl Fragment {
    pub fn element(tag: impl Into<String>) -> Self {
        Fragment::Element {
            tag: tag.into(),
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Fragment::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Fragment::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: Fragment) -> Self {
        if let Fragment::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Fragment::Element { tag, .. } => Some(tag),
            Fragment::Text { .. } => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Fragment::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            Fragment::Text { .. } => None,
        }
    }
}

//! TOML render scenarios.
//!
//! ```toml
//! format = "render-cases-v1"
//!
//! [[cases]]
//! id = "text-update"
//!
//! [[cases.steps]]
//! tree = { tag = "div", children = ["Hi"] }
//! expect = ["<root>", "  <div>", "    \"Hi\""]
//! placed = 2
//! ```
//!
//! A step renders `tree`, flushes, and compares the container snapshot with
//! `expect`. The optional counters are checked against the commit summary.

use crate::RENDER_CASES_FORMAT_V1;
use element::{Child, Element, ElementBuilder, Handler, InvalidElementError, PropValue};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
pub struct RenderCaseFile {
    pub format: String,
    pub cases: Vec<RenderCase>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderCase {
    pub id: String,
    pub steps: Vec<RenderStep>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderStep {
    pub tree: NodeSpec,
    pub expect: Vec<String>,
    #[serde(default)]
    pub placed: Option<usize>,
    #[serde(default)]
    pub removed: Option<usize>,
    #[serde(default)]
    pub updated: Option<usize>,
    /// Total attribute and listener calls of the commit.
    #[serde(default)]
    pub patched: Option<usize>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, AttrSpec>,
        /// Event keys (`onClick`); each gets a no-op handler shared across the
        /// steps of one case.
        #[serde(default)]
        listeners: Vec<String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AttrSpec {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&AttrSpec> for PropValue {
    fn from(spec: &AttrSpec) -> Self {
        match spec {
            AttrSpec::Bool(b) => PropValue::Bool(*b),
            AttrSpec::Int(i) => PropValue::Int(*i),
            AttrSpec::Float(f) => PropValue::Float(*f),
            AttrSpec::Str(s) => PropValue::from(s.as_str()),
        }
    }
}

/// Stable handlers per event key, so re-rendering the same listener set does
/// not churn.
#[derive(Default)]
pub struct HandlerPool {
    handlers: HashMap<String, Handler>,
}

impl HandlerPool {
    pub fn get(&mut self, key: &str) -> Handler {
        self.handlers
            .entry(key.to_string())
            .or_insert_with(|| Handler::new(|_| {}))
            .clone()
    }
}

impl NodeSpec {
    pub fn to_element(&self, pool: &mut HandlerPool) -> Result<Element, InvalidElementError> {
        match self {
            NodeSpec::Text(text) => Ok(element::build_text_element(text.as_str())),
            NodeSpec::Element {
                tag,
                attrs,
                listeners,
                children,
            } => {
                let mut builder = ElementBuilder::new(tag.as_str());
                for (key, value) in attrs {
                    builder = builder.prop(key.as_str(), PropValue::from(value));
                }
                for key in listeners {
                    builder = builder.prop(key.as_str(), pool.get(key));
                }
                for child in children {
                    let child = match child {
                        NodeSpec::Text(text) => Child::from(text.as_str()),
                        spec => Child::from(spec.to_element(pool)?),
                    };
                    builder = builder.child(child);
                }
                builder.build()
            }
        }
    }
}

pub fn load_render_cases(path: &Path) -> Vec<RenderCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read render cases {path:?}: {err}"));
    let file: RenderCaseFile = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse render cases {path:?}: {err}"));
    assert_eq!(
        file.format, RENDER_CASES_FORMAT_V1,
        "unsupported render case format in {path:?}"
    );
    let mut seen = std::collections::BTreeSet::new();
    for case in &file.cases {
        assert!(!case.id.trim().is_empty(), "empty case id in {path:?}");
        assert!(seen.insert(case.id.clone()), "duplicate case id '{}' in {path:?}", case.id);
        assert!(!case.steps.is_empty(), "case '{}' has no steps in {path:?}", case.id);
    }
    file.cases
}

use std::fmt;
use std::sync::Arc;

/// Name reported by [`Tag::Text`].
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// Prop key carrying the content of a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Reserved prop key; children are stored out of band in [`Props`].
pub const CHILDREN: &str = "children";

/// Prefix marking a prop key as an event listener (`onClick`).
pub const EVENT_PREFIX: &str = "on";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Host(Arc<str>),
    Text,
}

impl Tag {
    pub fn name(&self) -> &str {
        match self {
            Tag::Host(name) => name,
            Tag::Text => TEXT_ELEMENT,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Tag::Text)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event delivered to a registered listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: Arc<str>,
    pub detail: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Event listener. Two handlers are equal only if they share the same closure
/// allocation; a behaviorally identical closure is still a different handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&Event) + Send + Sync>);

impl Handler {
    pub fn new(f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn same(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Clone, Debug)]
pub enum PropValue {
    Str(Arc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(Handler),
}

impl PropValue {
    /// Change detection used when patching host objects: plain values compare
    /// by value, handlers by identity.
    pub fn same(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.same(b),
            _ => false,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Int(v) => write!(f, "{v}"),
            PropValue::Float(v) => write!(f, "{v}"),
            PropValue::Bool(v) => write!(f, "{v}"),
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Arc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Arc::from(value))
    }
}

impl From<Arc<str>> for PropValue {
    fn from(value: Arc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Handler> for PropValue {
    fn from(value: Handler) -> Self {
        PropValue::Handler(value)
    }
}

/// Any key with the `on` prefix and a non-empty remainder: `onClick`,
/// `onclick` and `online` are event keys, `on` and `id` are not.
pub fn is_event_key(key: &str) -> bool {
    key.strip_prefix(EVENT_PREFIX)
        .is_some_and(|rest| !rest.is_empty())
}

/// Runtime event name for an event key: prefix stripped, remainder lower-cased.
pub fn event_name(key: &str) -> Option<String> {
    if !is_event_key(key) {
        return None;
    }
    Some(key[EVENT_PREFIX.len()..].to_ascii_lowercase())
}

/// Element properties: insertion-ordered attributes plus the child sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attrs: Vec<(Arc<str>, PropValue)>,
    children: Vec<Element>,
}

impl Props {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Props of a synthetic container fiber: children only, no attributes.
    pub fn from_children(children: Vec<Element>) -> Self {
        Self {
            attrs: Vec::new(),
            children,
        }
    }

    pub(crate) fn new(attrs: Vec<(Arc<str>, PropValue)>, children: Vec<Element>) -> Self {
        Self { attrs, children }
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.attrs
            .iter()
            .find(|(name, _)| &**name == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Attributes and listeners in insertion order; `children` is not included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_ref(), value))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

/// Immutable description of one node to render.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: Tag,
    props: Arc<Props>,
}

impl Element {
    pub(crate) fn from_parts(tag: Tag, props: Props) -> Self {
        Self {
            tag,
            props: Arc::new(props),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn props(&self) -> &Arc<Props> {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        self.props.children()
    }

    /// Text content for `TEXT_ELEMENT` nodes.
    pub fn node_value(&self) -> Option<&PropValue> {
        if self.tag.is_text() {
            self.props.get(NODE_VALUE)
        } else {
            None
        }
    }

    /// Number of elements in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Element::subtree_len)
            .sum::<usize>()
    }
}

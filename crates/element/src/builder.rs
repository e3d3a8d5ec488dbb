use crate::error::InvalidElementError;
use crate::types::{
    CHILDREN, Element, Event, Handler, NODE_VALUE, PropValue, Props, TEXT_ELEMENT, Tag,
    is_event_key,
};
use std::sync::Arc;

/// A child argument: either a finished element or a bare value that becomes a
/// text element.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Value(PropValue),
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&Element> for Child {
    fn from(value: &Element) -> Self {
        Child::Element(value.clone())
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Value(value.into())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Value(value.into())
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Value(value.into())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Value(value.into())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Value(value.into())
    }
}

/// `{type: TEXT_ELEMENT, props: {nodeValue: value, children: []}}`
pub fn build_text_element(value: impl Into<PropValue>) -> Element {
    let props = Props::new(vec![(Arc::from(NODE_VALUE), value.into())], Vec::new());
    Element::from_parts(Tag::Text, props)
}

pub fn build_element<K, P, C>(
    tag: &str,
    props: P,
    children: C,
) -> Result<Element, InvalidElementError>
where
    K: Into<Arc<str>>,
    P: IntoIterator<Item = (K, PropValue)>,
    C: IntoIterator,
    C::Item: Into<Child>,
{
    validate_tag(tag)?;

    let mut attrs: Vec<(Arc<str>, PropValue)> = Vec::new();
    for (key, value) in props {
        let key: Arc<str> = key.into();
        validate_prop(&key, &value)?;
        match attrs.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => attrs.push((key, value)),
        }
    }

    let children = children
        .into_iter()
        .map(|child| match Into::<Child>::into(child) {
            Child::Element(element) => Ok(element),
            Child::Value(PropValue::Handler(_)) => Err(InvalidElementError::HandlerOutsideEventKey {
                key: NODE_VALUE.to_string(),
            }),
            Child::Value(value) => Ok(build_text_element(value)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Element::from_parts(
        Tag::Host(Arc::from(tag)),
        Props::new(attrs, children),
    ))
}

fn validate_tag(tag: &str) -> Result<(), InvalidElementError> {
    let Some(first) = tag.chars().next() else {
        return Err(InvalidElementError::EmptyTag);
    };
    if tag == TEXT_ELEMENT {
        return Err(InvalidElementError::ReservedTag);
    }
    let valid_rest = tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
    if !first.is_ascii_alphabetic() || !valid_rest {
        return Err(InvalidElementError::InvalidTagName(tag.to_string()));
    }
    Ok(())
}

fn validate_prop(key: &str, value: &PropValue) -> Result<(), InvalidElementError> {
    if key == CHILDREN {
        return Err(InvalidElementError::ReservedProp(key.to_string()));
    }
    match (is_event_key(key), value.is_handler()) {
        (true, false) => Err(InvalidElementError::EventKeyWithoutHandler {
            key: key.to_string(),
        }),
        (false, true) => Err(InvalidElementError::HandlerOutsideEventKey {
            key: key.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Fluent front end for [`build_element`].
#[derive(Clone, Debug)]
pub struct ElementBuilder {
    tag: String,
    props: Vec<(Arc<str>, PropValue)>,
    children: Vec<Child>,
}

impl ElementBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn prop(mut self, key: impl Into<Arc<str>>, value: impl Into<PropValue>) -> Self {
        self.props.push((key.into(), value.into()));
        self
    }

    pub fn handler(
        self,
        key: impl Into<Arc<str>>,
        f: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Self {
        self.prop(key, Handler::new(f))
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<Element, InvalidElementError> {
        build_element(&self.tag, self.props, self.children)
    }
}

impl Element {
    pub fn builder(tag: impl Into<String>) -> ElementBuilder {
        ElementBuilder::new(tag)
    }
}

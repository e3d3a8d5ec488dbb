//! # element
//!
//! Immutable element trees: the input of every render request.
//!
//! An [`Element`] is a tag plus [`Props`]; props carry an insertion-ordered
//! attribute list and the ordered child sequence. Bare text and numbers passed
//! as children are wrapped into `TEXT_ELEMENT` leaves whose `nodeValue` prop
//! holds the value.
//!
//! Construction is fail-fast: [`build_element`] and [`ElementBuilder::build`]
//! reject malformed input with [`InvalidElementError`] instead of producing a
//! tree the reconciler would have to second-guess.

mod builder;
mod error;
mod types;

pub use builder::{Child, ElementBuilder, build_element, build_text_element};
pub use error::InvalidElementError;
pub use types::{
    CHILDREN, EVENT_PREFIX, Element, Event, Handler, NODE_VALUE, PropValue, Props, TEXT_ELEMENT,
    Tag, event_name, is_event_key,
};

use std::fmt;

/// Element rejected at construction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidElementError {
    EmptyTag,
    /// `TEXT_ELEMENT` is reserved for text leaves built by `build_text_element`.
    ReservedTag,
    InvalidTagName(String),
    ReservedProp(String),
    HandlerOutsideEventKey { key: String },
    EventKeyWithoutHandler { key: String },
}

impl fmt::Display for InvalidElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidElementError::EmptyTag => f.write_str("element tag is empty"),
            InvalidElementError::ReservedTag => {
                f.write_str("TEXT_ELEMENT is reserved for text elements")
            }
            InvalidElementError::InvalidTagName(name) => {
                write!(f, "invalid element tag name: {name:?}")
            }
            InvalidElementError::ReservedProp(key) => write!(f, "prop key {key:?} is reserved"),
            InvalidElementError::HandlerOutsideEventKey { key } => {
                write!(f, "handler stored under non-event key {key:?}")
            }
            InvalidElementError::EventKeyWithoutHandler { key } => {
                write!(f, "event key {key:?} requires a handler value")
            }
        }
    }
}

impl std::error::Error for InvalidElementError {}

//! Message contract for routed messages.

use std::{collections::BTreeMap, fmt, sync::Arc};

/// Metadata key set on a message once it has been sent through the async producer.
pub const HANDLED_ASYNC: &str = "handled-async";

/// The three kinds of messages a bus dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Changes state; exactly one handler.
    Command,
    /// Reads state; exactly one finder.
    Query,
    /// Reports a fact; any number of listeners.
    Event,
}

impl MessageKind {
    /// Lower-case name used in logs and errors.
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKind::Command => "command",
            MessageKind::Query => "query",
            MessageKind::Event => "event",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A string.
    Str(String),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

/// Immutable message metadata.
///
/// Cloning is cheap; [`Metadata::with_added_entry`] returns a new map and
/// leaves `self` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Arc<BTreeMap<String, MetadataValue>>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Whether `key` is present, whatever its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether `key` is present and exactly `Bool(true)`.
    pub fn is_flag_set(&self, key: &str) -> bool {
        matches!(self.get(key), Some(MetadataValue::Bool(true)))
    }

    /// Copy of this metadata with one more entry (replacing any existing value for `key`).
    pub fn with_added_entry(
        &self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        let mut entries = BTreeMap::clone(&self.entries);
        entries.insert(key.into(), value.into());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<MetadataValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(
                iter.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

/// A message that can be routed.
///
/// Messages must be `Send + Sync + 'static` so routers can be shared
/// across threads.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct PlaceOrder { metadata: Metadata }
///
/// impl Message for PlaceOrder {
///     fn message_name(&self) -> Option<&str> { Some("order.place") }
///     fn metadata(&self) -> &Metadata { &self.metadata }
///     fn with_added_metadata(&self, key: &str, value: MetadataValue) -> Self {
///         Self { metadata: self.metadata.with_added_entry(key, value) }
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must implement `Message`",
    note = "Routed messages expose a name, metadata, and a copy-with-metadata operation."
)]
pub trait Message: Send + Sync + 'static {
    /// The name routers match against.
    fn message_name(&self) -> Option<&str> {
        None
    }

    /// The kind a transport-wrapped message declares in its header.
    ///
    /// Local messages return `None` and take the kind of the bus they are sent on.
    fn declared_kind(&self) -> Option<MessageKind> {
        None
    }

    /// Whether this message should be redirected through an async producer.
    fn is_async(&self) -> bool {
        false
    }

    /// The message metadata.
    fn metadata(&self) -> &Metadata;

    /// Copy of this message with one more metadata entry.
    fn with_added_metadata(&self, key: &str, value: MetadataValue) -> Self
    where
        Self: Sized;

    /// Whether the message has already been sent through the async producer.
    fn was_handled_async(&self) -> bool {
        self.metadata().is_flag_set(HANDLED_ASYNC)
    }
}

use marshal_reflect::PropertyError;

/// Receives non-fatal serializer events.
///
/// Without a listener these events are logged.
pub trait SerializerListener: Send + Sync {
    /// A bean getter failed and the property was written as null.
    fn on_getter_error(&self, property: &str, class: &str, error: &PropertyError) {
        let _ = (property, class, error);
    }
}

/// Receives non-fatal parser events.
pub trait ParserListener: Send + Sync {
    /// An input property with no counterpart on the target bean was
    /// skipped.
    fn on_unknown_property(&self, property: &str, class: &str) {
        let _ = (property, class);
    }
}

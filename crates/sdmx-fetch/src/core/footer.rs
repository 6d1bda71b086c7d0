//! Detection of the "result deferred" footer in SDMX responses.
//!
//! When a query is too large to answer synchronously the service replies with
//! a regular message whose footer looks like:
//!
//! ```xml
//! <footer:Footer>
//!   <footer:Message code="413" severity="Infomational">
//!     <common:Text>Due to the large query the response will be written to a file</common:Text>
//!     <common:Text>https://example.org/file/6b1c...</common:Text>
//!     <common:Text>Please check the URL regularly</common:Text>
//!   </footer:Message>
//! </footer:Footer>
//! ```
//!
//! [`FooterScanner`] consumes one [`MarkupEvent`] at a time and ends up in
//! [`FooterScanner::Deferred`] once the poll URL has been seen.
//!
//! The rules below are positional and mirror what the service is observed to
//! send, not a published schema. They are kept as named constants so a
//! change on the service side is a one-line fix.

/// Namespace prefix of the footer message element.
pub const FOOTER_PREFIX: &str = "footer";

/// Local name of the footer message element.
pub const MESSAGE_ELEMENT: &str = "Message";

/// Local name of the text entries inside a message, whatever their prefix.
pub const TEXT_ELEMENT: &str = "Text";

/// Message code the service uses for "too large, delivered later".
pub const DEFERRED_CODE: &str = "413";

/// Position (1-based) of the text entry holding the poll URL.
pub const POLL_URL_TEXT_INDEX: usize = 2;

/// A start tag as seen by the scanner.
pub trait Element {
    fn prefix(&self) -> Option<&str>;
    fn local_name(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<String>;
}

/// One structural event of a markup document.
pub enum MarkupEvent<'a, E: ?Sized> {
    Start(&'a E),
    End,
    Text(&'a str),
}

/// The footer message currently in scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterMessage {
    pub code: Option<String>,
    pub severity: Option<String>,
    /// `Text` elements started since this message began.
    pub texts_seen: usize,
}

impl FooterMessage {
    pub fn is_deferred(&self) -> bool {
        self.code.as_deref() == Some(DEFERRED_CODE)
    }

    fn expects_poll_url(&self) -> bool {
        self.is_deferred() && self.texts_seen == POLL_URL_TEXT_INDEX
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FooterScanner {
    /// No footer message seen yet.
    #[default]
    Body,
    /// Inside (or after) a footer message. The state survives the message's
    /// end tag and is only replaced when the next message starts.
    Message(FooterMessage),
    /// Poll URL found. Terminal.
    Deferred(String),
}

impl FooterScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed<E: Element + ?Sized>(&mut self, event: MarkupEvent<'_, E>) {
        match event {
            MarkupEvent::Start(element) => self.on_start(element),
            MarkupEvent::End => {}
            MarkupEvent::Text(text) => self.on_text(text),
        }
    }

    pub fn poll_url(&self) -> Option<&str> {
        match self {
            Self::Deferred(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Whether the next character data could be the poll URL.
    ///
    /// Any other text is ignored, so callers may skip decoding it.
    pub fn wants_text(&self) -> bool {
        matches!(self, Self::Message(message) if message.expects_poll_url())
    }

    fn on_start<E: Element + ?Sized>(&mut self, element: &E) {
        if self.is_done() {
            return;
        }

        if element.prefix() == Some(FOOTER_PREFIX) && element.local_name() == MESSAGE_ELEMENT {
            let message = FooterMessage {
                code: element.attribute("code"),
                severity: element.attribute("severity"),
                texts_seen: 0,
            };
            tracing::debug!(
                code = message.code.as_deref().unwrap_or_default(),
                severity = message.severity.as_deref().unwrap_or_default(),
                "footer message"
            );
            *self = Self::Message(message);
        } else if element.local_name() == TEXT_ELEMENT
            && let Self::Message(message) = self
        {
            message.texts_seen += 1;
        }
    }

    fn on_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Self::Message(message) = self
            && message.expects_poll_url()
        {
            tracing::debug!(poll_url = text, "deferred result");
            *self = Self::Deferred(text.to_owned());
        }
    }
}

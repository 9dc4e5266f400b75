//! Email message

/// A single-recipient plain text email
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    /// The recipient of the email
    pub to: String,

    /// The subject of the email
    pub subject: String,

    /// The plain text body of the email
    pub body: String,
}

impl Message {
    /// Create a new message
    pub fn new(to: &str, subject: &str, body: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    /// Renders the message with only the `To` and `Subject` headers.
    ///
    /// Line breaks inside header values are flattened to spaces so that a
    /// subject or recipient cannot smuggle in additional headers.
    pub fn to_rfc822(&self) -> String {
        format!(
            "To: {}\r\nSubject: {}\r\n\r\n{}",
            header_value(&self.to),
            header_value(&self.subject),
            self.body
        )
    }
}

fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

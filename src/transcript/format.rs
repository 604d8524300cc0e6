//! Telegram export document shapes.
//!
//! Only the fields the parser needs are modelled; everything else in the
//! export is ignored.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Root of an export file.
///
/// A full account export nests chats under `chats.list`, while a single
/// chat export puts `messages` at the top level.
#[derive(Debug, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub chats: Option<ChatList>,
    #[serde(default)]
    pub messages: Option<Vec<MessageEvent>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatList {
    #[serde(default)]
    pub list: Vec<Chat>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageEvent>,
}

/// One entry of a chat's message list.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub text: Option<MessageText>,
    #[serde(default)]
    pub date: Option<String>,
    /// Set when the event carries an `action` key (calls, pins, joins).
    #[serde(default, rename = "action", deserialize_with = "key_present")]
    pub is_action: bool,
}

/// The `text` field, which changes shape with the message's formatting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    PlainText(String),
    FragmentList(Vec<TextFragment>),
    FormattingObject(Map<String, Value>),
}

/// An element of a formatted text: either raw text or an entity such as
/// a link, mention or bold run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextFragment {
    Plain(String),
    /// Entities are recognized but never classified, so their fields are
    /// kept as raw JSON.
    Entity(Map<String, Value>),
}

impl MessageText {
    /// Text that gets classified.
    ///
    /// Only the first fragment of a formatted message is considered, and
    /// only if it is raw text. Entities and formatting objects yield an
    /// empty string.
    pub fn plain_text(&self) -> &str {
        match self {
            MessageText::PlainText(text) => text,
            MessageText::FragmentList(fragments) => match fragments.first() {
                Some(TextFragment::Plain(text)) => text,
                _ => "",
            },
            MessageText::FormattingObject(_) => "",
        }
    }
}

fn key_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

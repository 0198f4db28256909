//! Topic routing

use heapless::String;

use chroma_protocol::mqtt::MAX_TOPIC_LEN;

use crate::config::FeedConfig;

/// Which snapshot field a topic feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorTopic {
    /// Human-readable color name ("purple")
    Name,
    /// Hex RGB code ("#800080")
    Code,
}

/// A message routed to a color field; consumed immediately
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorUpdate<'a> {
    pub topic: ColorTopic,
    pub value: &'a [u8],
}

/// The pair of subscribed topic names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTopics {
    name: String<MAX_TOPIC_LEN>,
    code: String<MAX_TOPIC_LEN>,
}

impl FeedTopics {
    pub fn new(name: String<MAX_TOPIC_LEN>, code: String<MAX_TOPIC_LEN>) -> Self {
        Self { name, code }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.name_topic.clone(), config.code_topic.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Match an incoming topic by exact name
    pub fn classify(&self, topic: &str) -> Option<ColorTopic> {
        if topic == self.name.as_str() {
            Some(ColorTopic::Name)
        } else if topic == self.code.as_str() {
            Some(ColorTopic::Code)
        } else {
            None
        }
    }
}

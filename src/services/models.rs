use std::fmt;

use serde::Serialize;

/// Upstream models reachable through the relay, one inbound route each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Grok,
    Gemini,
    Claude,
    ChatGpt,
    Mistral,
    Gpt41,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Model::Grok,
        Model::Gemini,
        Model::Claude,
        Model::ChatGpt,
        Model::Mistral,
        Model::Gpt41,
    ];

    /// Path segment of the inbound route, e.g. `/gpt41`.
    pub fn route(self) -> &'static str {
        match self {
            Model::Grok => "grok",
            Model::Gemini => "gemini",
            Model::Claude => "claude",
            Model::ChatGpt => "chatgpt",
            Model::Mistral => "mistral",
            Model::Gpt41 => "gpt41",
        }
    }

    /// Segment appended to `unichat1/` for the completion call.
    pub fn upstream_path(self) -> &'static str {
        match self {
            Model::Gpt41 => "chatgpt41mini",
            other => other.route(),
        }
    }

    pub fn from_route(route: &str) -> Option<Model> {
        Model::ALL.into_iter().find(|m| m.route() == route)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

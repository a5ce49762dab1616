//! Stdout stream markers
//!
//! A model process answers a task by writing free-form text framed by these
//! markers. The runner harness reads stdout line by line and uses them to
//! find where a response for a given session begins and ends.

use std::fmt;

const SESSION_START_TAG: &str = "[SESSION_START]session_id=";
const SESSION_END_TAG: &str = "[SESSION_END]session_id=";
const END_OF_STREAM: &str = "</s>";

/// A structured line in the model output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMarker {
    /// Output for `session_id` starts on the next line
    SessionStart { session_id: String },
    /// The model finished generating tokens
    EndOfStream,
    /// Output for `session_id` is complete
    SessionEnd { session_id: String },
}

impl StreamMarker {
    pub fn session_start(session_id: impl Into<String>) -> Self {
        Self::SessionStart {
            session_id: session_id.into(),
        }
    }

    pub fn session_end(session_id: impl Into<String>) -> Self {
        Self::SessionEnd {
            session_id: session_id.into(),
        }
    }

    /// Parses a single output line, returning `None` for ordinary text
    ///
    /// Surrounding whitespace is ignored, so the padded form produced by
    /// `Display` parses back to the same marker.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if line == END_OF_STREAM {
            return Some(Self::EndOfStream);
        }

        if let Some(id) = line.strip_prefix(SESSION_START_TAG) {
            return Some(Self::session_start(id));
        }

        line.strip_prefix(SESSION_END_TAG).map(Self::session_end)
    }
}

impl fmt::Display for StreamMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Session markers are padded with a space on both sides on the wire.
        match self {
            Self::SessionStart { session_id } => write!(f, " {SESSION_START_TAG}{session_id} "),
            Self::EndOfStream => f.write_str(END_OF_STREAM),
            Self::SessionEnd { session_id } => write!(f, " {SESSION_END_TAG}{session_id} "),
        }
    }
}

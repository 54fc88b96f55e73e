//! Endpoint classification for intercepted exchanges.
//!
//! Most traffic to the service is background noise (repository sync,
//! telemetry, settings). These helpers decide which exchanges are worth
//! decoding and how their bodies are laid out. They only look at the request
//! path and the response content type; interception itself happens elsewhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::WireError;

/// Background endpoints hidden in [`FilterMode::Smart`].
pub const NOISE_ENDPOINTS: &[&str] = &[
    // repository sync
    "SyncMerkleSubtreeV2",
    "FastUpdateFileV2",
    "FastRepoInitHandshakeV2",
    "FastRepoSyncComplete",
    // telemetry
    "v1/traces",
    // dashboard / settings
    "GetTeamHooks",
    "GetTeamAdminSettingsOrEmptyIfNotInTeam",
    "GetUserPrivacyMode",
    "GetTeamCommands",
    "GetCliDownloadUrl",
];

/// Endpoints related to models and agent conversations.
pub const AI_ENDPOINTS: &[&str] = &[
    "GetUsableModels",
    "GetDefaultModelForCli",
    "AgentService",
    "RunSSE",
    "BidiAppend",
    "BidiService",
    "NameAgent",
    "StreamChat",
    "Conversation",
];

/// Endpoints carrying the live conversation stream.
const CONVERSATION_ENDPOINTS: &[&str] = &["RunSSE", "BidiAppend", "BidiService"];

const STREAMING_CONTENT_TYPES: &[&str] = &["grpc", "connect", "event-stream"];
const STREAMING_PATHS: &[&str] = &["AgentService/Run", "RunSSE", "BidiAppend", "Stream"];

/// Which exchanges to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Everything except known background noise.
    #[default]
    Smart,
    /// Only model and agent endpoints.
    Ai,
    /// Everything.
    All,
    /// Nothing; exchanges are only counted.
    Quiet,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Ai => "ai",
            Self::All => "all",
            Self::Quiet => "quiet",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Smart => "Hide noise (repo sync, telemetry)",
            Self::Ai => "AI requests only",
            Self::All => "Show everything",
            Self::Quiet => "Summary only (count requests)",
        }
    }

    /// Parse a mode, falling back to [`FilterMode::Smart`] for unknown input.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!(mode = value, "unknown filter mode, using smart");
            Self::Smart
        })
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smart" => Ok(Self::Smart),
            "ai" => Ok(Self::Ai),
            "all" => Ok(Self::All),
            "quiet" => Ok(Self::Quiet),
            other => Err(WireError::Config(format!("unknown filter mode '{other}'"))),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn is_noise(path: &str) -> bool {
    contains_any(path, NOISE_ENDPOINTS)
}

pub fn is_ai(path: &str) -> bool {
    contains_any(path, AI_ENDPOINTS)
}

/// Live conversation endpoints are always shown, whatever the filter mode.
pub fn is_ai_conversation(path: &str) -> bool {
    contains_any(path, CONVERSATION_ENDPOINTS)
}

/// Whether an exchange on `path` passes the filter.
pub fn should_show(mode: FilterMode, path: &str) -> bool {
    if is_ai_conversation(path) {
        return true;
    }
    match mode {
        FilterMode::All => true,
        FilterMode::Quiet => false,
        FilterMode::Ai => is_ai(path),
        FilterMode::Smart => !is_noise(path),
    }
}

/// Whether a response should be decoded incrementally as it arrives.
pub fn is_streaming(content_type: &str, path: &str) -> bool {
    contains_any(content_type, STREAMING_CONTENT_TYPES) || contains_any(path, STREAMING_PATHS)
}

/// Layout of a fully buffered response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `data: <base64>` lines.
    Sse,
    /// A sequence of length-prefixed frames.
    GrpcWebStream,
    /// A single encoded message.
    Message,
}

impl BodyKind {
    pub fn classify(content_type: &str, path: &str) -> Self {
        if content_type.contains("event-stream") {
            Self::Sse
        } else if content_type.contains("grpc-web") && (path.contains("RunSSE") || path.contains("Stream")) {
            Self::GrpcWebStream
        } else {
            Self::Message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNC: &str = "/aiserver.v1.RepositoryService/SyncMerkleSubtreeV2";
    const MODELS: &str = "/aiserver.v1.AiService/GetUsableModels";
    const RUN_SSE: &str = "/agent.v1.AgentService/RunSSE";
    const OTHER: &str = "/aiserver.v1.DashboardService/GetMe";

    #[test]
    fn test_filter_mode_matrix() {
        assert!(!should_show(FilterMode::Smart, SYNC));
        assert!(should_show(FilterMode::Smart, MODELS));
        assert!(should_show(FilterMode::Smart, OTHER));

        assert!(!should_show(FilterMode::Ai, SYNC));
        assert!(should_show(FilterMode::Ai, MODELS));
        assert!(!should_show(FilterMode::Ai, OTHER));

        assert!(should_show(FilterMode::All, SYNC));
        assert!(should_show(FilterMode::All, OTHER));

        assert!(!should_show(FilterMode::Quiet, MODELS));
        assert!(!should_show(FilterMode::Quiet, OTHER));
    }

    #[test]
    fn test_conversation_overrides_filter() {
        assert!(is_ai_conversation(RUN_SSE));
        assert!(should_show(FilterMode::Quiet, RUN_SSE));
        assert!(should_show(FilterMode::Ai, "/aiserver.v1.BidiService/BidiAppend"));
        assert!(!is_ai_conversation(MODELS));
    }

    #[test]
    fn test_telemetry_is_noise() {
        assert!(is_noise("/v1/traces"));
        assert!(!is_noise(RUN_SSE));
    }

    #[test]
    fn test_parse_filter_mode() {
        assert_eq!("smart".parse::<FilterMode>().unwrap(), FilterMode::Smart);
        assert_eq!(" AI ".parse::<FilterMode>().unwrap(), FilterMode::Ai);
        assert!("verbose".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::parse_lenient("verbose"), FilterMode::Smart);
        assert_eq!(FilterMode::parse_lenient("quiet"), FilterMode::Quiet);
        assert_eq!(FilterMode::All.to_string(), "all");
    }

    #[test]
    fn test_streaming_detection() {
        assert!(is_streaming("application/grpc-web+proto", OTHER));
        assert!(is_streaming("application/connect+proto", OTHER));
        assert!(is_streaming("text/event-stream", OTHER));
        assert!(is_streaming("application/proto", RUN_SSE));
        assert!(is_streaming("application/proto", "/agent.v1.AgentService/Run"));
        assert!(!is_streaming("application/json", MODELS));
    }

    #[test]
    fn test_body_kind() {
        assert_eq!(BodyKind::classify("text/event-stream", OTHER), BodyKind::Sse);
        assert_eq!(
            BodyKind::classify("application/grpc-web+proto", RUN_SSE),
            BodyKind::GrpcWebStream
        );
        assert_eq!(
            BodyKind::classify("application/grpc-web+proto", MODELS),
            BodyKind::Message
        );
        assert_eq!(BodyKind::classify("application/proto", RUN_SSE), BodyKind::Message);
    }
}

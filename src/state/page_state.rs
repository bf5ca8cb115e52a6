/// Page state definitions for tracking crawl progress
///
/// Every URL the crawler touches ends in exactly one of these states.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Success States =====
    /// Page was fetched, parsed and gated but not accepted
    Processed,

    /// Page passed the configured gate and is part of the results
    Accepted,

    /// Page was fetched but its anchor-to-word ratio marks it as a link farm
    LinkFarm,

    // ===== Error States =====
    /// Page returned HTTP 404 or similar (permanent failure)
    DeadLink,

    /// Page could not be reached (connection refused, DNS failure, TLS error, timeout)
    Unreachable,

    /// Page returned HTTP 429
    RateLimited,

    /// Page fetch failed for other reasons (server error, redirect loop, etc.)
    Failed,

    /// Page body could not be turned into a document
    ParseFailed,

    /// Page Content-Type is not HTML
    ContentMismatch,

    // ===== Special States =====
    /// Link was found one level beyond the maximum crawl depth
    DepthExceeded,

    /// Page redirected to a URL that was already fetched in this crawl
    Redirected,
}

impl PageState {
    /// Returns true if the page was fetched and parsed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::Accepted | Self::LinkFarm)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink
                | Self::Unreachable
                | Self::RateLimited
                | Self::Failed
                | Self::ParseFailed
                | Self::ContentMismatch
        )
    }

    /// Returns true if a later crawl may succeed where this one failed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable | Self::RateLimited | Self::Failed)
    }

    /// Converts the page state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Accepted => "accepted",
            Self::LinkFarm => "link_farm",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::RateLimited => "rate_limited",
            Self::Failed => "failed",
            Self::ParseFailed => "parse_failed",
            Self::ContentMismatch => "content_mismatch",
            Self::DepthExceeded => "depth_exceeded",
            Self::Redirected => "redirected",
        }
    }

    /// Parses a page state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "processed" => Some(Self::Processed),
            "accepted" => Some(Self::Accepted),
            "link_farm" => Some(Self::LinkFarm),
            "dead_link" => Some(Self::DeadLink),
            "unreachable" => Some(Self::Unreachable),
            "rate_limited" => Some(Self::RateLimited),
            "failed" => Some(Self::Failed),
            "parse_failed" => Some(Self::ParseFailed),
            "content_mismatch" => Some(Self::ContentMismatch),
            "depth_exceeded" => Some(Self::DepthExceeded),
            "redirected" => Some(Self::Redirected),
            _ => None,
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Processed,
            Self::Accepted,
            Self::LinkFarm,
            Self::DeadLink,
            Self::Unreachable,
            Self::RateLimited,
            Self::Failed,
            Self::ParseFailed,
            Self::ContentMismatch,
            Self::DepthExceeded,
            Self::Redirected,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transient() {
        assert!(PageState::Unreachable.is_transient());
        assert!(PageState::RateLimited.is_transient());
        assert!(PageState::Failed.is_transient());

        assert!(!PageState::DeadLink.is_transient());
        assert!(!PageState::ContentMismatch.is_transient());
        assert!(!PageState::Accepted.is_transient());
    }

    #[test]
    fn test_is_success() {
        assert!(PageState::Processed.is_success());
        assert!(PageState::Accepted.is_success());
        assert!(PageState::LinkFarm.is_success());

        assert!(!PageState::Redirected.is_success());
        assert!(!PageState::DeadLink.is_success());
        assert!(!PageState::DepthExceeded.is_success());
    }

    #[test]
    fn test_is_error() {
        assert!(PageState::DeadLink.is_error());
        assert!(PageState::Unreachable.is_error());
        assert!(PageState::RateLimited.is_error());
        assert!(PageState::Failed.is_error());
        assert!(PageState::ParseFailed.is_error());
        assert!(PageState::ContentMismatch.is_error());

        assert!(!PageState::Accepted.is_error());
        assert!(!PageState::LinkFarm.is_error());
        assert!(!PageState::DepthExceeded.is_error());
        assert!(!PageState::Redirected.is_error());
    }

    #[test]
    fn test_db_strings() {
        assert_eq!(PageState::LinkFarm.to_db_string(), "link_farm");
        assert_eq!(
            PageState::from_db_string("parse_failed"),
            Some(PageState::ParseFailed)
        );
        assert_eq!(PageState::from_db_string("archived"), None);
    }

    #[test]
    fn test_roundtrip_db_string() {
        for state in PageState::all_states() {
            let parsed = PageState::from_db_string(state.to_db_string());
            assert_eq!(Some(state), parsed, "Failed roundtrip for {:?}", state);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Accepted), "accepted");
        assert_eq!(format!("{}", PageState::DeadLink), "dead_link");
    }
}

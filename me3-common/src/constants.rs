//! Markers and patterns shared between the server and the templates.

/// Replaced with the fully qualified subdomain, e.g. `alice.ethonline2021char.eth`.
pub const USER_SUBDOMAIN_MARKER: &str = "{{USER_SUBDOMAIN}}";

/// Replaced with the user's links, JSON encoded and then URI-component encoded.
pub const USER_LINKS_MARKER: &str = "{{USER_LINKS}}";

/// Replaced with the user's avatar reference.
pub const USER_AVATAR_MARKER: &str = "{{USER_AVATAR}}";

/// Bundle scripts produced by the template build: `bundle.<hash>.<version>.js`.
pub const DEFAULT_DYNAMIC_FILE_PATTERN: &str = r"bundle\.[a-z0-9]*\.[0-9]{1,3}\.js";

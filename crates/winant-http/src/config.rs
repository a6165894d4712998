//! Client configuration.

use winant_core::LoadFlags;

/// Default size of the buffer used to read the response body (4KB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4 * 1024;

/// Default `User-Agent` sent when opening a session.
pub const DEFAULT_USER_AGENT: &str = concat!("winant/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every request opened with them.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent passed to the transport session.
    user_agent: String,
    /// Size of each body read.
    read_chunk_size: usize,
    /// Load flags used when a request does not set its own.
    default_load_flags: LoadFlags,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            default_load_flags: LoadFlags::NORMAL,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the body read size. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    /// Set the load flags used when a request does not set its own.
    #[must_use]
    pub fn with_default_load_flags(mut self, flags: LoadFlags) -> Self {
        self.default_load_flags = flags;
        self
    }

    /// Returns the user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the body read size.
    #[must_use]
    pub fn read_chunk_size(&self) -> usize {
        self.read_chunk_size
    }

    /// Returns the default load flags.
    #[must_use]
    pub fn default_load_flags(&self) -> LoadFlags {
        self.default_load_flags
    }
}

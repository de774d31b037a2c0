//! Registry configuration.

/// Default maximum number of simultaneously open files.
pub const MAX_OPEN_FILES: usize = 256;

/// Configuration for a [`crate::Registry`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Number of file slots; the file table never grows past it.
    pub max_files: usize,

    /// Node slots reserved up front; the node table grows beyond it on demand.
    pub node_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_files: MAX_OPEN_FILES,
            node_capacity: 1024,
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of file slots.
    #[must_use]
    pub const fn max_files(mut self, value: usize) -> Self {
        self.max_files = value;
        self
    }

    /// Sets the initial node slot reservation.
    #[must_use]
    pub const fn node_capacity(mut self, value: usize) -> Self {
        self.node_capacity = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_files, MAX_OPEN_FILES);
        assert_eq!(config.node_capacity, 1024);
    }

    #[test]
    fn builder_pattern() {
        let config = RegistryConfig::new().max_files(4).node_capacity(16);
        assert_eq!(config.max_files, 4);
        assert_eq!(config.node_capacity, 16);
    }
}

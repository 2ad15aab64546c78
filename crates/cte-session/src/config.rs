/// Default encoder pre-allocation: 256 bytes.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Default ceiling for encoded output and decoder input: 16 MiB.
pub const DEFAULT_MAX_SIZE: usize = 16 * 1024 * 1024;

/// Buffer limits shared by encoder and decoder sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Bytes reserved up front by an encoder. Default: 256.
    pub initial_capacity: usize,
    /// Largest buffer an encoder may produce. Default: 16 MiB.
    pub max_encoded_size: usize,
    /// Largest input a decoder or reader accepts. Default: 16 MiB.
    pub max_input_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_encoded_size: DEFAULT_MAX_SIZE,
            max_input_size: DEFAULT_MAX_SIZE,
        }
    }
}

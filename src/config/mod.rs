pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;
pub const DEFAULT_SCHEMA_SCRATCH_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct LogReaderConfig {
    /// Capacity of the buffered reader behind file-backed channels.
    pub read_buffer_size: usize,
    /// Initial capacity of the buffer schema-rule chains are concatenated into.
    pub schema_scratch_capacity: usize,
}

impl Default for LogReaderConfig {
    fn default() -> Self {
        LogReaderConfig {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            schema_scratch_capacity: DEFAULT_SCHEMA_SCRATCH_CAPACITY,
        }
    }
}

/// Forward/backward buffer windows handed to the streaming engine.
///
/// Sessions start with a small profile for fast first frame and widen to a
/// relaxed one once playback is established.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferProfile {
    /// Seconds of media the engine tries to keep ahead of the playhead
    pub max_buffer_length: f64,
    /// Hard ceiling for the forward buffer in seconds
    pub max_max_buffer_length: f64,
    /// Seconds kept behind the playhead before eviction
    pub back_buffer_length: f64,
}

impl BufferProfile {
    pub fn startup() -> Self {
        Self {
            max_buffer_length: 4.0,
            max_max_buffer_length: 8.0,
            back_buffer_length: 0.0,
        }
    }

    pub fn relaxed() -> Self {
        Self {
            max_buffer_length: 30.0,
            max_max_buffer_length: 60.0,
            back_buffer_length: 30.0,
        }
    }

    /// True when every window of `self` is at least as large as `other`'s
    pub fn covers(&self, other: &BufferProfile) -> bool {
        self.max_buffer_length >= other.max_buffer_length
            && self.max_max_buffer_length >= other.max_max_buffer_length
            && self.back_buffer_length >= other.back_buffer_length
    }
}

impl Default for BufferProfile {
    fn default() -> Self {
        Self::startup()
    }
}

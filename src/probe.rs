//! Capability probe for in-memory binary buffers.
//!
//! Every artifact-producing export except the document snapshot checks the
//! probe before doing any work.

/// Number of bytes the runtime probe tries to reserve.
const PROBE_CAPACITY: usize = 64;

/// Returns `true` when the runtime can allocate an in-memory binary buffer.
///
/// Allocation failure is reported as `false`, never propagated.
pub fn is_binary_buffer_supported() -> bool {
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve(PROBE_CAPACITY).is_ok()
}

/// A feature-detection gate injected into the exporter.
pub trait BufferProbe: Send + Sync {
    fn is_supported(&self) -> bool;
}

/// Probe backed by [`is_binary_buffer_supported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeProbe;

impl BufferProbe for RuntimeProbe {
    fn is_supported(&self) -> bool {
        is_binary_buffer_supported()
    }
}

impl<F> BufferProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_supported(&self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_probe_supports_buffers() {
        assert!(is_binary_buffer_supported());
        assert!(RuntimeProbe.is_supported());
    }

    #[test]
    fn closures_act_as_probes() {
        let unsupported = || false;
        assert!(!unsupported.is_supported());
        let boxed: Box<dyn BufferProbe> = Box::new(|| true);
        assert!(boxed.is_supported());
    }
}

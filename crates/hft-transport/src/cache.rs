use std::ops::Deref;

/// Wrapper type that pads its contents out to a 128-byte boundary, so that
/// independently-written fields (e.g. a producer's cursor and a consumer's
/// cursor) never share a cache line and induce false sharing between cores.
#[repr(align(128))]
pub(crate) struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

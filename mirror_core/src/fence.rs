//! Ordering guard for overlapping data loads: only the most recently issued
//! request may publish its result.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct RequestFence {
    latest: u64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new id, superseding every id issued before it.
    pub fn issue(&mut self) -> RequestId {
        self.latest += 1;
        RequestId(self.latest)
    }

    pub fn latest(&self) -> Option<RequestId> {
        (self.latest > 0).then_some(RequestId(self.latest))
    }

    pub fn accept(&self, id: RequestId) -> bool {
        id.0 == self.latest
    }
}

/// A value tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fenced<T> {
    pub id: RequestId,
    pub value: T,
}

impl<T> Fenced<T> {
    pub fn new(id: RequestId, value: T) -> Self {
        Self { id, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fenced<U> {
        Fenced {
            id: self.id,
            value: f(self.value),
        }
    }
}

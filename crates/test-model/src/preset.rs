use serde::{Deserialize, Serialize};

/// The preset response for the fake model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Text deltas delivered in order.
    ///
    /// Empty strings model control-only fragments: the fake provider
    /// consumes them without surfacing an event, like a real provider
    /// absorbing a chunk that carries no text.
    pub deltas: Vec<String>,
    /// If set, the response fails after this many deltas have been
    /// consumed, instead of reporting completion.
    pub fail_after: Option<usize>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified deltas.
    #[inline]
    pub fn with_deltas<I, S>(deltas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deltas: deltas.into_iter().map(Into::into).collect(),
            fail_after: None,
        }
    }

    /// Makes the response fail after `count` deltas have been consumed.
    /// `0` means the stream fails before delivering anything.
    #[inline]
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

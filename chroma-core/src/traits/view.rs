//! Output-side traits

use crate::state::StatusSnapshot;

/// Something that can show a status snapshot
///
/// Rendering is a side effect only; implementations log and swallow their
/// own device faults.
#[allow(async_fn_in_trait)]
pub trait StatusView {
    async fn render(&mut self, snapshot: &StatusSnapshot);
}

/// Bounded background work run once per loop iteration
///
/// Covers link monitoring and service advertisement.
#[allow(async_fn_in_trait)]
pub trait Housekeeping {
    async fn service(&mut self, now_ms: u64);
}

impl Housekeeping for () {
    async fn service(&mut self, _now_ms: u64) {}
}

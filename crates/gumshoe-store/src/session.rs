//! Page-lifecycle trigger: run the engine exactly once, when the document is
//! ready.

use gumshoe_core::{clock::Clock, page::PageContext, storage::SlotStorage};

use crate::store::{AttributionStore, RunOutcome};

/// The document readiness states a page moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
  Loading,
  Interactive,
  Complete,
}

/// One page context. The first trigger either runs the store immediately
/// or, while the document is still loading, defers until
/// [`PageSession::document_ready`]. Later triggers do nothing.
pub struct PageSession<S, C> {
  store:   AttributionStore<S, C>,
  pending: Option<PageContext>,
  outcome: Option<RunOutcome>,
}

impl<S: SlotStorage, C: Clock> PageSession<S, C> {
  pub fn new(store: AttributionStore<S, C>) -> Self {
    Self { store, pending: None, outcome: None }
  }

  /// Trigger the engine for `page` in the given readiness state.
  ///
  /// Returns the outcome if the run happened now.
  pub fn start(&mut self, state: ReadyState, page: PageContext) -> Option<&RunOutcome> {
    if self.outcome.is_some() || self.pending.is_some() {
      return None;
    }
    if state == ReadyState::Loading {
      self.pending = Some(page);
      return None;
    }
    Some(self.execute(&page))
  }

  /// The readiness event: runs a deferred trigger, if any.
  pub fn document_ready(&mut self) -> Option<&RunOutcome> {
    let page = self.pending.take()?;
    Some(self.execute(&page))
  }

  pub fn outcome(&self) -> Option<&RunOutcome> { self.outcome.as_ref() }

  pub fn into_store(self) -> AttributionStore<S, C> { self.store }

  fn execute(&mut self, page: &PageContext) -> &RunOutcome {
    let outcome = self.store.run(page);
    self.outcome.insert(outcome)
  }
}

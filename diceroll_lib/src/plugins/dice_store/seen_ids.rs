use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use uuid::Uuid;

/// Ids of rolls the store has already recorded, forgetting the oldest past `limit`.
///
/// Outlives the history itself, so clearing or trimming the history doesn't let an echo of an
/// old roll back in.
pub(super) struct SeenIds {
	limit: usize,
	order: VecDeque<Uuid>,
	ids: FxHashSet<Uuid>,
}

impl SeenIds {
	pub(super) fn new(limit: usize) -> SeenIds {
		return SeenIds {
			limit: limit.max(1),
			order: VecDeque::new(),
			ids: FxHashSet::default(),
		};
	}

	pub(super) fn contains(&self, id: &Uuid) -> bool {
		return self.ids.contains(id);
	}

	/// Remembers `id`. Returns false if it was already known.
	pub(super) fn insert(&mut self, id: Uuid) -> bool {
		if !self.ids.insert(id) {
			return false;
		}
		self.order.push_back(id);
		while self.order.len() > self.limit {
			if let Some(oldest) = self.order.pop_front() {
				self.ids.remove(&oldest);
			}
		}
		return true;
	}
}

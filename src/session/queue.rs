use crate::types::MovieRecord;

/// Fixed-order movie slots, one per round.
///
/// The order is decided when the queue is built and never changes. Slots
/// that could not be fetched up front stay empty until filled in place.
#[derive(Debug, Clone, Default)]
pub struct MovieQueue {
    slots: Vec<Option<MovieRecord>>,
}

impl MovieQueue {
    /// A queue of `len` empty slots
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn from_slots(slots: Vec<Option<MovieRecord>>) -> Self {
        Self { slots }
    }

    pub fn from_movies(movies: Vec<MovieRecord>) -> Self {
        Self {
            slots: movies.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn is_filled(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Fill an empty slot. Returns false if the slot is out of range or already filled.
    pub fn fill(&mut self, index: usize, movie: MovieRecord) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(movie);
                true
            }
            _ => false,
        }
    }

    /// Indices of slots still waiting for a movie
    pub fn missing_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

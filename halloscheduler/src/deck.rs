//! Working decks drawn without replacement.
//!
//! A [`Deck`] is a mutable copy of a pool. Each draw picks a uniformly random
//! element among those still in the deck and removes it, so every element of
//! a deck generation comes out exactly once. What happens when the deck runs
//! dry is left to the caller through the `on_empty` continuation of
//! [`draw_from_deck`]: bumper, bumper-audio and logo decks are reseeded, the
//! program deck may end the rotation instead.

use rand::Rng;

/// Mutable working copy of a pool, consumed by random draws.
#[derive(Debug, Clone)]
pub struct Deck<T> {
    cards: Vec<T>,
    generation: u64,
}

impl<T> Default for Deck<T> {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            generation: 0,
        }
    }
}

impl<T: Clone> Deck<T> {
    /// Replaces the whole deck by a fresh copy of `pool`.
    ///
    /// Whatever was left in the deck is discarded, so the new generation
    /// always holds the full pool.
    pub fn reseed(&mut self, pool: &[T]) {
        self.cards.clear();
        self.cards.extend_from_slice(pool);
        self.generation += 1;
    }
}

impl<T> Deck<T> {
    /// Removes and returns a uniformly chosen element, or `None` when empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.cards.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.cards.len());
        // L'ordre restant n'a pas d'importance : l'index suivant est tiré uniformément
        Some(self.cards.swap_remove(index))
    }

    /// Drops every element matching `predicate`; returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.cards.len();
        self.cards.retain(|card| !predicate(card));
        before - self.cards.len()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of times the deck has been (re)filled from its pool.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cards.iter()
    }
}

/// Draws from `deck`, delegating to `on_empty` when there is nothing left.
///
/// `on_empty` receives the deck and the random source so that it can reseed
/// and draw again, or return `None` to signal exhaustion.
pub fn draw_from_deck<T, R, F>(deck: &mut Deck<T>, rng: &mut R, on_empty: F) -> Option<T>
where
    R: Rng + ?Sized,
    F: FnOnce(&mut Deck<T>, &mut R) -> Option<T>,
{
    if deck.is_empty() {
        return on_empty(deck, rng);
    }
    deck.draw(rng)
}

/// `on_empty` policy of the bumper, bumper-audio and logo decks: reseed from
/// the full pool, then draw again.
pub fn reshuffle<'a, T, R>(pool: &'a [T]) -> impl FnOnce(&mut Deck<T>, &mut R) -> Option<T> + 'a
where
    T: Clone,
    R: Rng + ?Sized,
{
    move |deck, rng| {
        deck.reseed(pool);
        deck.draw(rng)
    }
}

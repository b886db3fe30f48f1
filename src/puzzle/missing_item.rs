use self::item_states::ItemState;
use super::{flash_all_lights, Bookshelf, ColorToken, SceneSink};

/// ELI5:
/// ┌──────────────── Missing Book Lifecycle ─────────────────┐
/// │  From State  →  Event    →  To State                    │
/// ├─────────────────────────────────────────────────────────┤
/// │  Hidden      →  Reveal   →  Revealed  (runes solved)    │
/// │  Revealed    →  Collect  →  Collected (player click)    │
/// │  Collected   →  Place    →  Placed    (book landed)     │
/// │  --------       ------                                  │
/// │  anything else keeps the current state                  │
/// └─────────────────────────────────────────────────────────┘
pub enum Event {
    Reveal,
    Collect,
    Place,
}

/// Flat view of the lifecycle for callers that only need to branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    Hidden,
    Revealed,
    Collected,
    Placed,
}

/// Each state is its own type, so `place()` simply does not exist on a book
/// that was never collected
mod item_states {
    use crate::puzzle::ColorToken;

    #[derive(Debug, Copy, Clone)]
    pub struct Hidden;
    #[derive(Debug, Copy, Clone)]
    pub struct Revealed;
    #[derive(Debug, Copy, Clone)]
    pub struct Collected;
    #[derive(Debug, Copy, Clone)]
    pub struct Placed;

    #[derive(Debug, Copy, Clone)]
    pub struct ItemContext {
        pub book: ColorToken,
    }

    #[derive(Debug, Copy, Clone)]
    pub struct ItemState<S> {
        context: ItemContext,
        // phantom marker, never read
        _state: S,
    }

    impl<S> ItemState<S> {
        pub fn context(&self) -> &ItemContext {
            &self.context
        }
    }

    impl ItemState<Hidden> {
        pub fn new(book: ColorToken) -> Self {
            ItemState {
                context: ItemContext { book },
                _state: Hidden,
            }
        }

        pub fn reveal(self) -> ItemState<Revealed> {
            ItemState {
                context: self.context,
                _state: Revealed,
            }
        }
    }

    impl ItemState<Revealed> {
        pub fn collect(self) -> ItemState<Collected> {
            ItemState {
                context: self.context,
                _state: Collected,
            }
        }
    }

    impl ItemState<Collected> {
        pub fn place(self) -> ItemState<Placed> {
            ItemState {
                context: self.context,
                _state: Placed,
            }
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum MissingItemStateMachine {
    Hidden(ItemState<item_states::Hidden>),
    Revealed(ItemState<item_states::Revealed>),
    Collected(ItemState<item_states::Collected>),
    Placed(ItemState<item_states::Placed>),
}

impl From<ItemState<item_states::Hidden>> for MissingItemStateMachine {
    fn from(state: ItemState<item_states::Hidden>) -> Self {
        MissingItemStateMachine::Hidden(state)
    }
}

impl From<ItemState<item_states::Revealed>> for MissingItemStateMachine {
    fn from(state: ItemState<item_states::Revealed>) -> Self {
        MissingItemStateMachine::Revealed(state)
    }
}

impl From<ItemState<item_states::Collected>> for MissingItemStateMachine {
    fn from(state: ItemState<item_states::Collected>) -> Self {
        MissingItemStateMachine::Collected(state)
    }
}

impl From<ItemState<item_states::Placed>> for MissingItemStateMachine {
    fn from(state: ItemState<item_states::Placed>) -> Self {
        MissingItemStateMachine::Placed(state)
    }
}

impl MissingItemStateMachine {
    // consumes the old state, the caller stores whatever comes back
    fn transition(self, event: Event) -> Self {
        use MissingItemStateMachine::*;
        match (self, event) {
            (Hidden(state), Event::Reveal) => state.reveal().into(),
            (Revealed(state), Event::Collect) => state.collect().into(),
            (Collected(state), Event::Place) => state.place().into(),
            // reveal twice, collect while hidden, place before collect ...
            _ => self,
        }
    }

    fn stage(&self) -> ItemStage {
        use MissingItemStateMachine::*;
        match self {
            Hidden(_) => ItemStage::Hidden,
            Revealed(_) => ItemStage::Revealed,
            Collected(_) => ItemStage::Collected,
            Placed(_) => ItemStage::Placed,
        }
    }

    fn book(&self) -> ColorToken {
        use MissingItemStateMachine::*;
        match self {
            Hidden(state) => state.context().book,
            Revealed(state) => state.context().book,
            Collected(state) => state.context().book,
            Placed(state) => state.context().book,
        }
    }
}

/// The book hidden in the haunted cabinet
#[derive(Debug, Clone)]
pub struct MissingItem {
    state: MissingItemStateMachine,
}

impl MissingItem {
    pub fn new(book: ColorToken) -> Self {
        MissingItem {
            state: MissingItemStateMachine::Hidden(ItemState::new(book)),
        }
    }

    pub fn book(&self) -> ColorToken {
        self.state.book()
    }

    pub fn stage(&self) -> ItemStage {
        self.state.stage()
    }

    /// true when this call moved the book out of hiding
    pub fn reveal(&mut self) -> bool {
        self.step(Event::Reveal)
    }

    /// Player picked the book up. Flashes the lights; the caller starts the
    /// flight back to the shelf.
    pub fn collect(&mut self, sink: &mut dyn SceneSink) -> bool {
        if !self.step(Event::Collect) {
            return false;
        }
        flash_all_lights(sink);
        log!("Missing book found!");
        true
    }

    /// Book has landed: shelve it, which unlocks the bookshelf
    pub fn place(&mut self, shelf: &mut Bookshelf, sink: &mut dyn SceneSink) -> bool {
        if self.stage() != ItemStage::Collected {
            return false;
        }
        if !shelf.place(self.book(), sink) {
            return false;
        }
        self.step(Event::Place)
    }

    fn step(&mut self, event: Event) -> bool {
        let before = self.state.stage();
        self.state = self.state.transition(event);
        self.state.stage() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::ColorToken::{Blue, Orange, Purple, Red, Yellow};
    use crate::puzzle::{SceneCommand, HANGING_LIGHTS};

    fn shelf() -> Bookshelf {
        Bookshelf::with_missing(
            vec![Purple, Orange, Blue, Yellow, Red],
            vec![Orange, Yellow, Purple, Blue, Red],
            2,
        )
    }

    #[test]
    fn collect_before_reveal_does_nothing() {
        let mut item = MissingItem::new(Blue);
        let mut sink = Vec::new();
        assert!(!item.collect(&mut sink));
        assert_eq!(item.stage(), ItemStage::Hidden);
        assert!(sink.is_empty());
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut item = MissingItem::new(Blue);
        assert!(item.reveal());
        assert!(!item.reveal());
        assert_eq!(item.stage(), ItemStage::Revealed);
    }

    #[test]
    fn place_before_collect_is_refused() {
        let mut item = MissingItem::new(Blue);
        let mut shelf = shelf();
        let mut sink = Vec::new();
        item.reveal();
        assert!(!item.place(&mut shelf, &mut sink));
        assert_eq!(item.stage(), ItemStage::Revealed);
        assert!(!shelf.is_unlocked());
    }

    #[test]
    fn full_lifecycle_unlocks_shelf() {
        let mut item = MissingItem::new(Blue);
        let mut shelf = shelf();
        let mut sink = Vec::new();

        item.reveal();
        assert!(item.collect(&mut sink));
        assert_eq!(sink.len(), HANGING_LIGHTS);
        assert!(sink
            .iter()
            .all(|command| matches!(command, SceneCommand::FlashLight { .. })));

        assert!(item.place(&mut shelf, &mut sink));
        assert_eq!(item.stage(), ItemStage::Placed);
        assert!(shelf.is_unlocked());
        assert!(shelf.contains(Blue));

        // placed is terminal
        assert!(!item.reveal());
        assert!(!item.collect(&mut sink));
        assert!(!item.place(&mut shelf, &mut sink));
        assert_eq!(item.stage(), ItemStage::Placed);
    }
}

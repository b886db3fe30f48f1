//! Click routing for the room.
//!
//! A click arrives as a hit-test list (nearest object first). Handlers are
//! asked in [`PRECEDENCE`] order and the first one that claims any hit owns
//! the click, even if a later handler would claim a nearer object.
use crate::puzzle::bookshelf::SHELF_SLOTS;
use crate::puzzle::runes::RUNE_COUNT;
use crate::puzzle::{ColorToken, SceneObject, HANGING_LIGHTS};
use std::collections::HashMap;

/// Opaque handle the presentation layer hands back from hit tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// What the room knows about a scene object, kept beside the scene instead
/// of on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMeta {
    pub object: SceneObject,
    /// the book that starts hidden in the cabinet
    pub missing_item: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    entries: HashMap<ObjectId, ObjectMeta>,
    next_id: u32,
}

impl ObjectTable {
    /// Tags every interactive object in the room. `books` are the shelf
    /// books in shelf order including the missing one.
    pub fn standard(books: &[ColorToken], missing: Option<ColorToken>) -> Self {
        let mut table = ObjectTable::default();
        table.tag(SceneObject::Portal);
        table.tag(SceneObject::Cube);
        table.tag(SceneObject::Cage);
        table.tag(SceneObject::RuneClue);
        for index in 0..RUNE_COUNT {
            table.tag(SceneObject::Rune(index));
        }
        table.tag(SceneObject::Terminal);
        for book in books.iter().take(SHELF_SLOTS) {
            table.insert(ObjectMeta {
                object: SceneObject::Book(*book),
                missing_item: Some(*book) == missing,
            });
        }
        table.tag(SceneObject::Door);
        table.tag(SceneObject::Cabinet);
        table.tag(SceneObject::CabinetDoor);
        for light in 0..HANGING_LIGHTS {
            table.tag(SceneObject::Light(light));
        }
        table
    }

    pub fn insert(&mut self, meta: ObjectMeta) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, meta);
        id
    }

    pub fn tag(&mut self, object: SceneObject) -> ObjectId {
        self.insert(ObjectMeta {
            object,
            missing_item: false,
        })
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectMeta> {
        self.entries.get(&id)
    }

    pub fn id_of(&self, object: SceneObject) -> Option<ObjectId> {
        self.entries
            .iter()
            .find(|(_, meta)| meta.object == object)
            .map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectMeta)> {
        self.entries.iter().map(|(id, meta)| (*id, meta))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==================== Handlers ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Portal,
    RuneClue,
    Rune,
    Terminal,
    MissingItem,
    Bookshelf,
}

/// TABLE
/// ┌───┬─────────────┬───────────────────────────────────────┐
/// │ # │ handler     │ claims                                │
/// ├───┼─────────────┼───────────────────────────────────────┤
/// │ 1 │ Portal      │ the portal, always                    │
/// │ 2 │ RuneClue    │ the clue paper, always                │
/// │ 3 │ Rune        │ runes, until the sequence is solved   │
/// │ 4 │ Terminal    │ the terminal, always                  │
/// │ 5 │ MissingItem │ the missing book, until collected     │
/// │ 6 │ Bookshelf   │ shelved books, any book while locked  │
/// └───┴─────────────┴───────────────────────────────────────┘
pub const PRECEDENCE: [HandlerKind; 6] = [
    HandlerKind::Portal,
    HandlerKind::RuneClue,
    HandlerKind::Rune,
    HandlerKind::Terminal,
    HandlerKind::MissingItem,
    HandlerKind::Bookshelf,
];

/// Puzzle facts the handlers gate on
pub trait Gates {
    fn runes_solved(&self) -> bool;
    fn missing_item_collected(&self) -> bool;
    fn shelf_locked(&self) -> bool;
    fn on_shelf(&self, book: ColorToken) -> bool;
}

impl HandlerKind {
    pub fn claims(self, meta: &ObjectMeta, gates: &dyn Gates) -> bool {
        match (self, meta.object) {
            (HandlerKind::Portal, SceneObject::Portal) => true,
            (HandlerKind::RuneClue, SceneObject::RuneClue) => true,
            (HandlerKind::Rune, SceneObject::Rune(_)) => !gates.runes_solved(),
            (HandlerKind::Terminal, SceneObject::Terminal) => true,
            (HandlerKind::MissingItem, SceneObject::Book(_)) => {
                meta.missing_item && !gates.missing_item_collected()
            }
            (HandlerKind::Bookshelf, SceneObject::Book(book)) => {
                gates.shelf_locked() || gates.on_shelf(book)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub handler: HandlerKind,
    pub id: ObjectId,
    pub object: SceneObject,
}

/// First handler in precedence order with a claim on any hit. Unknown ids
/// are skipped.
pub fn dispatch(hits: &[ObjectId], table: &ObjectTable, gates: &dyn Gates) -> Option<Claim> {
    PRECEDENCE.iter().find_map(|handler| {
        hits.iter().find_map(|id| {
            let meta = table.get(*id)?;
            handler.claims(meta, gates).then_some(Claim {
                handler: *handler,
                id: *id,
                object: meta.object,
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::ColorToken::{Blue, Orange, Purple, Red, Yellow};

    #[derive(Default)]
    struct FakeGates {
        runes_solved: bool,
        collected: bool,
        shelf_locked: bool,
    }

    impl Gates for FakeGates {
        fn runes_solved(&self) -> bool {
            self.runes_solved
        }
        fn missing_item_collected(&self) -> bool {
            self.collected
        }
        fn shelf_locked(&self) -> bool {
            self.shelf_locked
        }
        fn on_shelf(&self, book: ColorToken) -> bool {
            book != Blue || self.collected
        }
    }

    fn table() -> ObjectTable {
        ObjectTable::standard(&[Purple, Orange, Blue, Yellow, Red], Some(Blue))
    }

    fn id(table: &ObjectTable, object: SceneObject) -> ObjectId {
        table.id_of(object).expect("object is tagged")
    }

    #[test]
    fn precedence_order_is_fixed() {
        assert_eq!(
            PRECEDENCE,
            [
                HandlerKind::Portal,
                HandlerKind::RuneClue,
                HandlerKind::Rune,
                HandlerKind::Terminal,
                HandlerKind::MissingItem,
                HandlerKind::Bookshelf,
            ]
        );
    }

    #[test]
    fn portal_wins_even_behind_a_book() {
        let table = table();
        let hits = [
            id(&table, SceneObject::Book(Purple)),
            id(&table, SceneObject::Portal),
        ];
        let claim = dispatch(&hits, &table, &FakeGates::default());
        assert_eq!(claim.map(|claim| claim.handler), Some(HandlerKind::Portal));
    }

    #[test]
    fn solved_runes_fall_through_to_terminal() {
        let table = table();
        let hits = [
            id(&table, SceneObject::Rune(1)),
            id(&table, SceneObject::Terminal),
        ];
        let open = FakeGates::default();
        assert_eq!(
            dispatch(&hits, &table, &open).map(|claim| claim.handler),
            Some(HandlerKind::Rune)
        );
        let solved = FakeGates {
            runes_solved: true,
            ..FakeGates::default()
        };
        assert_eq!(
            dispatch(&hits, &table, &solved).map(|claim| claim.handler),
            Some(HandlerKind::Terminal)
        );
    }

    #[test]
    fn missing_book_goes_to_shelf_once_collected() {
        let table = table();
        let hits = [id(&table, SceneObject::Book(Blue))];
        let hidden = FakeGates {
            shelf_locked: true,
            ..FakeGates::default()
        };
        assert_eq!(
            dispatch(&hits, &table, &hidden).map(|claim| claim.handler),
            Some(HandlerKind::MissingItem)
        );
        let placed = FakeGates {
            collected: true,
            ..FakeGates::default()
        };
        assert_eq!(
            dispatch(&hits, &table, &placed).map(|claim| claim.handler),
            Some(HandlerKind::Bookshelf)
        );
    }

    #[test]
    fn unknown_and_inert_objects_are_unclaimed() {
        let table = table();
        let hits = [ObjectId(9999), id(&table, SceneObject::Door)];
        assert_eq!(dispatch(&hits, &table, &FakeGates::default()), None);
        assert_eq!(dispatch(&[], &table, &FakeGates::default()), None);
    }

    #[test]
    fn only_one_book_is_flagged_missing() {
        let table = table();
        let flagged: Vec<SceneObject> = table
            .iter()
            .filter(|(_, meta)| meta.missing_item)
            .map(|(_, meta)| meta.object)
            .collect();
        assert_eq!(flagged, vec![SceneObject::Book(Blue)]);
    }
}

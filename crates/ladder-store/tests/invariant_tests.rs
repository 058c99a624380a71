use ladder_store::{Category, Store, StoreError, TierId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Select(String),
    AddChild(String),
    RenameChild(String, String),
    DeleteChild(String),
    AddItem(u8, Category, String),
    EditItem(u8, Category, String, String),
    DeleteItem(u8, Category, String),
    MoveItem(Category, String, u8, u8),
    Toggle(String, bool),
}

fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Kid 1".to_string()),
        Just("Ana".to_string()),
        Just("Bo".to_string()),
        Just("Cy".to_string()),
        Just("bad;name".to_string()),
        Just(String::new()),
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Shower daily".to_string()),
        Just("Feed pet".to_string()),
        Just("Laptop".to_string()),
        Just("Walk dog".to_string()),
        Just("Dishes".to_string()),
        Just("no/slash".to_string()),
    ]
}

fn category() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Responsibilities), Just(Category::Privileges)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        name().prop_map(Op::Select),
        name().prop_map(Op::AddChild),
        (name(), name()).prop_map(|(a, b)| Op::RenameChild(a, b)),
        name().prop_map(Op::DeleteChild),
        (1..=5u8, category(), text()).prop_map(|(t, c, x)| Op::AddItem(t, c, x)),
        (1..=5u8, category(), text(), text()).prop_map(|(t, c, a, b)| Op::EditItem(t, c, a, b)),
        (1..=5u8, category(), text()).prop_map(|(t, c, x)| Op::DeleteItem(t, c, x)),
        (category(), text(), 1..=5u8, 1..=5u8).prop_map(|(c, x, f, t)| Op::MoveItem(c, x, f, t)),
        (text(), any::<bool>()).prop_map(|(x, m)| Op::Toggle(x, m)),
    ]
}

fn tier(id: u8) -> TierId {
    TierId::new(id).unwrap()
}

fn apply(store: &mut Store, op: &Op) -> Result<(), StoreError> {
    match op {
        Op::Select(n) => store.select_child(n),
        Op::AddChild(n) => store.add_child(n),
        Op::RenameChild(a, b) => store.rename_child(a, b),
        Op::DeleteChild(n) => store.delete_child(n),
        Op::AddItem(t, c, x) => store.add_item(tier(*t), *c, x),
        Op::EditItem(t, c, a, b) => store.edit_item(tier(*t), *c, a, b),
        Op::DeleteItem(t, c, x) => store.delete_item(tier(*t), *c, x),
        Op::MoveItem(c, x, f, t) => store.move_item(*c, x, tier(*f), tier(*t)),
        Op::Toggle(x, m) => store.toggle_mastery(x, *m),
    }
    .map(|_| ())
}

fn lists_are_unique(store: &Store) -> bool {
    store.profiles().values().all(|profile| {
        profile.tiers().all(|(_, data)| {
            [Category::Responsibilities, Category::Privileges].iter().all(|c| {
                let items = data.items(*c);
                items
                    .iter()
                    .enumerate()
                    .all(|(i, a)| items[i + 1..].iter().all(|b| a != b))
            })
        })
    })
}

proptest! {
    #[test]
    fn prop_invariants_hold_for_any_sequence(ops in proptest::collection::vec(op(), 0..60)) {
        let mut store = Store::default();
        for op in &ops {
            let before = store.clone();
            if apply(&mut store, op).is_err() {
                prop_assert_eq!(&store, &before, "failed {:?} mutated the store", op);
            }
            prop_assert!(store.check_invariants().is_ok(), "after {:?}", op);
            prop_assert!(lists_are_unique(&store), "after {:?}", op);
        }
    }

    #[test]
    fn prop_document_round_trip(ops in proptest::collection::vec(op(), 0..30)) {
        let mut store = Store::default();
        for op in &ops {
            let _ = apply(&mut store, op);
        }
        let back = Store::from_document(store.to_document().unwrap()).unwrap();
        prop_assert_eq!(back, store);
    }
}

#[test]
fn shower_example_walkthrough() {
    let mut store = Store::new("A", ladder_store::Profile::empty());
    store.add_item(tier(1), Category::Responsibilities, "Shower").unwrap();

    assert!(matches!(
        store.add_item(tier(1), Category::Responsibilities, "Shower"),
        Err(StoreError::Duplicate(_))
    ));

    store.toggle_mastery("Shower", true).unwrap();
    assert!(store.is_mastered("Shower"));

    store
        .edit_item(tier(1), Category::Responsibilities, "Shower", "Shower daily")
        .unwrap();
    assert_eq!(store.items(tier(1), Category::Responsibilities), ["Shower daily"]);
    assert_eq!(store.current_mastered().iter().collect::<Vec<_>>(), ["Shower daily"]);
}

//! Undo/redo laws exercised through the session

use ladder_core::{Command, Role, SessionConfig};
use ladder_store::Category;
use ladder_test_utils::{memory_gateway, parent, session_with, tier};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn command() -> impl Strategy<Value = Command> {
    let name = "[A-Z][a-z]{1,6}";
    let text = prop_oneof![Just("Dishes"), Just("Laundry"), Just("Phone"), Just("Make bed")];
    prop_oneof![
        name.prop_map(|name| Command::AddChild { name }),
        name.prop_map(|name| Command::SelectChild { name }),
        (1..=5u8, text.clone()).prop_map(|(t, text)| Command::AddItem {
            tier: tier(t),
            category: Category::Responsibilities,
            text: text.to_string(),
        }),
        (text.clone(), any::<bool>()).prop_map(|(text, mastered)| Command::ToggleMastery {
            text: text.to_string(),
            mastered,
        }),
        (text, 1..=5u8, 1..=5u8).prop_map(|(text, from, to)| Command::MoveItem {
            category: Category::Responsibilities,
            text: text.to_string(),
            from: tier(from),
            to: tier(to),
        }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_undo_every_applied_command_restores_login_state(
        commands in proptest::collection::vec(command(), 0..40)
    ) {
        runtime().block_on(async {
            let gateway = memory_gateway();
            let mut session = session_with(&gateway, SessionConfig::default());
            session.login(parent(), Role::Parent).await.unwrap();
            let baseline = session.store().cloned();

            let mut applied = 0;
            for command in &commands {
                if session.execute(command).is_ok_and(|change| change.is_applied()) {
                    applied += 1;
                }
            }
            prop_assert_eq!(session.history().len(), applied + 1);

            for _ in 0..applied {
                prop_assert!(session.undo().unwrap().is_applied());
            }
            prop_assert_eq!(session.store().cloned(), baseline);
            prop_assert!(!session.history_status().can_undo);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_redo_inverts_undo(commands in proptest::collection::vec(command(), 1..20)) {
        runtime().block_on(async {
            let gateway = memory_gateway();
            let mut session = session_with(&gateway, SessionConfig::default());
            session.login(parent(), Role::Parent).await.unwrap();
            for command in &commands {
                let _ = session.execute(command);
            }

            let before = session.store().cloned();
            if session.undo().unwrap().is_applied() {
                session.redo().unwrap();
            }
            prop_assert_eq!(session.store().cloned(), before);
            Ok::<(), TestCaseError>(())
        })?;
    }
}

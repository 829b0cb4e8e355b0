//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Activate),
        Just(Event::Close),
        "[a-zA-Z ]{1,20}".prop_map(|text| Event::Submit {
            speaker: "user".to_string(),
            text,
        }),
        "[a-zA-Z ]{1,20}".prop_map(|text| Event::ReplyReceived { text }),
        Just(Event::ReplyFailed),
        Just(Event::ConfigChanged),
    ]
}

/// Open/close calls only, as booleans: true = open (Activate while
/// closed), false = close.
fn arb_open_close_ops() -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), 1..30)
}

fn state_is_valid(state: &SessionState) -> bool {
    // A hidden dialog always means an idle NPC.
    state.dialog_open || state.npc == NpcState::Idle
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: any accepted transition leaves a valid state, and a
    // chat request is only issued by a transition into in-flight Thinking.
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut state = SessionState::default();

        for event in events {
            match transition(&state, event) {
                Ok(result) => {
                    prop_assert!(
                        state_is_valid(&result.new_state),
                        "invalid state: {:?}",
                        result.new_state
                    );
                    let requests = result
                        .effects
                        .iter()
                        .filter(|e| matches!(e, Effect::RequestChat { .. }))
                        .count();
                    if requests > 0 {
                        prop_assert_eq!(requests, 1);
                        prop_assert!(result.new_state.in_flight);
                        prop_assert_eq!(result.new_state.npc, NpcState::Thinking);
                        // The slot must have been free before.
                        prop_assert!(!state.in_flight);
                    }
                    state = result.new_state;
                }
                Err(_) => { /* rejected input leaves the state untouched */ }
            }
        }
    }

    // Invariant 2: visibility always equals the most recent open/close
    // call, and NpcState is Idle immediately after any close.
    #[test]
    fn prop_visibility_tracks_last_open_close(ops in arb_open_close_ops()) {
        let mut state = SessionState::default();

        for open in &ops {
            let event = if *open { Event::Activate } else { Event::Close };
            // Activate on an already-open dialog toggles it closed, so
            // drive "open" only from a closed dialog.
            if *open && state.dialog_open {
                continue;
            }
            state = transition(&state, event).unwrap().new_state;
            prop_assert_eq!(state.dialog_open, *open);
            if !*open {
                prop_assert_eq!(state.npc, NpcState::Idle);
            }
        }
    }

    // Invariant 3: while a request is in flight, submits are rejected and
    // never emit a second request.
    #[test]
    fn prop_in_flight_rejects_submit(text in "[a-z]{1,10}") {
        let state = SessionState {
            dialog_open: true,
            npc: NpcState::Thinking,
            in_flight: true,
        };
        let result = transition(
            &state,
            Event::Submit {
                speaker: "user".to_string(),
                text,
            },
        );
        prop_assert!(matches!(result, Err(TransitionError::RequestInFlight)));
    }

    // Invariant 4: the in-flight slot is cleared by both resolution
    // events, regardless of dialog visibility.
    #[test]
    fn prop_resolution_clears_in_flight(open in any::<bool>(), success in any::<bool>()) {
        let state = SessionState {
            dialog_open: open,
            npc: if open { NpcState::Thinking } else { NpcState::Idle },
            in_flight: true,
        };
        let event = if success {
            Event::ReplyReceived {
                text: "ok".to_string(),
            }
        } else {
            Event::ReplyFailed
        };

        let result = transition(&state, event).unwrap();
        prop_assert!(!result.new_state.in_flight);
        prop_assert!(state_is_valid(&result.new_state));
    }

    // Invariant 5: configuration refresh never changes state.
    #[test]
    fn prop_config_change_preserves_state(events in proptest::collection::vec(arb_event(), 0..15)) {
        let mut state = SessionState::default();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }

        let result = transition(&state, Event::ConfigChanged).unwrap();
        prop_assert_eq!(result.new_state, state);
    }
}

use crate::{Effect, Msg, ShellState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ShellState, msg: Msg) -> (ShellState, Vec<Effect>) {
    let effects = match msg {
        Msg::QuerySubmitted(query) => {
            // No trimming or limiting here: the catalog service sees exactly what was typed.
            state.begin_query(&query);
            vec![Effect::RunQuery { query }]
        }
        Msg::ResultsMounted {
            query,
            result_count,
        } => {
            state.mount(query, result_count);
            Vec::new()
        }
        Msg::QueryFailed { query, reason } => {
            state.fail(&query, reason);
            Vec::new()
        }
        Msg::SnapRemoved { id } => {
            if id.is_empty() {
                Vec::new()
            } else {
                vec![Effect::BroadcastRemoval { id }]
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

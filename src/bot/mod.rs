pub mod commands;
pub mod handlers;
pub mod keyboards;

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::booking::BookingService;
use crate::storage::UserStore;

/// Shared handler dependencies, cloned into every endpoint.
#[derive(Clone)]
pub struct BotState {
    pub service: Arc<BookingService>,
    pub store: Arc<UserStore>,
}

pub struct BotHandler {
    state: BotState,
}

impl BotHandler {
    pub fn new(service: Arc<BookingService>, store: Arc<UserStore>) -> Self {
        Self {
            state: BotState { service, store },
        }
    }

    pub fn schema(&self) -> UpdateHandler<teloxide::RequestError> {
        use teloxide::dispatching::UpdateFilterExt;

        let state = self.state.clone();
        let state_callback = self.state.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<commands::Command>()
                    .endpoint(move |bot, msg, cmd| {
                        let state = state.clone();
                        async move { handlers::message::command_handler(bot, msg, cmd, state).await }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(move |bot, q| {
                let state = state_callback.clone();
                async move { handlers::callback::callback_handler(bot, q, state).await }
            }))
    }
}

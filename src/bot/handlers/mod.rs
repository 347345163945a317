pub mod callback;
pub mod message;

use std::sync::Arc;
use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::engine::{ConversationEngine, Inbound};
use crate::bot::transport::{deliver, Outbound, Transport};
use crate::utils::logging::{log_event_done, log_event_error, log_event_start};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

const TRY_AGAIN_LATER: &str = "Щось пішло не так, спробуй ще раз трохи згодом";

pub struct BotHandler {
    pub engine: Arc<ConversationEngine>,
    pub transport: Arc<dyn Transport>,
}

impl BotHandler {
    pub fn new(engine: Arc<ConversationEngine>, transport: Arc<dyn Transport>) -> Self {
        Self { engine, transport }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let engine = self.engine.clone();
        let transport = self.transport.clone();
        let engine_callback = self.engine.clone();
        let transport_callback = self.transport.clone();

        dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let engine = engine.clone();
                let transport = transport.clone();
                async move { message::message_handler(msg, engine, transport).await }
            }))
            .branch(Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let engine = engine_callback.clone();
                let transport = transport_callback.clone();
                async move { callback::callback_handler(bot, q, engine, transport).await }
            }))
    }
}

/// Runs one inbound event through the engine and delivers the replies.
///
/// Storage failures are reported to the user as a generic error; delivery
/// failures are only logged. Nothing here ever stops the dispatcher.
pub async fn process_event(
    engine: &ConversationEngine,
    transport: &dyn Transport,
    user_id: i64,
    inbound: Inbound,
) {
    let kind = inbound.kind();
    match &inbound {
        Inbound::Message(text) => log_event_start(kind, user_id, text),
        Inbound::Callback { payload, .. } => log_event_start(kind, user_id, payload),
    }

    match engine.handle_event(user_id, inbound).await {
        Ok(replies) => {
            let delivered = deliver(transport, user_id, &replies).await;
            log_event_done(kind, user_id, delivered);
        }
        Err(e) => {
            log_event_error(kind, user_id, &e.to_string());
            deliver(transport, user_id, &[Outbound::text(TRY_AGAIN_LATER)]).await;
        }
    }
}

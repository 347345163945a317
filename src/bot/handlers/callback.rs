use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::engine::{ConversationEngine, Inbound};
use crate::bot::handlers::{process_event, HandlerResult};
use crate::bot::transport::Transport;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    engine: Arc<ConversationEngine>,
    transport: Arc<dyn Transport>,
) -> HandlerResult {
    let user_id = q.from.id.0 as i64;

    // Stops the loading spinner on the pressed button; not a user-visible reply.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        tracing::warn!("Failed to answer callback query from user {}: {}", user_id, e);
    }

    let Some(payload) = q.data.clone() else {
        return Ok(());
    };
    let message_id = q.message.as_ref().map(|m| m.id.0);

    process_event(
        &engine,
        transport.as_ref(),
        user_id,
        Inbound::Callback { payload, message_id },
    )
    .await;
    Ok(())
}

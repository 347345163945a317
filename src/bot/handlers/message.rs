use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::engine::{ConversationEngine, Inbound};
use crate::bot::handlers::{process_event, HandlerResult};
use crate::bot::transport::Transport;

pub async fn message_handler(
    msg: Message,
    engine: Arc<ConversationEngine>,
    transport: Arc<dyn Transport>,
) -> HandlerResult {
    // Channel posts and service messages have no sender to attach state to.
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let text = msg.text().unwrap_or_default().to_string();

    process_event(&engine, transport.as_ref(), user_id, Inbound::Message(text)).await;
    Ok(())
}

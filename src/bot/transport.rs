use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, MessageId,
};
use thiserror::Error;

use crate::bot::menu::MAIN_MENU_ROWS;
use crate::utils::logging::log_transport_error;

/// One inline button: visible label plus the opaque callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineChoice {
    pub label: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    None,
    MainMenu,
    /// One button per row.
    Choices(Vec<InlineChoice>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Send { text: String, keyboard: Keyboard },
    Edit { message_id: i32, text: String },
}

impl Outbound {
    pub fn text(text: impl Into<String>) -> Self {
        Outbound::Send {
            text: text.into(),
            keyboard: Keyboard::None,
        }
    }

    pub fn with_menu(text: impl Into<String>) -> Self {
        Outbound::Send {
            text: text.into(),
            keyboard: Keyboard::MainMenu,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Outbound::Send { text, .. } | Outbound::Edit { text, .. } => text,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),

    #[error("delivery failed: {0}")]
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, user_id: i64, text: &str, keyboard: &Keyboard) -> Result<(), TransportError>;

    async fn edit(&self, user_id: i64, message_id: i32, text: &str) -> Result<(), TransportError>;
}

/// Delivers replies in order. Failures are logged and skipped; returns how
/// many replies went through.
pub async fn deliver(transport: &dyn Transport, user_id: i64, replies: &[Outbound]) -> usize {
    let mut delivered = 0;
    for reply in replies {
        let result = match reply {
            Outbound::Send { text, keyboard } => transport.send(user_id, text, keyboard).await,
            Outbound::Edit { message_id, text } => transport.edit(user_id, *message_id, text).await,
        };
        match result {
            Ok(()) => delivered += 1,
            Err(e) => {
                let operation = match reply {
                    Outbound::Send { .. } => "send",
                    Outbound::Edit { .. } => "edit",
                };
                log_transport_error(operation, user_id, &e.to_string());
            }
        }
    }
    delivered
}

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

pub fn main_menu_markup() -> KeyboardMarkup {
    let rows = MAIN_MENU_ROWS
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    KeyboardMarkup::new(rows).resize_keyboard(true)
}

pub fn choices_markup(choices: &[InlineChoice]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(choices.iter().map(|choice| {
        vec![InlineKeyboardButton::callback(
            choice.label.clone(),
            choice.payload.clone(),
        )]
    }))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, user_id: i64, text: &str, keyboard: &Keyboard) -> Result<(), TransportError> {
        let request = self.bot.send_message(ChatId(user_id), text);
        match keyboard {
            Keyboard::None => request.await?,
            Keyboard::MainMenu => request.reply_markup(main_menu_markup()).await?,
            Keyboard::Choices(choices) => request.reply_markup(choices_markup(choices)).await?,
        };
        Ok(())
    }

    async fn edit(&self, user_id: i64, message_id: i32, text: &str) -> Result<(), TransportError> {
        self.bot
            .edit_message_text(ChatId(user_id), MessageId(message_id), text)
            .await?;
        Ok(())
    }
}

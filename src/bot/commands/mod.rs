use teloxide::utils::command::BotCommands;

/// Slash commands, registered with Telegram at startup and listed by /help.
/// Dispatch itself happens in the conversation engine.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команди еко-бота:")]
pub enum Command {
    #[command(description = "Почати або показати свій рівень")]
    Start,
    #[command(description = "Позначити поточну місію виконаною")]
    Done,
    #[command(description = "Увімкнути або вимкнути сповіщення про якість повітря")]
    Ecoalert,
    #[command(description = "Звіт: середній AQI, місії та рівень")]
    Report,
    #[command(description = "Показати цю довідку")]
    Help,
}

/// Reply-keyboard button labels.
pub const MISSION_BUTTON: &str = "Еко-місія";
pub const FACT_BUTTON: &str = "Факт про природу";
pub const QUIZ_BUTTON: &str = "Еко-вікторина";
pub const PROFILE_BUTTON: &str = "Мій профіль";

/// Layout of the persistent main menu, row by row.
pub const MAIN_MENU_ROWS: [[&str; 2]; 2] = [
    [MISSION_BUTTON, FACT_BUTTON],
    [QUIZ_BUTTON, PROFILE_BUTTON],
];

/// What an inbound text asks the bot to do once onboarding is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    Mission,
    Fact,
    Quiz,
    Profile,
    Done,
    ToggleAlerts,
    Report,
    Help,
    Unknown,
}

impl MenuAction {
    /// Matches menu buttons exactly and slash commands by their first word,
    /// so `/start <deep-link>` and `/done@eco_bot` are recognised too.
    pub fn from_text(text: &str) -> Self {
        match text {
            MISSION_BUTTON => return MenuAction::Mission,
            FACT_BUTTON => return MenuAction::Fact,
            QUIZ_BUTTON => return MenuAction::Quiz,
            PROFILE_BUTTON => return MenuAction::Profile,
            _ => {}
        }

        let Some(command) = text.split_whitespace().next() else {
            return MenuAction::Unknown;
        };
        let command = command.split('@').next().unwrap_or(command);

        match command {
            "/start" => MenuAction::Start,
            "/done" => MenuAction::Done,
            "/ecoalert" => MenuAction::ToggleAlerts,
            "/report" => MenuAction::Report,
            "/help" => MenuAction::Help,
            _ => MenuAction::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_buttons() {
        assert_eq!(MenuAction::from_text("Еко-місія"), MenuAction::Mission);
        assert_eq!(MenuAction::from_text("Факт про природу"), MenuAction::Fact);
        assert_eq!(MenuAction::from_text("Еко-вікторина"), MenuAction::Quiz);
        assert_eq!(MenuAction::from_text("Мій профіль"), MenuAction::Profile);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(MenuAction::from_text("/start"), MenuAction::Start);
        assert_eq!(MenuAction::from_text("/start ref123"), MenuAction::Start);
        assert_eq!(MenuAction::from_text("/done@eco_bot"), MenuAction::Done);
        assert_eq!(MenuAction::from_text("/ecoalert"), MenuAction::ToggleAlerts);
        assert_eq!(MenuAction::from_text("/report"), MenuAction::Report);
        assert_eq!(MenuAction::from_text("/help"), MenuAction::Help);
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(MenuAction::from_text(""), MenuAction::Unknown);
        assert_eq!(MenuAction::from_text("hello"), MenuAction::Unknown);
        assert_eq!(MenuAction::from_text("еко-місія"), MenuAction::Unknown);
        assert_eq!(MenuAction::from_text("/starts"), MenuAction::Unknown);
    }
}

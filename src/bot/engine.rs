use chrono::{SubsecRound, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, PoisonError};
use teloxide::utils::command::BotCommands;
use thiserror::Error;
use tracing::debug;

use crate::bot::commands::Command;
use crate::bot::gamification::{mission_available, Level, QuizAnswer};
use crate::bot::menu::MenuAction;
use crate::bot::transport::{InlineChoice, Keyboard, Outbound};
use crate::content::{pick_random, FACTS, MISSIONS, QUIZ};
use crate::database::models::UserRecord;
use crate::database::StoreError;
use crate::services::environment::{fetch_or_placeholder, EnvironmentClient, EnvironmentReading};
use crate::services::user_store::UserStore;
use crate::utils::datetime::today;
use crate::utils::transliterate::to_latin;

/// AQI above which readings count as unhealthy.
pub const AQI_ALERT_THRESHOLD: u32 = 100;

mod texts {
    pub const ASK_CITY: &str = "Привіт! Напиши своє місто (наприклад, Cherkasy або Київ):";
    pub const CHOOSE_FROM_MENU: &str = "Обери дію з меню";
    pub const MISSION_ALREADY_TAKEN: &str = "Ти вже отримав місію сьогодні. Нову можна взяти завтра.";
    pub const NO_ACTIVE_MISSION: &str = "Спочатку отримай місію";
    pub const QUIZ_CORRECT: &str = "Правильно!";
    pub const QUIZ_INCORRECT: &str = "Неправильно";
    pub const ALERTS_ON: &str = "Сповіщення про якість повітря увімкнено";
    pub const ALERTS_OFF: &str = "Сповіщення про якість повітря вимкнено";
    pub const TIP_CLEAN_AIR: &str = "Еко-порада: полий рослину";
    pub const TIP_DIRTY_AIR: &str = "Еко-порада: зачини вікна і відклади прогулянку";
}

/// An inbound event as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(String),
    Callback {
        payload: String,
        /// The message that carried the buttons, when the transport knows it.
        message_id: Option<i32>,
    },
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Message(_) => "message",
            Inbound::Callback { .. } => "callback",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("user {0} vanished from the store")]
    UnknownUser(i64),
}

/// Turns inbound events into persisted state changes and the replies to send.
pub struct ConversationEngine {
    store: Arc<UserStore>,
    environment: Arc<dyn EnvironmentClient>,
    rng: Mutex<StdRng>,
}

impl ConversationEngine {
    pub fn new(store: Arc<UserStore>, environment: Arc<dyn EnvironmentClient>) -> Self {
        Self::with_rng(store, environment, StdRng::from_entropy())
    }

    /// Engine with a deterministic content picker.
    pub fn with_seed(store: Arc<UserStore>, environment: Arc<dyn EnvironmentClient>, seed: u64) -> Self {
        Self::with_rng(store, environment, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: Arc<UserStore>, environment: Arc<dyn EnvironmentClient>, rng: StdRng) -> Self {
        Self {
            store,
            environment,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    /// Processes one inbound event for `user_id` and returns the replies.
    ///
    /// Unknown users are registered (and persisted) before anything else.
    pub async fn handle_event(&self, user_id: i64, inbound: Inbound) -> Result<Vec<Outbound>, EngineError> {
        let user = self.store.get_or_create(user_id).await?;

        match inbound {
            Inbound::Callback { payload, message_id } => {
                self.handle_quiz_answer(user_id, &payload, message_id).await
            }
            Inbound::Message(text) => {
                let action = MenuAction::from_text(&text);
                if action == MenuAction::Start {
                    return Ok(vec![start_reply(&user)]);
                }
                if !user.has_city() && !text.trim().is_empty() {
                    return self.handle_city_update(user_id, &text).await;
                }
                self.dispatch(user, action).await
            }
        }
    }

    async fn dispatch(&self, user: UserRecord, action: MenuAction) -> Result<Vec<Outbound>, EngineError> {
        let reply = match action {
            MenuAction::Start => start_reply(&user),
            MenuAction::Mission => self.handle_mission(user.id).await?,
            MenuAction::Fact => match self.pick(FACTS) {
                Some(fact) => Outbound::with_menu(format!("Факт: {fact}")),
                None => Outbound::with_menu(texts::CHOOSE_FROM_MENU),
            },
            MenuAction::Quiz => self.quiz_question(),
            MenuAction::Profile => Outbound::with_menu(format!(
                "Місій: {}\nРівень: {}",
                user.completed_missions,
                user.level()
            )),
            MenuAction::Done => self.handle_done(user.id).await?,
            MenuAction::ToggleAlerts => {
                let enabled = self
                    .modify(user.id, |u| {
                        u.alerts_enabled = !u.alerts_enabled;
                        u.alerts_enabled
                    })
                    .await?;
                Outbound::with_menu(if enabled { texts::ALERTS_ON } else { texts::ALERTS_OFF })
            }
            MenuAction::Report => Outbound::with_menu(format!(
                "Середній AQI: {:.1}\nМісій: {}\nРівень: {}",
                user.average_aqi(),
                user.completed_missions,
                user.level()
            )),
            MenuAction::Help => Outbound::with_menu(Command::descriptions().to_string()),
            MenuAction::Unknown => Outbound::with_menu(texts::CHOOSE_FROM_MENU),
        };
        Ok(vec![reply])
    }

    /// Stores the transliterated city, then runs a lookup and records the
    /// sample. A failed lookup still records a (zero) sample and stamps the
    /// check time.
    async fn handle_city_update(&self, user_id: i64, raw_city: &str) -> Result<Vec<Outbound>, EngineError> {
        let city = to_latin(raw_city);
        if city.is_empty() {
            return Ok(vec![Outbound::text(texts::ASK_CITY)]);
        }

        self.modify(user_id, |u| u.city = city.clone()).await?;

        let reading = fetch_or_placeholder(self.environment.as_ref(), &city).await;
        // Stored timestamps carry whole seconds only.
        let checked_at = Utc::now().trunc_subsecs(0);
        self.modify(user_id, |u| {
            u.weekly_aqi.push(f64::from(reading.aqi));
            u.last_check = Some(checked_at);
        })
        .await?;

        Ok(vec![Outbound::with_menu(city_summary(&city, &reading))])
    }

    async fn handle_mission(&self, user_id: i64) -> Result<Outbound, EngineError> {
        let today = today();
        let Some(candidate) = self.pick(MISSIONS) else {
            return Ok(Outbound::with_menu(texts::CHOOSE_FROM_MENU));
        };

        let assigned = self
            .modify(user_id, |u| {
                if !mission_available(u.last_mission_date, today) {
                    return None;
                }
                u.current_mission = candidate.to_string();
                u.last_mission_date = Some(today);
                Some(candidate)
            })
            .await?;

        Ok(match assigned {
            Some(mission) => Outbound::with_menu(format!(
                "Місія: {mission}\nКоли виконаєш, напиши /done"
            )),
            None => Outbound::with_menu(texts::MISSION_ALREADY_TAKEN),
        })
    }

    async fn handle_done(&self, user_id: i64) -> Result<Outbound, EngineError> {
        let today = today();
        let (user, outcome) = self
            .store
            .update(user_id, |u| {
                if !u.has_active_mission() {
                    return None;
                }
                let before = u.level();
                u.record_completion();
                u.last_mission_date = Some(today);
                u.current_mission.clear();
                Some(before)
            })
            .await?
            .ok_or(EngineError::UnknownUser(user_id))?;

        let Some(previous_level) = outcome else {
            return Ok(Outbound::with_menu(texts::NO_ACTIVE_MISSION));
        };

        let mut text = format!("Місія виконана! Всього місій: {}", user.completed_missions);
        text.push_str(&level_up_note(previous_level, user.level()));
        Ok(Outbound::with_menu(text))
    }

    async fn handle_quiz_answer(
        &self,
        user_id: i64,
        payload: &str,
        message_id: Option<i32>,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(answer) = QuizAnswer::parse(payload) else {
            debug!("Ignoring malformed quiz payload {:?} from user {}", payload, user_id);
            return Ok(Vec::new());
        };

        let text = if answer.is_correct() {
            let (user, previous_level) = self
                .store
                .update(user_id, |u| {
                    let before = u.level();
                    u.record_completion();
                    before
                })
                .await?
                .ok_or(EngineError::UnknownUser(user_id))?;
            format!("{}{}", texts::QUIZ_CORRECT, level_up_note(previous_level, user.level()))
        } else {
            texts::QUIZ_INCORRECT.to_string()
        };

        Ok(vec![match message_id {
            Some(message_id) => Outbound::Edit { message_id, text },
            None => Outbound::text(text),
        }])
    }

    fn quiz_question(&self) -> Outbound {
        let Some(question) = self.pick(QUIZ) else {
            return Outbound::with_menu(texts::CHOOSE_FROM_MENU);
        };

        let choices = question
            .choices
            .iter()
            .enumerate()
            .map(|(index, label)| InlineChoice {
                label: (*label).to_string(),
                payload: QuizAnswer::encode(index, question.correct),
            })
            .collect();

        Outbound::Send {
            text: question.prompt.to_string(),
            keyboard: Keyboard::Choices(choices),
        }
    }

    fn pick<T: Copy>(&self, items: &[T]) -> Option<T> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        pick_random(items, &mut *rng).copied()
    }

    async fn modify<T, F>(&self, user_id: i64, apply: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut UserRecord) -> T,
    {
        self.store
            .update(user_id, apply)
            .await?
            .map(|(_, outcome)| outcome)
            .ok_or(EngineError::UnknownUser(user_id))
    }
}

fn start_reply(user: &UserRecord) -> Outbound {
    if !user.has_city() {
        return Outbound::text(texts::ASK_CITY);
    }
    Outbound::with_menu(format!(
        "Вітаю!\nРівень: {}\nМісій: {}",
        user.level(),
        user.completed_missions
    ))
}

fn city_summary(city: &str, reading: &EnvironmentReading) -> String {
    let tip = if reading.aqi > AQI_ALERT_THRESHOLD {
        texts::TIP_DIRTY_AIR
    } else {
        texts::TIP_CLEAN_AIR
    };
    format!(
        "Місто: {}\nТемпература: {:.1}°C {}\nAQI: {}\n{}",
        city, reading.temperature, reading.condition, reading.aqi, tip
    )
}

fn level_up_note(before: Level, after: Level) -> String {
    if after > before {
        format!("\nНовий рівень: {after}")
    } else {
        String::new()
    }
}

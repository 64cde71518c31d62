use std::env;
use std::time::Duration;

use log::{error, info};
use thiserror::Error;

pub const BOT_TOKEN_VAR: &str = "DOOR_MONITOR_BOT_TOKEN";
pub const CHAT_IDS_VAR: &str = "DOOR_MONITOR_CHAT_IDS";

// A hung request must never back the dispatch queue up for long.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const OPEN_MESSAGE: &str = "Your door or window is OPEN!";
const CLOSED_MESSAGE: &str = "Your door or window is closed.";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Request(#[from] Box<ureq::Error>),
}

/// Telegram Bot API notifier.
///
/// Each recipient is messaged independently so one failed delivery never
/// blocks the others. Delivery is fire-and-forget: the scheduler retries
/// open reminders on its own cadence, so a failure here is only logged.
pub struct Telegram {
    agent: ureq::Agent,
    url: String,
    recipients: Vec<String>,
}

impl Telegram {
    pub fn new(bot_token: &str, recipients: Vec<String>) -> Telegram {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Telegram {
            agent,
            url: format!("https://api.telegram.org/bot{}/sendMessage", bot_token),
            recipients,
        }
    }

    /// Build a notifier from `DOOR_MONITOR_BOT_TOKEN` and
    /// `DOOR_MONITOR_CHAT_IDS` (comma separated). `None` if either is unset
    /// or no chat id remains after trimming.
    pub fn from_env() -> Option<Telegram> {
        let token = env::var(BOT_TOKEN_VAR).ok()?;
        let recipients: Vec<String> = env::var(CHAT_IDS_VAR)
            .ok()?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        if recipients.is_empty() {
            return None;
        }
        Some(Telegram::new(&token, recipients))
    }

    pub fn notify(&self, is_open: bool) -> Result<(), DeliveryError> {
        let text = if is_open { OPEN_MESSAGE } else { CLOSED_MESSAGE };
        let mut result = Ok(());
        for chat_id in &self.recipients {
            match self.send_to(chat_id, text) {
                Ok(()) => info!("notified chat {}", chat_id),
                Err(err) => {
                    error!("delivery to chat {} failed: {}", chat_id, err);
                    result = Err(err);
                }
            }
        }
        result
    }

    fn send_to(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.agent
            .get(&self.url)
            .query("chat_id", chat_id)
            .query("text", text)
            .call()
            .map_err(Box::new)?;
        Ok(())
    }
}

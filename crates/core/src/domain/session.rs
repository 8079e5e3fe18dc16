use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Guest,
    Customer,
}

/// Transcript and chat-log sender tags. The wire strings are fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    You,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::You => "You",
            Self::Bot => "Bot",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub message: String,
}

/// Per-session state handed into each handler. One instance serves the whole
/// process; there is no multi-session model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub logged_in: bool,
    pub role: Role,
    pub customer_id: Option<CustomerId>,
    pub history: Vec<ChatTurn>,
}

impl SessionContext {
    pub fn login_guest(&mut self) {
        self.logged_in = true;
        self.role = Role::Guest;
        self.customer_id = None;
    }

    pub fn login_customer(&mut self, id: CustomerId) {
        self.logged_in = true;
        self.role = Role::Customer;
        self.customer_id = Some(id);
    }

    /// Logout clears everything, including the transcript.
    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn is_customer(&self) -> bool {
        self.logged_in && self.role == Role::Customer
    }

    pub fn record_turn(&mut self, sender: Sender, message: impl Into<String>) {
        self.history.push(ChatTurn { sender, message: message.into() });
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Sender, SessionContext};
    use crate::domain::customer::CustomerId;

    #[test]
    fn customer_login_sets_role_and_id() {
        let mut session = SessionContext::default();
        session.login_customer(CustomerId::new("c5841053"));

        assert!(session.logged_in);
        assert!(session.is_customer());
        assert_eq!(session.customer_id.as_ref().map(CustomerId::as_str), Some("C5841053"));
    }

    #[test]
    fn guest_login_carries_no_customer_id() {
        let mut session = SessionContext::default();
        session.login_guest();

        assert!(session.logged_in);
        assert_eq!(session.role, Role::Guest);
        assert!(session.customer_id.is_none());
        assert!(!session.is_customer());
    }

    #[test]
    fn logout_resets_to_initial_state() {
        let mut session = SessionContext::default();
        session.login_customer(CustomerId::new("C1010011"));
        session.record_turn(Sender::You, "hello");
        session.record_turn(Sender::Bot, "hi");

        session.logout();

        assert_eq!(session, SessionContext::default());
        assert!(!session.logged_in);
        assert!(session.history.is_empty());
    }
}

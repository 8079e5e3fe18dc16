use teller_core::domain::session::SessionContext;
use teller_core::faq::FaqResponder;
use teller_core::recommend::{Recommender, LOGIN_PROMPT};
use teller_core::segment::segment;

/// Reply when no pipeline stage produced anything.
pub const FALLBACK: &str =
    "Sorry, I couldn't understand that. Please ask a banking-related question.";

pub struct ChatEngine {
    faq: FaqResponder,
    recommender: Recommender,
}

impl ChatEngine {
    pub fn new(faq: FaqResponder, recommender: Recommender) -> Self {
        Self { faq, recommender }
    }

    /// Compose the reply to one inbound message. Both pipeline halves may
    /// contribute a section; sections are joined with a blank line, and an
    /// empty set of sections becomes [`FALLBACK`].
    pub fn respond(&self, session: &SessionContext, input: &str) -> String {
        let segments = segment(input);
        let mut sections = Vec::new();

        if let Some(question) = segments.faq.as_deref() {
            if let Some(answer) = self.faq.answer_multi(question) {
                sections.push(answer);
            }
        }

        if let Some(request) = segments.recommendation.as_deref() {
            sections.push(self.recommendation_reply(session, request));
        }

        if sections.is_empty() {
            return FALLBACK.to_string();
        }
        sections.join("\n\n")
    }

    /// Recommendations require a logged-in customer; everyone else is asked
    /// to log in.
    fn recommendation_reply(&self, session: &SessionContext, request: &str) -> String {
        match session.customer_id.as_ref().filter(|_| session.is_customer()) {
            Some(customer_id) => self.recommender.recommend(customer_id, request),
            None => LOGIN_PROMPT.to_string(),
        }
    }
}

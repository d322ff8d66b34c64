/// How long a message stays fully visible before fading.
pub const FEEDBACK_VISIBLE_MS: u32 = 3_000;
/// Fade duration; matches the CSS opacity transition on the banner.
pub const FEEDBACK_FADE_MS: u32 = 500;

pub const SUCCESS_BACKGROUND: &str = "#4CAF50";
pub const ERROR_BACKGROUND: &str = "#f44336";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub text: String,
    pub is_error: bool,
}

impl FeedbackMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    pub fn class_name(&self) -> &'static str {
        if self.is_error { "error" } else { "" }
    }

    pub fn background(&self) -> &'static str {
        if self.is_error {
            ERROR_BACKGROUND
        } else {
            SUCCESS_BACKGROUND
        }
    }
}

/// Identifies one `show` call. Timers carry it so they only act on the
/// message they were started for.
pub type FeedbackToken = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerPhase {
    Hidden,
    Shown(FeedbackToken),
    Fading(FeedbackToken),
}

/// Transient feedback banner: `Hidden -> Shown -> Fading -> Hidden`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackBanner {
    phase: BannerPhase,
    message: Option<FeedbackMessage>,
    next_token: FeedbackToken,
}

impl Default for FeedbackBanner {
    fn default() -> Self {
        Self {
            phase: BannerPhase::Hidden,
            message: None,
            next_token: 1,
        }
    }
}

impl FeedbackBanner {
    pub fn phase(&self) -> BannerPhase {
        self.phase
    }

    pub fn message(&self) -> Option<&FeedbackMessage> {
        self.message.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, BannerPhase::Hidden)
    }

    pub fn opacity(&self) -> f64 {
        match self.phase {
            BannerPhase::Shown(_) => 1.0,
            BannerPhase::Hidden | BannerPhase::Fading(_) => 0.0,
        }
    }

    /// Display `message`, superseding whatever was shown before.
    pub fn show(&mut self, message: FeedbackMessage) -> FeedbackToken {
        let token = self.next_token;
        self.next_token += 1;
        self.message = Some(message);
        self.phase = BannerPhase::Shown(token);
        token
    }

    /// Start fading. Ignored unless `token` belongs to the message on screen.
    pub fn begin_fade(&mut self, token: FeedbackToken) -> bool {
        if self.phase != BannerPhase::Shown(token) {
            return false;
        }
        self.phase = BannerPhase::Fading(token);
        true
    }

    /// Hide after the fade. Ignored unless `token` is the fading message.
    pub fn hide(&mut self, token: FeedbackToken) -> bool {
        if self.phase != BannerPhase::Fading(token) {
            return false;
        }
        self.phase = BannerPhase::Hidden;
        true
    }
}

use anyhow::Result;
use tracing::debug;

use crate::client::{ChatBackend, Classifier, KeyUpdate};
use crate::core::verdict::AnalysisResult;
use crate::session::Session;
use crate::store::{CredentialStore, SaveError};

/// Buttons of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetKey,
    SaveKey,
    Analyze,
    Clear,
    Quit,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::SetKey,
        Action::SaveKey,
        Action::Analyze,
        Action::Clear,
        Action::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Action::SetKey => "Set API Key",
            Action::SaveKey => "Save Key",
            Action::Analyze => "Analyze",
            Action::Clear => "Clear",
            Action::Quit => "Quit",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellState {
    #[default]
    Idle,
    VerifyingKey,
    Analyzing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Text shown in the form: the URL entry and the three result fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub url: String,
    pub verdict: String,
    pub confidence: String,
    pub rationale: String,
}

impl Form {
    pub fn show(&mut self, result: &AnalysisResult) {
        self.verdict = result.verdict.to_string();
        self.confidence = result.confidence_display();
        self.rationale = result.rationale.clone();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_result(&self) -> bool {
        !self.verdict.is_empty()
    }
}

/// What the shell needs from a front end
pub trait Dialogs {
    /// Pick the next button; errors end the session
    fn choose_action(&mut self, form: &Form) -> Result<Action>;

    /// Modal message box
    fn message(&mut self, severity: Severity, title: &str, text: &str);

    /// Masked input; `None` when the user cancels
    fn ask_secret(&mut self, title: &str, prompt: &str) -> Result<Option<String>>;

    /// Edit the URL field; `None` keeps the current value
    fn ask_url(&mut self, current: &str) -> Result<Option<String>>;

    /// Busy indicator around blocking calls
    fn set_busy(&mut self, busy: bool);
}

pub struct Shell<B, S, U> {
    classifier: Classifier<B>,
    store: S,
    ui: U,
    session: Session,
    form: Form,
    state: ShellState,
}

impl<B, S, U> Shell<B, S, U>
where
    B: ChatBackend,
    S: CredentialStore,
    U: Dialogs,
{
    /// Build the shell, picking up any stored key
    pub fn new(classifier: Classifier<B>, store: S, ui: U) -> Self {
        let session = Session::load(&store);
        Self {
            classifier,
            store,
            ui,
            session,
            form: Form::default(),
            state: ShellState::Idle,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn classifier(&self) -> &Classifier<B> {
        &self.classifier
    }

    /// Event loop: runs until Quit
    pub fn run(&mut self) -> Result<()> {
        loop {
            let action = self.ui.choose_action(&self.form)?;
            if !self.dispatch(action)? {
                return Ok(());
            }
        }
    }

    /// Handle one button press. Returns `false` on Quit.
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        debug!(?action, "dispatch");
        match action {
            Action::SetKey => self.set_api_key()?,
            Action::SaveKey => self.save_key(),
            Action::Analyze => self.analyze()?,
            Action::Clear => self.clear(),
            Action::Quit => return Ok(false),
        }
        Ok(true)
    }

    pub fn set_api_key(&mut self) -> Result<()> {
        let raw = match self.ui.ask_secret("API Key", "Enter your OpenAI API key:")? {
            Some(raw) => raw,
            None => return Ok(()),
        };

        let Self {
            classifier,
            session,
            ui,
            state,
            ..
        } = self;

        let result = classifier.set_and_verify(session, &raw, || {
            *state = ShellState::VerifyingKey;
            ui.set_busy(true);
        });

        if *state == ShellState::VerifyingKey {
            ui.set_busy(false);
            *state = ShellState::Idle;
        }

        match result {
            Ok(KeyUpdate::Unchanged) => {}
            Ok(KeyUpdate::Verified) => ui.message(
                Severity::Info,
                "Success",
                "API key set and verified. Click 'Save Key' to persist.",
            ),
            Err(e) => ui.message(Severity::Error, e.title(), &e.to_string()),
        }

        Ok(())
    }

    pub fn save_key(&mut self) {
        let current = self.session.api_key().map(|k| k.as_str());

        let (severity, title, text) = match self.store.save(current) {
            Ok(()) => (Severity::Info, "Success", "API key saved.".to_string()),
            Err(e @ SaveError::Missing) => (Severity::Warning, "Missing Key", e.to_string()),
            Err(e @ SaveError::InvalidFormat) => (Severity::Error, "Invalid Format", e.to_string()),
            Err(e @ SaveError::Write(_)) => (Severity::Error, "Error", e.to_string()),
        };
        self.ui.message(severity, title, &text);
    }

    /// Analyze button: refresh the URL field, then classify it
    pub fn analyze(&mut self) -> Result<()> {
        if self.session.has_key() {
            if let Some(url) = self.ui.ask_url(&self.form.url)? {
                self.form.url = url;
            }
        }
        self.analyze_current();
        Ok(())
    }

    /// Classify whatever the URL field holds
    pub fn analyze_current(&mut self) {
        self.state = ShellState::Analyzing;
        let result = self.classifier.analyze(&self.session, &self.form.url);
        self.state = ShellState::Idle;

        match result {
            Ok(result) => self.form.show(&result),
            Err(e) => self.ui.message(Severity::Warning, e.title(), &e.to_string()),
        }
    }

    pub fn clear(&mut self) {
        self.form.clear();
    }
}

//! City autocomplete that tolerates out-of-order responses.
//!
//! Every keystroke bumps a generation counter. A suggestion request carries
//! the generation and input that triggered it, and its response is only
//! accepted while both still match. A slow reply for "Lon" therefore
//! cannot replace suggestions once the user has typed "Lond".

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::debug;

use crate::{client::WeatherClient, geocode::long_enough};

/// Identifies one in-flight suggestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    generation: u64,
    input: String,
}

impl SuggestionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Suggestion state for one text field.
#[derive(Debug, Clone, Default)]
pub struct Autocomplete {
    generation: u64,
    input: String,
    suggestions: Vec<String>,
}

impl Autocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new input value.
    ///
    /// Returns a ticket when a lookup should be issued. Input below the
    /// length threshold clears the suggestions instead.
    pub fn input_changed(&mut self, value: &str) -> Option<SuggestionTicket> {
        self.generation += 1;
        self.input = value.to_string();

        if !long_enough(value) {
            self.suggestions.clear();
            return None;
        }

        Some(SuggestionTicket {
            generation: self.generation,
            input: self.input.clone(),
        })
    }

    pub fn is_current(&self, ticket: &SuggestionTicket) -> bool {
        ticket.generation == self.generation && ticket.input == self.input
    }

    /// Apply a response. Stale responses are dropped and `false` is returned.
    pub fn deliver(&mut self, ticket: &SuggestionTicket, suggestions: Vec<String>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                input = %ticket.input,
                "discarding stale suggestions"
            );
            return false;
        }

        self.suggestions = suggestions;
        true
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

/// Suggestions published for a given input value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub input: String,
    pub items: Vec<String>,
}

/// Background task that turns keystrokes into published suggestions.
///
/// Keystrokes go in through [`AutocompleteSession::input`]; accepted
/// results come out on a `watch` channel. The caller is expected to
/// debounce keystrokes itself.
#[derive(Debug)]
pub struct AutocompleteSession {
    inputs: mpsc::Sender<String>,
    published: watch::Receiver<Suggestions>,
    task: JoinHandle<()>,
}

impl AutocompleteSession {
    pub fn spawn(client: WeatherClient) -> Self {
        let (inputs_tx, inputs_rx) = mpsc::channel(32);
        let (published_tx, published_rx) = watch::channel(Suggestions::default());
        let task = tokio::spawn(run(client, inputs_rx, published_tx));

        Self {
            inputs: inputs_tx,
            published: published_rx,
            task,
        }
    }

    /// Feed the field's new value. Returns `false` if the session has stopped.
    pub async fn input(&self, value: impl Into<String>) -> bool {
        self.inputs.send(value.into()).await.is_ok()
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.published.clone()
    }

    pub fn current(&self) -> Suggestions {
        self.published.borrow().clone()
    }
}

impl Drop for AutocompleteSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    client: WeatherClient,
    mut inputs: mpsc::Receiver<String>,
    published: watch::Sender<Suggestions>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(SuggestionTicket, Vec<String>)>();
    let mut state = Autocomplete::new();

    loop {
        tokio::select! {
            value = inputs.recv() => {
                let Some(value) = value else { break };

                match state.input_changed(&value) {
                    Some(ticket) => {
                        let client = client.clone();
                        let done = done_tx.clone();
                        tokio::spawn(async move {
                            let items = client.suggest_cities(ticket.input()).await;
                            let _ = done.send((ticket, items));
                        });
                    }
                    None => publish(&published, &state),
                }
            }
            Some((ticket, items)) = done_rx.recv() => {
                if state.deliver(&ticket, items) {
                    publish(&published, &state);
                }
            }
        }
    }
}

fn publish(published: &watch::Sender<Suggestions>, state: &Autocomplete) {
    published.send_replace(Suggestions {
        input: state.input().to_string(),
        items: state.suggestions().to_vec(),
    });
}

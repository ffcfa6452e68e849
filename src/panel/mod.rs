//! Record-page panel: loading, error with retry, empty and data states.
//!
//! Every load takes a ticket. Only the response for the most recent ticket is
//! applied, so a slow response to an earlier load can't overwrite a newer one.

pub mod format;
pub mod invoke;
pub mod views;

pub use invoke::{InvokeResult, InvokeStatus, LocalInvoker, ServerlessInvoker};
pub use views::{InvoiceCard, InvoiceTable};

use crate::handler::ServerlessContext;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Loading,
    Success(T),
    /// Nothing to show; rendered as a neutral message, not an error
    Empty(String),
    Error(String),
}

/// Data a panel can display
pub trait PanelView: Sized {
    /// Serverless function that produces the data
    const FUNCTION: &'static str;
    const LOADING: &'static str;
    const ERROR_TITLE: &'static str;
    /// Action offered next to the empty message
    const EMPTY_ACTION: Option<&'static str>;

    /// Classify the host's answer into a display state
    fn from_invocation(result: InvokeResult) -> PanelState<Self>;

    fn render(&self) -> Vec<String>;
}

/// Identifies one load; see [`Panel::finish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

pub struct Panel<T> {
    state: PanelState<T>,
    issued: u64,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Panel<T> {
    pub fn new() -> Self {
        Self {
            state: PanelState::Loading,
            issued: 0,
        }
    }

    pub fn state(&self) -> &PanelState<T> {
        &self.state
    }

    /// Enter `Loading` and hand out a fresh ticket
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.state = PanelState::Loading;
        LoadTicket(self.issued)
    }

    /// User-triggered retry; same as starting a new load
    pub fn retry(&mut self) -> LoadTicket {
        self.begin_load()
    }

    /// Apply a load's result. Returns `false` when the ticket is stale.
    pub fn finish(&mut self, ticket: LoadTicket, outcome: PanelState<T>) -> bool {
        if ticket.0 != self.issued {
            debug!(
                "Dropping stale response for load {} (latest is {})",
                ticket.0, self.issued
            );
            return false;
        }
        self.state = outcome;
        true
    }
}

impl<T: PanelView> Panel<T> {
    /// Run the panel's function through `invoker` and apply the result
    pub async fn load(&mut self, invoker: &dyn ServerlessInvoker, context: &ServerlessContext) {
        let ticket = self.begin_load();
        let outcome = match invoker.invoke(T::FUNCTION, context).await {
            Ok(result) => T::from_invocation(result),
            Err(err) => PanelState::Error(err.to_string()),
        };
        self.finish(ticket, outcome);
    }

    pub fn render(&self) -> String {
        let lines = match &self.state {
            PanelState::Loading => vec![T::LOADING.to_string()],
            PanelState::Error(message) => {
                vec![format!("{}: {}", T::ERROR_TITLE, message), "[Retry]".to_string()]
            }
            PanelState::Empty(message) => std::iter::once(message.clone())
                .chain(T::EMPTY_ACTION.map(str::to_string))
                .collect(),
            PanelState::Success(view) => view.render(),
        };
        lines.join("\n")
    }
}

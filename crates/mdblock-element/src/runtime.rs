//! Event loop driving a block element.
//!
//! Attribute changes and content assignments are queued and processed one
//! at a time. Fetches run as tokio tasks that post their outcome back into
//! the same queue, so an element is only ever touched from the loop.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::block::{FetchOutcome, MarkdownBlockElement, UpdateOutcome};
use crate::error::{RenderError, RuntimeClosed};
use crate::fetch::Fetcher;
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};

/// Queued events before senders wait.
const QUEUE_CAPACITY: usize = 100;

/// Input to an [`ElementRuntime`].
#[derive(Debug)]
pub enum ElementEvent {
    /// Set (`Some`) or remove (`None`) a host attribute.
    AttributeChanged { name: String, value: Option<String> },
    /// Assign raw markdown text.
    ContentAssigned(String),
    /// A spawned fetch finished.
    FetchCompleted(FetchOutcome),
}

/// Cloneable sender for [`ElementEvent`]s.
#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<ElementEvent>,
}

impl RuntimeHandle {
    /// Queue an event.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] if the runtime was dropped.
    pub async fn send(&self, event: ElementEvent) -> Result<(), RuntimeClosed> {
        self.tx.send(event).await.map_err(|_| RuntimeClosed)
    }

    /// Queue an attribute write.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] if the runtime was dropped.
    pub async fn set_attribute(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), RuntimeClosed> {
        self.send(ElementEvent::AttributeChanged {
            name: name.into(),
            value: Some(value.into()),
        })
        .await
    }

    /// Queue an attribute removal.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] if the runtime was dropped.
    pub async fn remove_attribute(&self, name: impl Into<String>) -> Result<(), RuntimeClosed> {
        self.send(ElementEvent::AttributeChanged {
            name: name.into(),
            value: None,
        })
        .await
    }

    /// Queue a content assignment.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeClosed`] if the runtime was dropped.
    pub async fn set_content(&self, text: impl Into<String>) -> Result<(), RuntimeClosed> {
        self.send(ElementEvent::ContentAssigned(text.into())).await
    }
}

/// Owns a block element and a fetcher and processes queued events.
pub struct ElementRuntime<F, S = AmmoniaSanitizer> {
    element: MarkdownBlockElement<S>,
    fetcher: Arc<F>,
    tx: mpsc::Sender<ElementEvent>,
    rx: mpsc::Receiver<ElementEvent>,
    in_flight: usize,
}

impl<F: Fetcher, S: Sanitizer> ElementRuntime<F, S> {
    #[must_use]
    pub fn new(element: MarkdownBlockElement<S>, fetcher: F) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        Self {
            element,
            fetcher: Arc::new(fetcher),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn element(&self) -> &MarkdownBlockElement<S> {
        &self.element
    }

    pub fn into_element(self) -> MarkdownBlockElement<S> {
        self.element
    }

    /// Attach the element, starting the initial fetch if `src` is set.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the initial render fails.
    pub async fn attach(&mut self) -> Result<(), RenderError> {
        let outcome = self.element.attach().await;
        self.apply(outcome)
    }

    /// Process events until the queue is empty and no fetch is running.
    ///
    /// # Errors
    ///
    /// Returns the first [`RenderError`]; remaining events stay queued.
    pub async fn run_until_idle(&mut self) -> Result<(), RenderError> {
        loop {
            let event = match self.rx.try_recv() {
                Ok(event) => event,
                Err(_) if self.in_flight == 0 => return Ok(()),
                Err(_) => match self.rx.recv().await {
                    Some(event) => event,
                    None => return Ok(()),
                },
            };
            self.handle_event(event).await?;
        }
    }

    async fn handle_event(&mut self, event: ElementEvent) -> Result<(), RenderError> {
        match event {
            ElementEvent::AttributeChanged { name, value } => {
                let outcome = self.element.set_attribute(&name, value.as_deref()).await;
                self.apply(outcome)
            }
            ElementEvent::ContentAssigned(text) => {
                self.element.set_content(text).await?;
                Ok(())
            }
            ElementEvent::FetchCompleted(outcome) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.element.complete_fetch(outcome).await?;
                Ok(())
            }
        }
    }

    fn apply(&mut self, outcome: UpdateOutcome) -> Result<(), RenderError> {
        if let Some(request) = outcome.fetch {
            let fetcher = Arc::clone(&self.fetcher);
            let tx = self.tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                let outcome = request.run(fetcher.as_ref()).await;
                // Runtime dropped: nobody left to apply it
                let _ = tx.send(ElementEvent::FetchCompleted(outcome)).await;
            });
        }
        outcome.render.map(|_| ())
    }
}

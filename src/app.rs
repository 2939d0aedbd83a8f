use crate::api::{self, ApiError, ExternalPostOutcome, HealthStatus, Tweet, TweetService};
use crate::config::Theme;
use crate::state::{AsyncOp, OpToken, RemoteCollection};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// The two navigable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Generate,
    Feed,
}

/// Completion of a spawned API call, routed back to the app over the
/// event channel and applied through the relevant token check.
#[derive(Debug)]
pub enum ApiEvent {
    GenerateDone {
        token: OpToken,
        result: Result<Tweet, ApiError>,
    },
    RefreshDone {
        token: OpToken,
        result: Result<Vec<Tweet>, ApiError>,
    },
    DeleteDone {
        id: String,
        result: Result<(), ApiError>,
    },
    PostDone {
        token: OpToken,
        result: Result<ExternalPostOutcome, ApiError>,
    },
    HealthDone {
        token: OpToken,
        result: Result<HealthStatus, ApiError>,
    },
}

/// Generate page state: the prompt editor plus the single-tweet result
/// slot. The generated tweet lives only here until the feed's own
/// refresh picks it up; it is never merged into the feed directly.
#[derive(Debug, Default)]
pub struct GenerateView {
    pub prompt: String,
    pub op: AsyncOp<Tweet>,
}

impl GenerateView {
    pub fn add_char(&mut self, c: char) {
        self.prompt.push(c);
    }

    pub fn delete_char(&mut self) {
        self.prompt.pop();
    }
}

/// Feed page state: the remote collection plus cursor and the armed
/// delete confirmation.
#[derive(Debug, Default)]
pub struct FeedView {
    pub collection: RemoteCollection<Tweet>,
    pub cursor: usize,
    pub confirm_delete: Option<String>,
}

impl FeedView {
    pub fn selected(&self) -> Option<&Tweet> {
        self.collection.items().get(self.cursor)
    }

    pub fn scroll_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.cursor + 1 < self.collection.len() {
            self.cursor += 1;
        }
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.collection.len() {
            self.cursor = self.collection.len().saturating_sub(1);
        }
    }
}

/// External-post modal: a draft initialized from the generated tweet's
/// content. Editing the draft never touches the cached tweet.
#[derive(Debug)]
pub struct PostModal {
    pub tweet_id: String,
    pub source_content: String,
    pub draft: String,
    pub op: AsyncOp<ExternalPostOutcome>,
}

impl PostModal {
    fn for_tweet(tweet: &Tweet) -> Self {
        Self {
            tweet_id: tweet.id.clone(),
            source_content: tweet.content.clone(),
            draft: tweet.content.clone(),
            op: AsyncOp::new(),
        }
    }

    pub fn add_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn delete_char(&mut self) {
        self.draft.pop();
    }

    pub fn draft_len(&self) -> usize {
        self.draft.chars().count()
    }
}

pub struct App {
    service: Arc<dyn TweetService>,
    events_tx: mpsc::UnboundedSender<ApiEvent>,
    pub page: Page,
    pub theme: Theme,
    pub generate: GenerateView,
    pub feed: FeedView,
    pub post_modal: Option<PostModal>,
    pub health: AsyncOp<HealthStatus>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        service: Arc<dyn TweetService>,
        theme: Theme,
    ) -> (Self, mpsc::UnboundedReceiver<ApiEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let app = Self {
            service,
            events_tx,
            page: Page::Generate,
            theme,
            generate: GenerateView::default(),
            feed: FeedView::default(),
            post_modal: None,
            health: AsyncOp::new(),
            status: None,
            should_quit: false,
        };
        (app, events_rx)
    }

    // ---- flows ------------------------------------------------------

    /// Submit the prompt. Validation failures become a local Failure on
    /// the slot without any network call.
    pub fn submit_generate(&mut self) {
        let prompt = match api::validate_prompt(&self.generate.prompt) {
            Ok(trimmed) => trimmed.to_string(),
            Err(err) => {
                let token = self.generate.op.start();
                self.generate.op.complete(token, Err(err));
                return;
            }
        };

        self.status = None;
        let token = self.generate.op.start();
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.generate(&prompt).await;
            let _ = tx.send(ApiEvent::GenerateDone { token, result });
        });
    }

    pub fn refresh_feed(&mut self) {
        let token = self.feed.collection.begin_refresh();
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.list().await;
            let _ = tx.send(ApiEvent::RefreshDone { token, result });
        });
    }

    /// Issue the delete for an armed confirmation. A delete already in
    /// flight for the same id makes this a no-op rather than a duplicate
    /// request.
    pub fn confirm_delete(&mut self) {
        let Some(id) = self.feed.confirm_delete.take() else {
            return;
        };
        if !self.feed.collection.begin_delete(&id) {
            debug!(%id, "delete already pending, ignoring repeat");
            return;
        }
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.delete_by_id(&id).await;
            let _ = tx.send(ApiEvent::DeleteDone { id, result });
        });
    }

    /// Open the external-post modal for the currently generated tweet.
    pub fn open_post_modal(&mut self) {
        if let Some(tweet) = self.generate.op.value() {
            self.post_modal = Some(PostModal::for_tweet(tweet));
        }
    }

    pub fn close_post_modal(&mut self) {
        self.post_modal = None;
    }

    /// Forward the edited draft to the external service. Empty and
    /// over-limit drafts fail locally without a call.
    pub fn submit_post(&mut self) {
        let Some(modal) = &mut self.post_modal else {
            return;
        };
        if modal.op.is_pending() {
            return;
        }
        let content = match api::validate_post_content(&modal.draft) {
            Ok(trimmed) => trimmed.to_string(),
            Err(err) => {
                let token = modal.op.start();
                modal.op.complete(token, Err(err));
                return;
            }
        };

        let token = modal.op.start();
        let id = modal.tweet_id.clone();
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.post_external(&id, &content).await;
            let _ = tx.send(ApiEvent::PostDone { token, result });
        });
    }

    /// Liveness probe; informational only, gates nothing.
    pub fn check_health(&mut self) {
        let token = self.health.start();
        let service = Arc::clone(&self.service);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.health_check().await;
            let _ = tx.send(ApiEvent::HealthDone { token, result });
        });
    }

    // ---- event application ------------------------------------------

    pub fn apply(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::GenerateDone { token, result } => {
                let applied = self.generate.op.complete(token, result);
                if applied && self.generate.op.value().is_some() {
                    // the prompt clears only on success
                    self.generate.prompt.clear();
                }
            }
            ApiEvent::RefreshDone { token, result } => {
                self.feed.collection.finish_refresh(token, result);
                self.feed.clamp_cursor();
            }
            ApiEvent::DeleteDone { id, result } => {
                let succeeded = result.is_ok();
                self.feed.collection.finish_delete(&id, result);
                self.feed.clamp_cursor();
                if succeeded {
                    self.status = Some("Tweet deleted.".to_string());
                }
            }
            ApiEvent::PostDone { token, result } => {
                // the modal may have been dismissed while the call ran
                if let Some(modal) = &mut self.post_modal {
                    let applied = modal.op.complete(token, result);
                    if applied {
                        if let Some(outcome) = modal.op.value() {
                            self.status = Some(match &outcome.external_id {
                                Some(id) => format!("Posted to Twitter clone (id {}).", id),
                                None => "Posted to Twitter clone.".to_string(),
                            });
                            self.post_modal = None;
                        }
                    }
                }
            }
            ApiEvent::HealthDone { token, result } => {
                self.health.complete(token, result);
            }
        }
    }

    // ---- navigation & input -----------------------------------------

    pub fn goto(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.page = page;
        self.status = None;
        if page == Page::Feed
            && !self.feed.collection.loaded_once()
            && !self.feed.collection.refresh_op().is_pending()
        {
            // first visit loads the feed automatically
            self.refresh_feed();
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::Char('t') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.toggle_theme();
            return;
        }

        if self.post_modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        match key.code {
            KeyCode::Tab => {
                let next = match self.page {
                    Page::Generate => Page::Feed,
                    Page::Feed => Page::Generate,
                };
                self.goto(next);
                return;
            }
            _ => {}
        }

        match self.page {
            Page::Generate => self.handle_generate_key(key),
            Page::Feed => self.handle_feed_key(key),
        }
    }

    fn handle_generate_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if !self.generate.op.is_pending() {
                    self.submit_generate();
                }
            }
            KeyCode::Backspace => self.generate.delete_char(),
            KeyCode::Esc => {
                if self.generate.op.error().is_some() {
                    self.generate.op.reset();
                }
                self.status = None;
            }
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.open_post_modal();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.generate.add_char(c);
            }
            _ => {}
        }
    }

    fn handle_feed_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('r') => {
                if !self.feed.collection.refresh_op().is_pending() {
                    self.refresh_feed();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.feed.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.feed.scroll_up(),
            KeyCode::Char('d') => {
                if let Some(tweet) = self.feed.selected() {
                    if !self.feed.collection.is_delete_pending(&tweet.id) {
                        self.feed.confirm_delete = Some(tweet.id.clone());
                    }
                }
            }
            KeyCode::Char('y') => self.confirm_delete(),
            KeyCode::Char('n') => self.feed.confirm_delete = None,
            KeyCode::Esc => {
                self.feed.confirm_delete = None;
                self.feed.collection.dismiss_refresh_error();
                self.feed.collection.dismiss_delete_error();
                self.status = None;
            }
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = &mut self.post_modal else {
            return;
        };
        match key.code {
            KeyCode::Enter => self.submit_post(),
            KeyCode::Esc => {
                // closing while posting abandons the call; its completion
                // will find the modal gone and be dropped
                self.post_modal = None;
            }
            KeyCode::Backspace => modal.delete_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                modal.add_char(c);
            }
            _ => {}
        }
    }
}

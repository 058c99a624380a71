//! Per-login session controller
//!
//! Owns the store, its undo history and the save queue for one signed-in
//! account. Every mutation goes through [`Session::apply`]: the store
//! operation runs first, and only an applied change is recorded and saved.

use crate::activity::{ActivityLog, ActivityRecorder, CompletionRecord};
use crate::config::SessionConfig;
use crate::error::{LadderError, LadderResult};
use crate::gateway::PersistenceGateway;
use crate::invite::Invitation;
use crate::saver::SaveQueue;
use crate::types::{Action, Notification, Role, SessionState, UserId};
use chrono::{DateTime, Local, Utc};
use ladder_history::{History, HistoryStatus};
use ladder_store::{Category, Change, Store, StoreResult, TierId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Session controller
pub struct Session {
    config: SessionConfig,
    gateway: Arc<dyn PersistenceGateway>,
    state: SessionState,
    role: Role,
    user: Option<UserId>,
    owner: Option<UserId>,
    store: Option<Store>,
    history: History<Store>,
    saver: Option<SaveQueue>,
    activity: Option<ActivityLog>,
    recorder: Option<ActivityRecorder>,
    notices: broadcast::Sender<Notification>,
}

impl Session {
    /// Create a session in the `Uninitialized` state
    #[must_use]
    pub fn new(config: SessionConfig, gateway: Arc<dyn PersistenceGateway>) -> Self {
        let (notices, _) = broadcast::channel(config.notification_capacity.max(1));
        let history = History::new(config.max_history);
        Self {
            config,
            gateway,
            state: SessionState::Uninitialized,
            role: Role::Parent,
            user: None,
            owner: None,
            store: None,
            history,
            saver: None,
            activity: None,
            recorder: None,
            notices,
        }
    }

    /// Record child completions in `log`
    ///
    /// When a child signed in through an invitation marks a responsibility
    /// as mastered, a [`CompletionRecord`] for today is written to the log.
    #[must_use]
    pub fn with_activity_log(mut self, log: ActivityLog) -> Self {
        self.activity = Some(log);
        self
    }

    /// Sign in and load the user's own store
    ///
    /// A missing or invalid document is replaced by the default store and
    /// saved. The loaded store becomes the first history entry.
    ///
    /// # Errors
    /// [`LadderError::Persistence`] if the gateway fails; the session is then
    /// back to `Uninitialized`
    pub async fn login(&mut self, user: UserId, role: Role) -> LadderResult<()> {
        self.open(user.clone(), user, role, None).await
    }

    /// Sign in a child through an invitation
    ///
    /// Loads the inviting parent's store and selects the invited profile.
    /// The selection is part of the baseline, not a recorded action.
    ///
    /// # Errors
    /// [`LadderError::Invite`] if the invitation is expired or used, otherwise
    /// as [`Session::login`]
    pub async fn login_child(
        &mut self,
        child: UserId,
        invitation: &mut Invitation,
        now: DateTime<Utc>,
    ) -> LadderResult<()> {
        let mut redeemed = invitation.clone();
        let claim = redeemed
            .redeem(child.clone(), now)
            .map_err(|e| self.reject(e.into()))?;
        info!(child = %child, parent = %claim.parent_uid, kid = %claim.kid_name, "Invite accepted");
        self.open(child, claim.parent_uid, Role::Child, Some(claim.kid_name))
            .await?;

        // spent only once the parent's store is loaded
        *invitation = redeemed;
        Ok(())
    }

    async fn open(
        &mut self,
        user: UserId,
        owner: UserId,
        role: Role,
        select: Option<String>,
    ) -> LadderResult<()> {
        let default_kid = self.config.default_kid_name().map_err(|e| self.reject(e))?;
        self.close().await;
        self.state = SessionState::Loading;
        info!(user = %user, owner = %owner, ?role, "Loading store");

        let loaded = match self.gateway.load(&owner).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(owner = %owner, error = %e, "Store load failed");
                self.state = SessionState::Uninitialized;
                return Err(self.reject(e.into()));
            }
        };

        let (mut store, persist) = match loaded {
            None => {
                info!(owner = %owner, "No stored document, starting from default");
                (Store::with_default_profile(&default_kid), true)
            }
            Some(document) => match Store::from_document(document) {
                Ok(store) => (store, false),
                Err(e) => {
                    warn!(owner = %owner, error = %e, "Stored document invalid, replacing with default");
                    self.notify(Notification::warning("Failed to load data. Using default store."));
                    (Store::with_default_profile(&default_kid), true)
                }
            },
        };

        if let Some(kid) = select {
            if let Err(e) = store.select_child(&kid) {
                warn!(kid = %kid, error = %e, "Invited profile missing, keeping current");
                self.notify(Notification::warning(e.to_string()));
            }
        }

        self.history = History::new(self.config.max_history);
        self.history.record(Action::Load.label(), &store);

        let mut saver = SaveQueue::spawn(Arc::clone(&self.gateway), owner.clone(), self.notices.clone());
        if persist {
            saver.request(&store);
        }

        self.recorder = match (&self.activity, role) {
            (Some(log), Role::Child) => Some(ActivityRecorder::spawn(log.clone(), self.notices.clone())),
            _ => None,
        };
        self.store = Some(store);
        self.saver = Some(saver);
        self.user = Some(user);
        self.owner = Some(owner);
        self.role = role;
        self.state = SessionState::Ready;
        info!(?role, "Session ready");
        Ok(())
    }

    /// Sign out, dropping store and history
    ///
    /// Pending saves are written before the worker stops.
    ///
    /// # Errors
    /// [`LadderError::Persistence`] if that final write failed; the session
    /// is cleared regardless
    pub async fn logout(&mut self) -> LadderResult<()> {
        if let Some(recorder) = self.recorder.take() {
            recorder.shutdown().await;
        }
        let result = match self.saver.take() {
            Some(saver) => saver.shutdown().await.map_err(LadderError::from),
            None => Ok(()),
        };
        self.store = None;
        self.history.clear();
        self.user = None;
        self.owner = None;
        self.state = SessionState::Cleared;
        info!("Logged out");
        result
    }

    async fn close(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            recorder.shutdown().await;
        }
        if let Some(saver) = self.saver.take() {
            if let Err(e) = saver.shutdown().await {
                warn!(error = %e, "Final save of previous login failed");
            }
        }
        self.store = None;
        self.history.clear();
    }

    // ---- mutation catalogue ----

    /// Make `kid` the active profile
    ///
    /// # Errors
    /// `NotFound` for an unknown name, `NotReady` outside `Ready`
    pub fn select_child(&mut self, kid: &str) -> LadderResult<Change> {
        self.apply(Action::SelectChild, |store| store.select_child(kid))
    }

    /// Add a profile from the default template and select it
    ///
    /// # Errors
    /// `Validation` or `Duplicate` for a bad name
    pub fn add_child(&mut self, name: &str) -> LadderResult<Change> {
        self.apply(Action::AddChild, |store| store.add_child(name))
    }

    /// Rename a profile, carrying its mastery along
    ///
    /// # Errors
    /// `Validation`, `Duplicate` or `NotFound`
    pub fn rename_child(&mut self, old: &str, new: &str) -> LadderResult<Change> {
        self.apply(Action::RenameChild, |store| store.rename_child(old, new))
    }

    /// Remove a profile
    ///
    /// # Errors
    /// `Invariant` when it is the only profile, `NotFound` when absent
    pub fn delete_child(&mut self, kid: &str) -> LadderResult<Change> {
        self.apply(Action::DeleteChild, |store| store.delete_child(kid))
    }

    /// Append an item to the active profile
    ///
    /// # Errors
    /// `Validation` or `Duplicate`
    pub fn add_item(&mut self, tier: TierId, category: Category, text: &str) -> LadderResult<Change> {
        let change = self.apply(Action::AddItem, |store| store.add_item(tier, category, text))?;
        if change.is_applied() {
            self.notify(Notification::success(format!(
                "Added \"{}\" to {}",
                text.trim(),
                category.singular()
            )));
        }
        Ok(change)
    }

    /// Replace an item's text in place
    ///
    /// # Errors
    /// `Validation`, `Duplicate` or `NotFound`
    pub fn edit_item(&mut self, tier: TierId, category: Category, old: &str, new: &str) -> LadderResult<Change> {
        self.apply(Action::EditItem, |store| store.edit_item(tier, category, old, new))
    }

    /// Remove an item
    ///
    /// # Errors
    /// `NotFound`
    pub fn delete_item(&mut self, tier: TierId, category: Category, text: &str) -> LadderResult<Change> {
        self.apply(Action::DeleteItem, |store| store.delete_item(tier, category, text))
    }

    /// Move an item to another tier, appending it there
    ///
    /// # Errors
    /// `Duplicate` at the destination or `NotFound` at the source
    pub fn move_item(&mut self, category: Category, text: &str, from: TierId, to: TierId) -> LadderResult<Change> {
        self.apply(Action::MoveItem, |store| store.move_item(category, text, from, to))
    }

    /// Set mastery of a responsibility for the active child
    ///
    /// A child newly marking a responsibility also records today's
    /// completion when an activity log is attached.
    ///
    /// # Errors
    /// `NotReady` outside `Ready`
    pub fn toggle_mastery(&mut self, text: &str, mastered: bool) -> LadderResult<Change> {
        let change = self.apply(Action::ToggleMastery, |store| store.toggle_mastery(text, mastered))?;
        if mastered && change.is_applied() {
            self.record_completion(text);
        }
        Ok(change)
    }

    fn record_completion(&self, text: &str) {
        if let (Some(recorder), Some(child)) = (&self.recorder, &self.user) {
            recorder.submit(CompletionRecord::new(child.clone(), text, Local::now().date_naive()));
        }
    }

    /// Restore the previous snapshot
    ///
    /// `Unchanged` when nothing is left to undo.
    ///
    /// # Errors
    /// `NotReady` outside `Ready`
    pub fn undo(&mut self) -> LadderResult<Change> {
        self.step(Step::Back)
    }

    /// Restore the snapshot undone last
    ///
    /// `Unchanged` when nothing is left to redo.
    ///
    /// # Errors
    /// `NotReady` outside `Ready`
    pub fn redo(&mut self) -> LadderResult<Change> {
        self.step(Step::Forward)
    }

    /// Run a store operation as one recorded action
    fn apply<F>(&mut self, action: Action, op: F) -> LadderResult<Change>
    where
        F: FnOnce(&mut Store) -> StoreResult<Change>,
    {
        let store = match (self.state, self.store.as_mut()) {
            (SessionState::Ready, Some(store)) => store,
            (state, _) => return Err(reject(&self.notices, LadderError::not_ready(state))),
        };

        match op(&mut *store) {
            Err(e) => {
                debug!(%action, error = %e, "Mutation rejected");
                Err(reject(&self.notices, e.into()))
            }
            Ok(Change::Unchanged) => {
                debug!(%action, "Mutation had no effect");
                Ok(Change::Unchanged)
            }
            Ok(Change::Applied) => {
                self.history.record(action.label(), store);
                if let Some(saver) = self.saver.as_mut() {
                    saver.request(store);
                }
                debug!(%action, entries = self.history.len(), "Mutation recorded");
                Ok(Change::Applied)
            }
        }
    }

    fn step(&mut self, step: Step) -> LadderResult<Change> {
        let store = match (self.state, self.store.as_mut()) {
            (SessionState::Ready, Some(store)) => store,
            (state, _) => return Err(reject(&self.notices, LadderError::not_ready(state))),
        };

        let snapshot = match step {
            Step::Back => self.history.undo(),
            Step::Forward => self.history.redo(),
        };
        let Some(snapshot) = snapshot else {
            return Ok(Change::Unchanged);
        };

        store.clone_from(snapshot);
        if let Some(saver) = self.saver.as_mut() {
            saver.request(store);
        }
        debug!(?step, cursor = self.history.cursor(), "History step restored");
        Ok(Change::Applied)
    }

    // ---- outside the history ----

    /// Issue an invitation for the active child
    ///
    /// # Errors
    /// `NotReady` outside `Ready`
    pub fn create_invite(&self, now: DateTime<Utc>) -> LadderResult<Invitation> {
        let (store, owner) = match (self.state, self.store.as_ref(), self.owner.as_ref()) {
            (SessionState::Ready, Some(store), Some(owner)) => (store, owner),
            (state, ..) => return Err(reject(&self.notices, LadderError::not_ready(state))),
        };

        let invitation = self
            .config
            .invite_ttl()
            .and_then(|ttl| Invitation::issue(owner.clone(), store.current_kid(), now, ttl))
            .map_err(|e| reject(&self.notices, e))?;
        info!(code = %invitation.code, kid = %invitation.kid_name, "Invite issued");
        self.notify(Notification::success(format!("Invite code {} created", invitation.code)));
        Ok(invitation)
    }

    /// Wait until the newest requested save and every queued completion
    /// have been written
    ///
    /// # Errors
    /// [`LadderError::Persistence`] if that save failed
    pub async fn flush(&self) -> LadderResult<()> {
        if let Some(recorder) = &self.recorder {
            recorder.flush().await;
        }
        match &self.saver {
            Some(saver) => saver.flush().await.map_err(LadderError::from),
            None => Ok(()),
        }
    }

    /// Receive notifications published after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notices.subscribe()
    }

    // ---- reads ----

    /// Lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether mutations are accepted
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Role of the signed-in user
    #[inline]
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Signed-in account
    #[must_use]
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// Account whose document is loaded; the parent for child logins
    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Live store, `None` unless ready
    #[must_use]
    pub fn store(&self) -> Option<&Store> {
        self.store.as_ref()
    }

    /// Undo/redo availability
    #[must_use]
    pub fn history_status(&self) -> HistoryStatus {
        self.history.status()
    }

    /// Recorded history
    #[must_use]
    pub fn history(&self) -> &History<Store> {
        &self.history
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Attached completion log
    #[must_use]
    pub fn activity_log(&self) -> Option<&ActivityLog> {
        self.activity.as_ref()
    }

    fn notify(&self, notice: Notification) {
        // no subscribers is fine
        let _ = self.notices.send(notice);
    }

    fn reject(&self, err: LadderError) -> LadderError {
        reject(&self.notices, err)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("role", &self.role)
            .field("user", &self.user)
            .field("owner", &self.owner)
            .field("history", &self.history.status())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Back,
    Forward,
}

fn reject(notices: &broadcast::Sender<Notification>, err: LadderError) -> LadderError {
    let _ = notices.send(Notification::error(err.to_string()));
    err
}

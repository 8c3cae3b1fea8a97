//! Favorites digest: a single pending reminder that counts the articles
//! saved for later and fires at the configured time of day.
//!
//! [`LocalNotificationController`] implements the scheduling rules on top
//! of any [`NotificationCenter`]. [`DigestCenter`] is the center used by the
//! terminal front end: it keeps the pending request in preferences and hands
//! it out once it is due.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::Article;
use crate::news::{NotificationScheduler, NotificationSettings};
use crate::storage::{keys, PreferenceStore};

pub const DIGEST_IDENTIFIER: &str = "com.newsdesk.favorites.digest";
pub const DIGEST_TITLE: &str = "You have news for reading";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

/// A scheduled, non-repeating digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub count: u32,
    pub fire_at: NaiveDateTime,
}

impl DigestRequest {
    pub fn new(count: u32, fire_at: NaiveDateTime) -> Self {
        Self {
            identifier: DIGEST_IDENTIFIER.to_string(),
            title: DIGEST_TITLE.to_string(),
            body: digest_body(count),
            count,
            fire_at,
        }
    }
}

pub fn digest_body(count: u32) -> String {
    if count == 1 {
        "1 article".to_string()
    } else {
        format!("{count} articles")
    }
}

/// Next wall-clock moment at `hour:minute` strictly after `now`.
pub fn next_occurrence(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(time);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Host notification facility.
pub trait NotificationCenter {
    fn authorization_status(&self) -> AuthorizationStatus;
    /// Ask the user for permission; returns whether it was granted.
    fn request_authorization(&mut self) -> bool;
    /// The pending digest, if any. Only one is ever pending.
    fn pending(&self) -> Option<DigestRequest>;
    /// Add or replace the pending request with the same identifier.
    fn add(&mut self, request: DigestRequest);
    fn remove_all(&mut self);
}

/// Keeps the digest count in step with favorite changes.
pub struct LocalNotificationController<C, S> {
    center: C,
    settings: S,
}

impl<C: NotificationCenter, S: NotificationSettings> LocalNotificationController<C, S> {
    pub fn new(center: C, settings: S) -> Self {
        Self { center, settings }
    }

    pub fn center(&self) -> &C {
        &self.center
    }

    fn add_request(&mut self, count: u32) {
        let (hour, minute) = self.settings.time();
        let fire_at = next_occurrence(Local::now().naive_local(), hour, minute);
        tracing::debug!(count, %fire_at, "Scheduling digest");
        self.center.add(DigestRequest::new(count, fire_at));
    }

    fn pending_count(&self) -> Option<u32> {
        self.center.pending().map(|request| request.count)
    }

    fn increment(&mut self) {
        let count = self.pending_count().map_or(1, |count| count + 1);
        self.add_request(count);
    }
}

impl<C: NotificationCenter, S: NotificationSettings> NotificationScheduler
    for LocalNotificationController<C, S>
{
    fn add_notification(&mut self, _article: &Article) {
        match self.center.authorization_status() {
            AuthorizationStatus::Authorized => self.increment(),
            AuthorizationStatus::NotDetermined => {
                if self.center.request_authorization() {
                    self.increment();
                } else {
                    tracing::info!("Notification permission not granted");
                }
            }
            AuthorizationStatus::Denied => {
                tracing::info!("Notifications denied, digest not scheduled");
            }
        }
    }

    fn remove_notification(&mut self, _article: &Article) {
        match self.pending_count() {
            Some(count) if count > 1 => self.add_request(count - 1),
            _ => self.center.remove_all(),
        }
    }

    fn remove_all(&mut self) {
        self.center.remove_all();
    }

    fn update_schedule(&mut self) {
        if let Some(count) = self.pending_count() {
            self.add_request(count);
        }
    }
}

/// Notification center for the terminal: the pending digest lives in
/// preferences and is shown in the status bar once due.
#[derive(Clone)]
pub struct DigestCenter {
    prefs: PreferenceStore,
    authorized: bool,
}

impl DigestCenter {
    pub fn new(prefs: PreferenceStore, authorized: bool) -> Self {
        Self { prefs, authorized }
    }

    /// Remove and return the pending digest if it is due at `now`.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Option<DigestRequest> {
        let request = self.pending()?;
        if request.fire_at > now {
            return None;
        }
        self.prefs.remove(keys::NOTIFICATIONS_PENDING);
        tracing::info!(count = request.count, "Digest due");
        Some(request)
    }
}

impl NotificationCenter for DigestCenter {
    fn authorization_status(&self) -> AuthorizationStatus {
        if self.authorized {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        }
    }

    fn request_authorization(&mut self) -> bool {
        self.authorized
    }

    fn pending(&self) -> Option<DigestRequest> {
        self.prefs.get(keys::NOTIFICATIONS_PENDING)
    }

    fn add(&mut self, request: DigestRequest) {
        self.prefs.set(keys::NOTIFICATIONS_PENDING, &request);
    }

    fn remove_all(&mut self) {
        self.prefs.remove(keys::NOTIFICATIONS_PENDING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CenterState {
        status: Option<AuthorizationStatus>,
        grant: bool,
        pending: Option<DigestRequest>,
        calls: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct RecordingCenter(Rc<RefCell<CenterState>>);

    impl NotificationCenter for RecordingCenter {
        fn authorization_status(&self) -> AuthorizationStatus {
            let mut state = self.0.borrow_mut();
            state.calls.push("status".into());
            state.status.unwrap_or(AuthorizationStatus::Authorized)
        }
        fn request_authorization(&mut self) -> bool {
            let mut state = self.0.borrow_mut();
            state.calls.push("request_authorization".into());
            state.grant
        }
        fn pending(&self) -> Option<DigestRequest> {
            self.0.borrow().pending.clone()
        }
        fn add(&mut self, request: DigestRequest) {
            let mut state = self.0.borrow_mut();
            state.calls.push(format!("add({})", request.count));
            state.pending = Some(request);
        }
        fn remove_all(&mut self) {
            let mut state = self.0.borrow_mut();
            state.calls.push("remove_all".into());
            state.pending = None;
        }
    }

    struct FixedSettings;

    impl NotificationSettings for FixedSettings {
        fn notifications_enabled(&self) -> bool {
            true
        }
        fn set_notifications_enabled(&mut self, _enabled: bool) {}
        fn time(&self) -> (u32, u32) {
            (19, 0)
        }
        fn update_time(&mut self, _hour: u32, _minute: u32) {}
    }

    fn article() -> Article {
        Article {
            author: "testauthor".into(),
            title: "testtitle".into(),
            description: "testdesc".into(),
            url: "testurl".into(),
            image_url: "testurlToImage".into(),
            published_at: "testpublishedAt".into(),
        }
    }

    fn controller() -> (
        LocalNotificationController<RecordingCenter, FixedSettings>,
        RecordingCenter,
    ) {
        let center = RecordingCenter::default();
        (
            LocalNotificationController::new(center.clone(), FixedSettings),
            center,
        )
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 5, 20)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_body_pluralization() {
        assert_eq!(digest_body(1), "1 article");
        assert_eq!(digest_body(2), "2 articles");
        assert_eq!(digest_body(0), "0 articles");
    }

    #[test]
    fn test_next_occurrence() {
        assert_eq!(next_occurrence(at(10, 0), 19, 0), at(19, 0));
        assert_eq!(
            next_occurrence(at(19, 0), 19, 0),
            at(19, 0) + Duration::days(1)
        );
        assert_eq!(
            next_occurrence(at(22, 30), 10, 0),
            at(10, 0) + Duration::days(1)
        );
    }

    #[test]
    fn test_add_counts_up() {
        let (mut controller, center) = controller();
        controller.add_notification(&article());
        controller.add_notification(&article());
        let pending = center.pending().unwrap();
        assert_eq!(pending.count, 2);
        assert_eq!(pending.body, "2 articles");
        assert_eq!(pending.title, DIGEST_TITLE);
        assert_eq!(pending.identifier, DIGEST_IDENTIFIER);
    }

    #[test]
    fn test_add_when_not_determined_requests_permission() {
        let (mut controller, center) = controller();
        center.0.borrow_mut().status = Some(AuthorizationStatus::NotDetermined);
        center.0.borrow_mut().grant = true;
        controller.add_notification(&article());
        assert_eq!(
            center.0.borrow().calls,
            vec!["status", "request_authorization", "add(1)"]
        );
    }

    #[test]
    fn test_add_when_not_granted_does_nothing() {
        let (mut controller, center) = controller();
        center.0.borrow_mut().status = Some(AuthorizationStatus::NotDetermined);
        controller.add_notification(&article());
        assert!(center.pending().is_none());
    }

    #[test]
    fn test_add_when_denied_does_nothing() {
        let (mut controller, center) = controller();
        center.0.borrow_mut().status = Some(AuthorizationStatus::Denied);
        controller.add_notification(&article());
        assert_eq!(center.0.borrow().calls, vec!["status"]);
    }

    #[test]
    fn test_remove_counts_down_then_clears() {
        let (mut controller, center) = controller();
        controller.add_notification(&article());
        controller.add_notification(&article());
        controller.remove_notification(&article());
        assert_eq!(center.pending().map(|r| r.count), Some(1));
        controller.remove_notification(&article());
        assert!(center.pending().is_none());
    }

    #[test]
    fn test_remove_without_pending_removes_all() {
        let (mut controller, center) = controller();
        controller.remove_notification(&article());
        assert_eq!(center.0.borrow().calls, vec!["remove_all"]);
    }

    #[test]
    fn test_update_schedule_keeps_count() {
        let (mut controller, center) = controller();
        controller.update_schedule();
        assert!(center.0.borrow().calls.is_empty());

        controller.add_notification(&article());
        controller.add_notification(&article());
        controller.update_schedule();
        assert_eq!(center.pending().map(|r| r.count), Some(2));
        assert_eq!(center.0.borrow().calls.last().unwrap(), "add(2)");
    }

    #[tokio::test]
    async fn test_digest_center_take_due() {
        let db = crate::storage::Database::open(":memory:").await.unwrap();
        let prefs = PreferenceStore::open(db).await.unwrap();
        let mut center = DigestCenter::new(prefs, true);
        assert_eq!(center.authorization_status(), AuthorizationStatus::Authorized);

        center.add(DigestRequest::new(3, at(19, 0)));
        assert_eq!(center.take_due(at(18, 59)), None);
        let due = center.take_due(at(19, 0)).unwrap();
        assert_eq!(due.body, "3 articles");
        assert!(center.pending().is_none());
    }

    #[tokio::test]
    async fn test_digest_center_denied() {
        let db = crate::storage::Database::open(":memory:").await.unwrap();
        let prefs = PreferenceStore::open(db).await.unwrap();
        let mut center = DigestCenter::new(prefs, false);
        assert_eq!(center.authorization_status(), AuthorizationStatus::Denied);
        assert!(!center.request_authorization());
    }
}

//! The daily reminder sweep.
//!
//! One sequential pass over every active expense in the system. Each record
//! whose reminder day is today gets one email; a failed send is logged and
//! counted as not sent, it never stops the pass.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::email::{format_price, format_renewal_date, EmailSender};
use crate::domain::reminder::is_due_today;
use crate::storage::SubscriptionStorage;

const FALLBACK_USER_NAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    pub emails_sent: u32,
}

#[derive(Clone)]
pub struct ReminderSweep {
    subscriptions: Arc<dyn SubscriptionStorage>,
    email: Arc<dyn EmailSender>,
}

impl ReminderSweep {
    pub fn new(subscriptions: Arc<dyn SubscriptionStorage>, email: Arc<dyn EmailSender>) -> Self {
        Self { subscriptions, email }
    }

    /// Send every reminder due on `today` and count the successful sends
    pub async fn run_sweep(&self, today: NaiveDate) -> Result<SweepOutcome> {
        let candidates = self.subscriptions.list_active_with_owner().await?;
        info!("Reminder sweep for {}: {} active expenses", today, candidates.len());

        let mut outcome = SweepOutcome::default();
        for candidate in candidates {
            let sub = &candidate.subscription;

            let Some(to) = candidate.owner_email.as_deref().filter(|e| !e.trim().is_empty()) else {
                debug!("Skipping {}: owner {} has no email", sub.id, sub.user_id);
                continue;
            };
            if !is_due_today(sub.next_renewal, sub.reminder_days, today) {
                continue;
            }

            let user_name = candidate
                .owner_name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(FALLBACK_USER_NAME);

            let sent = self
                .email
                .send(
                    to,
                    user_name,
                    &sub.name,
                    &format_renewal_date(sub.next_renewal),
                    &format_price(&sub.currency, sub.price),
                )
                .await;

            if sent {
                outcome.emails_sent += 1;
            } else {
                warn!("Reminder for {} ({}) was not delivered", sub.name, sub.id);
            }
        }

        info!("Reminder sweep for {} finished, {} emails sent", today, outcome.emails_sent);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ReminderCandidate;
    use crate::storage::repositories::subscription_repository::test_support::{insert_user, subscription};
    use crate::storage::{DbConnection, SubscriptionRepository};
    use async_trait::async_trait;
    use shared::Subscription;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Serves a fixed candidate list; only the sweep query is implemented
    struct FakeStore {
        candidates: Result<Vec<ReminderCandidate>, String>,
    }

    #[async_trait]
    impl SubscriptionStorage for FakeStore {
        async fn store_subscription(&self, _: &Subscription) -> Result<()> {
            unimplemented!()
        }
        async fn get_subscription(&self, _: &str, _: &str) -> Result<Option<Subscription>> {
            unimplemented!()
        }
        async fn list_subscriptions(&self, _: &str) -> Result<Vec<Subscription>> {
            unimplemented!()
        }
        async fn update_subscription(&self, _: &Subscription) -> Result<u64> {
            unimplemented!()
        }
        async fn delete_subscription(&self, _: &str, _: &str) -> Result<u64> {
            unimplemented!()
        }
        async fn list_active_with_owner(&self) -> Result<Vec<ReminderCandidate>> {
            self.candidates.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SentReminder {
        to: String,
        user_name: String,
        item_name: String,
        renewal_date_text: String,
        price_text: String,
    }

    /// Records every call and answers with a scripted result
    struct FakeSender {
        accept: fn(&str) -> bool,
        sent: Mutex<Vec<SentReminder>>,
    }

    impl FakeSender {
        fn answering(accept: fn(&str) -> bool) -> Arc<Self> {
            Arc::new(Self {
                accept,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<SentReminder> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for FakeSender {
        async fn send(
            &self,
            to: &str,
            user_name: &str,
            item_name: &str,
            renewal_date_text: &str,
            price_text: &str,
        ) -> bool {
            self.sent.lock().unwrap().push(SentReminder {
                to: to.to_string(),
                user_name: user_name.to_string(),
                item_name: item_name.to_string(),
                renewal_date_text: renewal_date_text.to_string(),
                price_text: price_text.to_string(),
            });
            (self.accept)(item_name)
        }
    }

    fn candidate(id: &str, name: &str, renewal: NaiveDate, email: Option<&str>) -> ReminderCandidate {
        ReminderCandidate {
            subscription: subscription(id, "u1", name, renewal),
            owner_name: Some("Alice".to_string()),
            owner_email: email.map(str::to_string),
        }
    }

    fn sweep(candidates: Vec<ReminderCandidate>, sender: Arc<FakeSender>) -> ReminderSweep {
        ReminderSweep::new(Arc::new(FakeStore { candidates: Ok(candidates) }), sender)
    }

    /// Three active expenses, only Netflix is due on 2025-02-26
    fn three_expenses() -> Vec<ReminderCandidate> {
        vec![
            candidate("s1", "Netflix", date(2025, 3, 1), Some("alice@example.com")),
            candidate("s2", "Spotify", date(2025, 3, 2), Some("alice@example.com")),
            candidate("s3", "Rent", date(2025, 4, 1), Some("alice@example.com")),
        ]
    }

    #[tokio::test]
    async fn test_sends_only_due_reminders() {
        let sender = FakeSender::answering(|_| true);
        let outcome = sweep(three_expenses(), sender.clone())
            .run_sweep(date(2025, 2, 26))
            .await
            .expect("Sweep failed");

        assert_eq!(outcome.emails_sent, 1);
        assert_eq!(
            sender.calls(),
            vec![SentReminder {
                to: "alice@example.com".to_string(),
                user_name: "Alice".to_string(),
                item_name: "Netflix".to_string(),
                renewal_date_text: "Sat Mar 01 2025".to_string(),
                price_text: "USD 9.99".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_send_is_not_counted() {
        let sender = FakeSender::answering(|_| false);
        let outcome = sweep(three_expenses(), sender.clone())
            .run_sweep(date(2025, 2, 26))
            .await
            .expect("Sweep should not fail when a send fails");

        assert_eq!(outcome.emails_sent, 0);
        assert_eq!(sender.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let renewal = date(2025, 3, 1);
        let candidates = vec![
            candidate("s1", "Broken", renewal, Some("alice@example.com")),
            candidate("s2", "Netflix", renewal, Some("alice@example.com")),
            candidate("s3", "Spotify", renewal, Some("alice@example.com")),
        ];
        let sender = FakeSender::answering(|item| item != "Broken");

        let outcome = sweep(candidates, sender.clone()).run_sweep(date(2025, 2, 26)).await.unwrap();

        assert_eq!(outcome.emails_sent, 2);
        assert_eq!(sender.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_skips_owner_without_email() {
        let renewal = date(2025, 3, 1);
        let candidates = vec![
            candidate("s1", "No email", renewal, None),
            candidate("s2", "Blank email", renewal, Some("  ")),
        ];
        let sender = FakeSender::answering(|_| true);

        let outcome = sweep(candidates, sender.clone()).run_sweep(date(2025, 2, 26)).await.unwrap();

        assert_eq!(outcome.emails_sent, 0);
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_email_flag_does_not_filter_reminders() {
        let mut quiet = candidate("s1", "Quiet", date(2025, 3, 1), Some("alice@example.com"));
        quiet.subscription.send_email = false;
        let sender = FakeSender::answering(|_| true);

        let outcome = sweep(vec![quiet], sender.clone()).run_sweep(date(2025, 2, 26)).await.unwrap();

        assert_eq!(outcome.emails_sent, 1);
        assert_eq!(sender.calls()[0].item_name, "Quiet");
    }

    #[tokio::test]
    async fn test_missing_owner_name_falls_back_to_user() {
        let mut anonymous = candidate("s1", "Netflix", date(2025, 3, 1), Some("anon@example.com"));
        anonymous.owner_name = None;
        let sender = FakeSender::answering(|_| true);

        sweep(vec![anonymous], sender.clone()).run_sweep(date(2025, 2, 26)).await.unwrap();

        assert_eq!(sender.calls()[0].user_name, "User");
    }

    #[tokio::test]
    async fn test_per_record_reminder_days() {
        let mut week_ahead = candidate("s1", "Insurance", date(2025, 3, 5), Some("alice@example.com"));
        week_ahead.subscription.reminder_days = 7;
        let mut same_day = candidate("s2", "Gym", date(2025, 2, 26), Some("alice@example.com"));
        same_day.subscription.reminder_days = 0;
        let sender = FakeSender::answering(|_| true);

        let outcome = sweep(vec![week_ahead, same_day], sender).run_sweep(date(2025, 2, 26)).await.unwrap();

        assert_eq!(outcome.emails_sent, 2);
    }

    #[tokio::test]
    async fn test_nothing_to_do() {
        let sender = FakeSender::answering(|_| true);
        let outcome = sweep(Vec::new(), sender).run_sweep(date(2025, 2, 26)).await.unwrap();
        assert_eq!(outcome, SweepOutcome { emails_sent: 0 });
    }

    #[tokio::test]
    async fn test_corrupt_stored_record_does_not_stop_the_sweep() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "u1", Some("alice@example.com")).await;
        let repo = SubscriptionRepository::new(db.clone());
        repo.store_subscription(&subscription("s1", "u1", "Corrupt", date(2025, 3, 1))).await.unwrap();
        repo.store_subscription(&subscription("s2", "u1", "Netflix", date(2025, 3, 1))).await.unwrap();
        sqlx::query("UPDATE subscriptions SET price = 'twelve' WHERE id = 's1'")
            .execute(db.pool())
            .await
            .unwrap();
        let sender = FakeSender::answering(|_| true);

        let outcome = ReminderSweep::new(Arc::new(repo), sender.clone())
            .run_sweep(date(2025, 2, 26))
            .await
            .expect("A corrupt record must not fail the sweep");

        assert_eq!(outcome.emails_sent, 1);
        assert_eq!(sender.calls()[0].item_name, "Netflix");
    }

    #[tokio::test]
    async fn test_store_failure_fails_the_sweep() {
        let store = FakeStore {
            candidates: Err("database is locked".to_string()),
        };
        let sweep = ReminderSweep::new(Arc::new(store), FakeSender::answering(|_| true));

        assert!(sweep.run_sweep(date(2025, 2, 26)).await.is_err());
    }
}

// ── Roster filtering ──
//
// Pure derivation of the visible roster from the full collection. No
// hidden state: the same records and query always yield the same view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{ClientRecord, PaymentStatus, SubscriptionStatus};

/// Status dropdown on the roster view.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    All,
    Connected,
    Disconnected,
    Overdue,
    Active,
}

impl StatusFilter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Connected,
        Self::Disconnected,
        Self::Overdue,
        Self::Active,
    ];

    pub fn admits(self, record: &ClientRecord) -> bool {
        match self {
            Self::All => true,
            Self::Connected => record.connected,
            Self::Disconnected => !record.connected,
            Self::Overdue => record.payment_status == PaymentStatus::Overdue,
            Self::Active => record.subscription_status == SubscriptionStatus::Active,
        }
    }
}

/// Search box contents plus status dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterQuery {
    pub search: String,
    pub status: StatusFilter,
}

impl RosterQuery {
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    pub fn matches(&self, record: &ClientRecord) -> bool {
        self.status.admits(record) && search_hits(&self.search.to_lowercase(), record)
    }
}

/// `needle` must already be lowercase.
fn search_hits(needle: &str, record: &ClientRecord) -> bool {
    needle.is_empty()
        || record.name.to_lowercase().contains(needle)
        || record.email.to_lowercase().contains(needle)
        || record.phone.to_lowercase().contains(needle)
}

/// Ordered subsequence of `records` matching `query`.
pub fn compute_view(records: &[Arc<ClientRecord>], query: &RosterQuery) -> Vec<Arc<ClientRecord>> {
    let needle = query.search.to_lowercase();
    records
        .iter()
        .filter(|r| query.status.admits(r) && search_hits(&needle, r))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ClientId;
    use crate::service::memory::demo_clients;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn demo() -> Vec<Arc<ClientRecord>> {
        demo_clients().into_iter().map(Arc::new).collect()
    }

    fn names(view: &[Arc<ClientRecord>]) -> Vec<&str> {
        view.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn john_is_connected_and_overdue() {
        let records = demo();
        let view = |status| compute_view(&records, &RosterQuery::new("", status));

        assert!(names(&view(StatusFilter::Overdue)).contains(&"John Doe"));
        assert!(names(&view(StatusFilter::Connected)).contains(&"John Doe"));
        assert!(!names(&view(StatusFilter::Disconnected)).contains(&"John Doe"));
    }

    #[test]
    fn status_filters_on_demo_data() {
        let records = demo();
        let view = |status| names(&compute_view(&records, &RosterQuery::new("", status)))
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        assert_eq!(view(StatusFilter::All), vec!["John Doe", "Jane Smith", "Mike Johnson"]);
        assert_eq!(view(StatusFilter::Disconnected), vec!["Mike Johnson"]);
        assert_eq!(view(StatusFilter::Active), vec!["John Doe", "Jane Smith"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = demo();
        let hit = |term: &str| {
            names(&compute_view(&records, &RosterQuery::new(term, StatusFilter::All)))
                .into_iter()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        };

        assert_eq!(hit("JANE"), vec!["Jane Smith"]);
        assert_eq!(hit("mike@"), vec!["Mike Johnson"]);
        assert_eq!(hit("734567"), vec!["Mike Johnson"]);
        assert_eq!(hit("john"), vec!["John Doe", "Mike Johnson"]);
        assert!(hit("nobody").is_empty());
    }

    #[test]
    fn filter_names_parse() {
        assert_eq!("Overdue".parse::<StatusFilter>().unwrap(), StatusFilter::Overdue);
        assert_eq!(StatusFilter::default(), StatusFilter::All);
        assert_eq!(StatusFilter::Disconnected.to_string(), "disconnected");
    }

    fn random_word(rng: &mut StdRng, alphabet: &[u8], max: usize) -> String {
        let len = rng.gen_range(0..=max);
        (0..len)
            .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
            .collect()
    }

    fn random_record(rng: &mut StdRng, n: u64) -> Arc<ClientRecord> {
        let mut record = demo_clients().swap_remove(0);
        record.id = ClientId::from(n);
        record.name = random_word(rng, b"abAB ", 6);
        record.email = random_word(rng, b"aBc@.", 6);
        record.phone = random_word(rng, b"+12 b", 6);
        record.connected = rng.gen_bool(0.5);
        record.payment_status = match rng.gen_range(0..3) {
            0 => PaymentStatus::Paid,
            1 => PaymentStatus::Pending,
            _ => PaymentStatus::Overdue,
        };
        record.subscription_status = if rng.gen_bool(0.5) {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::Suspended
        };
        Arc::new(record)
    }

    #[test]
    fn view_membership_matches_predicate() {
        let mut rng = StdRng::seed_from_u64(0x00C0_FFEE);
        for _ in 0..200 {
            let count = rng.gen_range(0..12);
            let records: Vec<_> = (0..count).map(|n| random_record(&mut rng, n)).collect();
            let term = random_word(&mut rng, b"aAbB1@", 2);
            let status = StatusFilter::ALL[rng.gen_range(0..StatusFilter::ALL.len())];
            let query = RosterQuery::new(term.clone(), status);

            let view = compute_view(&records, &query);

            let lowered = term.to_lowercase();
            let expected: Vec<_> = records
                .iter()
                .filter(|r| {
                    let text_hit = [&r.name, &r.email, &r.phone]
                        .iter()
                        .any(|f| f.to_lowercase().contains(&lowered));
                    text_hit && status.admits(r)
                })
                .map(|r| r.id.clone())
                .collect();
            let actual: Vec<_> = view.iter().map(|r| r.id.clone()).collect();
            assert_eq!(actual, expected, "term={term:?} status={status}");
        }
    }
}

//! Paginated Transfer Listing
//!
//! Filtered, cursor-paginated pages over the transfer store. Ordering is
//! creation time descending (the ULID key), id as tie-break. The cursor
//! is opaque to callers: base64 of the id of the last item returned on
//! the previous page; a page starts strictly after that row, so pages
//! never overlap or gap even when inserts land at the head.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::error::TransferError;
use super::status::TransferStatus;
use super::store::TransferStore;
use super::types::{Channel, Transfer, TransferId};

/// Listing filters; all optional, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    pub status: Option<TransferStatus>,
    pub channel: Option<Channel>,
    /// Inclusive lower bound on amount
    pub min_amount: Option<u64>,
    /// Inclusive upper bound on amount
    pub max_amount: Option<u64>,
    /// Case-insensitive match against reference OR recipient name
    pub q: Option<String>,
}

impl TransferFilter {
    fn matches(&self, transfer: &Transfer) -> bool {
        if let Some(status) = self.status {
            if transfer.status != status {
                return false;
            }
        }
        if let Some(channel) = self.channel {
            if transfer.channel != channel {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if transfer.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if transfer.amount > max {
                return false;
            }
        }
        if let Some(ref q) = self.q {
            let needle = q.to_lowercase();
            let in_reference = transfer.reference.to_lowercase().contains(&needle);
            let in_name = transfer.recipient_name.to_lowercase().contains(&needle);
            if !in_reference && !in_name {
                return false;
            }
        }
        true
    }
}

/// A list request: filters plus pagination parameters.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: TransferFilter,
    /// Page size; clamped to `1..=max_page_size`, defaulted when absent
    pub limit: Option<usize>,
    /// Opaque resume token from the previous page
    pub cursor: Option<String>,
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Transfer>,
    /// Present iff another page exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

pub(crate) fn encode_cursor(id: TransferId) -> String {
    BASE64.encode(id.to_string())
}

pub(crate) fn decode_cursor(cursor: &str) -> Result<TransferId, TransferError> {
    let bytes = BASE64
        .decode(cursor)
        .map_err(|_| TransferError::InvalidCursor)?;
    let text = String::from_utf8(bytes).map_err(|_| TransferError::InvalidCursor)?;
    text.parse().map_err(|_| TransferError::InvalidCursor)
}

/// Run a list query against the store.
///
/// Fetches `limit + 1` rows to probe for a further page: when the probe
/// row exists, `next_cursor` encodes the last RETURNED row's id and the
/// probe row is trimmed; otherwise this is the final page.
pub fn list(
    store: &TransferStore,
    query: &ListQuery,
    default_limit: usize,
    max_limit: usize,
) -> Result<Page, TransferError> {
    let limit = query.limit.unwrap_or(default_limit).clamp(1, max_limit);

    let after = match query.cursor.as_deref() {
        Some(cursor) => Some(decode_cursor(cursor)?),
        None => None,
    };

    let mut items = store.page_desc(after, limit + 1, |t| query.filter.matches(t));

    let next_cursor = if items.len() > limit {
        items.truncate(limit);
        items.last().map(|t| encode_cursor(t.id))
    } else {
        None
    };

    Ok(Page { items, next_cursor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::store::TransitionData;
    use chrono::Utc;

    fn seed_store(n: usize) -> (TransferStore, Vec<TransferId>) {
        let store = TransferStore::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let now = Utc::now();
            let amount = 1_000 * (i as u64 + 1);
            let transfer = Transfer {
                id: TransferId::new(),
                reference: format!("TRF-20250101-{i:04}"),
                amount,
                currency: "XOF".to_string(),
                channel: if i % 2 == 0 {
                    Channel::Wave
                } else {
                    Channel::OrangeMoney
                },
                status: TransferStatus::Pending,
                fees: 100,
                total: amount + 100,
                recipient_phone: "+221770000000".to_string(),
                recipient_name: format!("Recipient {i}"),
                metadata: serde_json::json!({}),
                provider_ref: None,
                error_code: None,
                created_at: now,
                updated_at: now,
            };
            ids.push(store.insert(transfer).unwrap().id);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        (store, ids)
    }

    fn list_all(store: &TransferStore, query: &ListQuery) -> Page {
        list(store, query, 20, 50).unwrap()
    }

    #[test]
    fn test_first_page_newest_first() {
        let (store, ids) = seed_store(3);
        let page = list_all(&store, &ListQuery::default());

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].id, ids[2]);
        assert_eq!(page.items[2].id, ids[0]);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_exactly_limit_rows_has_no_next_cursor() {
        let (store, _) = seed_store(4);
        let query = ListQuery {
            limit: Some(4),
            ..Default::default()
        };
        let page = list_all(&store, &query);
        assert_eq!(page.items.len(), 4);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_pagination_no_overlap_no_gap() {
        let (store, ids) = seed_store(7);

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let query = ListQuery {
                limit: Some(3),
                cursor: cursor.clone(),
                ..Default::default()
            };
            let page = list_all(&store, &query);
            seen.extend(page.items.iter().map(|t| t.id));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(seen, expected, "pages must cover every row exactly once");
    }

    #[test]
    fn test_cursor_stable_under_head_inserts() {
        let (store, ids) = seed_store(5);

        let first = list_all(
            &store,
            &ListQuery {
                limit: Some(2),
                ..Default::default()
            },
        );
        let cursor = first.next_cursor.clone().unwrap();

        // New rows land at the head of the ordering; the cursor is
        // anchored to its row, so the continuation is unaffected.
        let now = Utc::now();
        store
            .insert(Transfer {
                id: TransferId::new(),
                reference: "TRF-20250101-FRESH".to_string(),
                amount: 99_000,
                currency: "XOF".to_string(),
                channel: Channel::FreeMoney,
                status: TransferStatus::Pending,
                fees: 792,
                total: 99_792,
                recipient_phone: "+221770000001".to_string(),
                recipient_name: "Late Arrival".to_string(),
                metadata: serde_json::json!({}),
                provider_ref: None,
                error_code: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let second = list_all(
            &store,
            &ListQuery {
                limit: Some(2),
                cursor: Some(cursor),
                ..Default::default()
            },
        );
        let got: Vec<TransferId> = second.items.iter().map(|t| t.id).collect();
        assert_eq!(got, vec![ids[2], ids[1]]);
    }

    #[test]
    fn test_invalid_cursor_rejected() {
        let (store, _) = seed_store(1);

        for bad in ["%%%not-base64%%%", "bm90LWEtdWxpZA=="] {
            let query = ListQuery {
                cursor: Some(bad.to_string()),
                ..Default::default()
            };
            let err = list(&store, &query, 20, 50).unwrap_err();
            assert!(matches!(err, TransferError::InvalidCursor), "cursor: {bad}");
        }
    }

    #[test]
    fn test_status_and_channel_filters() {
        let (store, ids) = seed_store(4);
        store
            .transition(
                ids[0],
                TransferStatus::Pending,
                TransferStatus::Canceled,
                TransitionData::none(),
            )
            .unwrap();

        let canceled = list_all(
            &store,
            &ListQuery {
                filter: TransferFilter {
                    status: Some(TransferStatus::Canceled),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert_eq!(canceled.items.len(), 1);
        assert_eq!(canceled.items[0].id, ids[0]);

        let wave_only = list_all(
            &store,
            &ListQuery {
                filter: TransferFilter {
                    channel: Some(Channel::Wave),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert!(wave_only.items.iter().all(|t| t.channel == Channel::Wave));
        assert_eq!(wave_only.items.len(), 2);
    }

    #[test]
    fn test_amount_range_inclusive() {
        let (store, _) = seed_store(5); // amounts 1000..=5000
        let page = list_all(
            &store,
            &ListQuery {
                filter: TransferFilter {
                    min_amount: Some(2_000),
                    max_amount: Some(4_000),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let amounts: Vec<u64> = page.items.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![4_000, 3_000, 2_000]);
    }

    #[test]
    fn test_free_text_search_case_insensitive() {
        let (store, ids) = seed_store(3);

        let by_name = list_all(
            &store,
            &ListQuery {
                filter: TransferFilter {
                    q: Some("recipient 1".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert_eq!(by_name.items.len(), 1);
        assert_eq!(by_name.items[0].id, ids[1]);

        let by_reference = list_all(
            &store,
            &ListQuery {
                filter: TransferFilter {
                    q: Some("trf-20250101".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert_eq!(by_reference.items.len(), 3);
    }

    #[test]
    fn test_limit_clamped() {
        let (store, _) = seed_store(3);
        let page = list(
            &store,
            &ListQuery {
                limit: Some(500),
                ..Default::default()
            },
            20,
            2,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_some());
    }

    #[test]
    fn test_cursor_roundtrip() {
        let id = TransferId::new();
        assert_eq!(decode_cursor(&encode_cursor(id)).unwrap(), id);
    }
}

use chrono::{DateTime, Duration, Utc};

use crate::store::operations::cards::Card;

/// Cards touched within this window are candidates for the front of the
/// queue while they are still young.
const RECENT_WINDOW_DAYS: i64 = 5;
/// A recently-touched card with this many recorded reviews no longer needs
/// front-loading.
const RECENT_REVIEW_CAP: u32 = 4;

/// Session queue order: cards touched within the last five days that are
/// still under-reviewed come first (fewest reviews first), followed by
/// everything else, freshest first and then fewest reviews. Front-loads
/// cards still being learned without starving stale ones.
pub fn order_cards(cards: Vec<Card>, now: DateTime<Utc>) -> Vec<Card> {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    let (mut recent, mut older): (Vec<Card>, Vec<Card>) = cards
        .into_iter()
        .partition(|card| card.updated_at > cutoff && card.reviewed_number < RECENT_REVIEW_CAP);

    recent.sort_by_key(|card| card.reviewed_number);
    older.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then(a.reviewed_number.cmp(&b.reviewed_number))
    });

    recent.extend(older);
    recent
}

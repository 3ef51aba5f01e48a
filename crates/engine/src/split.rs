//! Share calculator: turns items, per-item selections and bill-level totals
//! into a per-user monetary breakdown.
//!
//! The functions here are pure: no I/O, no shared state. Callers validate
//! input at the boundary (quantity >= 1, price >= 0, ratios in `[0, 1]`,
//! known item ids); the calculator applies no checks of its own and silently
//! skips selections whose item id matches nothing.

use std::collections::{HashMap, HashSet};

use crate::rounding::round_to_two;
use crate::{BillItem, ItemSelection};

/// Bill-level monetary figures, as maintained by the caller.
///
/// Only `tax` and `service_charge` are distributed; `subtotal` and `total`
/// are informational and never re-derived during share computation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BillTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
}

/// One user's share of a single item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemContribution {
    pub item_id: String,
    pub name: String,
    /// Rounded monetary amount of this user's share.
    pub amount: f64,
    /// The raw split ratio the user claimed, not the normalized weight.
    pub split_ratio: f64,
    /// Set when more than one selection references the item, regardless of
    /// the ratio values.
    pub is_shared: bool,
}

/// The per-user output of [`compute_shares`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserBreakdown {
    pub user_id: String,
    pub items_subtotal: f64,
    pub tax_share: f64,
    pub service_charge_share: f64,
    pub total: f64,
    /// This user's share of the claimed subtotal, in percent (0..=100).
    pub percentage: f64,
    pub items: Vec<ItemContribution>,
}

impl UserBreakdown {
    fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }
}

/// Computes how much each user owes based on their item selections.
///
/// Tax and service charge are distributed proportionally to each user's share
/// of the claimed subtotal. Users without selections do not appear in the
/// returned map. An item's full value is always allocated among its claimants
/// in proportion to their ratios, even when the ratios sum to less than 1.
pub fn compute_shares(
    items: &[BillItem],
    selections: &[ItemSelection],
    totals: &BillTotals,
) -> HashMap<String, UserBreakdown> {
    let mut breakdowns: HashMap<String, UserBreakdown> = HashMap::new();

    for selection in selections {
        breakdowns
            .entry(selection.user_id.clone())
            .or_insert_with(|| UserBreakdown::empty(&selection.user_id));
    }

    for item in items {
        let item_selections: Vec<&ItemSelection> = selections
            .iter()
            .filter(|s| s.item_id == item.id)
            .collect();
        let total_ratio: f64 = item_selections.iter().map(|s| s.split_ratio).sum();
        let is_shared = item_selections.len() > 1;
        let item_value = item.value();

        for selection in item_selections {
            let Some(breakdown) = breakdowns.get_mut(&selection.user_id) else {
                continue;
            };

            // Guard against ratio-0 selections: the item then contributes
            // nothing to anyone.
            let share = if total_ratio > 0.0 {
                (selection.split_ratio / total_ratio) * item_value
            } else {
                0.0
            };

            breakdown.items_subtotal += share;
            breakdown.items.push(ItemContribution {
                item_id: item.id.clone(),
                name: item.name.clone(),
                amount: round_to_two(share),
                split_ratio: selection.split_ratio,
                is_shared,
            });
        }
    }

    // The claimed subtotal, which may be below totals.subtotal when some
    // items have no selection.
    let total_items_subtotal: f64 = breakdowns.values().map(|b| b.items_subtotal).sum();

    for breakdown in breakdowns.values_mut() {
        if total_items_subtotal > 0.0 {
            let ratio = breakdown.items_subtotal / total_items_subtotal;
            breakdown.percentage = round_to_two(ratio * 100.0);
            breakdown.tax_share = round_to_two(totals.tax * ratio);
            breakdown.service_charge_share = round_to_two(totals.service_charge * ratio);
        }

        breakdown.items_subtotal = round_to_two(breakdown.items_subtotal);
        breakdown.total = round_to_two(
            breakdown.items_subtotal + breakdown.tax_share + breakdown.service_charge_share,
        );
    }

    breakdowns
}

/// Computes a single user's breakdown, `None` if the user has no selections.
pub fn user_share(
    user_id: &str,
    items: &[BillItem],
    selections: &[ItemSelection],
    totals: &BillTotals,
) -> Option<UserBreakdown> {
    compute_shares(items, selections, totals).remove(user_id)
}

/// Returns the items nobody has selected yet.
pub fn unassigned_items<'a>(
    items: &'a [BillItem],
    selections: &[ItemSelection],
) -> Vec<&'a BillItem> {
    let claimed: HashSet<&str> = selections.iter().map(|s| s.item_id.as_str()).collect();
    items
        .iter()
        .filter(|item| !claimed.contains(item.id.as_str()))
        .collect()
}

/// Derives bill totals from the item list plus given tax and service charge.
pub fn totals_from_items(items: &[BillItem], tax: f64, service_charge: f64) -> BillTotals {
    let subtotal: f64 = items.iter().map(BillItem::value).sum();

    BillTotals {
        subtotal: round_to_two(subtotal),
        tax,
        service_charge,
        total: round_to_two(subtotal + tax + service_charge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, quantity: u32, price: f64) -> BillItem {
        BillItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
            price,
        }
    }

    fn selection(item_id: &str, user_id: &str, split_ratio: f64) -> ItemSelection {
        ItemSelection {
            id: format!("{item_id}-{user_id}"),
            item_id: item_id.to_string(),
            user_id: user_id.to_string(),
            split_ratio,
        }
    }

    fn totals(subtotal: f64, tax: f64, service_charge: f64) -> BillTotals {
        BillTotals {
            subtotal,
            tax,
            service_charge,
            total: subtotal + tax + service_charge,
        }
    }

    #[test]
    fn even_two_way_split_no_tax() {
        let items = vec![item("i1", "Pizza", 1, 200.0)];
        let selections = vec![selection("i1", "alice", 0.5), selection("i1", "bob", 0.5)];

        let breakdowns = compute_shares(&items, &selections, &totals(200.0, 0.0, 0.0));

        let alice = &breakdowns["alice"];
        let bob = &breakdowns["bob"];
        assert_eq!(alice.total, 100.0);
        assert_eq!(bob.total, 100.0);
        assert_eq!(alice.percentage, 50.0);
        assert_eq!(bob.percentage, 50.0);
    }

    #[test]
    fn unequal_ratio_distributes_tax_proportionally() {
        let items = vec![item("i1", "Platter", 1, 300.0)];
        let selections = vec![selection("i1", "alice", 0.75), selection("i1", "bob", 0.25)];

        let breakdowns = compute_shares(&items, &selections, &totals(300.0, 30.0, 0.0));

        let alice = &breakdowns["alice"];
        let bob = &breakdowns["bob"];
        assert_eq!(alice.items_subtotal, 225.0);
        assert_eq!(bob.items_subtotal, 75.0);
        assert_eq!(alice.tax_share, 22.5);
        assert_eq!(bob.tax_share, 7.5);
        assert_eq!(alice.total, 247.5);
        assert_eq!(bob.total, 82.5);
    }

    #[test]
    fn item_value_fully_allocated_even_for_partial_claims() {
        // Ratios sum to 0.5 but the whole item value is still split between
        // the claimants, proportioned by ratio.
        let items = vec![item("i1", "Noodles", 3, 100.0)];
        let selections = vec![selection("i1", "alice", 0.3), selection("i1", "bob", 0.2)];

        let breakdowns = compute_shares(&items, &selections, &totals(300.0, 0.0, 0.0));

        let allocated: f64 = breakdowns.values().map(|b| b.items_subtotal).sum();
        assert!((allocated - 300.0).abs() < 1e-9);
        assert_eq!(breakdowns["alice"].items_subtotal, 180.0);
        assert_eq!(breakdowns["bob"].items_subtotal, 120.0);
    }

    #[test]
    fn users_without_selections_are_absent() {
        let items = vec![item("i1", "Pizza", 1, 200.0)];
        let selections = vec![selection("i1", "alice", 1.0)];

        let breakdowns = compute_shares(&items, &selections, &totals(200.0, 20.0, 0.0));

        assert!(breakdowns.contains_key("alice"));
        assert!(!breakdowns.contains_key("bob"));
        assert_eq!(breakdowns.len(), 1);
    }

    #[test]
    fn no_selections_yields_empty_map() {
        let items = vec![item("i1", "Pizza", 1, 200.0)];

        let breakdowns = compute_shares(&items, &[], &totals(200.0, 20.0, 10.0));

        assert!(breakdowns.is_empty());
    }

    #[test]
    fn zero_ratio_selection_contributes_nothing() {
        let items = vec![item("i1", "Pizza", 1, 200.0)];
        let selections = vec![selection("i1", "alice", 0.0)];

        let breakdowns = compute_shares(&items, &selections, &totals(200.0, 0.0, 0.0));

        let alice = &breakdowns["alice"];
        assert_eq!(alice.items_subtotal, 0.0);
        assert_eq!(alice.total, 0.0);
        assert_eq!(alice.percentage, 0.0);
        assert_eq!(alice.items[0].amount, 0.0);
    }

    #[test]
    fn shared_flag_tracks_selection_count() {
        let items = vec![item("i1", "Pizza", 1, 200.0), item("i2", "Coke", 1, 50.0)];
        let selections = vec![
            selection("i1", "alice", 0.5),
            selection("i1", "bob", 0.5),
            selection("i2", "alice", 1.0),
        ];

        let breakdowns = compute_shares(&items, &selections, &totals(250.0, 0.0, 0.0));

        let alice = &breakdowns["alice"];
        let pizza = alice.items.iter().find(|c| c.item_id == "i1").unwrap();
        let coke = alice.items.iter().find(|c| c.item_id == "i2").unwrap();
        assert!(pizza.is_shared);
        assert!(!coke.is_shared);
    }

    #[test]
    fn selection_with_unknown_item_is_ignored() {
        let items = vec![item("i1", "Pizza", 1, 200.0)];
        let selections = vec![selection("i1", "alice", 1.0), selection("ghost", "bob", 1.0)];

        let breakdowns = compute_shares(&items, &selections, &totals(200.0, 0.0, 0.0));

        // Bob appears (he has a selection) but accrues nothing.
        assert_eq!(breakdowns["bob"].items_subtotal, 0.0);
        assert_eq!(breakdowns["alice"].items_subtotal, 200.0);
    }

    #[test]
    fn tax_shares_sum_to_bill_tax() {
        let items = vec![item("i1", "Pizza", 2, 150.0), item("i2", "Coke", 3, 40.0)];
        let selections = vec![
            selection("i1", "alice", 0.5),
            selection("i1", "bob", 0.5),
            selection("i2", "carol", 1.0),
        ];
        let totals = totals(420.0, 42.0, 21.0);

        let breakdowns = compute_shares(&items, &selections, &totals);

        let tax_sum: f64 = breakdowns.values().map(|b| b.tax_share).sum();
        let service_sum: f64 = breakdowns.values().map(|b| b.service_charge_share).sum();
        assert!((tax_sum - 42.0).abs() <= 0.01);
        assert!((service_sum - 21.0).abs() <= 0.01);
    }

    #[test]
    fn unclaimed_items_do_not_shift_tax_to_others() {
        // Only half the subtotal is claimed; tax is still split over the
        // claimed part only, so the single claimant carries all of it.
        let items = vec![item("i1", "Pizza", 1, 100.0), item("i2", "Cake", 1, 100.0)];
        let selections = vec![selection("i1", "alice", 1.0)];

        let breakdowns = compute_shares(&items, &selections, &totals(200.0, 10.0, 0.0));

        assert_eq!(breakdowns["alice"].tax_share, 10.0);
        assert_eq!(breakdowns["alice"].percentage, 100.0);
    }

    #[test]
    fn compute_shares_is_deterministic() {
        let items = vec![item("i1", "Pizza", 2, 99.99), item("i2", "Coke", 1, 33.33)];
        let selections = vec![
            selection("i1", "alice", 0.7),
            selection("i1", "bob", 0.3),
            selection("i2", "bob", 1.0),
        ];
        let totals = totals(233.31, 23.33, 11.67);

        let first = compute_shares(&items, &selections, &totals);
        let second = compute_shares(&items, &selections, &totals);

        assert_eq!(first, second);
    }

    #[test]
    fn user_share_returns_single_breakdown() {
        let items = vec![item("i1", "Pizza", 1, 200.0)];
        let selections = vec![selection("i1", "alice", 1.0)];
        let totals = totals(200.0, 0.0, 0.0);

        let alice = user_share("alice", &items, &selections, &totals).unwrap();
        assert_eq!(alice.total, 200.0);
        assert!(user_share("bob", &items, &selections, &totals).is_none());
    }

    #[test]
    fn unassigned_items_diff_against_selections() {
        let items = vec![item("i1", "Pizza", 1, 200.0), item("i2", "Cake", 1, 80.0)];
        let selections = vec![selection("i1", "alice", 1.0)];

        let unassigned = unassigned_items(&items, &selections);

        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, "i2");
    }

    #[test]
    fn totals_from_items_sums_price_times_quantity() {
        let items = vec![item("i1", "Pizza", 2, 150.0), item("i2", "Coke", 3, 40.5)];

        let totals = totals_from_items(&items, 30.0, 15.0);

        assert_eq!(totals.subtotal, 421.5);
        assert_eq!(totals.total, 466.5);
    }
}

//! Settlement optimizer: turns per-participant (owed, paid) pairs into a
//! short list of peer-to-peer payments that zero out all balances.

use crate::rounding::round_to_two;

/// One minor currency unit, used as the effective zero for monetary
/// comparisons to absorb floating-point and rounding noise.
const MINOR_UNIT: f64 = 0.01;

/// Settlement input: what a participant owes and what they already paid.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantBalance {
    pub user_id: String,
    pub name: String,
    pub amount_owed: f64,
    pub amount_paid: f64,
}

impl ParticipantBalance {
    /// Signed balance: positive = overpaid (creditor), negative = owes.
    pub fn balance(&self) -> f64 {
        round_to_two(self.amount_paid - self.amount_owed)
    }
}

/// One side of a settlement transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementParty {
    pub user_id: String,
    pub name: String,
}

/// A single directed payment reducing outstanding imbalance.
#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub from: SettlementParty,
    pub to: SettlementParty,
    pub amount: f64,
}

struct Entry {
    user_id: String,
    name: String,
    balance: f64,
}

/// Computes the settlement transactions for a group of participants.
///
/// Greedy two-pointer matching: the largest debtor pays the largest creditor
/// first, producing at most `creditors + debtors - 1` transactions. Residual
/// imbalance (total owed != total paid) is left unsettled; the optimizer
/// never rebalances against an external party.
pub fn compute_settlements(participants: &[ParticipantBalance]) -> Vec<Settlement> {
    let mut creditors: Vec<Entry> = Vec::new();
    let mut debtors: Vec<Entry> = Vec::new();

    for participant in participants {
        let balance = participant.balance();
        let entry = Entry {
            user_id: participant.user_id.clone(),
            name: participant.name.clone(),
            balance,
        };
        if balance > MINOR_UNIT {
            creditors.push(entry);
        } else if balance < -MINOR_UNIT {
            debtors.push(entry);
        }
    }

    creditors.sort_by(|a, b| b.balance.total_cmp(&a.balance));
    debtors.sort_by(|a, b| a.balance.total_cmp(&b.balance));

    let mut settlements = Vec::new();
    let mut credit_idx = 0;
    let mut debt_idx = 0;

    while credit_idx < creditors.len() && debt_idx < debtors.len() {
        let credit_amount = creditors[credit_idx].balance;
        let debt_amount = debtors[debt_idx].balance.abs();
        let amount = round_to_two(credit_amount.min(debt_amount));

        if amount > MINOR_UNIT {
            settlements.push(Settlement {
                from: SettlementParty {
                    user_id: debtors[debt_idx].user_id.clone(),
                    name: debtors[debt_idx].name.clone(),
                },
                to: SettlementParty {
                    user_id: creditors[credit_idx].user_id.clone(),
                    name: creditors[credit_idx].name.clone(),
                },
                amount,
            });

            creditors[credit_idx].balance = round_to_two(creditors[credit_idx].balance - amount);
            debtors[debt_idx].balance = round_to_two(debtors[debt_idx].balance + amount);
        }

        // Both cursors may advance in the same step when the amounts matched
        // exactly.
        if creditors[credit_idx].balance <= MINOR_UNIT {
            credit_idx += 1;
        }
        if debtors[debt_idx].balance >= -MINOR_UNIT {
            debt_idx += 1;
        }
    }

    settlements
}

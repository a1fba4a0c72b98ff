//! FICO-like credit scoring.
//!
//! [`ScoringEngine::compute`] is a pure, total function: every profile,
//! however extreme, maps to a score in 300..=850 with each of the five
//! factor sub-scores in 0..=100. This is an educational model, not the
//! real FICO formula.
//!
//! ## Factor curves
//!
//! The curves are banded rather than smooth: penalties step at the
//! utilization and inquiry thresholds commonly cited in consumer credit
//! education material. Each sub-score is clamped before weighting, and
//! the composite index maps linearly onto the 300..=850 band.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::profile::CreditProfile;

/// The five scoring factors, in weight order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    PaymentHistory,
    AmountsOwed,
    LengthHistory,
    NewCredit,
    CreditMix,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::PaymentHistory,
        Factor::AmountsOwed,
        Factor::LengthHistory,
        Factor::NewCredit,
        Factor::CreditMix,
    ];

    /// Factor weight; the five weights sum to exactly 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Factor::PaymentHistory => 0.35,
            Factor::AmountsOwed => 0.30,
            Factor::LengthHistory => 0.15,
            Factor::NewCredit => 0.10,
            Factor::CreditMix => 0.10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Factor::PaymentHistory => "payment_history",
            Factor::AmountsOwed => "amounts_owed",
            Factor::LengthHistory => "length_history",
            Factor::NewCredit => "new_credit",
            Factor::CreditMix => "credit_mix",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A computed credit score with its per-factor breakdown.
///
/// Immutable once produced. `score` is an affine function of
/// `weighted_index_0_100`: `score = round(300 + idx / 100 * 550)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScore {
    /// Composite score in 300..=850.
    pub score: f64,
    /// Per-factor sub-scores, each in 0..=100.
    pub breakdown: BTreeMap<Factor, f64>,
    /// Factor weights; sum to 1.0.
    pub weights: BTreeMap<Factor, f64>,
    /// Weighted mean of the sub-scores, in 0..=100.
    pub weighted_index_0_100: f64,
}

impl CreditScore {
    pub fn factor(&self, factor: Factor) -> f64 {
        self.breakdown.get(&factor).copied().unwrap_or(0.0)
    }
}

/// Stateless engine turning a [`CreditProfile`] into a [`CreditScore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the composite score. Never fails; inputs outside their
    /// documented ranges are clamped before use.
    pub fn compute(&self, profile: &CreditProfile) -> CreditScore {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(Factor::PaymentHistory, payment_history(profile));
        breakdown.insert(Factor::AmountsOwed, amounts_owed(profile));
        breakdown.insert(Factor::LengthHistory, length_history(profile));
        breakdown.insert(Factor::NewCredit, new_credit(profile));
        breakdown.insert(Factor::CreditMix, credit_mix(profile));

        let weights: BTreeMap<Factor, f64> =
            Factor::ALL.iter().map(|f| (*f, f.weight())).collect();

        let weighted_index_0_100: f64 = Factor::ALL
            .iter()
            .map(|f| breakdown[f] * f.weight())
            .sum::<f64>()
            .clamp(0.0, 100.0);

        let score = (300.0 + weighted_index_0_100 / 100.0 * 550.0)
            .round()
            .clamp(300.0, 850.0);

        CreditScore {
            score,
            breakdown,
            weights,
            weighted_index_0_100,
        }
    }
}

/// Payment history (35%): penalties scale with severity of delinquency,
/// 90-day-plus lates weigh five times a 30-day late. Time since the last
/// delinquency earns back up to 10 points over two years.
fn payment_history(p: &CreditProfile) -> f64 {
    let mut s = 100.0;
    s -= f64::from(p.late_30) * 3.0;
    s -= f64::from(p.late_60) * 7.0;
    s -= f64::from(p.late_90p) * 15.0;
    if p.has_collection {
        s -= 20.0;
    }
    if p.has_bankruptcy {
        s -= 40.0;
    }
    if let Some(months) = p.months_since_last_delinquency {
        s += (months / 24.0 * 10.0).clamp(0.0, 10.0);
    }
    s.clamp(0.0, 100.0)
}

/// Amounts owed (30%): banded revolving-utilization curve, steeper beyond
/// 50%, plus a linear installment-balance penalty and small thin/thick
/// file adjustments.
fn amounts_owed(p: &CreditProfile) -> f64 {
    let mut s = 100.0;
    let util = p.revolving_utilization.clamp(0.0, 1.0);
    if util <= 0.01 {
        // Zero utilization reads as inactivity, not discipline.
        s -= 2.0;
    } else if util <= 0.09 {
        s += 5.0;
    } else if util <= 0.29 {
        // Neutral band.
    } else if util <= 0.49 {
        s -= 10.0;
    } else if util <= 0.74 {
        s -= 25.0;
    } else {
        s -= 45.0;
    }

    let ibr = p.installment_balance_ratio.clamp(0.0, 1.0);
    s -= (ibr * 20.0).clamp(0.0, 20.0);

    if p.total_accounts < 3 {
        s -= 5.0;
    } else if p.total_accounts >= 15 {
        s -= 3.0;
    }
    s.clamp(0.0, 100.0)
}

/// Length of history (15%): oldest account saturates at 20 years (60 pts),
/// average age at 10 years (40 pts).
fn length_history(p: &CreditProfile) -> f64 {
    let oldest = (p.age_oldest_acct_years / 20.0 * 60.0).clamp(0.0, 60.0);
    let average = (p.avg_age_years / 10.0 * 40.0).clamp(0.0, 40.0);
    (oldest + average).clamp(0.0, 100.0)
}

/// New credit (10%): zero recent activity scores a small bonus, decaying
/// in bands as inquiry and new-account counts rise.
fn new_credit(p: &CreditProfile) -> f64 {
    let mut s: f64 = 100.0;
    s += match p.hard_inquiries_12m {
        0 => 3.0,
        1 => -5.0,
        2 => -10.0,
        _ => -20.0,
    };
    s += match p.new_accounts_12m {
        0 => 2.0,
        1 => -5.0,
        2 => -10.0,
        _ => -18.0,
    };
    s.clamp(0.0, 100.0)
}

/// Credit mix (10%): counts distinct account types, saturating at 100 once
/// three or more types are present.
fn credit_mix(p: &CreditProfile) -> f64 {
    let mut s: f64 = 50.0;
    if p.has_revolving {
        s += 15.0;
    }
    if p.has_installment {
        s += 15.0;
    }
    if p.has_mortgage {
        s += 10.0;
    }
    if p.has_student_or_auto {
        s += 5.0;
    }
    s.clamp(0.0, 100.0)
}

//! Borrower credit profiles.
//!
//! Every numeric field has a documented neutral default so scoring never
//! fails on missing data. `months_since_last_delinquency` is an explicit
//! `Option` rather than a sentinel value: `None` means never delinquent.
//!
//! The module also ships a deterministic dummy-profile generator, seeded
//! per user id, used to back-fill the profile store for unknown users.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::InputError;

/// A borrower's credit attributes.
///
/// Defaults mirror a middling, unremarkable borrower: no delinquencies,
/// a revolving and an installment line, five accounts, six years of
/// history. Missing inputs resolve to these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditProfile {
    // Payment history (35%)
    pub late_30: u32,
    pub late_60: u32,
    pub late_90p: u32,
    pub has_collection: bool,
    pub has_bankruptcy: bool,
    /// `None` = never delinquent.
    pub months_since_last_delinquency: Option<f64>,

    // Amounts owed / utilization (30%)
    /// Fraction in 0.0..=1.0.
    pub revolving_utilization: f64,
    /// Fraction in 0.0..=1.0.
    pub installment_balance_ratio: f64,
    pub total_accounts: u32,

    // Length of history (15%)
    pub age_oldest_acct_years: f64,
    pub avg_age_years: f64,

    // New credit (10%)
    pub hard_inquiries_12m: u32,
    pub new_accounts_12m: u32,

    // Credit mix (10%)
    pub has_mortgage: bool,
    pub has_installment: bool,
    pub has_revolving: bool,
    pub has_student_or_auto: bool,
}

impl Default for CreditProfile {
    fn default() -> Self {
        Self {
            late_30: 0,
            late_60: 0,
            late_90p: 0,
            has_collection: false,
            has_bankruptcy: false,
            months_since_last_delinquency: None,
            revolving_utilization: 0.0,
            installment_balance_ratio: 0.0,
            total_accounts: 5,
            age_oldest_acct_years: 6.0,
            avg_age_years: 3.0,
            hard_inquiries_12m: 0,
            new_accounts_12m: 0,
            has_mortgage: false,
            has_installment: true,
            has_revolving: true,
            has_student_or_auto: false,
        }
    }
}

/// Partial overlay for a [`CreditProfile`].
///
/// Every field is optional; [`ProfileUpdate::apply`] replaces only the
/// fields that are present. Ratio fields are range-checked up front so a
/// bad payload is rejected instead of silently clamped into the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub late_30: Option<u32>,
    pub late_60: Option<u32>,
    pub late_90p: Option<u32>,
    pub has_collection: Option<bool>,
    pub has_bankruptcy: Option<bool>,
    pub months_since_last_delinquency: Option<f64>,
    pub revolving_utilization: Option<f64>,
    pub installment_balance_ratio: Option<f64>,
    pub total_accounts: Option<u32>,
    pub age_oldest_acct_years: Option<f64>,
    pub avg_age_years: Option<f64>,
    pub hard_inquiries_12m: Option<u32>,
    pub new_accounts_12m: Option<u32>,
    pub has_mortgage: Option<bool>,
    pub has_installment: Option<bool>,
    pub has_revolving: Option<bool>,
    pub has_student_or_auto: Option<bool>,
}

impl ProfileUpdate {
    /// Validate the overlay's ratio fields.
    pub fn validate(&self) -> Result<(), InputError> {
        check_ratio(self.revolving_utilization, "revolving_utilization")?;
        check_ratio(self.installment_balance_ratio, "installment_balance_ratio")?;
        Ok(())
    }

    /// Apply the overlay to a base profile, returning the merged profile.
    pub fn apply(&self, base: &CreditProfile) -> CreditProfile {
        let mut out = base.clone();
        if let Some(v) = self.late_30 {
            out.late_30 = v;
        }
        if let Some(v) = self.late_60 {
            out.late_60 = v;
        }
        if let Some(v) = self.late_90p {
            out.late_90p = v;
        }
        if let Some(v) = self.has_collection {
            out.has_collection = v;
        }
        if let Some(v) = self.has_bankruptcy {
            out.has_bankruptcy = v;
        }
        if let Some(v) = self.months_since_last_delinquency {
            out.months_since_last_delinquency = Some(v);
        }
        if let Some(v) = self.revolving_utilization {
            out.revolving_utilization = v;
        }
        if let Some(v) = self.installment_balance_ratio {
            out.installment_balance_ratio = v;
        }
        if let Some(v) = self.total_accounts {
            out.total_accounts = v;
        }
        if let Some(v) = self.age_oldest_acct_years {
            out.age_oldest_acct_years = v;
        }
        if let Some(v) = self.avg_age_years {
            out.avg_age_years = v;
        }
        if let Some(v) = self.hard_inquiries_12m {
            out.hard_inquiries_12m = v;
        }
        if let Some(v) = self.new_accounts_12m {
            out.new_accounts_12m = v;
        }
        if let Some(v) = self.has_mortgage {
            out.has_mortgage = v;
        }
        if let Some(v) = self.has_installment {
            out.has_installment = v;
        }
        if let Some(v) = self.has_revolving {
            out.has_revolving = v;
        }
        if let Some(v) = self.has_student_or_auto {
            out.has_student_or_auto = v;
        }
        out
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn check_ratio(value: Option<f64>, field: &'static str) -> Result<(), InputError> {
    match value {
        Some(v) if !v.is_finite() => Err(InputError::NotFinite { field }),
        Some(v) if !(0.0..=1.0).contains(&v) => Err(InputError::RatioOutOfRange { field }),
        _ => Ok(()),
    }
}

/// Derive a stable RNG seed from an arbitrary user identifier.
fn seed_for(user_id: &str) -> u64 {
    let digest = Sha256::digest(user_id.as_bytes());
    u64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Generate a plausible dummy profile, deterministic per `user_id`.
///
/// The same id always yields the same profile, so seeded users are stable
/// across restarts. Distributions lean toward healthy borrowers: 80% have
/// no 30-day lates, 70% keep revolving utilization under 30%.
pub fn dummy_profile(user_id: &str) -> CreditProfile {
    let mut rng = StdRng::seed_from_u64(seed_for(user_id));

    let late_30 = pick(&mut rng, &[(0, 0.80), (1, 0.15), (2, 0.05)]);
    let late_60 = pick(&mut rng, &[(0, 0.92), (1, 0.08)]);
    let late_90p = pick(&mut rng, &[(0, 0.97), (1, 0.03)]);
    let has_collection = rng.gen::<f64>() < 0.06;
    let has_bankruptcy = rng.gen::<f64>() < 0.01;

    let delinquent = late_30 + late_60 + late_90p > 0 || has_collection || has_bankruptcy;
    let months_since_last_delinquency = if delinquent {
        Some(rng.gen_range(0..=36) as f64)
    } else {
        None
    };

    let revolving_utilization = if rng.gen::<f64>() < 0.7 {
        round2(rng.gen_range(0.02..0.29))
    } else {
        round2(rng.gen_range(0.30..0.95))
    };
    let installment_balance_ratio = round2(rng.gen_range(0.10..0.90));

    let total_accounts = rng.gen_range(3..=18);
    let age_oldest_acct_years = round1(rng.gen_range(2.0..20.0));
    let avg_age_years = round1(
        (age_oldest_acct_years - rng.gen_range(0.5..6.0))
            .clamp(0.5, age_oldest_acct_years),
    );

    let hard_inquiries_12m = pick(
        &mut rng,
        &[(0, 0.55), (1, 0.25), (2, 0.12), (3, 0.06), (4, 0.02)],
    );
    let new_accounts_12m = pick(&mut rng, &[(0, 0.60), (1, 0.25), (2, 0.12), (3, 0.03)]);

    CreditProfile {
        late_30,
        late_60,
        late_90p,
        has_collection,
        has_bankruptcy,
        months_since_last_delinquency,
        revolving_utilization,
        installment_balance_ratio,
        total_accounts,
        age_oldest_acct_years,
        avg_age_years,
        hard_inquiries_12m,
        new_accounts_12m,
        has_revolving: true,
        has_installment: rng.gen::<f64>() < 0.75,
        has_mortgage: rng.gen::<f64>() < 0.35,
        has_student_or_auto: rng.gen::<f64>() < 0.30,
    }
}

fn pick(rng: &mut StdRng, table: &[(u32, f64)]) -> u32 {
    let roll = rng.gen::<f64>();
    let mut cumulative = 0.0;
    for (value, weight) in table {
        cumulative += weight;
        if roll < cumulative {
            return *value;
        }
    }
    table.last().map(|(v, _)| *v).unwrap_or(0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_neutral() {
        let p = CreditProfile::default();
        assert_eq!(p.late_30, 0);
        assert_eq!(p.total_accounts, 5);
        assert!(p.months_since_last_delinquency.is_none());
        assert!(p.has_revolving);
        assert!(!p.has_mortgage);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let base = CreditProfile::default();
        let update = ProfileUpdate {
            late_30: Some(2),
            revolving_utilization: Some(0.6),
            ..Default::default()
        };

        let merged = update.apply(&base);
        assert_eq!(merged.late_30, 2);
        assert_eq!(merged.revolving_utilization, 0.6);
        // Untouched fields keep their base values.
        assert_eq!(merged.total_accounts, base.total_accounts);
        assert_eq!(merged.avg_age_years, base.avg_age_years);
    }

    #[test]
    fn update_rejects_out_of_range_ratio() {
        let update = ProfileUpdate {
            revolving_utilization: Some(1.2),
            ..Default::default()
        };
        assert_eq!(
            update.validate(),
            Err(InputError::RatioOutOfRange {
                field: "revolving_utilization"
            })
        );
    }

    #[test]
    fn update_rejects_non_finite_ratio() {
        let update = ProfileUpdate {
            installment_balance_ratio: Some(f64::NAN),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn dummy_profile_is_deterministic_per_id() {
        let a = dummy_profile("U123");
        let b = dummy_profile("U123");
        assert_eq!(a, b);

        let c = dummy_profile("U124");
        // Different ids should (overwhelmingly) differ somewhere.
        assert_ne!(a, c);
    }

    #[test]
    fn dummy_profile_stays_in_documented_ranges() {
        for id in ["alice", "bob", "carol", "1", "2", "3", "long-user-id-42"] {
            let p = dummy_profile(id);
            assert!((0.0..=1.0).contains(&p.revolving_utilization), "{id}");
            assert!((0.0..=1.0).contains(&p.installment_balance_ratio), "{id}");
            assert!((3..=18).contains(&p.total_accounts), "{id}");
            assert!(p.avg_age_years <= p.age_oldest_acct_years, "{id}");
            assert!(p.avg_age_years >= 0.5, "{id}");
            if let Some(m) = p.months_since_last_delinquency {
                assert!((0.0..=36.0).contains(&m), "{id}");
            }
            assert!(p.has_revolving);
        }
    }

    #[test]
    fn profile_serde_round_trip() {
        let p = dummy_profile("round-trip");
        let json = serde_json::to_string(&p).unwrap();
        let back: CreditProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn partial_json_deserializes_with_defaults() {
        let p: CreditProfile = serde_json::from_str(r#"{"late_30": 1}"#).unwrap();
        assert_eq!(p.late_30, 1);
        assert_eq!(p.total_accounts, 5);
    }
}

//! Loan applications and derived underwriting ratios.
//!
//! Currency amounts used as denominators are validated up front and never
//! silently defaulted; everything downstream of [`LoanApplication::validate`]
//! can assume positive, finite figures.

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::scoring::CreditScore;

/// A mortgage application's financial figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub property_value: f64,
    pub loan_amount: f64,
    pub monthly_installment: f64,
    pub monthly_income: f64,
    /// Optional LTV override; accepted as either a fraction or a
    /// percentage and normalized by [`LoanApplication::derived`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltv_ratio: Option<f64>,
}

/// Ratios derived from the application, normalized to fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Debt-to-income: monthly installment over monthly income.
    pub dti: f64,
    /// Loan-to-value: loan amount over property value.
    pub ltv: f64,
}

impl LoanApplication {
    /// Reject malformed figures before any evaluator runs.
    pub fn validate(&self) -> Result<(), InputError> {
        check_amount(self.property_value, "propertyValue")?;
        check_amount(self.loan_amount, "loanAmount")?;
        check_amount(self.monthly_installment, "monthlyInstallment")?;
        check_amount(self.monthly_income, "monthlyIncome")?;
        if let Some(ltv) = self.ltv_ratio {
            if !ltv.is_finite() {
                return Err(InputError::NotFinite { field: "ltvRatio" });
            }
        }
        Ok(())
    }

    /// Compute DTI and LTV. Callers must [`validate`](Self::validate)
    /// first; denominators are assumed positive.
    pub fn derived(&self) -> DerivedMetrics {
        DerivedMetrics {
            dti: self.monthly_installment / self.monthly_income,
            ltv: self
                .ltv_ratio
                .map(normalize_ltv)
                .unwrap_or(self.loan_amount / self.property_value),
        }
    }
}

/// An LTV override above 1.5 is read as a percentage (e.g. `85` for 85%)
/// and scaled down; genuine fractional LTVs above 150% do not occur in
/// practice.
fn normalize_ltv(value: f64) -> f64 {
    if value > 1.5 {
        value / 100.0
    } else {
        value
    }
}

fn check_amount(value: f64, field: &'static str) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(InputError::NonPositiveAmount { field });
    }
    Ok(())
}

/// The request envelope consumed by the ensemble decider.
///
/// Mirrors the upstream application service's JSON shape; when
/// `creditScore` is omitted the decider scores a resolved profile itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub kpr_application: KprApplication,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<CreditScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KprApplication {
    pub data: ApplicationData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationData {
    pub property_value: f64,
    pub loan_amount: f64,
    pub monthly_installment: f64,
    pub user_info: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ltv_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub monthly_income: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl RecommendationRequest {
    /// Flatten the envelope into a [`LoanApplication`].
    pub fn loan(&self) -> LoanApplication {
        let data = &self.kpr_application.data;
        LoanApplication {
            property_value: data.property_value,
            loan_amount: data.loan_amount,
            monthly_installment: data.monthly_installment,
            monthly_income: data.user_info.monthly_income,
            ltv_ratio: data.ltv_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_loan() -> LoanApplication {
        LoanApplication {
            property_value: 2_100_000_000.0,
            loan_amount: 1_785_000_000.0,
            monthly_installment: 16_500_000.0,
            monthly_income: 10_000_000.0,
            ltv_ratio: None,
        }
    }

    #[test]
    fn derives_dti_and_ltv() {
        let loan = sample_loan();
        loan.validate().unwrap();
        let d = loan.derived();
        assert!((d.dti - 1.65).abs() < 1e-9);
        assert!((d.ltv - 0.85).abs() < 1e-9);
    }

    #[test]
    fn ltv_override_takes_precedence() {
        let loan = LoanApplication {
            ltv_ratio: Some(0.7),
            ..sample_loan()
        };
        assert!((loan.derived().ltv - 0.7).abs() < 1e-9);
    }

    #[test]
    fn percentage_ltv_override_is_normalized() {
        let loan = LoanApplication {
            ltv_ratio: Some(85.0),
            ..sample_loan()
        };
        assert!((loan.derived().ltv - 0.85).abs() < 1e-9);
    }

    #[test]
    fn zero_income_is_an_input_error() {
        let loan = LoanApplication {
            monthly_income: 0.0,
            ..sample_loan()
        };
        assert_eq!(
            loan.validate(),
            Err(InputError::NonPositiveAmount {
                field: "monthlyIncome"
            })
        );
    }

    #[test]
    fn negative_property_value_is_an_input_error() {
        let loan = LoanApplication {
            property_value: -1.0,
            ..sample_loan()
        };
        assert!(loan.validate().is_err());
    }

    #[test]
    fn envelope_deserializes_camel_case() {
        let json = r#"{
            "kprApplication": {
                "data": {
                    "propertyValue": 2100000000,
                    "loanAmount": 1785000000,
                    "monthlyInstallment": 16500000,
                    "userInfo": { "monthlyIncome": 10000000, "userId": "U123" }
                }
            }
        }"#;
        let request: RecommendationRequest = serde_json::from_str(json).unwrap();
        assert!(request.credit_score.is_none());

        let loan = request.loan();
        assert_eq!(loan.monthly_income, 10_000_000.0);
        assert_eq!(
            request.kpr_application.data.user_info.user_id.as_deref(),
            Some("U123")
        );
    }
}

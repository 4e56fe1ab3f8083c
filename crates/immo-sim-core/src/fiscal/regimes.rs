use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{pct, with_metadata, ComputationOutput, Money, Percent, MONTHS_PER_YEAR};

/// Social levies on French property income.
pub const DEFAULT_SOCIAL_TAX_RATE_PCT: Decimal = dec!(17.2);

/// Share of rent taxed under micro-foncier (30% flat allowance).
const MICRO_FONCIER_TAXABLE_SHARE: Decimal = dec!(0.7);
/// Share of rent taxed under micro-BIC (50% flat allowance).
const MICRO_BIC_TAXABLE_SHARE: Decimal = dec!(0.5);

fn default_social_tax_rate() -> Percent {
    DEFAULT_SOCIAL_TAX_RATE_PCT
}

/// French rental-income tax regimes. Unfurnished lets use micro-foncier or
/// réel; furnished lets (LMNP) use micro-BIC or réel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalRegime {
    MicroFoncier,
    Real,
    LmnpMicroBic,
    LmnpReal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiscalProfile {
    pub regime: FiscalRegime,
    /// Marginal income-tax bracket, in percent
    pub marginal_tax_rate_pct: Percent,
    #[serde(default = "default_social_tax_rate")]
    pub social_tax_rate_pct: Percent,
}

/// Tax due under one regime, split by component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub regime: FiscalRegime,
    pub taxable_income: Money,
    pub income_tax: Money,
    pub social_tax: Money,
    pub annual_tax: Money,
    pub monthly_tax: Money,
}

impl FiscalRegime {
    pub const ALL: [FiscalRegime; 4] = [
        FiscalRegime::MicroFoncier,
        FiscalRegime::Real,
        FiscalRegime::LmnpMicroBic,
        FiscalRegime::LmnpReal,
    ];

    /// LMNP regimes apply to furnished lets only.
    pub fn is_furnished(self) -> bool {
        matches!(self, FiscalRegime::LmnpMicroBic | FiscalRegime::LmnpReal)
    }

    /// Whether social levies are added on top of the marginal rate.
    pub fn includes_social_tax(self) -> bool {
        matches!(self, FiscalRegime::MicroFoncier | FiscalRegime::Real)
    }

    pub fn label(self) -> &'static str {
        match self {
            FiscalRegime::MicroFoncier => "Micro-foncier",
            FiscalRegime::Real => "Régime réel",
            FiscalRegime::LmnpMicroBic => "LMNP micro-BIC",
            FiscalRegime::LmnpReal => "LMNP réel",
        }
    }

    /// Income the regime taxes, never negative.
    pub fn taxable_income(self, annual_rent: Money, annual_expenses: Money) -> Money {
        if annual_rent <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        match self {
            FiscalRegime::MicroFoncier => annual_rent * MICRO_FONCIER_TAXABLE_SHARE,
            FiscalRegime::LmnpMicroBic => annual_rent * MICRO_BIC_TAXABLE_SHARE,
            FiscalRegime::Real | FiscalRegime::LmnpReal => {
                (annual_rent - annual_expenses).max(Decimal::ZERO)
            }
        }
    }

    pub fn annual_tax(
        self,
        annual_rent: Money,
        annual_expenses: Money,
        marginal_rate_pct: Percent,
        social_rate_pct: Percent,
    ) -> Money {
        let tax = match self {
            FiscalRegime::MicroFoncier => micro_foncier_tax,
            FiscalRegime::Real => real_regime_tax,
            FiscalRegime::LmnpMicroBic => lmnp_micro_bic_tax,
            FiscalRegime::LmnpReal => lmnp_real_tax,
        };
        tax(annual_rent, annual_expenses, marginal_rate_pct, social_rate_pct)
    }
}

// ---------------------------------------------------------------------------
// Regime functions
// ---------------------------------------------------------------------------

/// 30% flat allowance; expenses are ignored.
pub fn micro_foncier_tax(
    annual_rent: Money,
    _annual_expenses: Money,
    marginal_rate_pct: Percent,
    social_rate_pct: Percent,
) -> Money {
    let taxable = FiscalRegime::MicroFoncier.taxable_income(annual_rent, Decimal::ZERO);
    taxable * pct(marginal_rate_pct + social_rate_pct)
}

/// Actual expenses deducted; a deficit is not taxed.
pub fn real_regime_tax(
    annual_rent: Money,
    annual_expenses: Money,
    marginal_rate_pct: Percent,
    social_rate_pct: Percent,
) -> Money {
    let taxable = FiscalRegime::Real.taxable_income(annual_rent, annual_expenses);
    taxable * pct(marginal_rate_pct + social_rate_pct)
}

/// Furnished let, 50% flat allowance, marginal rate only.
pub fn lmnp_micro_bic_tax(
    annual_rent: Money,
    _annual_expenses: Money,
    marginal_rate_pct: Percent,
    _social_rate_pct: Percent,
) -> Money {
    let taxable = FiscalRegime::LmnpMicroBic.taxable_income(annual_rent, Decimal::ZERO);
    taxable * pct(marginal_rate_pct)
}

/// Furnished let with actual expenses. The caller includes depreciation in
/// `annual_expenses`. Marginal rate only, no social levies.
pub fn lmnp_real_tax(
    annual_rent: Money,
    annual_expenses: Money,
    marginal_rate_pct: Percent,
    _social_rate_pct: Percent,
) -> Money {
    let taxable = FiscalRegime::LmnpReal.taxable_income(annual_rent, annual_expenses);
    taxable * pct(marginal_rate_pct)
}

/// Tax due for a profile, with the income/social split.
pub fn compute_tax(profile: &FiscalProfile, annual_rent: Money, annual_expenses: Money) -> TaxBreakdown {
    let regime = profile.regime;
    let taxable_income = regime.taxable_income(annual_rent, annual_expenses);
    let income_tax = taxable_income * pct(profile.marginal_tax_rate_pct);
    let social_tax = if regime.includes_social_tax() {
        taxable_income * pct(profile.social_tax_rate_pct)
    } else {
        Decimal::ZERO
    };
    let annual_tax = regime.annual_tax(
        annual_rent,
        annual_expenses,
        profile.marginal_tax_rate_pct,
        profile.social_tax_rate_pct,
    );

    TaxBreakdown {
        regime,
        taxable_income,
        income_tax,
        social_tax,
        annual_tax,
        monthly_tax: annual_tax / MONTHS_PER_YEAR,
    }
}

/// The same rent and expenses under all four regimes.
pub fn compare_regimes(
    annual_rent: Money,
    annual_expenses: Money,
    marginal_rate_pct: Percent,
    social_rate_pct: Percent,
) -> Vec<TaxBreakdown> {
    FiscalRegime::ALL
        .iter()
        .map(|&regime| {
            let profile = FiscalProfile {
                regime,
                marginal_tax_rate_pct: marginal_rate_pct,
                social_tax_rate_pct: social_rate_pct,
            };
            compute_tax(&profile, annual_rent, annual_expenses)
        })
        .collect()
}

/// Rental tax request: one profile, plus the side-by-side comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalTaxInput {
    pub annual_rent: Money,
    /// Deductible charges, only used by the real regimes
    #[serde(default)]
    pub annual_expenses: Money,
    pub profile: FiscalProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalTaxAnalysis {
    pub selected: TaxBreakdown,
    pub comparison: Vec<TaxBreakdown>,
    /// Regime with the lowest annual tax
    pub cheapest: FiscalRegime,
}

pub fn analyze_rental_tax(input: &RentalTaxInput) -> ComputationOutput<RentalTaxAnalysis> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_rent <= Decimal::ZERO {
        warnings.push("Annual rent is not positive: no tax due".into());
    }
    if input.annual_expenses > input.annual_rent && input.annual_rent > Decimal::ZERO {
        warnings.push("Expenses exceed rent: the deficit is not carried forward".into());
    }

    let p = &input.profile;
    let selected = compute_tax(p, input.annual_rent, input.annual_expenses);
    let comparison = compare_regimes(
        input.annual_rent,
        input.annual_expenses,
        p.marginal_tax_rate_pct,
        p.social_tax_rate_pct,
    );
    let cheapest = comparison
        .iter()
        .min_by(|a, b| a.annual_tax.cmp(&b.annual_tax))
        .map(|b| b.regime)
        .unwrap_or(p.regime);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "French rental income tax (micro-foncier, reel, LMNP micro-BIC, LMNP reel)",
        input,
        warnings,
        elapsed,
        RentalTaxAnalysis {
            selected,
            comparison,
            cheapest,
        },
    )
}

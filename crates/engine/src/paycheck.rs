//! Paycheck schedules and net pay.
//!
//! Turns a salaried income source into the dated, net-of-deduction
//! [`IncomeEvent`]s the allocation engine consumes. Everything here is
//! calendar arithmetic and integer cents; no ledger access.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, IncomeEvent, Money, ResultEngine};

/// How often a source pays out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    Weekly,
    BiWeekly,
    SemiMonthly,
    Monthly,
}

impl PayFrequency {
    #[must_use]
    pub const fn paychecks_per_year(self) -> i64 {
        match self {
            Self::Weekly => 52,
            Self::BiWeekly => 26,
            Self::SemiMonthly => 24,
            Self::Monthly => 12,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi_weekly",
            Self::SemiMonthly => "semi_monthly",
            Self::Monthly => "monthly",
        }
    }
}

impl TryFrom<&str> for PayFrequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "bi_weekly" => Ok(Self::BiWeekly),
            "semi_monthly" => Ok(Self::SemiMonthly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::Validation(format!(
                "invalid pay frequency: {other}"
            ))),
        }
    }
}

/// A salaried income stream paying into one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: Uuid,
    pub name: String,
    pub annual_salary: Money,
    pub frequency: PayFrequency,
    pub first_pay_date: NaiveDate,
    pub account_id: Uuid,
    pub active: bool,
}

impl IncomeSource {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        annual_salary: Money,
        frequency: PayFrequency,
        first_pay_date: NaiveDate,
        account_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            annual_salary,
            frequency,
            first_pay_date,
            account_id,
            active: true,
        }
    }

    /// Gross amount of a single paycheck: annual salary split evenly,
    /// truncating to whole cents.
    #[must_use]
    pub fn gross_per_paycheck(&self) -> Money {
        self.annual_salary
            .div_truncate(self.frequency.paychecks_per_year())
    }
}

/// One payroll deduction withheld from every paycheck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    pub name: String,
    pub kind: DeductionKind,
    pub pre_tax: bool,
    pub active: bool,
}

/// How a deduction's per-paycheck amount is computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeductionKind {
    /// Share of gross pay, in basis points (600 = 6%).
    Percentage { basis_points: i64 },
    /// Flat amount withheld from each paycheck.
    PerPaycheck { amount: Money },
    /// Flat annual amount, spread evenly across the year's paychecks.
    Annual { amount: Money },
}

impl Deduction {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DeductionKind, pre_tax: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            pre_tax,
            active: true,
        }
    }

    /// Amount withheld from one paycheck. Percentages apply to gross pay;
    /// pre-tax withholding does not shrink the base of later percentage
    /// deductions.
    #[must_use]
    pub fn per_paycheck(&self, gross: Money, frequency: PayFrequency) -> Money {
        match self.kind {
            DeductionKind::Percentage { basis_points } => gross.percent_bp(basis_points),
            DeductionKind::PerPaycheck { amount } => amount,
            DeductionKind::Annual { amount } => {
                amount.div_truncate(frequency.paychecks_per_year())
            }
        }
    }
}

/// A single paycheck decomposed into its withholding buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaycheckBreakdown {
    pub gross: Money,
    pub pre_tax: Money,
    pub post_tax: Money,
    pub net: Money,
}

/// Computes take-home pay for one paycheck.
#[must_use]
pub fn net_pay(
    gross: Money,
    deductions: &[Deduction],
    frequency: PayFrequency,
) -> PaycheckBreakdown {
    let mut pre_tax = Money::ZERO;
    let mut post_tax = Money::ZERO;
    for deduction in deductions.iter().filter(|d| d.active) {
        let amount = deduction.per_paycheck(gross, frequency);
        if deduction.pre_tax {
            pre_tax += amount;
        } else {
            post_tax += amount;
        }
    }
    PaycheckBreakdown {
        gross,
        pre_tax,
        post_tax,
        net: gross - pre_tax - post_tax,
    }
}

/// Pay dates for `source` falling within `[from, to]`, inclusive.
///
/// Weekly and bi-weekly schedules step 7 and 14 days from the first pay
/// date. Semi-monthly alternates the 1st and 15th. Monthly advances one
/// calendar month, with the day clamped when the month is shorter.
pub fn pay_dates(
    source: &IncomeSource,
    from: NaiveDate,
    to: NaiveDate,
) -> ResultEngine<Vec<NaiveDate>> {
    if from > to {
        return Err(EngineError::Validation(
            "schedule range start must not be after its end".to_string(),
        ));
    }

    let mut dates = Vec::new();
    let mut current = source.first_pay_date;
    while current <= to {
        if current >= from {
            dates.push(current);
        }
        current = match source.frequency {
            PayFrequency::Weekly => next_by_days(current, 7)?,
            PayFrequency::BiWeekly => next_by_days(current, 14)?,
            PayFrequency::SemiMonthly => next_semi_monthly(current)?,
            PayFrequency::Monthly => current.checked_add_months(Months::new(1)).ok_or_else(
                || EngineError::Validation("pay date overflowed the calendar".to_string()),
            )?,
        };
    }
    Ok(dates)
}

fn next_by_days(date: NaiveDate, days: u64) -> ResultEngine<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| EngineError::Validation("pay date overflowed the calendar".to_string()))
}

/// The 15th when before the 15th, otherwise the 1st of the next month.
fn next_semi_monthly(date: NaiveDate) -> ResultEngine<NaiveDate> {
    let next = if date.day() < 15 {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 15)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
    };
    next.ok_or_else(|| EngineError::Validation("pay date overflowed the calendar".to_string()))
}

/// Materializes net-pay income events for `source` over `[from, to]`.
///
/// The output is what the allocation engine takes as input: one event
/// per pay date, carrying take-home pay. Inactive sources and paychecks
/// whose deductions consume the full gross yield nothing.
pub fn income_events(
    source: &IncomeSource,
    deductions: &[Deduction],
    from: NaiveDate,
    to: NaiveDate,
) -> ResultEngine<Vec<IncomeEvent>> {
    if !source.active {
        return Ok(Vec::new());
    }
    let gross = source.gross_per_paycheck();
    let breakdown = net_pay(gross, deductions, source.frequency);
    if !breakdown.net.is_positive() {
        tracing::warn!(
            source = %source.name,
            gross = %breakdown.gross,
            net = %breakdown.net,
            "deductions consume the full paycheck, no income events generated"
        );
        return Ok(Vec::new());
    }
    Ok(pay_dates(source, from, to)?
        .into_iter()
        .map(|date| IncomeEvent::new(source.id, source.account_id, date, breakdown.net))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn source(frequency: PayFrequency, first: NaiveDate) -> IncomeSource {
        IncomeSource::new(
            "Job",
            Money::new(5_200_000),
            frequency,
            first,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn bi_weekly_year_has_twenty_six_dates() {
        let src = source(PayFrequency::BiWeekly, date(2024, 1, 5));
        let dates = pay_dates(&src, date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(dates.len(), 26);
        assert_eq!(dates[0], date(2024, 1, 5));
        assert_eq!(dates[1], date(2024, 1, 19));
    }

    #[test]
    fn semi_monthly_alternates_first_and_fifteenth() {
        let src = source(PayFrequency::SemiMonthly, date(2024, 1, 1));
        let dates = pay_dates(&src, date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 15),
                date(2024, 2, 1),
                date(2024, 2, 15),
                date(2024, 3, 1),
                date(2024, 3, 15),
            ]
        );
    }

    #[test]
    fn monthly_clamps_short_months() {
        let src = source(PayFrequency::Monthly, date(2024, 1, 31));
        let dates = pay_dates(&src, date(2024, 1, 1), date(2024, 4, 30)).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 29),
                date(2024, 4, 29),
            ]
        );
    }

    #[test]
    fn gross_splits_annual_salary_truncating() {
        let src = source(PayFrequency::BiWeekly, date(2024, 1, 5));
        // 52_000.00 / 26 = 2_000.00 exactly.
        assert_eq!(src.gross_per_paycheck(), Money::new(200_000));

        let odd = IncomeSource::new(
            "Odd",
            Money::new(100_000),
            PayFrequency::Weekly,
            date(2024, 1, 5),
            Uuid::new_v4(),
        );
        // 1000.00 / 52 = 19.23076.., truncated to 19.23.
        assert_eq!(odd.gross_per_paycheck(), Money::new(1_923));
    }

    #[test]
    fn net_pay_buckets_deductions() {
        let deductions = vec![
            Deduction::new(
                "401k",
                DeductionKind::Percentage { basis_points: 600 },
                true,
            ),
            Deduction::new(
                "Health",
                DeductionKind::PerPaycheck {
                    amount: Money::new(7_500),
                },
                true,
            ),
            Deduction::new(
                "Union dues",
                DeductionKind::Annual {
                    amount: Money::new(26_000),
                },
                false,
            ),
        ];
        let breakdown = net_pay(Money::new(200_000), &deductions, PayFrequency::BiWeekly);
        // 6% of 2000.00 = 120.00 plus 75.00 health, pre-tax.
        assert_eq!(breakdown.pre_tax, Money::new(19_500));
        // 260.00 annual over 26 paychecks = 10.00.
        assert_eq!(breakdown.post_tax, Money::new(1_000));
        assert_eq!(breakdown.net, Money::new(179_500));
    }

    #[test]
    fn inactive_deductions_ignored() {
        let mut deduction = Deduction::new(
            "Old plan",
            DeductionKind::Percentage {
                basis_points: 5_000,
            },
            true,
        );
        deduction.active = false;
        let breakdown = net_pay(Money::new(100_000), &[deduction], PayFrequency::Monthly);
        assert_eq!(breakdown.net, Money::new(100_000));
    }

    #[test]
    fn income_events_carry_net_pay() {
        let src = source(PayFrequency::Monthly, date(2024, 1, 15));
        let deductions = vec![Deduction::new(
            "Tax withholding",
            DeductionKind::Percentage {
                basis_points: 2_000,
            },
            true,
        )];
        let events = income_events(&src, &deductions, date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(events.len(), 3);
        // Gross 5_200_000 / 12 = 433_333; net = gross - 20%.
        let gross = Money::new(433_333);
        let expected_net = gross - gross.percent_bp(2_000);
        for event in &events {
            assert_eq!(event.amount, expected_net);
            assert_eq!(event.source_id, src.id);
            assert_eq!(event.account_id, src.account_id);
        }
    }

    #[test]
    fn inactive_source_yields_nothing() {
        let mut src = source(PayFrequency::Weekly, date(2024, 1, 5));
        src.active = false;
        let events = income_events(&src, &[], date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn reversed_range_rejected() {
        let src = source(PayFrequency::Weekly, date(2024, 1, 5));
        assert!(pay_dates(&src, date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }
}

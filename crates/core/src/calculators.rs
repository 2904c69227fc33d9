//! Paid-traffic and unit-economics calculators.
//!
//! Every metric is a single ratio over campaign numbers. Results carry the
//! raw value, a display string, and a traffic-light [`Rating`] used by the
//! marketing calculators and the report summary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Metric kinds
// ---------------------------------------------------------------------------

/// Every metric the calculators know how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Roas,
    Cpa,
    Cpc,
    Cpm,
    Cpl,
    Ctr,
    Roi,
    ConversionRate,
    Ltv,
    Cac,
    LtvCac,
}

/// All metric kinds, in display order.
pub const ALL_METRICS: &[MetricKind] = &[
    MetricKind::Roas,
    MetricKind::Cpa,
    MetricKind::Cpc,
    MetricKind::Cpm,
    MetricKind::Cpl,
    MetricKind::Ctr,
    MetricKind::Roi,
    MetricKind::ConversionRate,
    MetricKind::Ltv,
    MetricKind::Cac,
    MetricKind::LtvCac,
];

impl MetricKind {
    /// Parse the path segment used by `POST /calculators/{kind}`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        ALL_METRICS
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown calculator '{s}'")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Roas => "roas",
            MetricKind::Cpa => "cpa",
            MetricKind::Cpc => "cpc",
            MetricKind::Cpm => "cpm",
            MetricKind::Cpl => "cpl",
            MetricKind::Ctr => "ctr",
            MetricKind::Roi => "roi",
            MetricKind::ConversionRate => "conversion_rate",
            MetricKind::Ltv => "ltv",
            MetricKind::Cac => "cac",
            MetricKind::LtvCac => "ltv_cac",
        }
    }

    fn format(self) -> ValueFormat {
        match self {
            MetricKind::Roas | MetricKind::LtvCac => ValueFormat::Multiplier,
            MetricKind::Ctr | MetricKind::Roi | MetricKind::ConversionRate => ValueFormat::Percent,
            MetricKind::Cpa
            | MetricKind::Cpc
            | MetricKind::Cpm
            | MetricKind::Cpl
            | MetricKind::Ltv
            | MetricKind::Cac => ValueFormat::Money,
        }
    }

    /// `(good_at_or_above, warning_at_or_above)` for rated metrics.
    fn thresholds(self) -> Option<(f64, f64)> {
        match self {
            MetricKind::Roas => Some((3.0, 1.0)),
            MetricKind::Ctr => Some((2.0, 1.0)),
            MetricKind::Roi => Some((100.0, 0.0)),
            MetricKind::LtvCac => Some((3.0, 1.0)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueFormat {
    Multiplier,
    Money,
    Percent,
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Traffic-light classification of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Good,
    Warning,
    Bad,
    /// Cost metrics depend on the niche and are not rated.
    Neutral,
}

impl Rating {
    /// Display colour used by the browser for this rating.
    pub fn color(self) -> &'static str {
        match self {
            Rating::Good => "green",
            Rating::Warning => "yellow",
            Rating::Bad => "red",
            Rating::Neutral => "gray",
        }
    }
}

/// Rate `value` against the static thresholds for `kind`.
pub fn rate(kind: MetricKind, value: f64) -> Rating {
    match kind.thresholds() {
        Some((good, _)) if value >= good => Rating::Good,
        Some((_, warning)) if value >= warning => Rating::Warning,
        Some(_) => Rating::Bad,
        None => Rating::Neutral,
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format a multiplier, e.g. `3.00x`.
pub fn format_multiplier(value: f64) -> String {
    format!("{value:.2}x")
}

/// Format a money amount in reais, e.g. `R$ 12.50`.
pub fn format_money(value: f64) -> String {
    format!("R$ {value:.2}")
}

/// Format a percentage, e.g. `2.50%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn format_value(kind: MetricKind, value: f64) -> String {
    match kind.format() {
        ValueFormat::Multiplier => format_multiplier(value),
        ValueFormat::Money => format_money(value),
        ValueFormat::Percent => format_percent(value),
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

fn non_negative(field: &str, value: f64) -> Result<f64, CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// Finite inputs can still overflow to infinity.
fn finite(value: f64) -> Result<f64, CoreError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::Validation(
            "inputs are too large to produce a result".into(),
        ))
    }
}

fn ratio(numerator: (&str, f64), denominator: (&str, f64)) -> Result<f64, CoreError> {
    let n = non_negative(numerator.0, numerator.1)?;
    let d = non_negative(denominator.0, denominator.1)?;
    if d == 0.0 {
        return Err(CoreError::Validation(format!(
            "{} must be greater than zero",
            denominator.0
        )));
    }
    finite(n / d)
}

/// Return on ad spend: revenue / investment.
pub fn roas(investment: f64, revenue: f64) -> Result<f64, CoreError> {
    ratio(("revenue", revenue), ("investment", investment))
}

/// Cost per acquisition: investment / conversions.
pub fn cpa(investment: f64, conversions: f64) -> Result<f64, CoreError> {
    ratio(("investment", investment), ("conversions", conversions))
}

/// Cost per click: investment / clicks.
pub fn cpc(investment: f64, clicks: f64) -> Result<f64, CoreError> {
    ratio(("investment", investment), ("clicks", clicks))
}

/// Cost per thousand impressions.
pub fn cpm(investment: f64, impressions: f64) -> Result<f64, CoreError> {
    finite(ratio(("investment", investment), ("impressions", impressions))? * 1000.0)
}

/// Cost per lead: investment / leads.
pub fn cpl(investment: f64, leads: f64) -> Result<f64, CoreError> {
    ratio(("investment", investment), ("leads", leads))
}

/// Click-through rate in percent.
pub fn ctr(clicks: f64, impressions: f64) -> Result<f64, CoreError> {
    finite(ratio(("clicks", clicks), ("impressions", impressions))? * 100.0)
}

/// Return on investment in percent. May be negative.
pub fn roi(investment: f64, revenue: f64) -> Result<f64, CoreError> {
    let investment = non_negative("investment", investment)?;
    let revenue = non_negative("revenue", revenue)?;
    if investment == 0.0 {
        return Err(CoreError::Validation(
            "investment must be greater than zero".into(),
        ));
    }
    finite((revenue - investment) / investment * 100.0)
}

/// Conversions per click, in percent.
pub fn conversion_rate(conversions: f64, clicks: f64) -> Result<f64, CoreError> {
    finite(ratio(("conversions", conversions), ("clicks", clicks))? * 100.0)
}

/// Customer lifetime value: ticket × purchases per period × retained periods.
pub fn ltv(
    average_ticket: f64,
    purchases_per_period: f64,
    retention_periods: f64,
) -> Result<f64, CoreError> {
    finite(
        non_negative("average_ticket", average_ticket)?
            * non_negative("purchases_per_period", purchases_per_period)?
            * non_negative("retention_periods", retention_periods)?,
    )
}

/// Customer acquisition cost: acquisition spend / new customers.
pub fn cac(acquisition_spend: f64, new_customers: f64) -> Result<f64, CoreError> {
    ratio(
        ("acquisition_spend", acquisition_spend),
        ("new_customers", new_customers),
    )
}

/// LTV to CAC ratio.
pub fn ltv_cac(ltv: f64, cac: f64) -> Result<f64, CoreError> {
    ratio(("ltv", ltv), ("cac", cac))
}

// ---------------------------------------------------------------------------
// Request-shaped evaluation
// ---------------------------------------------------------------------------

/// Loose bag of calculator inputs. Each metric reads only the fields it needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculatorInput {
    pub investment: Option<f64>,
    pub revenue: Option<f64>,
    pub conversions: Option<f64>,
    pub clicks: Option<f64>,
    pub impressions: Option<f64>,
    pub leads: Option<f64>,
    pub average_ticket: Option<f64>,
    pub purchases_per_period: Option<f64>,
    pub retention_periods: Option<f64>,
    pub acquisition_spend: Option<f64>,
    pub new_customers: Option<f64>,
    pub ltv: Option<f64>,
    pub cac: Option<f64>,
}

/// A computed metric ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub kind: MetricKind,
    pub value: f64,
    pub formatted: String,
    pub rating: Rating,
    pub color: &'static str,
}

impl MetricResult {
    pub fn new(kind: MetricKind, value: f64) -> Self {
        let rating = rate(kind, value);
        Self {
            kind,
            value,
            formatted: format_value(kind, value),
            rating,
            color: rating.color(),
        }
    }
}

fn required(field: &str, value: Option<f64>) -> Result<f64, CoreError> {
    value.ok_or_else(|| CoreError::Validation(format!("{field} is required")))
}

/// Compute `kind` from a request body.
pub fn calculate(kind: MetricKind, input: &CalculatorInput) -> Result<MetricResult, CoreError> {
    let value = match kind {
        MetricKind::Roas => roas(
            required("investment", input.investment)?,
            required("revenue", input.revenue)?,
        )?,
        MetricKind::Cpa => cpa(
            required("investment", input.investment)?,
            required("conversions", input.conversions)?,
        )?,
        MetricKind::Cpc => cpc(
            required("investment", input.investment)?,
            required("clicks", input.clicks)?,
        )?,
        MetricKind::Cpm => cpm(
            required("investment", input.investment)?,
            required("impressions", input.impressions)?,
        )?,
        MetricKind::Cpl => cpl(
            required("investment", input.investment)?,
            required("leads", input.leads)?,
        )?,
        MetricKind::Ctr => ctr(
            required("clicks", input.clicks)?,
            required("impressions", input.impressions)?,
        )?,
        MetricKind::Roi => roi(
            required("investment", input.investment)?,
            required("revenue", input.revenue)?,
        )?,
        MetricKind::ConversionRate => conversion_rate(
            required("conversions", input.conversions)?,
            required("clicks", input.clicks)?,
        )?,
        MetricKind::Ltv => ltv(
            required("average_ticket", input.average_ticket)?,
            required("purchases_per_period", input.purchases_per_period)?,
            required("retention_periods", input.retention_periods)?,
        )?,
        MetricKind::Cac => cac(
            required("acquisition_spend", input.acquisition_spend)?,
            required("new_customers", input.new_customers)?,
        )?,
        MetricKind::LtvCac => ltv_cac(required("ltv", input.ltv)?, required("cac", input.cac)?)?,
    };
    Ok(MetricResult::new(kind, value))
}

// ---------------------------------------------------------------------------
// Campaign summaries
// ---------------------------------------------------------------------------

/// Raw campaign numbers for one reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CampaignNumbers {
    pub investment: f64,
    pub revenue: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub leads: i64,
    pub conversions: i64,
}

/// Compute every campaign metric whose inputs are present.
///
/// Metrics with a zero denominator are skipped rather than failing the whole
/// summary, since a report with no leads is still a valid report.
pub fn campaign_metrics(numbers: &CampaignNumbers) -> Vec<MetricResult> {
    let n = numbers;
    let candidates = [
        (MetricKind::Roas, roas(n.investment, n.revenue)),
        (MetricKind::Roi, roi(n.investment, n.revenue)),
        (MetricKind::Cpa, cpa(n.investment, n.conversions as f64)),
        (MetricKind::Cpc, cpc(n.investment, n.clicks as f64)),
        (MetricKind::Cpm, cpm(n.investment, n.impressions as f64)),
        (MetricKind::Cpl, cpl(n.investment, n.leads as f64)),
        (MetricKind::Ctr, ctr(n.clicks as f64, n.impressions as f64)),
        (
            MetricKind::ConversionRate,
            conversion_rate(n.conversions as f64, n.clicks as f64),
        ),
    ];
    candidates
        .into_iter()
        .filter_map(|(kind, value)| value.ok().map(|v| MetricResult::new(kind, v)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

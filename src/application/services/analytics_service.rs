use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use time::{Date, Duration};

use crate::domain::entities::{
    ConsultationFact, ConsumptionQuery, ConsumptionRow, DashboardSummary, DepartmentConsumption,
    DepartmentMonthlyAverage, DerivationFact, DoctorSuccessRate, MedicationConsumption,
    MonthlyAveragesQuery, MonthlyAveragesReport, MonthlyCount, SuccessRateQuery,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::AnalyticsRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::shared::timestamps::{format_date, month_key, month_start_before, parse_date, today};
use crate::shared::Validator;

pub const DEFAULT_SUCCESS_WINDOW_DAYS: i64 = 180;
pub const DEFAULT_FOLLOW_UP_DAYS: i64 = 30;
pub const DEFAULT_MONTHS: u32 = 6;
pub const DEFAULT_CONSUMPTION_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_CONSUMPTION_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct AnalyticsService {
    analytics_repo: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(analytics_repo: Arc<dyn AnalyticsRepository>) -> Self {
        Self { analytics_repo }
    }

    pub async fn doctor_success_rates(
        &self,
        query: SuccessRateQuery,
    ) -> ApiResult<Vec<DoctorSuccessRate>> {
        let (from, to) = resolve_window(
            query.from.as_deref(),
            query.to.as_deref(),
            DEFAULT_SUCCESS_WINDOW_DAYS,
        )?;
        let follow_up_days = query.follow_up_days.unwrap_or(DEFAULT_FOLLOW_UP_DAYS);
        Validator::new()
            .check(
                "follow_up_days",
                (0..=365).contains(&follow_up_days),
                "follow_up_days must be between 0 and 365",
            )
            .finish()?;
        let follow_up_end = to
            .checked_add(Duration::days(follow_up_days))
            .ok_or_else(|| {
                DomainError::invalid("to", "to leaves no room for the follow-up window")
            })?;

        let facts = self
            .analytics_repo
            .consultation_facts(
                &format_date(from),
                &format_date(to),
                query.department_id.as_deref(),
            )
            .await?;
        // Derivations after the window can still fail a consultation near its end
        let derivations = self
            .analytics_repo
            .derivation_facts(
                &format_date(from),
                &format_date(follow_up_end),
            )
            .await?;

        Ok(compute_success_rates(&facts, &derivations, follow_up_days))
    }

    pub async fn monthly_averages(
        &self,
        query: MonthlyAveragesQuery,
    ) -> ApiResult<MonthlyAveragesReport> {
        let months = query.months.unwrap_or(DEFAULT_MONTHS);
        Validator::new()
            .check(
                "months",
                (1..=24).contains(&months),
                "months must be between 1 and 24",
            )
            .finish()?;

        let window = MonthWindow::ending_before(today(), months);
        let counts = self
            .analytics_repo
            .monthly_counts(
                &format_date(window.from),
                &format_date(window.to),
                query.department_id.as_deref(),
            )
            .await?;
        let departments = self
            .analytics_repo
            .department_names(query.department_id.as_deref())
            .await?;

        Ok(MonthlyAveragesReport {
            from: format_date(window.from),
            to: format_date(window.to),
            months,
            departments: compute_monthly_averages(&departments, &counts, &window.keys),
        })
    }

    pub async fn medication_consumption(
        &self,
        query: ConsumptionQuery,
    ) -> ApiResult<Vec<MedicationConsumption>> {
        let (from, to) = resolve_window(
            query.from.as_deref(),
            query.to.as_deref(),
            DEFAULT_CONSUMPTION_WINDOW_DAYS,
        )?;
        let limit = query.limit.unwrap_or(DEFAULT_CONSUMPTION_LIMIT);
        Validator::new()
            .check(
                "limit",
                (1..=100).contains(&limit),
                "limit must be between 1 and 100",
            )
            .finish()?;

        let rows = self
            .analytics_repo
            .consumption_rows(
                &format_date(from),
                &format_date(to),
                query.department_id.as_deref(),
            )
            .await?;

        Ok(aggregate_consumption(rows, limit as usize))
    }

    pub async fn summary(&self) -> ApiResult<DashboardSummary> {
        self.analytics_repo.dashboard_summary().await
    }
}

/// Resolves an inclusive `[from, to]` window; `to` defaults to today and
/// `from` to `default_days` before `to`.
fn resolve_window(
    from: Option<&str>,
    to: Option<&str>,
    default_days: i64,
) -> DomainResult<(Date, Date)> {
    let mut v = Validator::new();
    let to = match to {
        Some(raw) => v.date("to", raw),
        None => Some(today()),
    };
    let from = match (from, to) {
        (Some(raw), _) => v.date("from", raw),
        (None, Some(to)) => {
            let start = to.checked_sub(Duration::days(default_days));
            v.check("to", start.is_some(), "to is out of the supported date range");
            start
        }
        (None, None) => None,
    };
    if let (Some(from), Some(to)) = (from, to) {
        v.check("from", from <= to, "from must not be after to");
    }
    v.finish()?;

    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(DomainError::invalid("from", "Invalid date window")),
    }
}

/// Whole calendar months before the month containing the reference date.
#[derive(Debug, PartialEq)]
struct MonthWindow {
    from: Date,
    to: Date,
    keys: Vec<String>,
}

impl MonthWindow {
    fn ending_before(reference: Date, months: u32) -> Self {
        let current_month = month_start_before(reference, 0);
        let to = current_month.previous_day().unwrap_or(current_month);
        let keys = (1..=months)
            .rev()
            .map(|back| month_key(month_start_before(reference, back)))
            .collect();
        Self {
            from: month_start_before(reference, months),
            to,
            keys,
        }
    }
}

/// A consultation succeeds when it did not end in a derivation and the
/// patient was not derived out of the same department within
/// `follow_up_days` of it.
pub fn compute_success_rates(
    facts: &[ConsultationFact],
    derivations: &[DerivationFact],
    follow_up_days: i64,
) -> Vec<DoctorSuccessRate> {
    let mut by_patient: HashMap<(&str, &str), Vec<Date>> = HashMap::new();
    for derivation in derivations {
        if let Some(date) = parse_date(&derivation.derivation_date) {
            by_patient
                .entry((
                    derivation.patient_id.as_str(),
                    derivation.origin_department_id.as_str(),
                ))
                .or_default()
                .push(date);
        }
    }

    let mut per_doctor: BTreeMap<&str, DoctorSuccessRate> = BTreeMap::new();
    for fact in facts {
        let failed_later = parse_date(&fact.consultation_date).is_some_and(|date| {
            let deadline = date
                .checked_add(Duration::days(follow_up_days))
                .unwrap_or(Date::MAX);
            by_patient
                .get(&(fact.patient_id.as_str(), fact.department_id.as_str()))
                .is_some_and(|dates| dates.iter().any(|d| *d >= date && *d <= deadline))
        });
        let successful = !fact.derived && !failed_later;

        let entry = per_doctor
            .entry(fact.doctor_id.as_str())
            .or_insert_with(|| DoctorSuccessRate {
                doctor_id: fact.doctor_id.clone(),
                doctor_name: fact.doctor_name.clone(),
                department_id: fact.department_id.clone(),
                department_name: fact.department_name.clone(),
                total_consultations: 0,
                successful_consultations: 0,
                success_rate: 0.0,
            });
        entry.total_consultations += 1;
        if successful {
            entry.successful_consultations += 1;
        }
    }

    let mut rates: Vec<DoctorSuccessRate> = per_doctor
        .into_values()
        .map(|mut rate| {
            if rate.total_consultations > 0 {
                rate.success_rate = round_to(
                    rate.successful_consultations as f64 / rate.total_consultations as f64,
                    4,
                );
            }
            rate
        })
        .collect();

    rates.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| a.doctor_name.cmp(&b.doctor_name))
    });
    rates
}

pub fn compute_monthly_averages(
    departments: &[(String, String)],
    counts: &[MonthlyCount],
    month_keys: &[String],
) -> Vec<DepartmentMonthlyAverage> {
    departments
        .iter()
        .map(|(id, name)| {
            let mut by_month: BTreeMap<String, i64> =
                month_keys.iter().map(|k| (k.clone(), 0)).collect();
            for count in counts.iter().filter(|c| &c.department_id == id) {
                if let Some(slot) = by_month.get_mut(&count.month) {
                    *slot += count.consultations;
                }
            }

            let total: i64 = by_month.values().sum();
            let months = month_keys.len().max(1) as f64;
            DepartmentMonthlyAverage {
                department_id: id.clone(),
                department_name: name.clone(),
                total_consultations: total,
                average_per_month: round_to(total as f64 / months, 2),
                by_month,
            }
        })
        .collect()
}

pub fn aggregate_consumption(
    rows: Vec<ConsumptionRow>,
    limit: usize,
) -> Vec<MedicationConsumption> {
    let mut by_medication: HashMap<String, MedicationConsumption> = HashMap::new();
    for row in rows {
        let entry = by_medication
            .entry(row.medication_id.clone())
            .or_insert_with(|| MedicationConsumption {
                medication_id: row.medication_id.clone(),
                medication_name: row.medication_name.clone(),
                total_quantity: 0,
                consultations: 0,
                by_department: Vec::new(),
            });
        entry.total_quantity += row.quantity;
        // A consultation belongs to a single department, so per-department counts add up
        entry.consultations += row.consultations;
        entry.by_department.push(DepartmentConsumption {
            department_id: row.department_id,
            department_name: row.department_name,
            quantity: row.quantity,
        });
    }

    let mut consumption: Vec<MedicationConsumption> = by_medication
        .into_values()
        .map(|mut medication| {
            medication.by_department.sort_by(|a, b| {
                b.quantity
                    .cmp(&a.quantity)
                    .then_with(|| a.department_name.cmp(&b.department_name))
            });
            medication
        })
        .collect();

    consumption.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| a.medication_name.cmp(&b.medication_name))
    });
    consumption.truncate(limit);
    consumption
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn fact(doctor: &str, patient: &str, date: &str, derived: bool) -> ConsultationFact {
        ConsultationFact {
            doctor_id: doctor.to_string(),
            doctor_name: format!("Dr. {}", doctor),
            department_id: "cardio".to_string(),
            department_name: "Cardiology".to_string(),
            patient_id: patient.to_string(),
            consultation_date: date.to_string(),
            derived,
        }
    }

    fn derivation(patient: &str, origin: &str, date: &str) -> DerivationFact {
        DerivationFact {
            patient_id: patient.to_string(),
            origin_department_id: origin.to_string(),
            derivation_date: date.to_string(),
        }
    }

    #[test]
    fn test_derived_outcome_is_a_failure() {
        let rates = compute_success_rates(
            &[fact("a", "p1", "2024-01-10", false), fact("a", "p2", "2024-01-11", true)],
            &[],
            30,
        );
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].total_consultations, 2);
        assert_eq!(rates[0].successful_consultations, 1);
        assert_eq!(rates[0].success_rate, 0.5);
    }

    #[test]
    fn test_later_derivation_within_follow_up_fails_consultation() {
        let facts = [fact("a", "p1", "2024-01-10", false)];

        let within = compute_success_rates(&facts, &[derivation("p1", "cardio", "2024-02-01")], 30);
        assert_eq!(within[0].successful_consultations, 0);

        let after = compute_success_rates(&facts, &[derivation("p1", "cardio", "2024-03-01")], 30);
        assert_eq!(after[0].successful_consultations, 1);

        let other_department =
            compute_success_rates(&facts, &[derivation("p1", "neuro", "2024-01-12")], 30);
        assert_eq!(other_department[0].successful_consultations, 1);

        let earlier =
            compute_success_rates(&facts, &[derivation("p1", "cardio", "2024-01-01")], 30);
        assert_eq!(earlier[0].successful_consultations, 1);
    }

    #[test]
    fn test_rates_sorted_by_rate_then_name() {
        let rates = compute_success_rates(
            &[
                fact("b", "p1", "2024-01-10", false),
                fact("a", "p2", "2024-01-10", false),
                fact("c", "p3", "2024-01-10", true),
            ],
            &[],
            30,
        );
        let order: Vec<&str> = rates.iter().map(|r| r.doctor_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(rates[2].success_rate, 0.0);
    }

    #[test]
    fn test_month_window_excludes_running_month() {
        let window = MonthWindow::ending_before(date!(2024 - 03 - 15), 3);
        assert_eq!(window.from, date!(2023 - 12 - 01));
        assert_eq!(window.to, date!(2024 - 02 - 29));
        assert_eq!(window.keys, vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_monthly_averages_zero_fill() {
        let departments = vec![
            ("cardio".to_string(), "Cardiology".to_string()),
            ("neuro".to_string(), "Neurology".to_string()),
        ];
        let counts = vec![
            MonthlyCount {
                department_id: "cardio".to_string(),
                department_name: "Cardiology".to_string(),
                month: "2024-01".to_string(),
                consultations: 4,
            },
            MonthlyCount {
                department_id: "cardio".to_string(),
                department_name: "Cardiology".to_string(),
                month: "2024-02".to_string(),
                consultations: 1,
            },
        ];
        let keys = vec!["2023-12".to_string(), "2024-01".to_string(), "2024-02".to_string()];

        let report = compute_monthly_averages(&departments, &counts, &keys);
        assert_eq!(report[0].total_consultations, 5);
        assert_eq!(report[0].average_per_month, 1.67);
        assert_eq!(report[0].by_month.get("2023-12"), Some(&0));
        assert_eq!(report[1].total_consultations, 0);
        assert_eq!(report[1].by_month.len(), 3);
    }

    #[test]
    fn test_consumption_groups_and_limits() {
        let row = |med: &str, dep: &str, quantity: i64, consultations: i64| ConsumptionRow {
            medication_id: med.to_string(),
            medication_name: med.to_uppercase(),
            department_id: dep.to_string(),
            department_name: dep.to_uppercase(),
            quantity,
            consultations,
        };
        let rows = vec![
            row("ibuprofen", "er", 10, 2),
            row("ibuprofen", "cardio", 30, 3),
            row("enalapril", "cardio", 25, 5),
            row("insulin", "er", 1, 1),
        ];

        let top = aggregate_consumption(rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].medication_id, "ibuprofen");
        assert_eq!(top[0].total_quantity, 40);
        assert_eq!(top[0].consultations, 5);
        assert_eq!(top[0].by_department[0].department_id, "cardio");
        assert_eq!(top[1].medication_id, "enalapril");
    }

    #[test]
    fn test_resolve_window_defaults_and_errors() {
        let (from, to) = resolve_window(None, Some("2024-06-30"), 30).unwrap();
        assert_eq!(to, date!(2024 - 06 - 30));
        assert_eq!(from, date!(2024 - 05 - 31));

        assert!(resolve_window(Some("2024-07-01"), Some("2024-06-30"), 30).is_err());
        assert!(resolve_window(Some("yesterday"), None, 30).is_err());
    }

    #[test]
    fn test_follow_up_deadline_saturates_at_last_date() {
        let rates = compute_success_rates(
            &[fact("a", "p1", "9999-12-20", false)],
            &[derivation("p1", "cardio", "9999-12-31")],
            30,
        );
        assert_eq!(rates[0].successful_consultations, 0);
    }
}

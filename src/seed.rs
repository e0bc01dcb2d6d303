// 🌱 Seed Data - the mock records the API serves at startup
//
// Fixed dates keep responses stable between runs. Period under close is
// January 2025.

use crate::models::{
    AuditEvent, BindingStatus, CaseStatus, CaseType, CloseTask, CloseTaskStatus,
    DataTemplateBinding, FieldMapping, MatchRule, Priority, ReconConfig, ReconStatus, ReconType,
    RevenueCase,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub const CLOSE_PERIOD: &str = "2025-01";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap_or_default()
}

// ============================================================================
// CLOSE TASKS
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn task(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    owner: &str,
    status: CloseTaskStatus,
    priority: Priority,
    due_day: u32,
    dependencies: &[&str],
) -> CloseTask {
    CloseTask {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        period: CLOSE_PERIOD.to_string(),
        entity: "US01".to_string(),
        owner: owner.to_string(),
        reviewer: Some("controller@acme.com".to_string()),
        status,
        priority,
        due_date: date(2025, 2, due_day),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        updated_at: ts(2025, 1, 31, 9),
    }
}

pub fn close_tasks() -> Vec<CloseTask> {
    use CloseTaskStatus::*;

    vec![
        task("task-001", "Bank reconciliation - Operating", "Reconcile Chase operating account to GL 1010", "Cash", "maria.chen@acme.com", Completed, Priority::High, 2, &[]),
        task("task-002", "Bank reconciliation - Payroll", "Reconcile payroll account to GL 1020", "Cash", "maria.chen@acme.com", InProgress, Priority::High, 2, &[]),
        task("task-003", "Apply unapplied cash", "Clear unapplied receipts in lockbox batch", "Cash", "sam.ortiz@acme.com", InProgress, Priority::Medium, 3, &["task-001"]),
        task("task-004", "Accrue professional fees", "Book legal and audit fee accruals", "Accruals", "jordan.lee@acme.com", NotStarted, Priority::Medium, 4, &[]),
        task("task-005", "Accrue payroll", "Accrue wages for days worked after last pay date", "Accruals", "jordan.lee@acme.com", PendingReview, Priority::High, 3, &["task-002"]),
        task("task-006", "Prepaid amortization", "Amortize insurance and software prepaids", "Prepaids", "priya.nair@acme.com", Completed, Priority::Low, 4, &[]),
        task("task-007", "Revenue cut-off review", "Confirm shipments billed in period", "Revenue", "priya.nair@acme.com", NotStarted, Priority::Critical, 5, &["task-003"]),
        task("task-008", "Deferred revenue roll-forward", "Roll forward deferred revenue by contract", "Revenue", "priya.nair@acme.com", Blocked, Priority::High, 5, &["task-007"]),
        task("task-009", "Intercompany settlement", "Settle US01/UK02 intercompany balances", "Intercompany", "sam.ortiz@acme.com", NotStarted, Priority::Medium, 6, &[]),
        task("task-010", "Fixed asset depreciation", "Run depreciation and post journal", "Fixed Assets", "jordan.lee@acme.com", Completed, Priority::Low, 4, &[]),
        task("task-011", "Flux analysis", "Explain balance sheet movements over 10%", "Reporting", "controller@acme.com", NotStarted, Priority::Medium, 7, &["task-005", "task-008"]),
        task("task-012", "Close sign-off", "Controller sign-off for the period", "Reporting", "controller@acme.com", NotStarted, Priority::Critical, 8, &["task-011"]),
    ]
}

pub fn close_task_events() -> Vec<AuditEvent> {
    vec![
        AuditEvent::status_change("task-001", Some("maria.chen@acme.com"), "in_progress", "completed").at(ts(2025, 2, 1, 15)),
        AuditEvent::status_change("task-002", Some("maria.chen@acme.com"), "not_started", "in_progress").at(ts(2025, 2, 1, 10)),
        AuditEvent::status_change("task-005", Some("jordan.lee@acme.com"), "in_progress", "pending_review").at(ts(2025, 2, 2, 11)),
        AuditEvent::new("task-008", "comment", "priya.nair@acme.com", "Waiting on contract amendments from legal".to_string()).at(ts(2025, 2, 2, 14)),
        AuditEvent::status_change("task-008", Some("priya.nair@acme.com"), "not_started", "blocked").at(ts(2025, 2, 2, 14)),
    ]
}

// ============================================================================
// RECONCILIATIONS
// ============================================================================

pub fn recons() -> Vec<ReconConfig> {
    vec![
        ReconConfig {
            id: "recon-001".to_string(),
            name: "Operating Cash".to_string(),
            description: "Chase operating account vs GL 1010".to_string(),
            recon_type: ReconType::BankToGl,
            source_a: "Chase Bank Feed".to_string(),
            source_b: "GL 1010".to_string(),
            match_rules: vec![MatchRule::tolerance("amount", "amount"), MatchRule::exact("reference", "document_number")],
            tolerance_amount: 0.01,
            tolerance_days: 2,
            status: ReconStatus::Active,
            owner: "maria.chen@acme.com".to_string(),
            match_rate: 0.984,
            unmatched_count: 7,
            last_run_at: Some(ts(2025, 2, 1, 6)),
            created_at: ts(2024, 6, 3, 9),
            updated_at: ts(2025, 2, 1, 6),
        },
        ReconConfig {
            id: "recon-002".to_string(),
            name: "Payroll Clearing".to_string(),
            description: "Payroll account vs GL 1020".to_string(),
            recon_type: ReconType::BankToGl,
            source_a: "Wells Fargo Payroll Feed".to_string(),
            source_b: "GL 1020".to_string(),
            match_rules: vec![MatchRule::tolerance("amount", "amount")],
            tolerance_amount: 0.0,
            tolerance_days: 1,
            status: ReconStatus::Active,
            owner: "maria.chen@acme.com".to_string(),
            match_rate: 0.91,
            unmatched_count: 23,
            last_run_at: Some(ts(2025, 2, 1, 6)),
            created_at: ts(2024, 6, 3, 9),
            updated_at: ts(2025, 2, 1, 6),
        },
        ReconConfig {
            id: "recon-003".to_string(),
            name: "AR Subledger".to_string(),
            description: "AR aging vs GL 1200".to_string(),
            recon_type: ReconType::SubledgerToGl,
            source_a: "AR Aging Report".to_string(),
            source_b: "GL 1200".to_string(),
            match_rules: vec![MatchRule::exact("customer_id", "customer_id"), MatchRule::tolerance("balance", "balance")],
            tolerance_amount: 1.0,
            tolerance_days: 0,
            status: ReconStatus::Active,
            owner: "sam.ortiz@acme.com".to_string(),
            match_rate: 0.997,
            unmatched_count: 2,
            last_run_at: Some(ts(2025, 1, 31, 22)),
            created_at: ts(2024, 8, 12, 9),
            updated_at: ts(2025, 1, 31, 22),
        },
        ReconConfig {
            id: "recon-004".to_string(),
            name: "US01 / UK02 Intercompany".to_string(),
            description: "Intercompany receivable vs payable".to_string(),
            recon_type: ReconType::Intercompany,
            source_a: "US01 GL 1500".to_string(),
            source_b: "UK02 GL 2500".to_string(),
            match_rules: vec![MatchRule::exact("ic_reference", "ic_reference")],
            tolerance_amount: 5.0,
            tolerance_days: 3,
            status: ReconStatus::Paused,
            owner: "sam.ortiz@acme.com".to_string(),
            match_rate: 0.82,
            unmatched_count: 41,
            last_run_at: Some(ts(2025, 1, 15, 6)),
            created_at: ts(2024, 9, 1, 9),
            updated_at: ts(2025, 1, 20, 16),
        },
        ReconConfig {
            id: "recon-005".to_string(),
            name: "Lockbox Cash Application".to_string(),
            description: "Lockbox receipts vs open invoices".to_string(),
            recon_type: ReconType::CashApplication,
            source_a: "Lockbox File".to_string(),
            source_b: "Open AR Invoices".to_string(),
            match_rules: vec![MatchRule::exact("invoice_number", "invoice_number"), MatchRule::tolerance("amount", "open_amount")],
            tolerance_amount: 0.5,
            tolerance_days: 0,
            status: ReconStatus::Active,
            owner: "sam.ortiz@acme.com".to_string(),
            match_rate: 0.88,
            unmatched_count: 54,
            last_run_at: Some(ts(2025, 2, 1, 7)),
            created_at: ts(2024, 10, 7, 9),
            updated_at: ts(2025, 2, 1, 7),
        },
        ReconConfig {
            id: "recon-006".to_string(),
            name: "Stripe Payouts".to_string(),
            description: "Stripe payouts vs bank deposits".to_string(),
            recon_type: ReconType::BankToGl,
            source_a: "Stripe Balance Transactions".to_string(),
            source_b: "Chase Bank Feed".to_string(),
            match_rules: vec![MatchRule::exact("payout_id", "reference")],
            tolerance_amount: 0.0,
            tolerance_days: 2,
            status: ReconStatus::Draft,
            owner: "priya.nair@acme.com".to_string(),
            match_rate: 0.0,
            unmatched_count: 0,
            last_run_at: None,
            created_at: ts(2025, 1, 28, 9),
            updated_at: ts(2025, 1, 28, 9),
        },
    ]
}

pub fn recon_events() -> Vec<AuditEvent> {
    vec![
        AuditEvent::new("recon-001", "created", "maria.chen@acme.com", "Reconciliation created".to_string()).at(ts(2024, 6, 3, 9)),
        AuditEvent::status_change("recon-004", Some("sam.ortiz@acme.com"), "active", "paused").at(ts(2025, 1, 20, 16)),
        AuditEvent::new("recon-006", "created", "priya.nair@acme.com", "Reconciliation created".to_string()).at(ts(2025, 1, 28, 9)),
    ]
}

// ============================================================================
// DATA-TEMPLATE BINDINGS
// ============================================================================

fn map(source: &str, target: &str, transform: Option<&str>) -> FieldMapping {
    FieldMapping {
        source_field: source.to_string(),
        target_field: target.to_string(),
        transform: transform.map(str::to_string),
    }
}

pub fn bindings() -> Vec<DataTemplateBinding> {
    vec![
        DataTemplateBinding {
            id: "binding-001".to_string(),
            template_id: "tpl-bank-stmt".to_string(),
            template_name: "Bank Statement (BAI2)".to_string(),
            target_type: "recon".to_string(),
            target_id: "recon-001".to_string(),
            field_mappings: vec![
                map("Value Date", "date", Some("parse_date")),
                map("Amount", "amount", None),
                map("Bank Reference", "reference", Some("uppercase")),
            ],
            status: BindingStatus::Active,
            created_by: "maria.chen@acme.com".to_string(),
            created_at: ts(2024, 6, 3, 10),
        },
        DataTemplateBinding {
            id: "binding-002".to_string(),
            template_id: "tpl-bank-stmt".to_string(),
            template_name: "Bank Statement (BAI2)".to_string(),
            target_type: "recon".to_string(),
            target_id: "recon-002".to_string(),
            field_mappings: vec![map("Value Date", "date", Some("parse_date")), map("Amount", "amount", None)],
            status: BindingStatus::Active,
            created_by: "maria.chen@acme.com".to_string(),
            created_at: ts(2024, 6, 3, 10),
        },
        DataTemplateBinding {
            id: "binding-003".to_string(),
            template_id: "tpl-lockbox".to_string(),
            template_name: "Lockbox Remittance".to_string(),
            target_type: "recon".to_string(),
            target_id: "recon-005".to_string(),
            field_mappings: vec![
                map("Invoice #", "invoice_number", Some("uppercase")),
                map("Check Amount", "amount", Some("abs")),
                map("Payer", "customer_name", None),
            ],
            status: BindingStatus::Active,
            created_by: "sam.ortiz@acme.com".to_string(),
            created_at: ts(2024, 10, 7, 10),
        },
        DataTemplateBinding {
            id: "binding-004".to_string(),
            template_id: "tpl-ic-balance".to_string(),
            template_name: "Intercompany Balance Export".to_string(),
            target_type: "entity".to_string(),
            target_id: "UK02".to_string(),
            field_mappings: vec![map("IC Ref", "ic_reference", None), map("Balance GBP", "amount", None)],
            status: BindingStatus::Inactive,
            created_by: "sam.ortiz@acme.com".to_string(),
            created_at: ts(2024, 9, 1, 10),
        },
    ]
}

// ============================================================================
// REVENUE CASES
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn case(
    id: &str,
    title: &str,
    case_type: CaseType,
    status: CaseStatus,
    severity: Priority,
    customer: &str,
    at_risk: f64,
    recovered: f64,
    assignee: &str,
    opened_day: u32,
) -> RevenueCase {
    RevenueCase {
        id: id.to_string(),
        title: title.to_string(),
        case_type,
        status,
        severity,
        customer: customer.to_string(),
        amount_at_risk: at_risk,
        amount_recovered: recovered,
        assignee: assignee.to_string(),
        opened_at: ts(2025, 1, opened_day, 9),
        updated_at: ts(2025, 1, 31, 17),
    }
}

pub fn revenue_cases() -> Vec<RevenueCase> {
    use CaseStatus::*;
    use CaseType::*;

    vec![
        case("case-001", "Usage overage not invoiced", UnbilledUsage, Investigating, Priority::High, "Globex Corp", 48_250.0, 0.0, "jordan.lee@acme.com", 6),
        case("case-002", "Discount applied past expiry", BillingError, PendingApproval, Priority::Medium, "Initech", 12_400.0, 9_800.0, "priya.nair@acme.com", 9),
        case("case-003", "Renewal uplift missing", ContractMismatch, Open, Priority::Critical, "Umbrella Health", 131_000.0, 0.0, "jordan.lee@acme.com", 14),
        case("case-004", "Duplicate credit memo", BillingError, Resolved, Priority::Low, "Stark Industries", 3_150.0, 3_150.0, "sam.ortiz@acme.com", 3),
        case("case-005", "Seats provisioned above contract", RevenueLeakage, Open, Priority::High, "Wayne Enterprises", 27_600.0, 0.0, "priya.nair@acme.com", 21),
        case("case-006", "Late fee waived without approval", RevenueLeakage, Closed, Priority::Low, "Hooli", 850.0, 0.0, "sam.ortiz@acme.com", 2),
    ]
}

pub fn revenue_case_events() -> Vec<AuditEvent> {
    vec![
        AuditEvent::status_change("case-001", Some("jordan.lee@acme.com"), "open", "investigating").at(ts(2025, 1, 8, 13)),
        AuditEvent::status_change("case-002", Some("priya.nair@acme.com"), "investigating", "pending_approval").at(ts(2025, 1, 27, 10)),
        AuditEvent::status_change("case-004", Some("sam.ortiz@acme.com"), "investigating", "resolved").at(ts(2025, 1, 17, 15)),
    ]
}

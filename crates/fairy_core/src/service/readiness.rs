//! Submission readiness audit over the wizard sections.
//!
//! # Responsibility
//! - Turn a `ProjectBundle` into one outcome per wizard section.
//! - Stay a pure function so the same bundle always yields the same report.
//!
//! # Invariants
//! - Checks are reported in wizard tab order.
//! - A report is ready exactly when no outcome is `Fail`.

use crate::model::bundle::ProjectBundle;
use crate::model::sections::Answer;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

/// Audited wizard section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessCheck {
    Overview,
    DataInventory,
    Permissions,
    Deidentification,
    Metadata,
    Repository,
}

impl ReadinessCheck {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::DataInventory => "Data Inventory",
            Self::Permissions => "Permissions & Ethics",
            Self::Deidentification => "De-identification",
            Self::Metadata => "Metadata",
            Self::Repository => "Repository",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub check: ReadinessCheck,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckOutcome {
    fn new(check: ReadinessCheck, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            check,
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|outcome| outcome.status == CheckStatus::Fail)
    }

    pub fn passed_count(&self) -> usize {
        self.count(CheckStatus::Pass)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    pub fn outcome(&self, check: ReadinessCheck) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|outcome| outcome.check == check)
    }
}

/// Audits every wizard section of one project.
pub fn assess_readiness(bundle: &ProjectBundle) -> ReadinessReport {
    ReadinessReport {
        outcomes: vec![
            check_overview(bundle),
            check_inventory(bundle),
            check_permissions(bundle),
            check_deidentification(bundle),
            check_metadata(bundle),
            check_repository(bundle),
        ],
    }
}

fn check_overview(bundle: &ProjectBundle) -> CheckOutcome {
    let project = &bundle.project;
    if project.title.trim().is_empty() || project.description.trim().is_empty() {
        return CheckOutcome::new(
            ReadinessCheck::Overview,
            CheckStatus::Fail,
            "title and description are required",
        );
    }
    CheckOutcome::new(
        ReadinessCheck::Overview,
        CheckStatus::Pass,
        "title and description present",
    )
}

fn check_inventory(bundle: &ProjectBundle) -> CheckOutcome {
    match bundle.data_inventory.len() {
        0 => CheckOutcome::new(
            ReadinessCheck::DataInventory,
            CheckStatus::Fail,
            "no data locations recorded",
        ),
        count => CheckOutcome::new(
            ReadinessCheck::DataInventory,
            CheckStatus::Pass,
            format!("{count} data location(s) recorded"),
        ),
    }
}

fn check_permissions(bundle: &ProjectBundle) -> CheckOutcome {
    let permissions = &bundle.permissions;
    let mut unanswered = Vec::new();
    if !permissions.contains_human_data.is_known() {
        unanswered.push("human subjects data");
    }
    if !permissions.irb_required.is_known() {
        unanswered.push("IRB/ethics approval");
    }

    if unanswered.is_empty() {
        return CheckOutcome::new(
            ReadinessCheck::Permissions,
            CheckStatus::Pass,
            "all permission questions answered",
        );
    }
    CheckOutcome::new(
        ReadinessCheck::Permissions,
        CheckStatus::Warn,
        format!("unanswered: {}", unanswered.join(", ")),
    )
}

fn check_deidentification(bundle: &ProjectBundle) -> CheckOutcome {
    let human_data = bundle.permissions.contains_human_data == Answer::Yes;
    match (human_data, bundle.deidentification.has_strategy()) {
        (true, false) => CheckOutcome::new(
            ReadinessCheck::Deidentification,
            CheckStatus::Fail,
            "human subjects data requires a de-identification strategy",
        ),
        (_, true) => CheckOutcome::new(
            ReadinessCheck::Deidentification,
            CheckStatus::Pass,
            "strategy recorded",
        ),
        (false, false) => CheckOutcome::new(
            ReadinessCheck::Deidentification,
            CheckStatus::Pass,
            "not required without human subjects data",
        ),
    }
}

fn check_metadata(bundle: &ProjectBundle) -> CheckOutcome {
    let metadata = &bundle.metadata;
    if metadata.is_empty() {
        return CheckOutcome::new(
            ReadinessCheck::Metadata,
            CheckStatus::Fail,
            "no sample metadata imported",
        );
    }
    CheckOutcome::new(
        ReadinessCheck::Metadata,
        CheckStatus::Pass,
        format!(
            "{} sample(s) across {} column(s)",
            metadata.rows.len(),
            metadata.columns.len()
        ),
    )
}

fn check_repository(bundle: &ProjectBundle) -> CheckOutcome {
    let Some(choice) = bundle.repository.choice else {
        return CheckOutcome::new(
            ReadinessCheck::Repository,
            CheckStatus::Fail,
            "no target repository selected",
        );
    };

    if bundle.permissions.contains_human_data == Answer::Yes && !choice.is_controlled_access() {
        return CheckOutcome::new(
            ReadinessCheck::Repository,
            CheckStatus::Warn,
            format!(
                "{} is open access; human subjects data usually needs a controlled-access repository",
                choice.label()
            ),
        );
    }
    CheckOutcome::new(
        ReadinessCheck::Repository,
        CheckStatus::Pass,
        format!("{} selected", choice.label()),
    )
}

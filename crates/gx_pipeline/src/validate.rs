//! crates/gx_pipeline/src/validate.rs
//! Boundary validation before any computation.
//! Deterministic outputs; no RNG.
//!
//! Errors: fewer than two participants, duplicate ids, a participant excluding
//! themselves, configuration outside its domain. Exclusions naming someone
//! outside the group are warnings; they cannot affect any assignment.

use std::collections::BTreeSet;
use std::fmt;

use gx_core::{EngineConfig, ParticipantId, ParticipantPreference};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Root,
    Participant(ParticipantId),
    Exclusion(ParticipantId, ParticipantId),
    Param(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub where_: EntityRef,
}

/// pass = no Error; issue order is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in self.errors() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.code, issue.message)?;
            first = false;
        }
        if first {
            f.write_str("no errors")?;
        }
        Ok(())
    }
}

pub fn validate(prefs: &[ParticipantPreference], cfg: &EngineConfig) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_group_size(prefs));
    issues.extend(check_unique_ids(prefs));
    issues.extend(check_exclusions(prefs));
    issues.extend(check_config(cfg));

    sort_issues_stably(&mut issues);

    ValidationReport {
        pass: !issues.iter().any(|i| i.severity == Severity::Error),
        issues,
    }
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

fn check_group_size(prefs: &[ParticipantPreference]) -> Vec<ValidationIssue> {
    if prefs.len() >= 2 {
        return Vec::new();
    }
    vec![ValidationIssue {
        severity: Severity::Error,
        code: "participants.too_few",
        message: format!("at least 2 participants required, got {}", prefs.len()),
        where_: EntityRef::Root,
    }]
}

fn check_unique_ids(prefs: &[ParticipantPreference]) -> Vec<ValidationIssue> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut out = Vec::new();
    for p in prefs {
        if !seen.insert(&p.user_id) && reported.insert(&p.user_id) {
            out.push(ValidationIssue {
                severity: Severity::Error,
                code: "participants.duplicate_id",
                message: format!("participant id {} appears more than once", p.user_id),
                where_: EntityRef::Participant(p.user_id.clone()),
            });
        }
    }
    out
}

fn check_exclusions(prefs: &[ParticipantPreference]) -> Vec<ValidationIssue> {
    let known: BTreeSet<&ParticipantId> = prefs.iter().map(|p| &p.user_id).collect();
    let mut out = Vec::new();
    for p in prefs {
        for ex in &p.exclusions {
            if *ex == p.user_id {
                out.push(ValidationIssue {
                    severity: Severity::Error,
                    code: "exclusions.self",
                    message: format!("{} excludes themselves", p.user_id),
                    where_: EntityRef::Participant(p.user_id.clone()),
                });
            } else if !known.contains(ex) {
                out.push(ValidationIssue {
                    severity: Severity::Warning,
                    code: "exclusions.unknown_target",
                    message: format!("{} excludes {}, who is not in the group", p.user_id, ex),
                    where_: EntityRef::Exclusion(p.user_id.clone(), ex.clone()),
                });
            }
        }
    }
    out
}

fn check_config(cfg: &EngineConfig) -> Vec<ValidationIssue> {
    match cfg.validate() {
        Ok(()) => Vec::new(),
        Err(gx_core::CoreError::DomainOutOfRange(field)) => vec![ValidationIssue {
            severity: Severity::Error,
            code: "config.domain",
            message: format!("configuration value out of range: {field}"),
            where_: EntityRef::Param(field),
        }],
        Err(e) => vec![ValidationIssue {
            severity: Severity::Error,
            code: "config.domain",
            message: e.to_string(),
            where_: EntityRef::Root,
        }],
    }
}

fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| cmp_where(&a.where_, &b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}

fn cmp_where(a: &EntityRef, b: &EntityRef) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    use EntityRef::*;
    match (a, b) {
        (Root, Root) => Equal,
        (Root, _) => Less,
        (_, Root) => Greater,
        (Param(pa), Param(pb)) => pa.cmp(pb),
        (Param(_), _) => Less,
        (_, Param(_)) => Greater,
        (Participant(x), Participant(y)) => x.cmp(y),
        (Participant(_), _) => Less,
        (_, Participant(_)) => Greater,
        (Exclusion(a1, a2), Exclusion(b1, b2)) => (a1, a2).cmp(&(b1, b2)),
    }
}

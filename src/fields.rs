//! Enumerations and field types for plan management.
//!
//! This module defines the structured values attached to tasks and findings:
//! task status, dependency type, and the severity and kind of advisory findings
//! produced by the workload analyzer.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task progress status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[serde(alias = "NotStarted")]
    NotStarted,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Complete")]
    Complete,
    #[serde(alias = "Blocked")]
    Blocked,
}

/// Dependency relationship between a predecessor and a dependent task.
///
/// Only finish-to-start is supported: the dependent starts once the
/// predecessor has finished, offset by the dependency's lag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
}

/// Severity tag attached to every analyzer finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
    Alert,
}

/// Category of an analyzer finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    OrphanDependency,
    Unassigned,
    Overallocation,
    Blocked,
}

impl FindingKind {
    /// Severity every finding of this kind carries.
    pub fn severity(self) -> Severity {
        match self {
            FindingKind::OrphanDependency => Severity::Warning,
            FindingKind::Unassigned => Severity::Info,
            FindingKind::Overallocation | FindingKind::Blocked => Severity::Alert,
        }
    }
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::NotStarted => "Not Started",
        Status::InProgress => "In Progress",
        Status::Complete => "Complete",
        Status::Blocked => "Blocked",
    }
}

/// Format a finding severity for display.
pub fn format_severity(s: Severity) -> &'static str {
    match s {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Alert => "alert",
    }
}

//! Testing utilities for the PMO scenario workspace
//!
//! Shared portfolios, dates and builders.

#![allow(missing_docs)]

use chrono::NaiveDate;
use pmo_model::{PortfolioSnapshot, Project, RagStatus, Task};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fixed "today" for runway calculations
pub fn reference_date() -> NaiveDate {
    date(2026, 2, 19)
}

/// Project with one task whose comments carry `comment`
pub fn project_with_comment(name: &str, comment: &str) -> Project {
    Project::new(name).with_task(Task::new(format!("{name} task")).with_comments(comment))
}

pub fn snapshot(projects: Vec<Project>) -> PortfolioSnapshot {
    PortfolioSnapshot::new(projects).unwrap()
}

/// Alpha has no dependencies; Beta is blocked by Alpha
pub fn alpha_beta() -> PortfolioSnapshot {
    snapshot(vec![
        Project::new("Alpha")
            .with_dates(Some(date(2026, 1, 1)), Some(date(2026, 6, 30)))
            .with_budget(100_000.0)
            .with_actual_spend(45_000.0),
        project_with_comment("Beta", "blocked by Alpha")
            .with_dates(Some(date(2026, 2, 1)), Some(date(2026, 8, 31)))
            .with_budget(150_000.0)
            .with_actual_spend(10_000.0),
    ])
}

/// Three-project mixed portfolio: Alpha depends on Beta, Gamma on Alpha
pub fn sample_portfolio() -> PortfolioSnapshot {
    snapshot(vec![
        project_with_comment("Alpha", "Depends on Beta API")
            .with_status("In Progress")
            .with_rag(RagStatus::Amber)
            .with_dates(Some(date(2026, 1, 1)), Some(date(2026, 6, 30)))
            .with_budget(100_000.0)
            .with_actual_spend(45_000.0),
        Project::new("Beta")
            .with_status("Planning")
            .with_rag(RagStatus::Green)
            .with_dates(Some(date(2026, 2, 1)), Some(date(2026, 8, 31)))
            .with_budget(150_000.0)
            .with_actual_spend(10_000.0),
        project_with_comment("Gamma", "Depends on Alpha delivery")
            .with_status("At Risk")
            .with_rag(RagStatus::Red)
            .with_dates(Some(date(2025, 9, 1)), Some(date(2026, 4, 30)))
            .with_budget(200_000.0)
            .with_actual_spend(185_000.0),
    ])
}

/// A <- B <- C chain plus a direct C -> A edge (diamond)
pub fn diamond_portfolio() -> PortfolioSnapshot {
    snapshot(vec![
        Project::new("A").with_dates(Some(date(2026, 1, 1)), Some(date(2026, 3, 31))),
        project_with_comment("B", "blocked by A")
            .with_dates(Some(date(2026, 4, 1)), Some(date(2026, 6, 30))),
        project_with_comment("C", "waiting for B; also depends on A")
            .with_dates(Some(date(2026, 7, 1)), Some(date(2026, 9, 30))),
    ])
}

/// A depends on C, B on A, C on B
pub fn cyclic_portfolio() -> PortfolioSnapshot {
    snapshot(vec![
        project_with_comment("A", "depends on C").with_dates(Some(date(2026, 1, 1)), Some(date(2026, 2, 1))),
        project_with_comment("B", "depends on A").with_dates(Some(date(2026, 1, 1)), Some(date(2026, 2, 1))),
        project_with_comment("C", "depends on B").with_dates(Some(date(2026, 1, 1)), Some(date(2026, 2, 1))),
    ])
}

/// `count` projects where each depends on up to `fanout` earlier ones
pub fn synthetic_portfolio(count: usize, fanout: usize) -> PortfolioSnapshot {
    let projects = (0..count)
        .map(|i| {
            let deps: Vec<String> = (1..=fanout)
                .filter_map(|step| i.checked_sub(step))
                .map(|j| format!("Project {j:04}"))
                .collect();
            let mut project = Project::new(format!("Project {i:04}"))
                .with_dates(Some(date(2026, 1, 1)), Some(date(2026, 12, 31)))
                .with_budget(100_000.0)
                .with_actual_spend(25_000.0);
            if !deps.is_empty() {
                project = project.with_task(
                    Task::new("integration").with_comments(format!("blocked by {}", deps.join(", "))),
                );
            }
            project
        })
        .collect::<Vec<_>>();
    snapshot(projects)
}

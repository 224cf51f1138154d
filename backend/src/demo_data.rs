//! Demo data seeded on startup.
//!
//! Accounts are provisioned and requests are submitted, approved and
//! rejected through the domain services, so totals and accolades come from
//! the same credit path as live approvals.

use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

use crate::domain::ports::{AccountRepository, RequestLifecycleCommand, SubmitHoursRequest};
use crate::domain::{AccountService, Error, ErrorCode, Principal, Role};

pub const DEMO_STAFF_PASSWORD: &str = "staffpass";
pub const DEMO_STUDENT_PASSWORD: &str = "studentpass";

const STAFF: [&str; 3] = ["staff1", "staff2", "staff3"];
const STUDENTS: [&str; 7] = [
    "student1", "student2", "student3", "student4", "student5", "student6", "student7",
];

#[derive(Debug, Clone, Copy)]
enum Resolution {
    Approve(&'static str),
    Reject(&'static str),
    Leave,
}

struct DemoRequest {
    student: &'static str,
    hours: f64,
    description: &'static str,
    resolution: Resolution,
}

const REQUESTS: [DemoRequest; 8] = [
    DemoRequest {
        student: "student1",
        hours: 5.0,
        description: "Community Outreach",
        resolution: Resolution::Approve("staff1"),
    },
    DemoRequest {
        student: "student2",
        hours: 3.0,
        description: "Food Drive",
        resolution: Resolution::Approve("staff1"),
    },
    DemoRequest {
        student: "student2",
        hours: 8.0,
        description: "Football",
        resolution: Resolution::Reject("staff2"),
    },
    DemoRequest {
        student: "student3",
        hours: 10.0,
        description: "Library Book Sorting",
        resolution: Resolution::Approve("staff2"),
    },
    DemoRequest {
        student: "student4",
        hours: 15.0,
        description: "Park Cleanup",
        resolution: Resolution::Leave,
    },
    DemoRequest {
        student: "student5",
        hours: 7.0,
        description: "Senior Center",
        resolution: Resolution::Approve("staff3"),
    },
    DemoRequest {
        student: "student6",
        hours: 12.0,
        description: "Animal Shelter",
        resolution: Resolution::Approve("staff1"),
    },
    DemoRequest {
        student: "student7",
        hours: 2.0,
        description: "Help Desk",
        resolution: Resolution::Leave,
    },
];

/// Raised when demo seeding fails part-way.
#[derive(Debug, Error)]
pub enum DemoSeedError {
    #[error("failed to provision demo account {username}: {source}")]
    Account {
        username: &'static str,
        #[source]
        source: Error,
    },
    #[error("failed to seed demo request {description:?}: {source}")]
    Request {
        description: &'static str,
        #[source]
        source: Error,
    },
    #[error("demo account {0} missing from the seed plan")]
    UnknownAccount(&'static str),
}

/// What seeding did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSeedOutcome {
    Applied { accounts: usize, requests: usize },
    AlreadySeeded,
}

/// Provision the demo staff and students, then replay their requests.
///
/// Seeding is skipped when the first demo account already exists, so a
/// restarted server backed by PostgreSQL does not duplicate requests.
pub async fn seed_demo_data<A>(
    accounts: &AccountService<A>,
    lifecycle: &dyn RequestLifecycleCommand,
) -> Result<DemoSeedOutcome, DemoSeedError>
where
    A: AccountRepository,
{
    let mut principals: HashMap<&'static str, Principal> = HashMap::new();
    let roster = STAFF
        .iter()
        .map(|name| (*name, DEMO_STAFF_PASSWORD, Role::Staff))
        .chain(
            STUDENTS
                .iter()
                .map(|name| (*name, DEMO_STUDENT_PASSWORD, Role::Student)),
        );
    for (username, password, role) in roster {
        match accounts.provision(username, password, role).await {
            Ok(account) => {
                principals.insert(username, Principal::new(account.id, role));
            }
            Err(err) if err.code() == ErrorCode::Conflict && principals.is_empty() => {
                info!(username, "demo data already present; skipping");
                return Ok(DemoSeedOutcome::AlreadySeeded);
            }
            Err(source) => return Err(DemoSeedError::Account { username, source }),
        }
    }

    let principal_for = |username: &'static str| {
        principals
            .get(username)
            .copied()
            .ok_or(DemoSeedError::UnknownAccount(username))
    };
    for demo in &REQUESTS {
        let request_error = |source| DemoSeedError::Request {
            description: demo.description,
            source,
        };
        let created = lifecycle
            .submit(
                principal_for(demo.student)?,
                SubmitHoursRequest {
                    hours: demo.hours,
                    description: demo.description.to_owned(),
                },
            )
            .await
            .map_err(request_error)?;
        match demo.resolution {
            Resolution::Approve(staff) => {
                lifecycle
                    .approve(principal_for(staff)?, created.id())
                    .await
                    .map_err(request_error)?;
            }
            Resolution::Reject(staff) => {
                lifecycle
                    .reject(principal_for(staff)?, created.id(), None)
                    .await
                    .map_err(request_error)?;
            }
            Resolution::Leave => {}
        }
    }

    let outcome = DemoSeedOutcome::Applied {
        accounts: principals.len(),
        requests: REQUESTS.len(),
    };
    info!(
        accounts = principals.len(),
        requests = REQUESTS.len(),
        "demo data seeded"
    );
    Ok(outcome)
}

//! Executable statement plans.
//!
//! Every compiled statement becomes one [`Plan`] variant. The engine
//! dispatches all of them through [`Plan::execute_or_fail`], which either
//! takes over the consumer or hands it back inside a [`Rejection`].

mod distributed;
mod update_settings;

use std::fmt;

use log::debug;

use tessera_core::{BoxedRowConsumer, Rejection, Row, SubQueryResults};

use crate::context::PlannerContext;
use crate::dependencies::DependencyCarrier;

pub use distributed::DistributedPlan;
pub use update_settings::{UpdateSettingsPlan, build_settings_from, build_transient_settings};

/// Kind of statement a plan was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Copy,
    Ddl,
    Management,
    Undefined,
}

impl StatementType {
    /// Whether the statement reads or writes table data.
    pub fn is_data_manipulation(&self) -> bool {
        matches!(
            self,
            Self::Select | Self::Insert | Self::Update | Self::Delete | Self::Copy
        )
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Copy => "COPY",
            Self::Ddl => "DDL",
            Self::Management => "MANAGEMENT",
            Self::Undefined => "UNDEFINED",
        };
        write!(f, "{name}")
    }
}

/// A compiled statement.
#[derive(Debug, Clone)]
pub enum Plan {
    /// Data manipulation through an operation graph.
    Distributed(DistributedPlan),
    /// `SET [PERSISTENT | TRANSIENT | GLOBAL] ...`
    UpdateSettings(UpdateSettingsPlan),
    /// A statement without effect.
    Noop,
}

impl Plan {
    pub fn statement_type(&self) -> StatementType {
        match self {
            Self::Distributed(plan) => plan.statement_type(),
            Self::UpdateSettings(_) => StatementType::Management,
            Self::Noop => StatementType::Undefined,
        }
    }

    /// Dispatch the plan.
    ///
    /// On `Ok` the consumer receives exactly one terminal signal, possibly
    /// after this returns. On `Err` nothing was submitted and the untouched
    /// consumer comes back with the error. Must be called within a Tokio
    /// runtime.
    pub fn execute_or_fail(
        &self,
        dependencies: &DependencyCarrier,
        ctx: &PlannerContext,
        consumer: BoxedRowConsumer,
        params: &Row,
        sub_query_results: &SubQueryResults,
    ) -> Result<(), Rejection> {
        match self {
            Self::Distributed(plan) => plan.execute_or_fail(dependencies, ctx, consumer),
            Self::UpdateSettings(plan) => {
                plan.execute_or_fail(dependencies, ctx, consumer, params, sub_query_results)
            }
            Self::Noop => {
                consumer.complete(Ok(0));
                Ok(())
            }
        }
    }

    /// Dispatch the plan, routing a synchronous rejection to the consumer.
    pub fn execute(
        &self,
        dependencies: &DependencyCarrier,
        ctx: &PlannerContext,
        consumer: BoxedRowConsumer,
        params: &Row,
        sub_query_results: &SubQueryResults,
    ) {
        if let Err(rejection) =
            self.execute_or_fail(dependencies, ctx, consumer, params, sub_query_results)
        {
            debug!(
                "job {}: {} statement rejected: {}",
                ctx.job_id(),
                self.statement_type(),
                rejection.error
            );
            rejection.fail_consumer();
        }
    }
}

impl From<DistributedPlan> for Plan {
    fn from(plan: DistributedPlan) -> Self {
        Self::Distributed(plan)
    }
}

impl From<UpdateSettingsPlan> for Plan {
    fn from(plan: UpdateSettingsPlan) -> Self {
        Self::UpdateSettings(plan)
    }
}

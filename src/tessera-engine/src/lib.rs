//! Statement execution for Tessera.
//!
//! Compiled statements arrive as [`Plan`] variants bound to a
//! [`PlannerContext`]. Dispatch goes through [`Plan::execute_or_fail`] with
//! a [`DependencyCarrier`] holding the external services:
//!
//! - distributed plans build a node operation graph and hand it to the
//!   job launcher, which streams terminal rows to the consumer
//! - settings plans evaluate and validate their assignments, issue one
//!   cluster update and report its acknowledgement as a single row
//!   through [`OneRowListener`]

pub mod cluster;
pub mod context;
pub mod dependencies;
pub mod plan;
pub mod result;
pub mod testing;

pub use cluster::{
    ClusterSettingsAction, ClusterUpdateSettingsRequest, ClusterUpdateSettingsResponse,
};
pub use context::PlannerContext;
pub use dependencies::DependencyCarrier;
pub use plan::{DistributedPlan, Plan, StatementType, UpdateSettingsPlan};
pub use result::OneRowListener;

//! `SET` statements changing cluster settings.

use std::sync::Arc;

use log::{debug, info};

use common_error::{TesseraError, TesseraResult};
use tessera_core::{
    Assignment, BoxedRowConsumer, Rejection, Row, Settings, SettingsBuilder, SettingsRegistry,
    SubQueryResults, Symbol, Value, acknowledgement_row,
};

use crate::cluster::{ClusterUpdateSettingsRequest, ClusterUpdateSettingsResponse};
use crate::context::PlannerContext;
use crate::dependencies::DependencyCarrier;
use crate::result::OneRowListener;

/// Plan for changing persistent and transient cluster settings in one request.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSettingsPlan {
    persistent: Vec<Assignment>,
    transient: Vec<Assignment>,
    merged_transient: Vec<Assignment>,
}

impl UpdateSettingsPlan {
    /// Create a plan from both assignment lists.
    ///
    /// The transient side carries every persistent key, with explicit
    /// transient assignments replacing the carried-over ones.
    pub fn new(persistent: Vec<Assignment>, transient: Vec<Assignment>) -> Self {
        let merged_transient = build_transient_settings(&persistent, &transient);
        Self {
            persistent,
            transient,
            merged_transient,
        }
    }

    /// Create a plan updating the persistent settings, overriding stale
    /// transient values of the same keys as well.
    pub fn persistent_only(persistent: Vec<Assignment>) -> Self {
        let transient = persistent.clone();
        Self::new(persistent, transient)
    }

    pub fn persistent_settings(&self) -> &[Assignment] {
        &self.persistent
    }

    /// Transient assignments after carrying over the persistent ones.
    pub fn transient_settings(&self) -> &[Assignment] {
        &self.merged_transient
    }

    pub(crate) fn execute_or_fail(
        &self,
        dependencies: &DependencyCarrier,
        ctx: &PlannerContext,
        consumer: BoxedRowConsumer,
        params: &Row,
        sub_query_results: &SubQueryResults,
    ) -> Result<(), Rejection> {
        let request = match self.build_request(dependencies, ctx, params, sub_query_results) {
            Ok(request) => request,
            Err(e) => return Err(Rejection::new(e, consumer)),
        };

        let job_id = ctx.job_id().clone();
        if ctx.is_cancelled() || consumer.is_closed() {
            debug!("job {job_id}: cancelled before the cluster settings update was sent");
            let error = TesseraError::cancelled(format!("job {job_id} was cancelled"));
            return Err(Rejection::new(error, consumer));
        }

        debug!(
            "job {job_id}: updating cluster settings persistent={:?} transient={:?}",
            request.persistent.keys().collect::<Vec<_>>(),
            request.transient.keys().collect::<Vec<_>>()
        );

        let action = Arc::clone(dependencies.cluster_settings());
        let to_row = move |response: ClusterUpdateSettingsResponse| {
            if !response.acknowledged {
                info!("job {job_id}: cluster settings update was not acknowledged");
            }
            acknowledgement_row(response.acknowledged)
        };
        OneRowListener::new(consumer, to_row).attach(async move { action.update(request).await });
        Ok(())
    }

    fn build_request(
        &self,
        dependencies: &DependencyCarrier,
        ctx: &PlannerContext,
        params: &Row,
        sub_query_results: &SubQueryResults,
    ) -> TesseraResult<ClusterUpdateSettingsRequest> {
        let eval = |symbol: &Symbol| {
            dependencies.evaluator().evaluate(
                ctx.transaction(),
                ctx.functions(),
                symbol,
                params,
                sub_query_results,
            )
        };

        let transient = if ctx.config().settings.mirror_persistent_into_transient {
            &self.merged_transient
        } else {
            &self.transient
        };

        Ok(ClusterUpdateSettingsRequest {
            persistent: build_settings_from(&self.persistent, dependencies.registry(), eval)?,
            transient: build_settings_from(transient, dependencies.registry(), eval)?,
        })
    }
}

/// Overlay `transient` onto `persistent` by assignment key.
///
/// Keys keep the position of their first appearance; a later assignment of
/// the same key replaces the earlier one in place.
pub fn build_transient_settings(
    persistent: &[Assignment],
    transient: &[Assignment],
) -> Vec<Assignment> {
    let mut merged: Vec<Assignment> = Vec::with_capacity(persistent.len() + transient.len());
    for assignment in persistent.iter().chain(transient) {
        match merged
            .iter()
            .position(|existing| existing.column_name == assignment.column_name)
        {
            Some(pos) => merged[pos] = assignment.clone(),
            None => merged.push(assignment.clone()),
        }
    }
    merged
}

/// Evaluate assignments into validated settings.
///
/// Every key must name a setting or a settings group before its value is
/// evaluated. Values are flattened into leaf keys, and every leaf must be
/// alterable at runtime.
pub fn build_settings_from<E>(
    assignments: &[Assignment],
    registry: &dyn SettingsRegistry,
    eval: E,
) -> TesseraResult<Settings>
where
    E: Fn(&Symbol) -> TesseraResult<Value>,
{
    let mut builder = SettingsBuilder::new();
    for assignment in assignments {
        let name = setting_name(eval(&assignment.column_name)?)?;
        if !registry.is_valid_setting(&name) {
            return Err(TesseraError::unsupported_setting(name));
        }
        let value = eval(assignment.only_expression()?)?;
        registry.flatten(&mut builder, &name, value);
    }

    let settings = builder.build();
    for key in settings.keys() {
        registry.check_runtime_setting(key)?;
    }
    Ok(settings)
}

fn setting_name(key: Value) -> TesseraResult<String> {
    match key {
        Value::String(name) => Ok(name),
        other => Err(TesseraError::invalid_argument(format!(
            "setting name must be a string, got {} {other}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::BuiltinSettingsRegistry;

    fn literal_eval(symbol: &Symbol) -> TesseraResult<Value> {
        match symbol {
            Symbol::Literal(value) => Ok(value.clone()),
            other => Err(TesseraError::evaluation(format!("cannot evaluate {other}"))),
        }
    }

    fn keys(assignments: &[Assignment]) -> Vec<String> {
        assignments.iter().map(|a| a.column_name.to_string()).collect()
    }

    #[test]
    fn test_persistent_only_mirrors_into_transient() {
        let plan = UpdateSettingsPlan::persistent_only(vec![Assignment::literal(
            "stats.enabled",
            true,
        )]);
        assert_eq!(plan.persistent_settings(), plan.transient_settings());
    }

    #[test]
    fn test_transient_wins_on_conflict() {
        let plan = UpdateSettingsPlan::new(
            vec![
                Assignment::literal("stats.enabled", true),
                Assignment::literal("stats.jobs_log_size", 100i64),
            ],
            vec![Assignment::literal("stats.enabled", false)],
        );

        assert_eq!(
            plan.transient_settings(),
            &[
                Assignment::literal("stats.enabled", false),
                Assignment::literal("stats.jobs_log_size", 100i64),
            ]
        );
        assert_eq!(plan.persistent_settings().len(), 2);
    }

    #[test]
    fn test_empty_transient_carries_persistent() {
        let merged =
            build_transient_settings(&[Assignment::literal("stats.enabled", true)], &[]);
        assert_eq!(merged, vec![Assignment::literal("stats.enabled", true)]);
    }

    #[test]
    fn test_duplicate_key_last_wins_in_place() {
        let merged = build_transient_settings(
            &[
                Assignment::literal("stats.enabled", true),
                Assignment::literal("bulk.request_timeout", "1m"),
                Assignment::literal("stats.enabled", false),
            ],
            &[Assignment::literal("indices.breaker.query.limit", "60%")],
        );
        assert_eq!(
            keys(&merged),
            vec![
                "'stats.enabled'",
                "'bulk.request_timeout'",
                "'indices.breaker.query.limit'"
            ]
        );
        assert_eq!(merged[0], Assignment::literal("stats.enabled", false));
    }

    #[test]
    fn test_build_settings_flattens_objects() {
        let registry = BuiltinSettingsRegistry::new();
        let value: Value = [("enabled", Value::from(true)), ("jobs_log_size", Value::from(100i64))]
            .into_iter()
            .collect();
        let settings = build_settings_from(
            &[Assignment::new(Symbol::literal("stats"), Symbol::Literal(value))],
            &registry,
            literal_eval,
        )
        .unwrap();

        assert_eq!(
            settings.keys().collect::<Vec<_>>(),
            vec!["stats.enabled", "stats.jobs_log_size"]
        );
        assert_eq!(settings.get("stats.jobs_log_size"), Some(&Value::Int64(100)));
    }

    #[test]
    fn test_unknown_key_rejected_before_value_evaluation() {
        let registry = BuiltinSettingsRegistry::new();
        let assignment = Assignment::new(Symbol::literal("unknown.setting"), Symbol::Parameter(0));
        let err = build_settings_from(&[assignment], &registry, literal_eval).unwrap_err();

        assert_eq!(
            err.to_string(),
            "UnsupportedSetting: Setting 'unknown.setting' is not supported"
        );
    }

    #[test]
    fn test_unknown_leaf_in_group_rejected() {
        let registry = BuiltinSettingsRegistry::new();
        let value: Value = [("no_such_flag", Value::from(true))].into_iter().collect();
        let err = build_settings_from(
            &[Assignment::new(Symbol::literal("stats"), Symbol::Literal(value))],
            &registry,
            literal_eval,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TesseraError::UnsupportedSetting(name) if name == "stats.no_such_flag"
        ));
    }

    #[test]
    fn test_fixed_setting_rejected() {
        let registry = BuiltinSettingsRegistry::new();
        let err = build_settings_from(
            &[Assignment::literal("cluster.name", "other")],
            &registry,
            literal_eval,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "NotRuntimeSetting: Setting 'cluster.name' cannot be set/reset at runtime"
        );
    }

    #[test]
    fn test_malformed_assignments() {
        let registry = BuiltinSettingsRegistry::new();

        let numeric_key = Assignment::new(Symbol::literal(1i64), Symbol::literal(true));
        let err = build_settings_from(&[numeric_key], &registry, literal_eval).unwrap_err();
        assert!(matches!(err, TesseraError::InvalidArgument(_)));

        let no_value = Assignment {
            column_name: Symbol::literal("stats.enabled"),
            expressions: vec![],
        };
        let err = build_settings_from(&[no_value], &registry, literal_eval).unwrap_err();
        assert!(matches!(err, TesseraError::InvalidArgument(_)));
    }
}

//! Scheduler operations and their input/output shapes

use crate::errors::{
    SchedulerError, CONFLICT, RESOURCE_NOT_FOUND, SERVICE_ERRORS, SERVICE_QUOTA_EXCEEDED,
    VALIDATION,
};
use crate::model::{ScheduleExpression, ScheduleSummary, Target};
use jsonwire_client::{ErrorDescriptor, Operation, OperationDescriptor, Service, ServiceProtocol};
use jsonwire_core::{Shape, Timestamp, Value};
use std::collections::BTreeMap;

/// The job scheduler service
#[derive(Debug, Clone, Copy)]
pub struct Scheduler;

impl Service for Scheduler {
    const PROTOCOL: ServiceProtocol = ServiceProtocol::json_1_1("JobScheduler_20240601");

    type Error = SchedulerError;

    fn errors() -> &'static [ErrorDescriptor<SchedulerError>] {
        SERVICE_ERRORS
    }

    fn operations() -> &'static [&'static OperationDescriptor<SchedulerError>] {
        OPERATIONS
    }
}

pub static CREATE_SCHEDULE: OperationDescriptor<SchedulerError> = OperationDescriptor {
    name: "CreateSchedule",
    errors: &[CONFLICT, VALIDATION, SERVICE_QUOTA_EXCEEDED],
};

pub static GET_SCHEDULE: OperationDescriptor<SchedulerError> = OperationDescriptor {
    name: "GetSchedule",
    errors: &[RESOURCE_NOT_FOUND, VALIDATION],
};

pub static LIST_SCHEDULES: OperationDescriptor<SchedulerError> = OperationDescriptor {
    name: "ListSchedules",
    errors: &[VALIDATION],
};

pub static UPDATE_SCHEDULE: OperationDescriptor<SchedulerError> = OperationDescriptor {
    name: "UpdateSchedule",
    errors: &[RESOURCE_NOT_FOUND, CONFLICT, VALIDATION],
};

pub static DELETE_SCHEDULE: OperationDescriptor<SchedulerError> = OperationDescriptor {
    name: "DeleteSchedule",
    errors: &[RESOURCE_NOT_FOUND, CONFLICT, VALIDATION],
};

pub static OPERATIONS: &[&OperationDescriptor<SchedulerError>] = &[
    &CREATE_SCHEDULE,
    &GET_SCHEDULE,
    &LIST_SCHEDULES,
    &UPDATE_SCHEDULE,
    &DELETE_SCHEDULE,
];

macro_rules! operation {
    ($op:ident, $input:ty, $output:ty, $descriptor:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $op;

        impl Operation for $op {
            type Service = Scheduler;
            type Input = $input;
            type Output = $output;

            fn descriptor() -> &'static OperationDescriptor<SchedulerError> {
                &$descriptor
            }
        }
    };
}

operation!(CreateSchedule, CreateScheduleInput, CreateScheduleOutput, CREATE_SCHEDULE);
operation!(GetSchedule, GetScheduleInput, GetScheduleOutput, GET_SCHEDULE);
operation!(ListSchedules, ListSchedulesInput, ListSchedulesOutput, LIST_SCHEDULES);
operation!(UpdateSchedule, UpdateScheduleInput, UpdateScheduleOutput, UPDATE_SCHEDULE);
operation!(DeleteSchedule, DeleteScheduleInput, DeleteScheduleOutput, DELETE_SCHEDULE);

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct CreateScheduleInput {
    pub name: String,
    pub expression: ScheduleExpression,
    pub target: Target,
    pub description: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
    pub start_date: Option<Timestamp>,
    /// Relative share when several schedules fire at once
    pub weight: Option<f64>,
    #[wire(idempotency_token)]
    pub client_token: Option<String>,
}

impl CreateScheduleInput {
    pub fn new(name: impl Into<String>, expression: ScheduleExpression, target: Target) -> Self {
        Self {
            name: name.into(),
            expression,
            target,
            description: None,
            tags: None,
            start_date: None,
            weight: None,
            client_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct CreateScheduleOutput {
    pub schedule_arn: String,
    pub creation_date: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct GetScheduleInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct GetScheduleOutput {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub expression: Option<ScheduleExpression>,
    pub target: Option<Target>,
    pub tags: Option<BTreeMap<String, String>>,
    pub start_date: Option<Timestamp>,
    pub weight: Option<f64>,
    #[wire(with = "jsonwire_core::scalar::lenient_i64")]
    pub invocation_count: Option<i64>,
    pub last_run_at: Option<Timestamp>,
    pub success_rate: Option<f64>,
    /// Reported as ISO-8601 text rather than epoch seconds
    #[wire(with = "jsonwire_core::scalar::date_time")]
    pub creation_date: Option<Timestamp>,
    /// Free-form annotations, passed through untouched
    pub annotations: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Shape)]
pub struct ListSchedulesInput {
    pub max_results: Option<i32>,
    pub next_token: Option<String>,
    pub name_prefix: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ListSchedulesOutput {
    pub schedules: Vec<ScheduleSummary>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct UpdateScheduleInput {
    pub name: String,
    pub expression: ScheduleExpression,
    pub target: Target,
    pub description: Option<String>,
    pub start_date: Option<Timestamp>,
    pub weight: Option<f64>,
    #[wire(idempotency_token)]
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct UpdateScheduleOutput {
    pub schedule_arn: String,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct DeleteScheduleInput {
    pub name: String,
    #[wire(idempotency_token)]
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct DeleteScheduleOutput;

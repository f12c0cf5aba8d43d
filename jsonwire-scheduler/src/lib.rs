//! Job scheduler service client
//!
//! A complete JSON 1.1 service described with jsonwire: derived shapes for
//! every input, output and exception, a union for schedule expressions, static
//! operation and error tables, and a thin client over any [`Transport`].
//!
//! [`Transport`]: jsonwire_client::Transport

pub mod client;
pub mod errors;
pub mod model;
pub mod operations;

pub use client::SchedulerClient;
pub use errors::{
    ConflictException, InternalServerException, ResourceNotFoundException, SchedulerError,
    ServiceQuotaExceededException, ThrottlingException, ValidationException, ValidationField,
};
pub use model::{
    CronExpression, RateExpression, RetryPolicy, ScheduleExpression, ScheduleSummary, Target,
};
pub use operations::{
    CreateSchedule, CreateScheduleInput, CreateScheduleOutput, DeleteSchedule,
    DeleteScheduleInput, DeleteScheduleOutput, GetSchedule, GetScheduleInput, GetScheduleOutput,
    ListSchedules, ListSchedulesInput, ListSchedulesOutput, Scheduler, UpdateSchedule,
    UpdateScheduleInput, UpdateScheduleOutput,
};

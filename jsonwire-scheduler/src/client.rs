//! Scheduler client
//!
//! Pairs a [`Dispatcher`] with a caller-supplied [`Transport`].
//!
//! ```rust,ignore
//! use jsonwire_scheduler::{SchedulerClient, GetScheduleInput};
//!
//! let client = SchedulerClient::new("https://scheduler.local", my_transport)?;
//! let schedule = client
//!     .get_schedule(GetScheduleInput { name: "nightly-backup".into() })
//!     .await?;
//! println!("{:?} ({:?})", schedule.state, schedule.metadata.request_id);
//! ```

use crate::operations::{
    CreateSchedule, CreateScheduleInput, DeleteSchedule, DeleteScheduleInput, GetSchedule,
    GetScheduleInput, ListSchedules, ListSchedulesInput, ListSchedulesOutput, UpdateSchedule,
    UpdateScheduleInput,
};
use jsonwire_client::{Dispatcher, OperationResult, StaticEndpoint, Transport};
use jsonwire_core::{Output, Result};
use std::collections::HashSet;

pub struct SchedulerClient<T> {
    dispatcher: Dispatcher,
    transport: T,
}

impl<T: Transport> SchedulerClient<T> {
    /// Client for the service at `endpoint` with default dispatcher settings
    pub fn new(endpoint: &str, transport: T) -> Result<Self> {
        let dispatcher = Dispatcher::builder(StaticEndpoint::from_url(endpoint)?).build();
        Ok(Self::with_dispatcher(dispatcher, transport))
    }

    pub fn with_dispatcher(dispatcher: Dispatcher, transport: T) -> Self {
        Self {
            dispatcher,
            transport,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[tracing::instrument(skip_all, fields(schedule = %input.name))]
    pub async fn create_schedule(&self, input: CreateScheduleInput) -> OperationResult<CreateSchedule> {
        self.dispatcher
            .call::<CreateSchedule, _>(&self.transport, &input)
            .await
    }

    #[tracing::instrument(skip_all, fields(schedule = %input.name))]
    pub async fn get_schedule(&self, input: GetScheduleInput) -> OperationResult<GetSchedule> {
        self.dispatcher
            .call::<GetSchedule, _>(&self.transport, &input)
            .await
    }

    #[tracing::instrument(skip_all)]
    pub async fn list_schedules(&self, input: ListSchedulesInput) -> OperationResult<ListSchedules> {
        self.dispatcher
            .call::<ListSchedules, _>(&self.transport, &input)
            .await
    }

    /// Follow `NextToken` until the listing is exhausted
    ///
    /// Stops early if the service hands back a token it already returned.
    pub async fn list_all_schedules(
        &self,
        mut input: ListSchedulesInput,
    ) -> OperationResult<ListSchedules> {
        let mut schedules = Vec::new();
        let mut seen_tokens = HashSet::new();
        loop {
            let (page, metadata) = self.list_schedules(input.clone()).await?.into_parts();
            schedules.extend(page.schedules);
            tracing::trace!(fetched = schedules.len(), "Fetched schedule page");

            let next = page.next_token.filter(|token| !token.is_empty());
            match next {
                Some(token) if seen_tokens.insert(token.clone()) => input.next_token = Some(token),
                repeated => {
                    if let Some(token) = repeated {
                        tracing::warn!(next_token = %token, "Pagination token repeated, stopping");
                    }
                    let body = ListSchedulesOutput {
                        schedules,
                        next_token: None,
                    };
                    return Ok(Output::new(body, metadata));
                }
            }
        }
    }

    #[tracing::instrument(skip_all, fields(schedule = %input.name))]
    pub async fn update_schedule(&self, input: UpdateScheduleInput) -> OperationResult<UpdateSchedule> {
        self.dispatcher
            .call::<UpdateSchedule, _>(&self.transport, &input)
            .await
    }

    #[tracing::instrument(skip_all, fields(schedule = %input.name))]
    pub async fn delete_schedule(&self, input: DeleteScheduleInput) -> OperationResult<DeleteSchedule> {
        self.dispatcher
            .call::<DeleteSchedule, _>(&self.transport, &input)
            .await
    }
}

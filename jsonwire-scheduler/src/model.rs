//! Shapes shared by several scheduler operations

use jsonwire_core::{
    decode_shape, encode_shape, Directive, EncodeContext, Field, Fields, LazyJson, Result, Shape,
    Timestamp, UnknownVariant, Union, Value, WireValue,
};

/// When a schedule fires
#[derive(Debug, Clone, PartialEq, Union)]
pub enum ScheduleExpression {
    /// Every `value` `unit`s
    Rate(RateExpression),
    Cron(CronExpression),
    /// Once, at the given time
    At(Timestamp),
    #[wire(unknown)]
    Unknown(UnknownVariant),
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct RateExpression {
    pub value: i32,
    /// `minutes`, `hours` or `days`
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Shape)]
pub struct CronExpression {
    pub expression: String,
    /// IANA zone name; UTC when absent
    pub timezone: Option<String>,
}

/// What a schedule invokes
#[derive(Debug, Clone, PartialEq, Shape)]
pub struct Target {
    #[wire(rename = "Arn")]
    pub arn: String,
    pub role_arn: String,
    /// Payload delivered to the target, kept as raw JSON text
    pub input: Option<LazyJson>,
    pub retry_policy: Option<RetryPolicy>,
    pub dead_letter_arns: Option<Vec<String>>,
}

/// Delivery retry limits for a target
///
/// Hand-written table; the wire names predate the PascalCase convention for
/// the age limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryPolicy {
    pub maximum_retry_attempts: Option<i32>,
    pub maximum_event_age_in_seconds: Option<i32>,
}

impl Shape for RetryPolicy {
    const NAME: &'static str = "RetryPolicy";

    fn fields() -> &'static [Field<Self>] {
        const FIELDS: &[Field<RetryPolicy>] = &[
            Field {
                member: "maximum_retry_attempts",
                wire: "MaximumRetryAttempts",
                aliases: &[],
                required: false,
                directive: Directive::Member,
                encode: |s, cx| s.maximum_retry_attempts.as_ref().map(|v| v.to_wire(cx)).transpose(),
            },
            Field {
                member: "maximum_event_age_in_seconds",
                wire: "MaximumEventAgeInSeconds",
                aliases: &["MaximumEventAge"],
                required: false,
                directive: Directive::Member,
                encode: |s, cx| {
                    s.maximum_event_age_in_seconds
                        .as_ref()
                        .map(|v| v.to_wire(cx))
                        .transpose()
                },
            },
        ];
        FIELDS
    }

    fn from_fields(fields: &Fields<'_, Self>) -> Result<Self> {
        Ok(RetryPolicy {
            maximum_retry_attempts: fields.optional(0)?,
            maximum_event_age_in_seconds: fields.optional(1)?,
        })
    }
}

impl WireValue for RetryPolicy {
    fn to_wire(&self, cx: &EncodeContext<'_>) -> Result<Value> {
        encode_shape(self, cx)
    }

    fn from_wire(value: &Value) -> Result<Self> {
        decode_shape(value)
    }
}

/// One entry of a schedule listing
#[derive(Debug, Clone, PartialEq, Shape)]
pub struct ScheduleSummary {
    pub name: String,
    pub arn: Option<String>,
    /// `ENABLED` or `DISABLED`
    pub state: Option<String>,
    pub expression: Option<ScheduleExpression>,
    pub last_modification_date: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retry_policy_accepts_legacy_age_key() {
        let policy: RetryPolicy = decode_shape(&json!({"MaximumEventAge": 3600})).unwrap();
        assert_eq!(policy.maximum_event_age_in_seconds, Some(3600));
        assert_eq!(policy.maximum_retry_attempts, None);
    }

    #[test]
    fn test_target_wire_names() {
        let target = Target {
            arn: "arn:queue".into(),
            role_arn: "arn:role".into(),
            input: None,
            retry_policy: Some(RetryPolicy {
                maximum_retry_attempts: Some(3),
                maximum_event_age_in_seconds: None,
            }),
            dead_letter_arns: Some(vec!["arn:dlq".into()]),
        };

        let wire = encode_shape(&target, &EncodeContext::default()).unwrap();
        assert_eq!(
            wire,
            json!({
                "Arn": "arn:queue",
                "RoleArn": "arn:role",
                "RetryPolicy": {"MaximumRetryAttempts": 3},
                "DeadLetterArns": ["arn:dlq"]
            })
        );
    }

    #[test]
    fn test_expression_variants() {
        let cx = EncodeContext::default();
        let rate = ScheduleExpression::Rate(RateExpression {
            value: 5,
            unit: "minutes".into(),
        });
        assert_eq!(
            rate.to_wire(&cx).unwrap(),
            json!({"Rate": {"Value": 5, "Unit": "minutes"}})
        );

        let at = ScheduleExpression::At(Timestamp::from_epoch_millis(1_700_000_000_250).unwrap());
        assert_eq!(at.to_wire(&cx).unwrap(), json!({"At": 1_700_000_000.25}));
    }

    #[test]
    fn test_unknown_expression_round_trips() {
        let wire = json!({"Solar": {"Event": "sunset", "Offset": -15}});
        let decoded = ScheduleExpression::from_wire(&wire).unwrap();
        assert!(matches!(&decoded, ScheduleExpression::Unknown(v) if v.key == "Solar"));
        assert_eq!(decoded.to_wire(&EncodeContext::default()).unwrap(), wire);
    }
}

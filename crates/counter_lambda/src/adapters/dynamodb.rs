use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::adapters::counter_store::{CounterStore, CounterStoreError};
use crate::config::resolve_table_name;
use crate::runtime::contract::{
    parse_count, COUNTER_ID, COUNTER_KEY_ATTRIBUTE, COUNT_ATTRIBUTE, COUNT_NAME_PLACEHOLDER,
    INCREMENT_UPDATE_EXPRESSION, ONE_VALUE_PLACEHOLDER, ZERO_VALUE_PLACEHOLDER,
};

type Item = HashMap<String, AttributeValue>;

/// Counter record kept in a DynamoDB table keyed by `counter_id`.
///
/// The client is reusable across invocations; the table name is resolved from
/// configuration on each call.
#[derive(Clone)]
pub struct DynamoCounterStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoCounterStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

impl CounterStore for DynamoCounterStore {
    fn get_count(&self) -> Result<u64, CounterStoreError> {
        let table_name = resolve_table_name()?;
        tracing::debug!(table = %table_name, "reading counter record");

        let output = block_on_store(async {
            self.client
                .get_item()
                .table_name(table_name)
                .key(COUNTER_KEY_ATTRIBUTE, counter_key())
                .send()
                .await
                .map_err(|error| classify_sdk_error("GetItem", error))
        })??;

        count_from_item(output.item())
    }

    fn increment_count(&self) -> Result<u64, CounterStoreError> {
        let table_name = resolve_table_name()?;
        tracing::debug!(table = %table_name, "incrementing counter record");

        let output = block_on_store(async {
            self.client
                .update_item()
                .table_name(table_name)
                .key(COUNTER_KEY_ATTRIBUTE, counter_key())
                .update_expression(INCREMENT_UPDATE_EXPRESSION)
                .expression_attribute_names(COUNT_NAME_PLACEHOLDER, COUNT_ATTRIBUTE)
                .expression_attribute_values(ZERO_VALUE_PLACEHOLDER, number(0))
                .expression_attribute_values(ONE_VALUE_PLACEHOLDER, number(1))
                .return_values(ReturnValue::UpdatedNew)
                .send()
                .await
                .map_err(|error| classify_sdk_error("UpdateItem", error))
        })??;

        count_from_updated_attributes(output.attributes())
    }
}

fn block_on_store<F: Future>(future: F) -> Result<F::Output, CounterStoreError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|error| {
        CounterStoreError::Transport(format!("no async runtime available for store call: {error}"))
    })?;
    if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::CurrentThread {
        return Err(CounterStoreError::Transport(
            "store calls require a multi-threaded async runtime".to_string(),
        ));
    }
    Ok(tokio::task::block_in_place(|| handle.block_on(future)))
}

fn counter_key() -> AttributeValue {
    AttributeValue::S(COUNTER_ID.to_string())
}

fn number(value: u64) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn classify_sdk_error<E, R>(operation: &str, error: SdkError<E, R>) -> CounterStoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match error {
        SdkError::ServiceError(context) => {
            let service_error = context.into_err();
            CounterStoreError::Store(format!(
                "An error occurred ({}) when calling the {operation} operation: {}",
                service_error.code().unwrap_or("Unknown"),
                service_error.message().unwrap_or("no message provided"),
            ))
        }
        other => CounterStoreError::Transport(format!(
            "{operation} request failed: {}",
            DisplayErrorContext(&other)
        )),
    }
}

fn count_from_item(item: Option<&Item>) -> Result<u64, CounterStoreError> {
    match item.and_then(|item| item.get(COUNT_ATTRIBUTE)) {
        Some(value) => parse_count_attribute(value),
        None => Ok(0),
    }
}

fn count_from_updated_attributes(attributes: Option<&Item>) -> Result<u64, CounterStoreError> {
    let value = attributes
        .and_then(|attributes| attributes.get(COUNT_ATTRIBUTE))
        .ok_or_else(|| {
            CounterStoreError::InvalidRecord(format!(
                "update response did not include '{COUNT_ATTRIBUTE}'"
            ))
        })?;
    parse_count_attribute(value)
}

fn parse_count_attribute(value: &AttributeValue) -> Result<u64, CounterStoreError> {
    let raw = value.as_n().map_err(|_| {
        CounterStoreError::InvalidRecord(format!("'{COUNT_ATTRIBUTE}' must be a number attribute"))
    })?;
    parse_count(raw).map_err(CounterStoreError::InvalidRecord)
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
    use aws_smithy_types::body::SdkBody;
    use serde_json::{json, Value};

    use crate::config::TABLE_NAME_ENV;
    use crate::handlers::counter::handle_counter_event;
    use crate::runtime::contract::ErrorCategory;

    use super::*;

    const TEST_TABLE: &str = "visitor-counter";

    fn replay_event(status: u16, body: &str) -> ReplayEvent {
        ReplayEvent::new(
            http::Request::builder()
                .method("POST")
                .uri("https://dynamodb.us-east-1.amazonaws.com/")
                .body(SdkBody::empty())
                .expect("request should build"),
            http::Response::builder()
                .status(status)
                .header("content-type", "application/x-amz-json-1.0")
                .body(SdkBody::from(body.to_string()))
                .expect("response should build"),
        )
    }

    fn replay_store(events: Vec<ReplayEvent>) -> (DynamoCounterStore, StaticReplayClient) {
        std::env::set_var(TABLE_NAME_ENV, TEST_TABLE);
        let replay_client = StaticReplayClient::new(events);
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
            .http_client(replay_client.clone())
            .build();
        (
            DynamoCounterStore::new(aws_sdk_dynamodb::Client::from_conf(config)),
            replay_client,
        )
    }

    fn sent_requests(replay_client: &StaticReplayClient) -> Vec<(String, Value)> {
        replay_client
            .actual_requests()
            .map(|request| {
                let target = request
                    .headers()
                    .get("x-amz-target")
                    .unwrap_or_default()
                    .to_string();
                let body = request.body().bytes().expect("request body should be buffered");
                let body = serde_json::from_slice(body).expect("request body should be json");
                (target, body)
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn increment_issues_single_atomic_update() {
        let (store, replay_client) =
            replay_store(vec![replay_event(200, r#"{"Attributes":{"count":{"N":"7"}}}"#)]);

        assert_eq!(store.increment_count(), Ok(7));

        let requests = sent_requests(&replay_client);
        assert_eq!(requests.len(), 1);
        let (target, body) = &requests[0];
        assert_eq!(target, "DynamoDB_20120810.UpdateItem");
        assert_eq!(body["TableName"], json!(TEST_TABLE));
        assert_eq!(body["Key"], json!({"counter_id": {"S": "global"}}));
        assert_eq!(
            body["UpdateExpression"],
            json!("SET #c = if_not_exists(#c, :zero) + :one")
        );
        assert_eq!(body["ExpressionAttributeNames"], json!({"#c": "count"}));
        assert_eq!(
            body["ExpressionAttributeValues"],
            json!({":zero": {"N": "0"}, ":one": {"N": "1"}})
        );
        assert_eq!(body["ReturnValues"], json!("UPDATED_NEW"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn get_reads_item_by_counter_key() {
        let (store, replay_client) = replay_store(vec![
            replay_event(200, r#"{"Item":{"counter_id":{"S":"global"},"count":{"N":"12"}}}"#),
            replay_event(200, "{}"),
        ]);

        assert_eq!(store.get_count(), Ok(12));
        assert_eq!(store.get_count(), Ok(0));

        let requests = sent_requests(&replay_client);
        assert_eq!(requests.len(), 2);
        for (target, body) in &requests {
            assert_eq!(target, "DynamoDB_20120810.GetItem");
            assert_eq!(body["TableName"], json!(TEST_TABLE));
            assert_eq!(body["Key"], json!({"counter_id": {"S": "global"}}));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn service_error_maps_to_store_error() {
        let (store, _replay_client) = replay_store(vec![replay_event(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
        )]);

        let error = store.get_count().expect_err("missing table should fail");

        assert_eq!(
            error,
            CounterStoreError::Store(
                "An error occurred (ResourceNotFoundException) when calling the GetItem operation: Requested resource not found"
                    .to_string()
            )
        );
        assert_eq!(error.category(), ErrorCategory::Store);
    }

    #[tokio::test]
    async fn current_thread_runtime_yields_error_envelope() {
        let error = block_on_store(async { 1 }).expect_err("current-thread runtime should fail");
        assert!(matches!(error, CounterStoreError::Transport(_)));

        let (store, replay_client) = replay_store(Vec::new());
        let response = handle_counter_event(&json!({}), &store);
        let body: Value = serde_json::from_str(&response.body).expect("body should be json");

        assert_eq!(response.status_code, 500);
        assert_eq!(body["error"], json!("Unhandled error"));
        assert_eq!(replay_client.actual_requests().count(), 0);
    }

    fn item_with(value: AttributeValue) -> Item {
        HashMap::from([
            (COUNTER_KEY_ATTRIBUTE.to_string(), counter_key()),
            (COUNT_ATTRIBUTE.to_string(), value),
        ])
    }

    #[test]
    fn absent_item_reads_as_zero() {
        assert_eq!(count_from_item(None), Ok(0));
    }

    #[test]
    fn item_without_count_reads_as_zero() {
        let item = HashMap::from([(COUNTER_KEY_ATTRIBUTE.to_string(), counter_key())]);
        assert_eq!(count_from_item(Some(&item)), Ok(0));
    }

    #[test]
    fn item_count_is_parsed() {
        let item = item_with(number(12));
        assert_eq!(count_from_item(Some(&item)), Ok(12));
    }

    #[test]
    fn non_numeric_count_attribute_is_invalid_record() {
        let item = item_with(AttributeValue::S("12".to_string()));
        let error = count_from_item(Some(&item)).expect_err("string attribute should fail");
        assert!(matches!(error, CounterStoreError::InvalidRecord(_)));
    }

    #[test]
    fn updated_attributes_yield_new_count() {
        let attributes = HashMap::from([(COUNT_ATTRIBUTE.to_string(), number(7))]);
        assert_eq!(count_from_updated_attributes(Some(&attributes)), Ok(7));
    }

    #[test]
    fn update_response_without_count_is_invalid_record() {
        let error =
            count_from_updated_attributes(None).expect_err("missing attributes should fail");
        assert!(matches!(error, CounterStoreError::InvalidRecord(_)));
        assert!(error.detail().contains("count"));
    }

    #[test]
    fn block_on_store_without_runtime_is_transport_error() {
        let error = block_on_store(async { 1 }).expect_err("no runtime should fail");
        assert!(matches!(error, CounterStoreError::Transport(_)));
    }
}

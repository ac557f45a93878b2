use counter_lambda::adapters::dynamodb::DynamoCounterStore;
use counter_lambda::handlers::counter::{handle_counter_event, ApiGatewayResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(
    store: &DynamoCounterStore,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_counter_event(&event.payload, store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoCounterStore::new(aws_sdk_dynamodb::Client::new(&aws_config));

    lambda_runtime::run(service_fn(|event| handle_request(&store, event))).await
}

// Transaction Step Definitions
//
// Steps that push token transfers through the transaction processor.

use cucumber::{given, then, when};
use serde_json::json;

use antelope_rpc::transactions::{Action, Authorization, ProcessorState, TransactionPrepareError};

use super::common::AntelopeWorld;
use super::common::test_support::doubles::SIGNATURE;

fn transfer(from: &str, to: &str, quantity: &str, memo: &str) -> Action {
    Action::new(
        "eosio.token",
        "transfer",
        vec![Authorization::new(from, "active")],
        json!({ "from": from, "to": to, "quantity": quantity, "memo": memo }),
    )
}

#[given("the node accepts transactions")]
async fn node_accepts(world: &mut AntelopeWorld) {
    world.node().accept_transactions().await;
}

#[when(regex = r#"^(\w+) transfers "([^"]*)" to (\w+) with memo "([^"]*)"$"#)]
async fn transfer_tokens(world: &mut AntelopeWorld, from: String, quantity: String, to: String, memo: String) {
    let action = transfer(&from, &to, &quantity, &memo);

    let prepared = world.processor().prepare(vec![action]).await;
    if let Err(e) = prepared {
        world.prepare_error = Some(e);
        return;
    }
    let broadcast = world.processor().sign_and_broadcast().await;
    match broadcast {
        Ok(response) => world.response = Some(response),
        Err(e) => world.broadcast_error = Some(e),
    }
}

#[when(regex = r#"^(\w+) prepares a transfer of "([^"]*)" to (\w+)$"#)]
async fn prepare_transfer(world: &mut AntelopeWorld, from: String, quantity: String, to: String) {
    let action = transfer(&from, &to, &quantity, "");
    let prepared = world.processor().prepare(vec![action]).await;
    if let Err(e) = prepared {
        world.prepare_error = Some(e);
    }
}

#[when("the same transfer is prepared again")]
async fn prepare_again(world: &mut AntelopeWorld) {
    let action = transfer("bob", "alice", "1.0000 SYS", "");
    let prepared = world.processor().prepare(vec![action]).await;
    if let Err(e) = prepared {
        world.prepare_error = Some(e);
    }
}

#[then("the transaction is broadcast with a non-empty transaction id")]
async fn transaction_broadcast(world: &mut AntelopeWorld) {
    assert!(world.prepare_error.is_none(), "prepare failed: {:?}", world.prepare_error);
    assert!(world.broadcast_error.is_none(), "broadcast failed: {:?}", world.broadcast_error);
    let response = world.response.as_ref().expect("No broadcast response");
    assert!(!response.transaction_id().is_empty());
    assert_eq!(world.processor().state(), ProcessorState::Broadcast);
}

#[then(regex = r#"^the node received (\d+) signed transactions?$"#)]
async fn node_received(world: &mut AntelopeWorld, count: usize) {
    let bodies = world.node().received_bodies("send_transaction").await;
    assert_eq!(bodies.len(), count);
    for body in bodies {
        assert_eq!(body["signatures"], json!([SIGNATURE]));
        assert_eq!(body["compression"], json!(0));
        assert!(!body["packed_trx"].as_str().unwrap_or_default().is_empty());
    }
}

#[then("the transfer memo reached the node")]
async fn memo_reached_node(world: &mut AntelopeWorld) {
    let bodies = world.node().received_bodies("get_required_keys").await;
    let transaction = &bodies.first().expect("Required keys never resolved")["transaction"];
    let data = transaction["actions"][0]["data"].as_str().unwrap_or_default();
    let data = hex::decode(data).expect("Action data is not hex");
    let data: serde_json::Value = serde_json::from_slice(&data).expect("Action data is not JSON");
    assert_eq!(data["memo"], "hello");
    assert_eq!(data["quantity"], "1.1234 SYS");
}

#[then("preparation is rejected as invalid state")]
async fn prepare_rejected(world: &mut AntelopeWorld) {
    assert!(matches!(
        world.prepare_error,
        Some(TransactionPrepareError::InvalidState(ProcessorState::Prepared))
    ));
    assert_eq!(world.processor().state(), ProcessorState::Prepared);
}

// Node Error Step Definitions
//
// Steps that check how node and transport failures surface to callers.

use cucumber::{given, then, when};

use antelope_rpc::errors::{backend_error, backend_error_message, describe};
use antelope_rpc::rpc::{CallErrorKind, RpcProvider};
use antelope_rpc::transactions::{ProcessorState, TransactionSignAndBroadcastError};

use super::common::AntelopeWorld;

#[given(regex = r#"^the node rejects transactions with error (\d+) "([^"]*)"$"#)]
async fn node_rejects(world: &mut AntelopeWorld, code: i64, name: String) {
    world.node().reject_transactions(code, &name).await;
}

#[when("chain info is requested")]
async fn request_chain_info(world: &mut AntelopeWorld) {
    let result = world.provider().get_info().await;
    if let Err(e) = result {
        world.call_error = Some(e);
    }
}

#[then("the broadcast fails with a node error")]
async fn broadcast_fails(world: &mut AntelopeWorld) {
    assert!(world.response.is_none());
    let err = world.broadcast_error.as_ref().expect("Broadcast did not fail");
    assert!(matches!(err, TransactionSignAndBroadcastError::Broadcast(call) if call.kind() == CallErrorKind::Backend));
    assert!(backend_error(err).is_some());
    assert_eq!(world.processor().state(), ProcessorState::Failed);
}

#[then(regex = r#"^the node error message contains "([^"]*)"$"#)]
async fn node_error_contains(world: &mut AntelopeWorld, text: String) {
    let err = world.broadcast_error.as_ref().expect("Broadcast did not fail");
    let backend = backend_error(err).expect("No node error in chain");
    assert!(backend_error_message(backend).contains(&text));
    assert!(describe(err).contains(&text));
}

#[then("the call fails with a transport error")]
async fn call_fails_with_transport(world: &mut AntelopeWorld) {
    let err = world.call_error.as_ref().expect("Call did not fail");
    assert_eq!(err.kind(), CallErrorKind::Transport);
    assert!(err.fault().is_some_and(|fault| fault.is_connect()));
}

#[then("no node error is attached")]
async fn no_node_error(world: &mut AntelopeWorld) {
    let err = world.call_error.as_ref().expect("Call did not fail");
    assert!(err.rpc_response_error().is_none());
    assert!(backend_error(err).is_none());
}

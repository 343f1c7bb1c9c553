//! Transaction building, signing and broadcasting.
//!
//! A [`TransactionProcessor`] takes a list of [`Action`]s through the
//! `prepare -> sign -> broadcast` pipeline against an Antelope node. The
//! heavy lifting is delegated to collaborators:
//!
//! ```text
//! +----------------------+     +-----------------------+
//! | TransactionProcessor |---->| RpcProvider           |  chain info, keys, submit
//! +----------------------+     +-----------------------+
//!      |        |              +-----------------------+
//!      |        +------------->| AbiProvider           |  cached contract ABIs
//!      |                       +-----------------------+
//!      |                       +-----------------------+
//!      +---------------------->| SerializationProvider |  binary encoding
//!      |                       +-----------------------+
//!      |                       +-----------------------+
//!      +---------------------->| SignatureProvider     |  signatures
//!                              +-----------------------+
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let session = TransactionSession::from_config(&config, serializer, signer)?;
//! let mut processor = session.transaction_processor();
//!
//! processor
//!     .prepare(vec![Action::new(
//!         "eosio.token",
//!         "transfer",
//!         vec![Authorization::new("bob", "active")],
//!         json!({"from": "bob", "to": "alice", "quantity": "1.1234 SYS", "memo": "hello"}),
//!     )])
//!     .await?;
//! let response = processor.sign_and_broadcast().await?;
//! println!("{}", response.transaction_id());
//! ```

mod action;
mod error;
mod processor;
mod session;
mod transaction;

pub use action::{Action, ActionData, Authorization};
pub use error::{TransactionPrepareError, TransactionSignAndBroadcastError};
pub use processor::{ProcessorState, TransactionProcessor};
pub use session::TransactionSession;
pub use transaction::{PackedAction, SignedTransaction, Transaction, signing_digest};

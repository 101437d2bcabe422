//! End-to-end client flows against the in-process chain harness.

use provenance_common::address::Address;
use provenance_common::gateway::GatewayError;
use provenance_common::product::ProductState;
use provenance_common::session::SessionError;
use provenance_common::tracker::{Tracker, TrackerError, ValidationError};

use provenance_contract_integration::harness::{MockChain, MockWallet, CHAIN_ADDRESS};

const ALICE: &str = "0x00000000000000000000000000000000000000aa";
const BOB: &str = "0x00000000000000000000000000000000000000bb";

async fn connected(chain: &MockChain, account: &str) -> Tracker<MockWallet> {
    let mut tracker = Tracker::new(Some(MockWallet::new(chain, account)));
    tracker.connect_wallet().await.unwrap();
    tracker.load_contract(CHAIN_ADDRESS).await.unwrap();
    tracker
}

#[tokio::test]
async fn full_lifecycle_stamps_participants() {
    tracing_subscriber::fmt::try_init().ok();

    let chain = MockChain::new();
    let mut tracker = connected(&chain, ALICE).await;

    tracker.add_product("Widget").await.unwrap();
    let widget = &tracker.products()[0];
    assert_eq!(widget.id, 1);
    assert_eq!(widget.name, "Widget");
    assert_eq!(widget.state, ProductState::Created);
    assert_eq!(widget.manufacturer, Address(ALICE.into()));
    assert!(widget.packer.is_zero());
    assert!(widget.participants_consistent());

    // Created → Packed
    let action = tracker.advance(1).await.unwrap();
    assert_eq!(action.label, "Pack");
    assert_eq!(action.resulting_state, ProductState::Packed);
    let widget = &tracker.products()[0];
    assert_eq!(widget.state, ProductState::Packed);
    assert_eq!(widget.packer, Address(ALICE.into()));
    assert!(widget.shipper.is_zero());
    assert!(widget.participants_consistent());

    // Packed → Shipped → Delivered, timestamps moving forward each step
    let mut last_stamp = widget.timestamp;
    for expected in [ProductState::Shipped, ProductState::Delivered] {
        let action = tracker.advance(1).await.unwrap();
        assert_eq!(action.resulting_state, expected);
        let widget = &tracker.products()[0];
        assert_eq!(widget.state, expected);
        assert!(widget.participants_consistent());
        assert!(widget.timestamp > last_stamp);
        last_stamp = widget.timestamp;
    }
    assert_eq!(tracker.products()[0].retailer, Address(ALICE.into()));

    // Delivered is terminal
    assert_eq!(
        tracker.advance(1).await.unwrap_err(),
        TrackerError::Validation(ValidationError::AlreadyDelivered(1))
    );
}

#[tokio::test]
async fn validation_issues_no_network_call() {
    let chain = MockChain::new();

    let mut tracker = Tracker::new(Some(MockWallet::new(&chain, ALICE)));
    tracker.connect_wallet().await.unwrap();

    assert_eq!(
        tracker.load_contract("").await.unwrap_err(),
        TrackerError::Validation(ValidationError::EmptyAddress)
    );
    assert_eq!(chain.read_count(), 0);

    tracker.load_contract(CHAIN_ADDRESS).await.unwrap();
    let reads_after_load = chain.read_count();

    assert_eq!(
        tracker.add_product("   ").await.unwrap_err(),
        TrackerError::Validation(ValidationError::EmptyName)
    );
    assert_eq!(chain.write_count(), 0);
    assert_eq!(chain.read_count(), reads_after_load);
}

#[tokio::test]
async fn refresh_replaces_snapshot_wholesale() {
    let chain = MockChain::new();
    let mut alice = connected(&chain, ALICE).await;
    let mut bob = connected(&chain, BOB).await;

    alice.add_product("Crate of apples").await.unwrap();
    assert!(bob.products().is_empty(), "bob still holds his old snapshot");

    bob.refresh().await.unwrap();
    assert_eq!(bob.products().len(), 1);
    assert_eq!(bob.products()[0].manufacturer, Address(ALICE.into()));

    // A stale cached entry must not survive a refresh
    chain.rename_product(1, "Crate of pears");
    bob.refresh().await.unwrap();
    assert_eq!(bob.products()[0].name, "Crate of pears");
}

#[tokio::test]
async fn concurrent_tab_race_is_resolved_by_the_contract() {
    let chain = MockChain::new();
    let mut alice = connected(&chain, ALICE).await;
    let mut bob = connected(&chain, BOB).await;

    alice.add_product("Widget").await.unwrap();
    bob.refresh().await.unwrap();

    // Both tabs see Created and offer "Pack"; only the first submission
    // lands, the second reverts on-chain and passes through verbatim.
    alice.advance(1).await.unwrap();
    let err = bob.advance(1).await.unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Gateway(GatewayError::TransactionFailed(ref msg))
            if msg.contains("reverted")
    ));

    // The losing tab recovers with a refresh: packer is the winner
    bob.refresh().await.unwrap();
    assert_eq!(bob.products()[0].state, ProductState::Packed);
    assert_eq!(bob.products()[0].packer, Address(ALICE.into()));
}

#[tokio::test]
async fn silent_restore_skips_the_prompt() {
    let chain = MockChain::new();

    let mut fresh = Tracker::new(Some(MockWallet::new(&chain, ALICE)));
    assert!(!fresh.restore().await.unwrap());
    assert!(!fresh.is_connected());

    let mut returning = Tracker::new(Some(MockWallet::pre_authorized(&chain, ALICE)));
    assert!(returning.restore().await.unwrap());
    assert_eq!(returning.account(), Some(&Address(ALICE.into())));
}

#[tokio::test]
async fn user_denial_passes_through() {
    let chain = MockChain::new();
    let mut tracker = Tracker::new(Some(MockWallet::denying(&chain, ALICE)));
    let err = tracker.connect_wallet().await.unwrap_err();
    assert_eq!(
        err,
        TrackerError::Session(SessionError::Provider("user rejected the request".into()))
    );
    assert!(!tracker.is_connected());
}

#[tokio::test]
async fn disconnect_clears_account_and_binding() {
    let chain = MockChain::new();
    let mut tracker = connected(&chain, ALICE).await;
    tracker.add_product("Widget").await.unwrap();

    tracker.accounts_changed(vec![]);
    assert!(!tracker.is_connected());
    assert!(tracker.account().is_none());
    assert!(!tracker.has_contract());

    // The snapshot itself is just data; only the session is torn down
    assert_eq!(tracker.products().len(), 1);
    assert_eq!(
        tracker.refresh().await.unwrap_err(),
        TrackerError::Session(SessionError::NotInitialized)
    );
}

#[tokio::test]
async fn bad_address_fails_on_first_call_not_on_load() {
    let chain = MockChain::new();
    let mut tracker = Tracker::new(Some(MockWallet::new(&chain, ALICE)));
    tracker.connect_wallet().await.unwrap();

    // Binding itself does not validate the address; the initial read that
    // load_contract performs is the first call, and that is what fails.
    let err = tracker.load_contract("0xdeadbeef").await.unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Gateway(GatewayError::Provider(ref msg))
            if msg.contains("no contract deployed")
    ));
}

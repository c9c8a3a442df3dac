use proptest::prelude::*;

use staking_ledger::{Custody, LedgerError, StakingLedger};
use staking_nullables::{NullClock, NullCustody};
use staking_types::{Address, RewardRate};

#[derive(Clone, Debug)]
enum Action {
    Deposit(u128),
    Withdraw(u128),
    Claim,
    Exit,
    Fund(u128),
}

#[derive(Clone, Debug)]
struct Step {
    actor: usize,
    action: Action,
    delay: u64,
    fail_custody: bool,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0u128..5_000).prop_map(Action::Deposit),
        3 => (0u128..5_000).prop_map(Action::Withdraw),
        1 => Just(Action::Claim),
        1 => Just(Action::Exit),
        1 => (0u128..2_000).prop_map(Action::Fund),
    ]
}

fn step() -> impl Strategy<Value = Step> {
    (0usize..3, action(), 0u64..120, prop::bool::weighted(0.1)).prop_map(
        |(actor, action, delay, fail_custody)| Step {
            actor,
            action,
            delay,
            fail_custody,
        },
    )
}

fn actors() -> [Address; 3] {
    [
        Address::from_label("alice"),
        Address::from_label("bob"),
        Address::from_label("carol"),
    ]
}

fn apply(
    ledger: &mut StakingLedger,
    custody: &mut NullCustody,
    caller: &Address,
    action: &Action,
    clock: &NullClock,
) -> Result<(), LedgerError> {
    let now = clock.now();
    match action {
        Action::Deposit(amount) => ledger.deposit(custody, caller, *amount, now),
        Action::Withdraw(amount) => ledger.withdraw(custody, caller, *amount, now),
        Action::Claim => ledger.claim_reward(custody, caller, now).map(|_| ()),
        Action::Exit => ledger.exit(custody, caller, now).map(|_| ()),
        Action::Fund(amount) => ledger.fund(custody, caller, *amount),
    }
}

proptest! {
    /// Every invariant holds after every operation, successful or not.
    #[test]
    fn invariants_hold_after_every_step(
        rate in 0u128..5_000_000_000_000_000_000,
        pool in 0u128..50_000,
        steps in prop::collection::vec(step(), 1..60),
    ) {
        let mut ledger = StakingLedger::new(RewardRate::from_raw(rate));
        let mut custody = NullCustody::with_balance(pool);
        let clock = NullClock::new(1_000);
        let actors = actors();

        for s in &steps {
            clock.advance(s.delay);
            if s.fail_custody {
                custody.fail_next_receive("scripted");
                custody.fail_next_transfer("scripted");
            }
            let _ = apply(&mut ledger, &mut custody, &actors[s.actor], &s.action, &clock);
            prop_assert!(ledger.check_invariants(&custody).is_ok(), "{:?}", ledger.check_invariants(&custody));
            custody.clear_failures();
        }
    }

    /// Σ deposits − Σ withdrawn principal == total_staked for any history.
    #[test]
    fn principal_is_conserved(
        rate in 0u128..1_000_000_000_000_000_000,
        steps in prop::collection::vec(step(), 1..60),
    ) {
        let mut ledger = StakingLedger::new(RewardRate::from_raw(rate));
        let mut custody = NullCustody::with_balance(10_000);
        let clock = NullClock::new(0);
        let actors = actors();
        let mut deposited: u128 = 0;
        let mut withdrawn: u128 = 0;

        for s in &steps {
            clock.advance(s.delay);
            let caller = &actors[s.actor];
            let principal_before = ledger.staked_balance(caller);
            if apply(&mut ledger, &mut custody, caller, &s.action, &clock).is_ok() {
                match s.action {
                    Action::Deposit(amount) => deposited += amount,
                    Action::Withdraw(amount) => withdrawn += amount,
                    Action::Exit => withdrawn += principal_before,
                    Action::Claim | Action::Fund(_) => {}
                }
            }
            prop_assert_eq!(deposited - withdrawn, ledger.total_staked());
        }
    }

    /// A failed operation changes nothing: state, events, or custody.
    #[test]
    fn failures_are_atomic(
        steps in prop::collection::vec(step(), 1..60),
    ) {
        let mut ledger = StakingLedger::new(RewardRate::from_raw(100_000_000_000_000_000));
        let mut custody = NullCustody::with_balance(1_000);
        let clock = NullClock::new(0);
        let actors = actors();

        for s in &steps {
            clock.advance(s.delay);
            if s.fail_custody {
                custody.fail_next_receive("scripted");
                custody.fail_next_transfer("scripted");
            }
            let before = ledger.snapshot();
            let events_before = ledger.events().len();
            let held_before = custody.balance();
            if apply(&mut ledger, &mut custody, &actors[s.actor], &s.action, &clock).is_err() {
                prop_assert_eq!(ledger.snapshot(), before);
                prop_assert_eq!(ledger.events().len(), events_before);
                prop_assert_eq!(custody.balance(), held_before);
            }
            custody.clear_failures();
        }
    }

    /// Withdrawing more than the current principal always fails cleanly.
    #[test]
    fn over_withdrawal_always_rejected(
        deposit in 1u128..1_000_000,
        excess in 1u128..1_000_000,
        delay in 0u64..10_000,
    ) {
        let mut ledger = StakingLedger::new(RewardRate::from_raw(1));
        let mut custody = NullCustody::new();
        let alice = Address::from_label("alice");
        let clock = NullClock::new(0);

        ledger.deposit(&mut custody, &alice, deposit, clock.now()).unwrap();
        let err = ledger
            .withdraw(&mut custody, &alice, deposit + excess, clock.advance(delay))
            .unwrap_err();
        prop_assert_eq!(err.reason(), "Insufficient balance");
        prop_assert_eq!(ledger.staked_balance(&alice), deposit);
        prop_assert_eq!(ledger.total_staked(), deposit);
    }

    /// Reads are idempotent with no intervening mutation.
    #[test]
    fn reads_are_idempotent(
        steps in prop::collection::vec(step(), 0..30),
        probe in 0usize..3,
    ) {
        let mut ledger = StakingLedger::new(RewardRate::from_raw(10_000_000_000_000_000));
        let mut custody = NullCustody::with_balance(5_000);
        let clock = NullClock::new(0);
        let actors = actors();
        for s in &steps {
            clock.advance(s.delay);
            let _ = apply(&mut ledger, &mut custody, &actors[s.actor], &s.action, &clock);
        }
        let who = &actors[probe];
        let now = clock.advance(50);
        let first = (
            ledger.staked_balance(who),
            ledger.total_staked(),
            ledger.pending_reward(who, now, &custody),
        );
        let second = (
            ledger.staked_balance(who),
            ledger.total_staked(),
            ledger.pending_reward(who, now, &custody),
        );
        prop_assert_eq!(first, second);
    }
}

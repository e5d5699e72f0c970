//! Cross-component tests for the full ledger over the in-memory store.
//!
//! Covers the deposit lifecycle end to end, the at-most-once crediting
//! guarantee under concurrency, debit/conversion failure paths, and the
//! balance == journal-sum invariant.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use campay_auth::AuthContext;
    use campay_core::{Amount, DepositId, DomainError, EntryRef, UserId, units};
    use campay_ledger::{
        AdjudicationAction, AdjudicationGateway, BalanceLedger, CommissionLedger, DepositFilter,
        DepositLifecycle, DepositStatus, EntryKind, LedgerConfig, LedgerError, Network,
    };
    use campay_ledger::store::{LedgerStore, LedgerTx};

    use crate::memory::MemoryLedgerStore;

    struct Harness {
        store: Arc<MemoryLedgerStore>,
        deposits: DepositLifecycle<MemoryLedgerStore>,
        balances: BalanceLedger<MemoryLedgerStore>,
        commissions: CommissionLedger<MemoryLedgerStore>,
        gateway: AdjudicationGateway<MemoryLedgerStore>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryLedgerStore::new());
        let config = LedgerConfig::default();
        Harness {
            deposits: DepositLifecycle::new(store.clone(), config.clone()),
            balances: BalanceLedger::new(store.clone()),
            commissions: CommissionLedger::new(store.clone(), config),
            gateway: AdjudicationGateway::new(store.clone()),
            store,
        }
    }

    fn admin() -> AuthContext {
        AuthContext::admin(UserId::new(1))
    }

    fn member(id: u64) -> AuthContext {
        AuthContext::member(UserId::new(id))
    }

    fn domain(err: LedgerError) -> DomainError {
        match err {
            LedgerError::Domain(e) => e,
            LedgerError::Storage(e) => panic!("unexpected storage error: {e}"),
        }
    }

    fn journal_sum(h: &Harness, owner: UserId) -> Amount {
        h.balances
            .journal(owner)
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .sum()
    }

    /// requestDeposit(user=42, TRC20, 10): pending row, T-address, UID memo.
    #[test]
    fn request_deposit_creates_pending_with_address_and_memo() {
        let h = harness();
        let ticket = h
            .deposits
            .request_deposit(&member(42), Network::Trc20, units(10))
            .unwrap();

        assert!(ticket.address.starts_with('T'));
        assert_eq!(ticket.memo, "UID42");
        assert_eq!(ticket.expiry_hint_secs, 3600);

        let page = h
            .deposits
            .list_deposits(&member(42), DepositFilter::default())
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].status, DepositStatus::Pending);
        assert_eq!(page.items[0].owner, UserId::new(42));
    }

    #[test]
    fn request_deposit_below_minimum_is_rejected() {
        let h = harness();
        let err = h
            .deposits
            .request_deposit(&member(42), Network::Erc20, units(9))
            .unwrap_err();
        assert!(matches!(
            domain(err),
            DomainError::Validation { field: "amount", .. }
        ));
    }

    #[test]
    fn evidence_moves_deposit_to_checking_once() {
        let h = harness();
        let ctx = member(42);
        let ticket = h
            .deposits
            .request_deposit(&ctx, Network::Trc20, units(10))
            .unwrap();

        h.deposits
            .submit_evidence(&ctx, ticket.deposit_id, "0xabc")
            .unwrap();
        let page = h.deposits.list_deposits(&ctx, DepositFilter::default()).unwrap();
        assert_eq!(page.items[0].status, DepositStatus::Checking);
        assert_eq!(page.items[0].evidence.as_deref(), Some("0xabc"));

        // Second submission: deposit is no longer pending.
        let err = h
            .deposits
            .submit_evidence(&ctx, ticket.deposit_id, "0xdef")
            .unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound);
    }

    #[test]
    fn evidence_on_foreign_or_unknown_deposit_reads_as_not_found() {
        let h = harness();
        let ticket = h
            .deposits
            .request_deposit(&member(42), Network::Trc20, units(10))
            .unwrap();

        let err = h
            .deposits
            .submit_evidence(&member(43), ticket.deposit_id, "0xabc")
            .unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound);

        let err = h
            .deposits
            .submit_evidence(&member(42), DepositId::new(), "0xabc")
            .unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound);
    }

    /// Approval credits the owner exactly once, journaled against the deposit.
    #[test]
    fn approval_credits_balance_and_journals_once() {
        let h = harness();
        let ctx = member(42);
        let ticket = h
            .deposits
            .request_deposit(&ctx, Network::Trc20, units(10))
            .unwrap();
        h.deposits
            .submit_evidence(&ctx, ticket.deposit_id, "0xabc")
            .unwrap();

        let outcome = h
            .gateway
            .adjudicate(&admin(), ticket.deposit_id, AdjudicationAction::Approve, None)
            .unwrap();
        assert_eq!(outcome.new_status, DepositStatus::Approved);
        assert_eq!(outcome.amount_credited, Some(units(10)));

        let account = h.balances.get_balance(UserId::new(42)).unwrap();
        assert_eq!(account.balance, units(10));
        assert_eq!(account.total_credited, units(10));

        let journal = h.balances.journal(UserId::new(42)).unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].kind, EntryKind::Deposit);
        assert_eq!(journal[0].reference, EntryRef::from(ticket.deposit_id));
        assert_eq!(journal[0].amount, units(10));
    }

    /// A second approval of the same deposit conflicts and changes nothing.
    #[test]
    fn second_adjudication_conflicts_without_double_credit() {
        let h = harness();
        let ctx = member(42);
        let ticket = h
            .deposits
            .request_deposit(&ctx, Network::Trc20, units(10))
            .unwrap();
        h.gateway
            .adjudicate(&admin(), ticket.deposit_id, AdjudicationAction::Approve, None)
            .unwrap();

        let err = h
            .gateway
            .adjudicate(&admin(), ticket.deposit_id, AdjudicationAction::Approve, None)
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));

        assert_eq!(h.balances.get_balance(UserId::new(42)).unwrap().balance, units(10));
        assert_eq!(h.balances.journal(UserId::new(42)).unwrap().len(), 1);
    }

    /// N racing approvals: exactly one commits, one journal entry exists.
    #[test]
    fn concurrent_approvals_credit_at_most_once() {
        let h = harness();
        let ctx = member(42);
        let ticket = h
            .deposits
            .request_deposit(&ctx, Network::Trc20, units(10))
            .unwrap();
        h.deposits
            .submit_evidence(&ctx, ticket.deposit_id, "0xabc")
            .unwrap();

        let gateway = Arc::new(AdjudicationGateway::new(h.store.clone()));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let gateway = gateway.clone();
            let deposit_id = ticket.deposit_id;
            handles.push(std::thread::spawn(move || {
                gateway.adjudicate(&admin(), deposit_id, AdjudicationAction::Approve, None)
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(outcome) => {
                    successes += 1;
                    assert_eq!(outcome.amount_credited, Some(units(10)));
                }
                Err(e) => assert!(matches!(domain(e), DomainError::Conflict(_))),
            }
        }
        assert_eq!(successes, 1);

        assert_eq!(h.balances.get_balance(UserId::new(42)).unwrap().balance, units(10));
        assert_eq!(h.balances.journal(UserId::new(42)).unwrap().len(), 1);
    }

    #[test]
    fn rejection_has_no_balance_effect_and_is_terminal() {
        let h = harness();
        let ctx = member(42);
        let ticket = h
            .deposits
            .request_deposit(&ctx, Network::Bep20, units(25))
            .unwrap();

        let outcome = h
            .gateway
            .adjudicate(
                &admin(),
                ticket.deposit_id,
                AdjudicationAction::Reject,
                Some("hash not found on chain".to_string()),
            )
            .unwrap();
        assert_eq!(outcome.new_status, DepositStatus::Rejected);
        assert_eq!(outcome.amount_credited, None);

        assert_eq!(h.balances.get_balance(UserId::new(42)).unwrap().balance, Amount::ZERO);
        assert!(h.balances.journal(UserId::new(42)).unwrap().is_empty());

        // Terminal: evidence and re-adjudication both bounce.
        let err = h
            .deposits
            .submit_evidence(&ctx, ticket.deposit_id, "0xabc")
            .unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound);
        let err = h
            .gateway
            .adjudicate(&admin(), ticket.deposit_id, AdjudicationAction::Approve, None)
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
    }

    #[test]
    fn adjudication_requires_admin_role() {
        let h = harness();
        let ticket = h
            .deposits
            .request_deposit(&member(42), Network::Trc20, units(10))
            .unwrap();
        let err = h
            .gateway
            .adjudicate(&member(42), ticket.deposit_id, AdjudicationAction::Approve, None)
            .unwrap_err();
        assert_eq!(domain(err), DomainError::Unauthorized);
    }

    /// If the credit step conflicts, the whole adjudication rolls back and
    /// the deposit keeps its pre-adjudication state.
    #[test]
    fn failed_credit_rolls_back_status_transition() {
        let h = harness();
        let ctx = member(42);
        let ticket = h
            .deposits
            .request_deposit(&ctx, Network::Trc20, units(10))
            .unwrap();
        h.deposits
            .submit_evidence(&ctx, ticket.deposit_id, "0xabc")
            .unwrap();

        // Occupy the (deposit, reference) idempotency slot out of band.
        h.balances
            .credit(
                UserId::new(42),
                units(10),
                EntryKind::Deposit,
                EntryRef::from(ticket.deposit_id),
            )
            .unwrap();

        let err = h
            .gateway
            .adjudicate(&admin(), ticket.deposit_id, AdjudicationAction::Approve, None)
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));

        // Status transition was rolled back with the failed credit.
        let page = h.deposits.list_deposits(&ctx, DepositFilter::default()).unwrap();
        assert_eq!(page.items[0].status, DepositStatus::Checking);
        assert_eq!(h.balances.get_balance(UserId::new(42)).unwrap().balance, units(10));
    }

    #[test]
    fn duplicate_credit_reference_is_rejected() {
        let h = harness();
        let owner = UserId::new(9);
        let reference = EntryRef::new();

        h.balances
            .credit(owner, units(10), EntryKind::Deposit, reference)
            .unwrap();
        let err = h
            .balances
            .credit(owner, units(10), EntryKind::Deposit, reference)
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Conflict(_)));
        assert_eq!(h.balances.get_balance(owner).unwrap().balance, units(10));
    }

    /// debit(owner=9, 20) at balance 20: balance 0, one -20 entry appended.
    #[test]
    fn debit_full_balance_appends_negative_entry() {
        let h = harness();
        let owner = UserId::new(9);
        h.balances
            .credit(owner, units(20), EntryKind::Deposit, EntryRef::new())
            .unwrap();

        let campaign_ref = EntryRef::new();
        let (entry, account) = h
            .balances
            .debit(owner, units(20), EntryKind::CampaignDebit, campaign_ref)
            .unwrap();
        assert_eq!(account.balance, Amount::ZERO);
        assert_eq!(entry.amount, -units(20));
        assert_eq!(entry.kind, EntryKind::CampaignDebit);

        // total_credited is monotonic; debits do not touch it.
        assert_eq!(account.total_credited, units(20));
        assert_eq!(journal_sum(&h, owner), Amount::ZERO);
    }

    #[test]
    fn overdraft_fails_with_shortfall_and_no_change() {
        let h = harness();
        let owner = UserId::new(9);
        h.balances
            .credit(owner, units(5), EntryKind::Deposit, EntryRef::new())
            .unwrap();

        let err = h
            .balances
            .debit(owner, units(20), EntryKind::CampaignDebit, EntryRef::new())
            .unwrap_err();
        assert_eq!(
            domain(err),
            DomainError::insufficient_funds(units(20), units(5))
        );
        assert_eq!(h.balances.get_balance(owner).unwrap().balance, units(5));
        assert_eq!(h.balances.journal(owner).unwrap().len(), 1);
    }

    /// convert(owner=7, 5) when available == 3: insufficient, nothing moves.
    #[test]
    fn conversion_exceeding_available_changes_nothing() {
        let h = harness();
        let owner = UserId::new(7);
        h.commissions.accrue(owner, units(3)).unwrap();

        // Admin context so the role threshold (0) is not what fails here.
        let ctx = AuthContext::admin(owner);
        let err = h.commissions.convert(&ctx, units(5)).unwrap_err();
        assert_eq!(domain(err), DomainError::insufficient_funds(units(5), units(3)));

        let summary = h.commissions.summary(owner).unwrap();
        assert_eq!(summary.available, units(3));
        assert_eq!(summary.converted, Amount::ZERO);
        assert_eq!(h.balances.get_balance(owner).unwrap().balance, Amount::ZERO);
    }

    #[test]
    fn conversion_below_role_minimum_is_rejected() {
        let h = harness();
        let owner = UserId::new(7);
        h.commissions.accrue(owner, units(8)).unwrap();

        let err = h.commissions.convert(&member(7), units(5)).unwrap_err();
        assert!(matches!(
            domain(err),
            DomainError::Validation { field: "amount", .. }
        ));

        // Admins have threshold zero, so the same request goes through.
        let receipt = h
            .commissions
            .convert(&AuthContext::admin(owner), units(5))
            .unwrap();
        assert_eq!(receipt.amount, units(5));
        assert_eq!(h.balances.get_balance(owner).unwrap().balance, units(5));
    }

    #[test]
    fn conversion_marks_rows_fifo_and_credits_amount() {
        let h = harness();
        let owner = UserId::new(7);
        let first = h.commissions.accrue(owner, units(2)).unwrap();
        let second = h.commissions.accrue(owner, units(5)).unwrap();

        let ctx = AuthContext::admin(owner);
        let receipt = h.commissions.convert(&ctx, units(2)).unwrap();
        assert_eq!(receipt.new_available, units(5));
        assert_eq!(receipt.new_converted, units(2));

        let rows = h
            .store
            .read(|tx| Ok(tx.commissions_for(owner)?))
            .unwrap();
        let first_row = rows.iter().find(|c| c.id == first).unwrap();
        let second_row = rows.iter().find(|c| c.id == second).unwrap();
        assert!(first_row.converted);
        assert!(first_row.converted_at.is_some());
        assert!(!second_row.converted);

        let journal = h.balances.journal(owner).unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].kind, EntryKind::CommissionConvert);
        assert_eq!(journal[0].reference, EntryRef::from(receipt.batch_id));
    }

    /// The legacy implementation marked `floor(amount / 0.5)` rows converted
    /// regardless of their amounts; convert() instead marks only the rows
    /// needed to cover the amount. Four one-unit rows, convert 2: two rows,
    /// not four.
    #[test]
    fn conversion_covers_amount_not_a_row_count() {
        let h = harness();
        let owner = UserId::new(7);
        for _ in 0..4 {
            h.commissions.accrue(owner, units(1)).unwrap();
        }

        let receipt = h
            .commissions
            .convert(&AuthContext::admin(owner), units(2))
            .unwrap();
        assert_eq!(receipt.new_available, units(2));
        assert_eq!(receipt.new_converted, units(2));

        let rows = h.store.read(|tx| Ok(tx.commissions_for(owner)?)).unwrap();
        assert_eq!(rows.iter().filter(|c| c.converted).count(), 2);
    }

    /// Rows are not split, so the last marked row may over-cover; the credit
    /// is still exactly the requested amount.
    #[test]
    fn conversion_over_covers_at_row_granularity() {
        let h = harness();
        let owner = UserId::new(7);
        h.commissions.accrue(owner, units(3)).unwrap();
        h.commissions.accrue(owner, units(5)).unwrap();

        let receipt = h
            .commissions
            .convert(&AuthContext::admin(owner), units(4))
            .unwrap();
        assert_eq!(receipt.amount, units(4));
        // Both rows marked: 3 alone does not cover 4.
        assert_eq!(receipt.new_converted, units(8));
        assert_eq!(receipt.new_available, Amount::ZERO);
        assert_eq!(h.balances.get_balance(owner).unwrap().balance, units(4));
    }

    #[test]
    fn listing_filters_and_paginates() {
        let h = harness();
        for id in [42u64, 42, 43] {
            h.deposits
                .request_deposit(&member(id), Network::Trc20, units(10))
                .unwrap();
        }
        let ticket = h
            .deposits
            .request_deposit(&member(42), Network::Erc20, units(15))
            .unwrap();
        h.deposits
            .submit_evidence(&member(42), ticket.deposit_id, "0xfeed")
            .unwrap();

        // Members only see their own rows.
        let page = h
            .deposits
            .list_deposits(&member(43), DepositFilter::default())
            .unwrap();
        assert_eq!(page.total, 1);

        // Admins see everything; status filter applies.
        let page = h
            .deposits
            .list_deposits(
                &admin(),
                DepositFilter {
                    status: Some(DepositStatus::Checking),
                    ..DepositFilter::default()
                },
            )
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, ticket.deposit_id);

        // Search hits the stored evidence reference.
        let page = h
            .deposits
            .list_deposits(
                &admin(),
                DepositFilter {
                    search: Some("0xFEED".to_string()),
                    ..DepositFilter::default()
                },
            )
            .unwrap();
        assert_eq!(page.total, 1);

        // Pagination: 4 rows, limit 3 -> two pages.
        let page = h
            .deposits
            .list_deposits(
                &admin(),
                DepositFilter {
                    page: 2,
                    limit: 3,
                    ..DepositFilter::default()
                },
            )
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 1);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Credit(u64),
        Debit(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..500).prop_map(Op::Credit),
            (1u64..500).prop_map(Op::Debit),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: under any sequence of credits and debits the balance
        /// equals the signed journal sum and never goes negative; rejected
        /// debits leave no trace.
        #[test]
        fn balance_always_equals_journal_sum(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let h = harness();
            let owner = UserId::new(5);

            for op in ops {
                match op {
                    Op::Credit(n) => {
                        h.balances
                            .credit(owner, units(n), EntryKind::Deposit, EntryRef::new())
                            .unwrap();
                    }
                    Op::Debit(n) => {
                        let before = h.balances.get_balance(owner).unwrap();
                        let result = h.balances.debit(
                            owner,
                            units(n),
                            EntryKind::CampaignDebit,
                            EntryRef::new(),
                        );
                        if before.balance < units(n) {
                            prop_assert!(result.is_err());
                            let after = h.balances.get_balance(owner).unwrap();
                            prop_assert_eq!(after, before);
                        } else {
                            prop_assert!(result.is_ok());
                        }
                    }
                }

                let account = h.balances.get_balance(owner).unwrap();
                prop_assert!(account.balance >= Amount::ZERO);
                prop_assert_eq!(account.balance, journal_sum(&h, owner));
            }
        }
    }
}

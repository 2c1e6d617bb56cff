use alloy_primitives::{Address, U256};
use share_vault::{
    events::{Deposit, EmergencyWithdraw, OwnershipTransferred, VaultEvent, Withdraw},
    pricing::{VIRTUAL_ASSETS, VIRTUAL_SHARES},
    test_utils::{
        deploy_token, deploy_vault, fund, initialize_logger, tokens, vault_setup, VaultSetup,
        ALICE, BOB, CAROL, DAVE, DEPLOYER, USER_FUNDING,
    },
    Quantity, VaultError,
};

#[test]
fn test_vault_deployment() {
    let VaultSetup {
        token,
        vault,
        deployer,
    } = vault_setup(&[]);

    assert_eq!(token.address(), deployer.create(0));
    assert_eq!(vault.address(), deployer.create(1));
    assert_eq!(vault.asset(), token.address());
    assert_eq!(vault.owner(), deployer);
    assert_eq!(vault.total_shares(), U256::ZERO);
    assert_eq!(vault.total_assets(), U256::ZERO);
}

#[test]
fn test_vault_first_deposit() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);
    let amount = tokens(100);

    let alice_before = token.balance_of(ALICE);
    let vault_before = token.balance_of(vault.address());

    let shares = vault
        .deposit(&mut token, ALICE, amount)
        .expect("Deposit failed");

    assert_eq!(token.balance_of(ALICE), alice_before - amount);
    assert_eq!(token.balance_of(vault.address()), vault_before + amount);

    let expected = amount * VIRTUAL_SHARES / VIRTUAL_ASSETS;
    assert_eq!(shares, expected);
    assert_eq!(vault.shares_of(ALICE), expected);
    assert_eq!(vault.total_shares(), expected);
    assert_eq!(vault.total_assets(), amount);

    assert_eq!(
        vault.last_event(),
        Some(&VaultEvent::Deposit(Deposit {
            depositor: ALICE,
            amount,
            shares: expected,
        }))
    );
}

#[test]
fn test_vault_subsequent_deposit_multi_user() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE, BOB]);

    vault.deposit(&mut token, ALICE, tokens(100)).unwrap();
    let shares_after_first = vault.total_shares();
    let assets_after_first = vault.total_assets();

    let amount = tokens(50);
    vault.deposit(&mut token, BOB, amount).unwrap();

    let expected = amount * (shares_after_first + VIRTUAL_SHARES)
        / (assets_after_first + VIRTUAL_ASSETS);
    assert_eq!(vault.shares_of(BOB), expected);
    assert_eq!(vault.total_shares(), shares_after_first + expected);
    assert_eq!(vault.total_assets(), assets_after_first + amount);
}

#[test]
fn test_vault_deposit_zero_amount() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);

    let err = vault
        .deposit(&mut token, ALICE, U256::ZERO)
        .expect_err("Zero deposit succeeded");
    assert_eq!(err, VaultError::InvalidAmount(Quantity::Amount));
    assert!(err.matches_revert_reason("Amount must be greater than 0"));
}

#[test]
fn test_vault_deposit_without_approval() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[]);
    let amount = tokens(100);
    fund(&mut token, ALICE, amount);

    let err = vault
        .deposit(&mut token, ALICE, amount)
        .expect_err("Deposit without approval succeeded");

    assert!(err.matches_revert_reason("Insufficient allowance"));
    assert_eq!(token.balance_of(ALICE), amount);
    assert_eq!(vault.total_assets(), U256::ZERO);
    assert_eq!(vault.total_shares(), U256::ZERO);
    assert!(vault.events().is_empty());
}

#[test]
fn test_vault_deposit_wrong_asset() {
    initialize_logger();
    let mut token = deploy_token();
    let mut vault = deploy_vault(&token);
    let mut other = share_vault::Erc20::new(
        DEPLOYER.create(7),
        "Other",
        "OTH",
        18,
        tokens(1),
        DEPLOYER,
    );

    let err = vault
        .deposit(&mut other, DEPLOYER, tokens(1))
        .expect_err("Deposit of a foreign token succeeded");
    assert_eq!(
        err,
        VaultError::AssetMismatch {
            expected: token.address(),
            found: other.address(),
        }
    );

    // The real asset still works.
    token.approve(DEPLOYER, vault.address(), tokens(1)).unwrap();
    vault.deposit(&mut token, DEPLOYER, tokens(1)).unwrap();
}

#[test]
fn test_vault_withdraw() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);
    vault.deposit(&mut token, ALICE, tokens(100)).unwrap();

    let shares = vault.shares_of(ALICE);
    let alice_before = token.balance_of(ALICE);
    let vault_before = token.balance_of(vault.address());

    let burn = shares / U256::from(2);
    let expected_assets = vault.preview_withdraw(ALICE, burn).unwrap();
    let assets = vault
        .withdraw(&mut token, ALICE, burn)
        .expect("Withdraw failed");

    assert_eq!(assets, expected_assets);
    assert_eq!(vault.shares_of(ALICE), shares - burn);
    assert_eq!(token.balance_of(ALICE), alice_before + assets);
    assert_eq!(token.balance_of(vault.address()), vault_before - assets);
    assert!(token.balance_of(ALICE) > alice_before);

    assert_eq!(
        vault.last_event(),
        Some(&VaultEvent::Withdraw(Withdraw {
            withdrawer: ALICE,
            shares: burn,
            assets,
        }))
    );
}

#[test]
fn test_vault_withdraw_all() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);
    vault.deposit(&mut token, ALICE, tokens(100)).unwrap();
    assert!(vault.shares_of(ALICE) > U256::ZERO);

    let alice_before = token.balance_of(ALICE);
    vault
        .withdraw_all(&mut token, ALICE)
        .expect("WithdrawAll failed");

    assert_eq!(vault.shares_of(ALICE), U256::ZERO);
    assert_eq!(vault.total_shares(), U256::ZERO);
    assert_eq!(vault.total_assets(), U256::ZERO);
    assert!(token.balance_of(ALICE) > alice_before);
    assert_eq!(token.balance_of(ALICE), tokens(USER_FUNDING));
}

#[test]
fn test_vault_withdraw_insufficient_shares() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);

    let err = vault
        .withdraw(&mut token, ALICE, U256::from(1))
        .expect_err("Withdraw without shares succeeded");
    assert!(err.matches_revert_reason("Insufficient shares"));

    vault.deposit(&mut token, ALICE, tokens(1)).unwrap();
    let ledger_before = vault.ledger().clone();
    let balance_before = token.balance_of(ALICE);
    let shares = vault.shares_of(ALICE);

    let err = vault
        .withdraw(&mut token, ALICE, shares + U256::from(1))
        .expect_err("Withdraw above balance succeeded");
    assert_eq!(
        err,
        VaultError::InsufficientShares {
            available: shares,
            requested: shares + U256::from(1),
        }
    );
    assert_eq!(vault.ledger(), &ledger_before);
    assert_eq!(token.balance_of(ALICE), balance_before);
}

#[test]
fn test_vault_withdraw_zero_shares() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);

    let err = vault
        .withdraw(&mut token, ALICE, U256::ZERO)
        .expect_err("Zero withdraw succeeded");
    assert!(err.matches_revert_reason("Shares must be greater than 0"));
}

#[test]
fn test_vault_convert_to_shares() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);

    let amount = tokens(100);
    assert_eq!(
        vault.convert_to_shares(amount).unwrap(),
        amount * VIRTUAL_SHARES / VIRTUAL_ASSETS
    );

    vault.deposit(&mut token, ALICE, tokens(100)).unwrap();

    let assets = tokens(50);
    let expected = assets * (vault.total_shares() + VIRTUAL_SHARES)
        / (vault.total_assets() + VIRTUAL_ASSETS);
    assert_eq!(vault.convert_to_shares(assets).unwrap(), expected);
    assert_eq!(
        expected,
        assets * (U256::from(10u64).pow(U256::from(29)) + VIRTUAL_SHARES)
            / (tokens(100) + U256::from(1))
    );
}

#[test]
fn test_vault_convert_to_assets() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);

    let shares = tokens(100);
    assert_eq!(
        vault.convert_to_assets(shares).unwrap(),
        shares * VIRTUAL_ASSETS / VIRTUAL_SHARES
    );

    vault.deposit(&mut token, ALICE, tokens(100)).unwrap();

    let shares = vault.shares_of(ALICE);
    let expected = shares * (vault.total_assets() + VIRTUAL_ASSETS)
        / (vault.total_shares() + VIRTUAL_SHARES);
    assert_eq!(vault.convert_to_assets(shares).unwrap(), expected);
}

#[test]
fn test_vault_ownership_transfer() {
    let VaultSetup {
        mut vault,
        deployer,
        ..
    } = vault_setup(&[]);

    vault
        .transfer_ownership(deployer, ALICE)
        .expect("Ownership transfer failed");

    assert_eq!(vault.owner(), ALICE);
    assert_eq!(
        vault.last_event(),
        Some(&VaultEvent::OwnershipTransferred(OwnershipTransferred {
            previous_owner: deployer,
            new_owner: ALICE,
        }))
    );

    // The previous owner has lost its rights.
    let err = vault
        .transfer_ownership(deployer, BOB)
        .expect_err("Former owner kept its rights");
    assert!(err.matches_revert_reason("Only owner"));
}

#[test]
fn test_vault_ownership_transfer_only_owner() {
    let VaultSetup { mut vault, .. } = vault_setup(&[]);

    let err = vault
        .transfer_ownership(ALICE, BOB)
        .expect_err("Non-owner transferred ownership");
    assert_eq!(err, VaultError::Unauthorized { caller: ALICE });
    assert!(err.matches_revert_reason("Only owner"));
}

#[test]
fn test_vault_ownership_transfer_to_zero_address() {
    let VaultSetup {
        mut vault,
        deployer,
        ..
    } = vault_setup(&[]);

    let err = vault
        .transfer_ownership(deployer, Address::ZERO)
        .expect_err("Ownership transferred to zero address");
    assert_eq!(err, VaultError::ZeroAddress);
    assert_eq!(vault.owner(), deployer);
}

#[test]
fn test_vault_emergency_withdraw_updates_state() {
    let VaultSetup {
        mut token,
        mut vault,
        deployer,
    } = vault_setup(&[ALICE]);
    vault.deposit(&mut token, ALICE, tokens(100)).unwrap();

    let total_assets_before = vault.total_assets();
    let total_shares_before = vault.total_shares();
    let vault_balance = token.balance_of(vault.address());
    let owner_balance = token.balance_of(deployer);
    let alice_value_before = vault.convert_to_assets(vault.shares_of(ALICE)).unwrap();

    let amount = tokens(50);
    vault
        .emergency_withdraw(&mut token, deployer, amount)
        .expect("Emergency withdraw failed");

    assert_eq!(token.balance_of(vault.address()), vault_balance - amount);
    assert_eq!(token.balance_of(deployer), owner_balance + amount);
    assert_eq!(vault.total_assets(), total_assets_before - amount);
    // Shares are untouched, so each one is now worth less.
    assert_eq!(vault.total_shares(), total_shares_before);
    assert!(vault.convert_to_assets(vault.shares_of(ALICE)).unwrap() < alice_value_before);

    assert_eq!(
        vault.last_event(),
        Some(&VaultEvent::EmergencyWithdraw(EmergencyWithdraw { amount }))
    );
}

#[test]
fn test_vault_emergency_withdraw_only_owner() {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[ALICE]);
    vault.deposit(&mut token, ALICE, tokens(10)).unwrap();

    let err = vault
        .emergency_withdraw(&mut token, ALICE, U256::from(1))
        .expect_err("Non-owner emergency withdraw succeeded");
    assert!(err.matches_revert_reason("Only owner"));
    assert_eq!(vault.total_assets(), tokens(10));
}

#[test]
fn test_vault_emergency_withdraw_above_assets() {
    let VaultSetup {
        mut token,
        mut vault,
        deployer,
    } = vault_setup(&[ALICE]);
    vault.deposit(&mut token, ALICE, tokens(10)).unwrap();

    let err = vault
        .emergency_withdraw(&mut token, deployer, tokens(11))
        .expect_err("Emergency withdraw above assets succeeded");
    assert!(matches!(err, VaultError::InsufficientAssets { .. }));
    assert_eq!(token.balance_of(vault.address()), tokens(10));
}

#[test]
fn test_vault_logs_carry_vault_address() {
    let VaultSetup {
        mut token,
        mut vault,
        deployer,
    } = vault_setup(&[ALICE]);
    vault.deposit(&mut token, ALICE, tokens(10)).unwrap();
    vault.withdraw_all(&mut token, ALICE).unwrap();
    vault.transfer_ownership(deployer, BOB).unwrap();

    let logs = vault.logs();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|log| log.address == vault.address()));
}

#[test]
fn test_vault_full_workflow_multi_user() -> eyre::Result<()> {
    let VaultSetup {
        mut token,
        mut vault,
        ..
    } = vault_setup(&[CAROL, DAVE]);

    vault.deposit(&mut token, CAROL, tokens(1000))?;
    let carol_shares = vault.shares_of(CAROL);
    assert!(carol_shares > U256::ZERO);

    vault.deposit(&mut token, DAVE, tokens(500))?;
    let dave_shares = vault.shares_of(DAVE);
    assert!(dave_shares > U256::ZERO);
    assert_ne!(carol_shares, dave_shares);

    vault.withdraw(&mut token, CAROL, carol_shares / U256::from(2))?;
    assert!(vault.shares_of(CAROL) > U256::ZERO);

    vault.withdraw_all(&mut token, DAVE)?;
    assert_eq!(vault.shares_of(DAVE), U256::ZERO);

    assert!(vault.total_assets() > U256::ZERO);
    assert!(vault.total_shares() > U256::ZERO);
    assert_eq!(vault.total_shares(), vault.shares_of(CAROL));
    // Accounting never promises more than the vault holds.
    assert!(vault.total_assets() <= token.balance_of(vault.address()));

    Ok(())
}

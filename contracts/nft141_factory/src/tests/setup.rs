use soroban_sdk::{
    testutils::{Address as _, IssuerFlags},
    token, Address, Bytes, Env, String,
};

use crate::{
    contract::{Nft141Factory, Nft141FactoryClient},
    storage_types::{DeploymentStatus, FeeSchedule},
};

pub const ACCOUNT_SUFFIX: &str = "nft141factory";
pub const PENDING_TIMEOUT_LEDGERS: u32 = 100;

/// Smallest child: env meta plus an `init(owner)` export returning void.
pub const CHILD_WASM: &[u8] = &[
    0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, // magic, version
    0x00, 0x1e, 0x11, b'c', b'o', b'n', b't', b'r', b'a', b'c', b't', b'e', b'n', b'v', b'm', b'e',
    b't', b'a', b'v', b'0', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
    0x00, // contractenvmetav0, protocol 20
    0x01, 0x06, 0x01, 0x60, 0x01, 0x7e, 0x01, 0x7e, // (i64) -> i64
    0x03, 0x02, 0x01, 0x00, // func
    0x07, 0x08, 0x01, 0x04, b'i', b'n', b'i', b't', 0x00, 0x00, // export "init"
    0x0a, 0x06, 0x01, 0x04, 0x00, 0x42, 0x02, 0x0b, // i64.const 2 (void)
];

/// Deployable child without an `init` export.
pub const BROKEN_CHILD_WASM: &[u8] = &[
    0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, // magic, version
    0x00, 0x1e, 0x11, b'c', b'o', b'n', b't', b'r', b'a', b'c', b't', b'e', b'n', b'v', b'm', b'e',
    b't', b'a', b'v', b'0', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
    0x00, // contractenvmetav0, protocol 20
];

pub fn child_wasm(env: &Env) -> Bytes {
    Bytes::from_slice(env, CHILD_WASM)
}

pub fn broken_child_wasm(env: &Env) -> Bytes {
    Bytes::from_slice(env, BROKEN_CHILD_WASM)
}

/// `CHILD_WASM` padded with a custom section up to exactly `size` bytes.
pub fn child_wasm_with_size(env: &Env, size: u32) -> Bytes {
    let mut wasm = child_wasm(env);
    // section id and a two byte length prefix
    let payload = size - wasm.len() - 3;
    assert!((128..16384).contains(&payload));

    wasm.extend_from_array(&[
        0x00,
        (payload & 0x7f) as u8 | 0x80,
        (payload >> 7) as u8,
        0x03,
        b'p',
        b'a',
        b'd',
    ]);
    for _ in 0..payload - 4 {
        wasm.push_back(0);
    }

    assert_eq!(wasm.len(), size);
    wasm
}

/// fee = 1, min deposit = 10, no per byte cost
pub fn example_fee_schedule() -> FeeSchedule {
    FeeSchedule {
        deployment_fee: 1,
        min_storage_deposit: 10,
        storage_byte_cost: 0,
    }
}

pub fn deploy_token_contract<'a>(
    env: &Env,
    admin: &Address,
) -> (token::Client<'a>, token::StellarAssetClient<'a>) {
    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    // balances can be deauthorized to make transfers fail
    sac.issuer().set_flag(IssuerFlags::RevocableFlag);

    (
        token::Client::new(env, &sac.address()),
        token::StellarAssetClient::new(env, &sac.address()),
    )
}

pub fn deploy_factory_contract<'a>(
    env: &Env,
    owner: impl Into<Option<Address>>,
    payment_token: &Address,
    fee_schedule: FeeSchedule,
    factory_reserve: i128,
) -> Nft141FactoryClient<'a> {
    let owner = owner.into().unwrap_or(Address::generate(env));
    let factory = Nft141FactoryClient::new(env, &env.register(Nft141Factory, ()));

    factory.initialize(
        &owner,
        payment_token,
        &String::from_str(env, ACCOUNT_SUFFIX),
        &fee_schedule,
        &factory_reserve,
        &PENDING_TIMEOUT_LEDGERS,
    );

    factory
}

pub struct FactoryTest<'a> {
    pub env: Env,
    pub owner: Address,
    pub factory: Nft141FactoryClient<'a>,
    pub token: token::Client<'a>,
    pub token_admin: token::StellarAssetClient<'a>,
}

impl<'a> FactoryTest<'a> {
    /// Initialized factory with the example fee schedule and a 500 byte child
    /// registered as version 1.
    pub fn setup() -> Self {
        Self::setup_with_reserve(0)
    }

    pub fn setup_with_reserve(factory_reserve: i128) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.cost_estimate().budget().reset_unlimited();

        let owner = Address::generate(&env);
        let (token, token_admin) = deploy_token_contract(&env, &owner);
        let factory = deploy_factory_contract(
            &env,
            owner.clone(),
            &token.address,
            example_fee_schedule(),
            factory_reserve,
        );
        factory.register_code(&owner, &child_wasm_with_size(&env, 500), &1);

        FactoryTest {
            env,
            owner,
            factory,
            token,
            token_admin,
        }
    }

    pub fn label(&self, label: &str) -> String {
        String::from_str(&self.env, label)
    }

    /// Distinct valid label per `index`: `ch` followed by two letters.
    pub fn indexed_label(&self, index: u32) -> String {
        let label = [
            b'c',
            b'h',
            b'a' + (index / 26) as u8,
            b'a' + (index % 26) as u8,
        ];
        String::from_bytes(&self.env, &label)
    }

    pub fn child_id(&self, label: &str) -> String {
        let mut id = [0u8; 64];
        let len = label.len() + 1 + ACCOUNT_SUFFIX.len();
        id[..label.len()].copy_from_slice(label.as_bytes());
        id[label.len()] = b'.';
        id[label.len() + 1..len].copy_from_slice(ACCOUNT_SUFFIX.as_bytes());

        String::from_bytes(&self.env, &id[..len])
    }

    /// New account holding `amount` of the payment token.
    pub fn funded_user(&self, amount: i128) -> Address {
        let user = Address::generate(&self.env);
        if amount > 0 {
            self.token_admin.mint(&user, &amount);
        }
        user
    }

    /// Drives a ticket through the whole chain and returns where it ended.
    pub fn advance_all(&self, ticket: u64) -> DeploymentStatus {
        let mut status = self.factory.advance(&ticket);
        for _ in 0..3 {
            if status != DeploymentStatus::Pending {
                break;
            }
            status = self.factory.advance(&ticket);
        }
        status
    }
}

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Layout version of the persisted state.
pub const STORAGE_VERSION: u32 = 1;

/// Records read by one listing call, kept under the per-transaction read limit.
pub const MAX_PAGE_SIZE: u32 = 15;

/// Pending records examined by one sweep. Every failed record also touches the
/// token balances and both indexes.
pub const MAX_SWEEP_BATCH: u32 = 5;

/// Entry point every child template must export. Receives the child owner.
pub const CHILD_INIT_FN: &str = "init";

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Initialized,
    Config,
    StorageVersion,
    Code(u32),
    CodeEnabled(u32),
    Deployment(String),
    IndexLen(IndexKind),
    IndexAt(IndexKind, u32),
    IndexSlot(IndexKind, String),
    Ticket(u64),
    TicketCounter,
    Reserved,
    StrandedFunds,
    OwnershipLog,
}

/// Slot indexes over child ids. Each slot is its own entry; removal moves the
/// last id into the freed slot.
#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum IndexKind {
    /// Every live (`Pending` or `Active`) record
    Deployments = 0,
    /// Records whose chain has not resolved yet
    Pending = 1,
}

// ################################################################
//                             Config
// ################################################################

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Flat fee kept by the factory for every deployment
    pub deployment_fee: i128,
    /// Lower bound of the balance forwarded to a new child
    pub min_storage_deposit: i128,
    /// Additional deposit per byte of child code
    pub storage_byte_cost: i128,
}

impl FeeSchedule {
    pub fn is_valid(&self) -> bool {
        self.deployment_fee >= 0 && self.min_storage_deposit >= 0 && self.storage_byte_cost >= 0
    }

    pub fn storage_deposit(&self, code_size: u32) -> Option<i128> {
        self.storage_byte_cost
            .checked_mul(code_size as i128)?
            .checked_add(self.min_storage_deposit)
    }

    /// Minimum payment accepted for a child built from `code_size` bytes.
    pub fn total_due(&self, code_size: u32) -> Option<i128> {
        self.storage_deposit(code_size)?
            .checked_add(self.deployment_fee)
    }
}

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub owner: Address,
    /// Token deployments are paid in and children are funded with
    pub payment_token: Address,
    /// Appended to every label to form the child account id
    pub account_suffix: String,
    pub fee_schedule: FeeSchedule,
    /// Balance the factory keeps for itself, never reserved nor withdrawn
    pub factory_reserve: i128,
    /// Ledgers after which a pending deployment may be swept
    pub pending_timeout_ledgers: u32,
    /// Zero until the first code version is registered
    pub current_code_version: u32,
}

// ################################################################
//                             Code
// ################################################################

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeEntry {
    pub version: u32,
    pub wasm_hash: BytesN<32>,
    pub size: u32,
    pub registered_ledger: u32,
}

// ################################################################
//                             Deployments
// ################################################################

#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum DeploymentStatus {
    Pending = 0,
    Active = 1,
    Failed = 2,
}

/// Next link of the deployment chain. Each one runs in its own invocation.
#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum DeploymentStep {
    /// Create the child instance from the registered code
    Deploy = 0,
    /// Forward the initial balance to the child
    Fund = 1,
    /// Call the child's init entry point
    Initialize = 2,
    Complete = 3,
}

#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum FailureReason {
    FundingFailed = 0,
    InitFailed = 1,
    TimedOut = 2,
}

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentRecord {
    /// `<label>.<account_suffix>`
    pub child_id: String,
    pub label: String,
    pub child_address: Address,
    pub child_owner: Address,
    pub payer: Address,
    pub code_version: u32,
    pub ticket: u64,
    pub initial_balance: i128,
    pub fee_paid: i128,
    pub created_ledger: u32,
    pub created_at: u64,
    pub status: DeploymentStatus,
    pub next_step: DeploymentStep,
}

/// Returned by `deploy`, correlates the request with its eventual outcome.
#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentTicket {
    pub id: u64,
    pub child_id: String,
    pub child_address: Address,
}

/// Outcome of a ticket. Kept after the record itself is removed.
#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketState {
    pub ticket: u64,
    pub child_id: String,
    pub child_address: Address,
    pub status: DeploymentStatus,
    pub failure: Option<FailureReason>,
}

// ################################################################
//                             Audit
// ################################################################

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrandedFunds {
    pub ticket: u64,
    pub child_id: String,
    /// Where the funds are: the abandoned child, or the factory when the refund failed
    pub holder: Address,
    pub payer: Address,
    pub amount: i128,
    pub ledger: u32,
}

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnershipTransfer {
    pub previous_owner: Address,
    pub new_owner: Address,
    pub ledger: u32,
    pub timestamp: u64,
}

use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FactoryError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidLabel = 4,
    AlreadyExists = 5,
    InsufficientDeposit = 6,
    UnknownCodeVersion = 7,
    NotFound = 8,
    InvalidVersion = 9,
    /// The deployment chain behind a ticket failed; see `TicketState::failure`
    DeploymentFailed = 10,
    DeploymentPending = 11,
    /// Committing the request would leave reservations uncovered by the factory balance
    InsufficientFactoryBalance = 12,
    InvalidAmount = 13,
    CodeVersionDisabled = 14,
    InvalidCode = 15,
    InvalidConfig = 16,
    MathOverflow = 17,
    ChildNotActive = 18,
}

/// The flash aggregator result type.
pub type Result<T> = core::result::Result<T, Error>;

/// The flash aggregator error types.
///
/// Every variant aborts the whole in-flight operation: a message returning
/// `Err` reverts all state changes and external effects of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[ink::scale_derive(Encode, Decode, TypeInfo)]
pub enum Error {
    /// Token and amount lists differ in length.
    ArityMismatch,
    /// The same token was requested twice.
    DuplicateAsset,
    /// The canonical token set is not acceptable for the selected route.
    UnvalidatedTokens,
    /// The route id is not in the route table.
    UnknownRoute,
    /// A callback came from an address other than the expected provider,
    /// or for a loan this contract did not initiate.
    InvalidCallbackSender,
    /// The callback payload does not match the outstanding request.
    FingerprintMismatch,
    /// A balance ended below `initial + fee` after the caller's logic ran.
    InsufficientRepayment,
    /// A bridge route's provider charged a fee where none is expected.
    FeeNotZero,
    /// A flash loan is already being executed.
    AlreadyInProgress,
    /// The caller is not the owner.
    NotOwner,
    /// The asset already has a market.
    AlreadyRegistered,
    /// The market handle does not lend the asset it is registered for.
    InvalidMarket,
    /// A bridge route needs a market that was never registered.
    MarketNotRegistered,
    /// Fee above 10000 bps.
    InvalidFee,
    /// The route cannot lend this asset.
    UnsupportedAsset,
    /// The caller's receiver logic reported failure.
    ReceiverFailed,
    /// The callback payload could not be decoded.
    DecodeFailed,
    /// A provider, market or wrapper call failed.
    ProviderCallFailed,
    /// A token call failed without a token error.
    TransferFailed,
    /// Arithmetic overflow while sizing a repayment.
    Overflow,
    /// Error reported by a token contract.
    Token(ierc20::Error),
    /// Error reported by a provider contract.
    Provider(iflash::Error),
}

impl From<ierc20::Error> for Error {
    fn from(error: ierc20::Error) -> Self {
        Error::Token(error)
    }
}

impl From<iflash::Error> for Error {
    fn from(error: iflash::Error) -> Self {
        Error::Provider(error)
    }
}

/// Provider callbacks answer in the provider's error type.
impl From<Error> for iflash::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Provider(error) => error,
            Error::InsufficientRepayment => iflash::Error::RepayFailed,
            Error::Token(_) | Error::TransferFailed => iflash::Error::TransferFailed,
            _ => iflash::Error::CallbackFailed,
        }
    }
}

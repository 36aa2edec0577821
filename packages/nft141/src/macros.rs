/// Evaluates to `Ok(())` when the assertion holds, otherwise logs the error
/// code (and an optional message) and evaluates to `Err(error)`.
///
/// ```ignore
/// validate!(&env, payment >= due, FactoryError::InsufficientDeposit, "Factory: Deploy: payment too low")?;
/// ```
#[macro_export]
macro_rules! validate {
    ($env:expr, $assert:expr, $err:expr) => {{
        if $assert {
            Ok(())
        } else {
            let error_code = $err;
            ::soroban_sdk::log!($env, "Error {} thrown at line {}", error_code as u32, line!());
            Err(error_code)
        }
    }};
    ($env:expr, $assert:expr, $err:expr, $($arg:tt)+) => {{
        if $assert {
            Ok(())
        } else {
            let error_code = $err;
            ::soroban_sdk::log!($env, "Error {} thrown at line {}", error_code as u32, line!());
            ::soroban_sdk::log!($env, $($arg)+);
            Err(error_code)
        }
    }};
}
